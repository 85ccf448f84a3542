use proptest::prelude::*;
use std::collections::BTreeSet;

pub const MAX_HEIGHT: u64 = 400;

/// Distinct `(block, index)` event positions, in chain order
pub fn event_positions_strategy() -> impl Strategy<Value = Vec<(u64, u64)>> {
	prop::collection::btree_set((0..MAX_HEIGHT, 0u64..5), 0..40)
		.prop_map(|positions| positions.into_iter().collect())
}

/// Event positions plus a subset of them whose first delivery fails
pub fn events_with_failures_strategy() -> impl Strategy<Value = (Vec<(u64, u64)>, BTreeSet<(u64, u64)>)>
{
	event_positions_strategy().prop_flat_map(|positions| {
		let len = positions.len();
		(
			Just(positions.clone()),
			prop::sample::subsequence(positions, 0..=len)
				.prop_map(|failing| failing.into_iter().collect::<BTreeSet<_>>()),
		)
	})
}

/// Heights at which a block trigger's first delivery fails
pub fn failing_heights_strategy(height: u64) -> impl Strategy<Value = BTreeSet<u64>> {
	prop::collection::btree_set(0..=height, 0..10)
}
