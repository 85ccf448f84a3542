use std::sync::Arc;

use proptest::{prelude::*, test_runner::Config};

use crate::properties::{
	strategies::{failing_heights_strategy, MAX_HEIGHT},
	support::{interval, runtime, service, FlakyHandler, StaticChain},
};
use eth_listener::services::{
	listener::{ListenerParams, MemoryMetadataStore, MetadataDb},
	trigger::BlockTrigger,
};

fn height_and_failures() -> impl Strategy<Value = (u64, Vec<u64>, Vec<u64>)> {
	(0..MAX_HEIGHT).prop_flat_map(|height| {
		(
			Just(height),
			failing_heights_strategy(height).prop_map(|s| s.into_iter().collect()),
			failing_heights_strategy(height).prop_map(|s| s.into_iter().collect()),
		)
	})
}

proptest! {
	#![proptest_config(Config {
		cases: 64,
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn test_every_block_delivered_once_in_order(
		(height, failing_a, failing_b) in height_and_failures()
	) {
		let handler = Arc::new(FlakyHandler::default());
		{
			let mut failing = handler.failing.lock().unwrap();
			failing.extend(failing_a.iter().map(|h| ("a".to_string(), *h, 0)));
			failing.extend(failing_b.iter().map(|h| ("b".to_string(), *h, 0)));
		}
		let store = MemoryMetadataStore::new();
		let params = ListenerParams::builder()
			.interval(interval())
			.block_trigger(BlockTrigger::new("a", handler.clone()))
			.block_trigger(BlockTrigger::new("b", handler.clone()))
			.build();
		let mut listener = service(params, StaticChain { height, events: vec![] }, &store);
		let db = MetadataDb::new(Arc::new(store.clone()));

		let watermarks = runtime().block_on(async {
			let mut history = Vec::new();
			// Each failure costs at most one extra poll
			for _ in 0..(failing_a.len() + failing_b.len() + 2) {
				listener.poll().await.unwrap();
				let md = db.blocks_metadata().await.unwrap();
				history.push((md.latest("a"), md.latest("b")));
			}
			history
		});

		let expected: Vec<(u64, u64)> = (0..=height).map(|h| (h, 0)).collect();
		prop_assert_eq!(handler.delivered("a"), expected.clone());
		prop_assert_eq!(handler.delivered("b"), expected);

		// Watermarks never move backwards
		for pair in watermarks.windows(2) {
			prop_assert!(pair[0].0 <= pair[1].0);
			prop_assert!(pair[0].1 <= pair[1].1);
		}
		prop_assert_eq!(watermarks.last().copied(), Some((Some(height), Some(height))));
	}
}
