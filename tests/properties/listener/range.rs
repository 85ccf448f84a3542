use proptest::{prelude::*, test_runner::Config};

use eth_listener::services::listener::{delayed_height, window_end, MAX_BLOCKS_FOR_EVENTS};

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn test_delayed_height(chain_height in any::<u64>(), block_delay in any::<u64>()) {
		match delayed_height(chain_height, block_delay) {
			Some(height) => prop_assert_eq!(height + block_delay, chain_height),
			None => prop_assert!(chain_height < block_delay),
		}
	}

	#[test]
	fn test_window_stays_within_bounds(from in 0u64..1_000_000, span in 0u64..1_000) {
		let to = from + span;
		let end = window_end(from, to);
		prop_assert!(end >= from);
		prop_assert!(end <= to);
		prop_assert!(end - from < MAX_BLOCKS_FOR_EVENTS);
		prop_assert!(end == to || end - from == MAX_BLOCKS_FOR_EVENTS - 1);
	}
}
