use std::sync::Arc;

use proptest::{prelude::*, test_runner::Config};

use crate::properties::{
	strategies::{events_with_failures_strategy, MAX_HEIGHT},
	support::{interval, runtime, service, FlakyHandler, StaticChain},
};
use alloy::primitives::Address;
use eth_listener::services::{
	listener::{
		EventsEntry, ListenerParams, MemoryMetadataStore, MetadataDb, MAX_BLOCKS_FOR_EVENTS,
	},
	trigger::EventTrigger,
};

proptest! {
	#![proptest_config(Config {
		cases: 64,
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn test_every_event_delivered_once_in_order(
		(positions, failing) in events_with_failures_strategy(),
		height in 0..MAX_HEIGHT,
	) {
		let handler = Arc::new(FlakyHandler::default());
		handler
			.failing
			.lock()
			.unwrap()
			.extend(failing.iter().map(|&(block, index)| ("logs".to_string(), block, index)));
		let store = MemoryMetadataStore::new();
		let params = ListenerParams::builder()
			.interval(interval())
			.event_trigger(EventTrigger::new("logs", handler.clone()).with_source(Address::ZERO))
			.build();
		let chain = StaticChain { height, events: positions.clone() };
		let mut listener = service(params, chain, &store);
		let db = MetadataDb::new(Arc::new(store.clone()));

		let windows = height / MAX_BLOCKS_FOR_EVENTS + 1;
		let cursors: Vec<EventsEntry> = runtime().block_on(async {
			let mut cursors = Vec::new();
			// Each failure costs at most one extra poll
			for _ in 0..(windows as usize + failing.len() + 1) {
				listener.poll().await.unwrap();
				let md = db.events_metadata().await.unwrap();
				cursors.push(md.entries["logs"]);
			}
			cursors
		});

		let expected: Vec<(u64, u64)> = positions
			.iter()
			.copied()
			.filter(|(block, _)| *block <= height)
			.collect();
		prop_assert_eq!(handler.delivered("logs"), expected);

		// Cursors only move forward
		let key = |c: &EventsEntry| (c.latest_block, c.latest_event_index.map_or(-1, |i| i as i64));
		for pair in cursors.windows(2) {
			prop_assert!(key(&pair[0]) <= key(&pair[1]));
		}
		prop_assert_eq!(
			cursors.last().copied(),
			Some(EventsEntry { latest_block: height + 1, latest_event_index: None })
		);
	}
}
