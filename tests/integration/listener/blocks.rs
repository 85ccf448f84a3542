use std::sync::Arc;

use crate::integration::mocks::{interval, listener, metadata, FakeChain, RecordingBlockHandler};
use eth_listener::{
	models::{BlockId, BlockTag},
	services::{
		listener::{BlocksMetadata, ListenerError, ListenerParams, MemoryMetadataStore},
		trigger::BlockTrigger,
	},
};

fn params(handler: &Arc<RecordingBlockHandler>, names: &[&str]) -> ListenerParams {
	let mut builder = ListenerParams::builder().interval(interval());
	for name in names {
		builder = builder.block_trigger(BlockTrigger::new(*name, handler.clone()));
	}
	builder.build()
}

#[tokio::test]
async fn test_walks_every_block_up_to_chain_head() {
	let chain = FakeChain::new(5);
	let handler = RecordingBlockHandler::new();
	let store = MemoryMetadataStore::new();
	let mut service = listener(params(&handler, &["audit"]), &chain, &store);

	service.poll().await.unwrap();

	assert_eq!(handler.heights("audit"), vec![0, 1, 2, 3, 4, 5]);
	let md = metadata(&store).blocks_metadata().await.unwrap();
	assert_eq!(md.latest("audit"), Some(5));
}

#[tokio::test]
async fn test_failing_trigger_does_not_hold_back_others() {
	let chain = FakeChain::new(60);
	let handler = RecordingBlockHandler::new();
	handler.fail_at("a", 50);
	let store = MemoryMetadataStore::new();
	let mut service = listener(params(&handler, &["a", "b"]), &chain, &store);

	service.poll().await.unwrap();

	let md = metadata(&store).blocks_metadata().await.unwrap();
	assert_eq!(md.latest("a"), Some(49));
	assert_eq!(md.latest("b"), Some(60));
	assert_eq!(handler.heights("a").last(), Some(&49));
	assert_eq!(handler.heights("b").len(), 61);

	// Once the handler recovers, only the lagging trigger is handed blocks again
	handler.recover();
	service.poll().await.unwrap();

	let md = metadata(&store).blocks_metadata().await.unwrap();
	assert_eq!(md.latest("a"), Some(60));
	assert_eq!(md.latest("b"), Some(60));
	assert_eq!(handler.heights("a"), (0..=60).collect::<Vec<_>>());
	assert_eq!(handler.heights("b"), (0..=60).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_block_delay_holds_back_recent_blocks() {
	let chain = FakeChain::new(100);
	let handler = RecordingBlockHandler::new();
	let store = MemoryMetadataStore::new();
	let mut params = params(&handler, &["audit"]);
	params.block_delay = 10;
	let mut service = listener(params, &chain, &store);

	service.poll().await.unwrap();

	assert_eq!(handler.heights("audit").last(), Some(&90));
}

#[tokio::test]
async fn test_chain_shorter_than_delay_is_skipped() {
	let chain = FakeChain::new(3);
	let handler = RecordingBlockHandler::new();
	let store = MemoryMetadataStore::new();
	let mut params = params(&handler, &["audit"]);
	params.block_delay = 10;
	let mut service = listener(params, &chain, &store);

	service.poll().await.unwrap();

	assert!(handler.heights("audit").is_empty());
	assert!(chain.block_requests().is_empty());
}

#[tokio::test]
async fn test_block_specifier_bounds_the_walk() {
	let chain = FakeChain::new(100);
	chain.set_tagged_height(95);
	let handler = RecordingBlockHandler::new();
	let store = MemoryMetadataStore::new();
	let mut params = params(&handler, &["audit"]);
	params.block_specifier = Some(BlockTag::Finalized);
	// Ignored when a specifier is set
	params.block_delay = 50;
	let mut service = listener(params, &chain, &store);

	service.poll().await.unwrap();

	assert_eq!(
		chain.block_requests()[0],
		BlockId::Tag(BlockTag::Finalized)
	);
	assert_eq!(handler.heights("audit").last(), Some(&95));
}

#[tokio::test]
async fn test_floor_skips_earlier_blocks() {
	let chain = FakeChain::new(20);
	let handler = RecordingBlockHandler::new();
	let store = MemoryMetadataStore::new();
	let params = ListenerParams::builder()
		.interval(interval())
		.block_trigger(BlockTrigger::new("late", handler.clone()).with_earliest_block(15))
		.build();
	let mut service = listener(params, &chain, &store);

	service.poll().await.unwrap();

	assert_eq!(handler.heights("late"), vec![15, 16, 17, 18, 19, 20]);
	assert!(!chain.block_requests().contains(&BlockId::Number(14)));
}

#[tokio::test]
async fn test_restart_resumes_after_watermark() {
	let chain = FakeChain::new(10);
	let handler = RecordingBlockHandler::new();
	let store = MemoryMetadataStore::new();

	let mut service = listener(params(&handler, &["audit"]), &chain, &store);
	service.poll().await.unwrap();
	drop(service);

	chain.set_height(13);
	let mut restarted = listener(params(&handler, &["audit"]), &chain, &store);
	restarted.poll().await.unwrap();

	assert_eq!(handler.heights("audit"), (0..=13).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_earliest_block_override_is_applied_once() {
	let chain = FakeChain::new(105);
	let handler = RecordingBlockHandler::new();
	let store = MemoryMetadataStore::new();

	let mut md = BlocksMetadata::default();
	md.set_latest("audit", Some(104));
	metadata(&store).set_blocks_metadata(&md).await.unwrap();

	let mut params = params(&handler, &["audit"]);
	params.earliest_block = Some(100);
	let mut service = listener(params, &chain, &store);

	service.poll().await.unwrap();
	assert_eq!(handler.heights("audit"), vec![100, 101, 102, 103, 104, 105]);

	// The override is not re-applied on later polls
	service.poll().await.unwrap();
	assert_eq!(handler.heights("audit").len(), 6);
}

#[tokio::test]
async fn test_provider_failure_ends_cycle_and_keeps_progress() {
	let chain = FakeChain::new(10);
	chain.fail_block(7);
	let handler = RecordingBlockHandler::new();
	let store = MemoryMetadataStore::new();
	let mut service = listener(params(&handler, &["audit"]), &chain, &store);

	let result = service.poll().await;

	assert!(matches!(result, Err(ListenerError::ProviderError(_))));
	let md = metadata(&store).blocks_metadata().await.unwrap();
	assert_eq!(md.latest("audit"), Some(6));
}
