use std::sync::Arc;

use eth_listener::services::listener::{
	BlocksMetadata, EventsEntry, EventsMetadata, FileMetadataStore, MetadataDb, MetadataStore,
	TransactionsMetadata, EVENTS_METADATA_KEY,
};

#[tokio::test]
async fn test_metadata_survives_reopen() {
	let dir = tempfile::tempdir().unwrap();

	{
		let db = MetadataDb::new(Arc::new(FileMetadataStore::open(dir.path()).await.unwrap()));
		let mut blocks = BlocksMetadata::default();
		blocks.set_latest("audit", Some(1234));
		db.set_blocks_metadata(&blocks).await.unwrap();
		db.set_transactions_metadata(&TransactionsMetadata {
			latest_block: Some(99),
		})
		.await
		.unwrap();
		let mut events = EventsMetadata::default();
		events.entries.insert(
			"transfers".to_string(),
			EventsEntry {
				latest_block: 77,
				latest_event_index: Some(4),
			},
		);
		db.set_events_metadata(&events).await.unwrap();
		db.close().await.unwrap();
	}

	let db = MetadataDb::new(Arc::new(FileMetadataStore::open(dir.path()).await.unwrap()));
	assert_eq!(db.blocks_metadata().await.unwrap().latest("audit"), Some(1234));
	assert_eq!(
		db.transactions_metadata().await.unwrap().latest_block,
		Some(99)
	);
	assert_eq!(
		db.events_metadata().await.unwrap().entries["transfers"],
		EventsEntry {
			latest_block: 77,
			latest_event_index: Some(4),
		}
	);
}

#[tokio::test]
async fn test_legacy_events_metadata_is_migrated() {
	let dir = tempfile::tempdir().unwrap();
	let store = FileMetadataStore::open(dir.path()).await.unwrap();
	store
		.set(EVENTS_METADATA_KEY, br#"{"latest_blocks":{"transfers":500}}"#)
		.await
		.unwrap();

	let db = MetadataDb::new(Arc::new(store));
	let md = db.events_metadata().await.unwrap();

	assert_eq!(md.version, 2);
	assert_eq!(
		md.entries["transfers"],
		EventsEntry {
			latest_block: 500,
			latest_event_index: None,
		}
	);
}

#[tokio::test]
async fn test_closed_database_rejects_access() {
	let dir = tempfile::tempdir().unwrap();
	let db = MetadataDb::new(Arc::new(FileMetadataStore::open(dir.path()).await.unwrap()));

	db.close().await.unwrap();
	// Closing twice is harmless
	db.close().await.unwrap();

	assert!(!db.is_open().await);
	assert!(db.blocks_metadata().await.is_err());
	assert!(db
		.set_transactions_metadata(&TransactionsMetadata::default())
		.await
		.is_err());
}
