//! Polling listener.
//!
//! Each poll cycle selects the highest block eligible for processing, then walks blocks,
//! transactions and events for their triggers. Progress is persisted after every unit of work
//! (a block height, or one trigger's event window) so a restart resumes where it stopped.
//!
//! - `service`: construction, poll cycle and background loop
//! - `range`: selection of the highest eligible block
//! - `blocks`, `transactions`, `events`: the per-kind walkers
//! - `metadata`: persisted watermarks and serialized store access
//! - `storage`: metadata store implementations

mod blocks;
mod error;
mod events;
mod metadata;
mod range;
mod service;
mod storage;
mod transactions;

pub use blocks::calculate_blocks_from;
pub use error::ListenerError;
pub use events::{already_handled, resolve_cursor, window_end, MAX_BLOCKS_FOR_EVENTS};
pub use metadata::{
	BlocksMetadata, EventsEntry, EventsMetadata, MetadataDb, TransactionsMetadata,
	BLOCKS_METADATA_KEY, EVENTS_METADATA_KEY, TRANSACTIONS_METADATA_KEY,
};
pub use range::delayed_height;
pub use service::{ListenerParams, ListenerParamsBuilder, ListenerProviders, ListenerService};
pub use storage::{FileMetadataStore, MemoryMetadataStore, MetadataStore};
pub use transactions::calculate_txs_from;
