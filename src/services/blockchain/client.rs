//! Chain provider capabilities consumed by the listener.
//!
//! The listener only needs three narrow capabilities from a node: the current chain height, a
//! block by height or tag, and a ranged log query. Each is its own trait so tests and alternative
//! backends can supply them independently.

use alloy::primitives::{Address, B256};
use async_trait::async_trait;

use crate::{
	models::{Block, BlockId, Event},
	services::blockchain::BlockChainError,
};

/// Reports the current chain height
#[async_trait]
pub trait ChainHeightProvider: Send + Sync {
	/// Retrieves the latest block number from the blockchain
	async fn chain_height(&self) -> Result<u64, BlockChainError>;
}

/// Fetches single blocks with their full transaction list
#[async_trait]
pub trait BlocksProvider: Send + Sync {
	/// Retrieves a block by height or named tag
	///
	/// # Errors
	/// Returns `BlockChainError::BlockNotFound` when the node has no such block
	async fn block(&self, id: BlockId) -> Result<Block, BlockChainError>;
}

/// Executes ranged, filtered log queries
#[async_trait]
pub trait EventsProvider: Send + Sync {
	/// Retrieves the events matching `filter`, ordered by block then log index
	async fn events(&self, filter: &EventsFilter) -> Result<Vec<Event>, BlockChainError>;
}

/// Inclusive block range plus address/topic filter for a log query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsFilter {
	pub from_block: u64,
	pub to_block: u64,
	pub address: Option<Address>,
	/// Positional topic filter; an empty list matches any topics
	pub topics: Vec<B256>,
}
