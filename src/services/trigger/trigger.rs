//! Runtime triggers: a name, a floor height, optional filters and a handler.

use alloy::primitives::{Address, B256};
use std::{fmt, sync::Arc};

use crate::{
	models::Transaction,
	services::trigger::{BlockHandler, EventHandler, SourceResolver, TriggerError, TxHandler},
};

/// Subscription to every block
#[derive(Clone)]
pub struct BlockTrigger {
	/// Unique among block triggers; keys the persisted watermark
	pub name: String,
	/// Heights below this are never handled
	pub earliest_block: u64,
	pub handler: Arc<dyn BlockHandler>,
}

impl BlockTrigger {
	pub fn new(name: impl Into<String>, handler: Arc<dyn BlockHandler>) -> Self {
		Self {
			name: name.into(),
			earliest_block: 0,
			handler,
		}
	}

	pub fn with_earliest_block(mut self, earliest_block: u64) -> Self {
		self.earliest_block = earliest_block;
		self
	}
}

impl fmt::Debug for BlockTrigger {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BlockTrigger")
			.field("name", &self.name)
			.field("earliest_block", &self.earliest_block)
			.finish_non_exhaustive()
	}
}

/// Subscription to transactions, optionally filtered by sender and recipient
#[derive(Clone)]
pub struct TxTrigger {
	pub name: String,
	pub earliest_block: u64,
	pub from: Option<Address>,
	pub to: Option<Address>,
	pub handler: Arc<dyn TxHandler>,
}

impl TxTrigger {
	pub fn new(name: impl Into<String>, handler: Arc<dyn TxHandler>) -> Self {
		Self {
			name: name.into(),
			earliest_block: 0,
			from: None,
			to: None,
			handler,
		}
	}

	pub fn with_earliest_block(mut self, earliest_block: u64) -> Self {
		self.earliest_block = earliest_block;
		self
	}

	pub fn with_from(mut self, from: Address) -> Self {
		self.from = Some(from);
		self
	}

	pub fn with_to(mut self, to: Address) -> Self {
		self.to = Some(to);
		self
	}

	/// Checks the address filters. A `to` filter never matches a contract creation.
	pub fn matches(&self, tx: &Transaction) -> bool {
		if self.from.is_some_and(|from| from != tx.sender()) {
			return false;
		}
		if self.to.is_some() && self.to != tx.to() {
			return false;
		}
		true
	}
}

impl fmt::Debug for TxTrigger {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TxTrigger")
			.field("name", &self.name)
			.field("earliest_block", &self.earliest_block)
			.field("from", &self.from)
			.field("to", &self.to)
			.finish_non_exhaustive()
	}
}

/// Subscription to log events of one contract
///
/// The contract is either a static `source` or, when it is only known at runtime, a
/// `source_resolver` consulted once per poll. The resolver wins when both are set.
#[derive(Clone)]
pub struct EventTrigger {
	pub name: String,
	pub earliest_block: u64,
	pub source: Option<Address>,
	pub source_resolver: Option<Arc<dyn SourceResolver>>,
	pub topics: Vec<B256>,
	pub handler: Arc<dyn EventHandler>,
}

impl EventTrigger {
	pub fn new(name: impl Into<String>, handler: Arc<dyn EventHandler>) -> Self {
		Self {
			name: name.into(),
			earliest_block: 0,
			source: None,
			source_resolver: None,
			topics: Vec::new(),
			handler,
		}
	}

	pub fn with_earliest_block(mut self, earliest_block: u64) -> Self {
		self.earliest_block = earliest_block;
		self
	}

	pub fn with_source(mut self, source: Address) -> Self {
		self.source = Some(source);
		self
	}

	pub fn with_source_resolver(mut self, resolver: Arc<dyn SourceResolver>) -> Self {
		self.source_resolver = Some(resolver);
		self
	}

	pub fn with_topics(mut self, topics: Vec<B256>) -> Self {
		self.topics = topics;
		self
	}

	/// Returns the contract address to query for this poll.
	pub async fn resolve_source(&self) -> Result<Address, TriggerError> {
		match (&self.source_resolver, self.source) {
			(Some(resolver), _) => resolver.resolve().await,
			(None, Some(source)) => Ok(source),
			(None, None) => Err(TriggerError::configuration_error(format!(
				"event trigger '{}' has no source",
				self.name
			))),
		}
	}
}

impl fmt::Debug for EventTrigger {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EventTrigger")
			.field("name", &self.name)
			.field("earliest_block", &self.earliest_block)
			.field("source", &self.source)
			.field("has_source_resolver", &self.source_resolver.is_some())
			.field("topics", &self.topics)
			.finish_non_exhaustive()
	}
}
