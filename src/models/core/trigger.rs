use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// Trigger definitions grouped by kind, as read from the listener configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerDefinitions {
	#[serde(default)]
	pub blocks: Vec<BlockTriggerConfig>,
	#[serde(default)]
	pub transactions: Vec<TxTriggerConfig>,
	#[serde(default)]
	pub events: Vec<EventTriggerConfig>,
}

impl TriggerDefinitions {
	pub fn is_empty(&self) -> bool {
		self.blocks.is_empty() && self.transactions.is_empty() && self.events.is_empty()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BlockTriggerConfig {
	pub name: String,
	#[serde(default)]
	pub earliest_block: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TxTriggerConfig {
	pub name: String,
	#[serde(default)]
	pub earliest_block: u64,
	/// Only dispatch transactions sent by this address
	#[serde(default)]
	pub from: Option<Address>,
	/// Only dispatch transactions sent to this address
	#[serde(default)]
	pub to: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EventTriggerConfig {
	pub name: String,
	#[serde(default)]
	pub earliest_block: u64,
	/// Contract address whose logs are watched
	#[serde(default)]
	pub source: Option<Address>,
	/// Positional topic filter; topic 0 is the event signature hash
	#[serde(default)]
	pub topics: Vec<B256>,
}
