//! Log event data structure as returned by `eth_getLogs`.

use alloy::rpc::types::Log;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Wrapper around a mined alloy RPC log
///
/// Construction goes through `TryFrom<Log>`, which rejects pending logs without a block number
/// or log index, so the position accessors are always backed by node data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Log")]
pub struct Event(Log);

impl Event {
	/// Get the height of the block that emitted the event
	pub fn block_number(&self) -> u64 {
		self.0.block_number.unwrap_or_default()
	}

	/// Get the position of the event within its block
	pub fn log_index(&self) -> u64 {
		self.0.log_index.unwrap_or_default()
	}

	/// Returns the `(block, index)` position of the event on chain.
	pub fn position(&self) -> (u64, u64) {
		(self.block_number(), self.log_index())
	}

	/// Unwraps the underlying RPC log
	pub fn into_inner(self) -> Log {
		self.0
	}
}

impl TryFrom<Log> for Event {
	type Error = String;

	fn try_from(log: Log) -> Result<Self, Self::Error> {
		if log.block_number.is_none() {
			return Err("log is missing blockNumber".to_string());
		}
		if log.log_index.is_none() {
			return Err("log is missing logIndex".to_string());
		}
		Ok(Self(log))
	}
}

impl Deref for Event {
	type Target = Log;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
