//! Listener error types.
//!
//! Configuration errors are fatal at construction. Provider and storage errors abort the current
//! poll cycle only. Cancellation is reported separately so it is never counted as a failure.

use log::error;
use thiserror::Error;

use crate::services::{blockchain::BlockChainError, trigger::TriggerError};

#[derive(Debug, Error)]
pub enum ListenerError {
	/// Invalid parameters or trigger definitions
	#[error("Configuration error: {0}")]
	ConfigurationError(String),

	/// Chain height, block or events query failed
	#[error("Provider error: {0}")]
	ProviderError(String),

	/// Metadata store read or write failed, or the store is closed
	#[error("Storage error: {0}")]
	StorageError(String),

	/// Shutdown was requested while work was in flight
	#[error("Listener cancelled")]
	Cancelled,
}

impl ListenerError {
	pub fn configuration_error(msg: impl Into<String>) -> Self {
		let error = Self::ConfigurationError(msg.into());
		error!("{}", error);
		error
	}

	pub fn provider_error(msg: impl Into<String>) -> Self {
		let error = Self::ProviderError(msg.into());
		error!("{}", error);
		error
	}

	pub fn storage_error(msg: impl Into<String>) -> Self {
		let error = Self::StorageError(msg.into());
		error!("{}", error);
		error
	}

	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Cancelled)
	}
}

impl From<BlockChainError> for ListenerError {
	fn from(err: BlockChainError) -> Self {
		Self::provider_error(err.to_string())
	}
}

impl From<TriggerError> for ListenerError {
	fn from(err: TriggerError) -> Self {
		Self::configuration_error(err.to_string())
	}
}

impl From<serde_json::Error> for ListenerError {
	fn from(err: serde_json::Error) -> Self {
		Self::storage_error(format!("malformed metadata: {}", err))
	}
}

impl From<std::io::Error> for ListenerError {
	fn from(err: std::io::Error) -> Self {
		Self::storage_error(err.to_string())
	}
}
