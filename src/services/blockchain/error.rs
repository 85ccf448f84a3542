//! Blockchain error types and handling.
//!
//! This module provides the error type returned by the chain providers, covering network
//! connectivity, request processing, and missing blocks.

use log::error;

/// Represents possible errors that can occur during blockchain operations
#[derive(Debug)]
pub enum BlockChainError {
	/// Errors related to network connectivity issues
	ConnectionError(String),

	/// Errors related to malformed requests or invalid responses
	RequestError(String),

	/// When a requested block cannot be found on the blockchain
	///
	/// Contains the height or tag that was requested
	BlockNotFound(String),

	/// Internal errors within the blockchain client
	InternalError(String),
}

impl BlockChainError {
	/// Formats the error message based on the error type
	fn format_message(&self) -> String {
		match self {
			Self::ConnectionError(msg) => format!("Connection error: {}", msg),
			Self::RequestError(msg) => format!("Request error: {}", msg),
			Self::BlockNotFound(id) => format!("Block not found: {}", id),
			Self::InternalError(msg) => format!("Internal error: {}", msg),
		}
	}

	/// Creates a new connection error with logging
	pub fn connection_error(msg: impl Into<String>) -> Self {
		let error = Self::ConnectionError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new request error with logging
	pub fn request_error(msg: impl Into<String>) -> Self {
		let error = Self::RequestError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new block not found error with logging
	pub fn block_not_found(id: impl ToString) -> Self {
		let error = Self::BlockNotFound(id.to_string());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new internal error with logging
	pub fn internal_error(msg: impl Into<String>) -> Self {
		let error = Self::InternalError(msg.into());
		error!("{}", error.format_message());
		error
	}
}

// Standard error trait implementations
impl std::fmt::Display for BlockChainError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl std::error::Error for BlockChainError {}

impl From<reqwest_middleware::Error> for BlockChainError {
	fn from(err: reqwest_middleware::Error) -> Self {
		Self::connection_error(err.to_string())
	}
}
