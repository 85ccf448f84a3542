//! Network transport implementations for blockchain clients.
//!
//! - HTTP JSON-RPC transport for EVM execution clients

mod http;

pub use http::HttpTransportClient;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use crate::services::blockchain::BlockChainError;

/// Base trait for all blockchain transport clients
#[async_trait]
pub trait BlockchainTransport: Send + Sync {
	/// Get the URL being used by the transport
	fn get_current_url(&self) -> String;

	/// Send a raw request to the blockchain and return the full JSON-RPC response
	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, BlockChainError>
	where
		P: Into<Value> + Send + Clone + Serialize;

	/// Builds the JSON-RPC request body
	fn customize_request<P>(&self, id: u64, method: &str, params: Option<P>) -> Value
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		json!({
			"jsonrpc": "2.0",
			"id": id,
			"method": method,
			"params": params.map(|p| p.into()).unwrap_or_else(|| json!([]))
		})
	}
}
