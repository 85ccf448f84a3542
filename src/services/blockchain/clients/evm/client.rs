//! EVM-compatible blockchain client implementation.
//!
//! This module provides the JSON-RPC adapter behind the listener's provider capabilities:
//! chain height via `eth_blockNumber`, blocks via `eth_getBlockByNumber` and log events via
//! `eth_getLogs`.

use alloy::primitives::U64;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use crate::{
	models::{Block, BlockId, Event},
	services::blockchain::{
		client::{BlocksProvider, ChainHeightProvider, EventsFilter, EventsProvider},
		transports::{BlockchainTransport, HttpTransportClient},
		BlockChainError,
	},
	utils::http::HttpRetryConfig,
};

/// Client implementation for Ethereum Virtual Machine (EVM) compatible blockchains
#[derive(Clone)]
pub struct EvmClient<T: Send + Sync + Clone> {
	/// The underlying transport client for RPC communication
	transport: T,
}

impl<T: Send + Sync + Clone> EvmClient<T> {
	/// Creates a new EVM client instance with a specific transport client
	pub fn new_with_transport(transport: T) -> Self {
		Self { transport }
	}
}

impl EvmClient<HttpTransportClient> {
	/// Creates a new EVM client talking JSON-RPC over HTTP
	///
	/// # Arguments
	/// * `rpc_url` - Endpoint of the execution client
	/// * `timeout` - Per-request timeout
	/// * `retry_config` - Retry policy for transient failures
	pub fn new(
		rpc_url: &str,
		timeout: Duration,
		retry_config: &HttpRetryConfig,
	) -> Result<Self, BlockChainError> {
		let transport = HttpTransportClient::new(rpc_url, timeout, retry_config)?;
		Ok(Self::new_with_transport(transport))
	}
}

/// Extracts the `result` field of a JSON-RPC response
fn take_result(mut response: Value) -> Result<Value, BlockChainError> {
	response
		.get_mut("result")
		.map(Value::take)
		.ok_or_else(|| BlockChainError::request_error("Missing 'result' field".to_string()))
}

#[async_trait]
impl<T: Send + Sync + Clone + BlockchainTransport> ChainHeightProvider for EvmClient<T> {
	async fn chain_height(&self) -> Result<u64, BlockChainError> {
		let response = self
			.transport
			.send_raw_request::<Value>("eth_blockNumber", None)
			.await?;

		let result = take_result(response)?;

		serde_json::from_value::<U64>(result)
			.map(|height| height.to::<u64>())
			.map_err(|e| {
				BlockChainError::request_error(format!("Failed to parse block number: {}", e))
			})
	}
}

#[async_trait]
impl<T: Send + Sync + Clone + BlockchainTransport> BlocksProvider for EvmClient<T> {
	/// Retrieves a block with full transaction objects
	///
	/// # Errors
	/// - Returns `BlockChainError::BlockNotFound` if the node returns `null`
	/// - Returns `BlockChainError::RequestError` if the block cannot be parsed
	async fn block(&self, id: BlockId) -> Result<Block, BlockChainError> {
		let params = json!([id.to_rpc_param(), true]);

		let response = self
			.transport
			.send_raw_request("eth_getBlockByNumber", Some(params))
			.await?;

		let block_data = take_result(response)?;

		// Handle null response case
		if block_data.is_null() {
			return Err(BlockChainError::block_not_found(id));
		}

		serde_json::from_value(block_data).map_err(|e| {
			BlockChainError::request_error(format!("Failed to parse block {}: {}", id, e))
		})
	}
}

#[async_trait]
impl<T: Send + Sync + Clone + BlockchainTransport> EventsProvider for EvmClient<T> {
	async fn events(&self, filter: &EventsFilter) -> Result<Vec<Event>, BlockChainError> {
		let mut query = json!({
			"fromBlock": U64::from(filter.from_block),
			"toBlock": U64::from(filter.to_block),
		});
		if let Some(address) = filter.address {
			query["address"] = json!(address);
		}
		if !filter.topics.is_empty() {
			query["topics"] = json!(filter.topics);
		}

		let response = self
			.transport
			.send_raw_request("eth_getLogs", Some(json!([query])))
			.await?;

		let logs_data = take_result(response)?;

		// Parse the response into the expected type
		serde_json::from_value(logs_data)
			.map_err(|e| BlockChainError::request_error(format!("Failed to parse logs: {}", e)))
	}
}
