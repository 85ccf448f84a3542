//! HTTP transport implementation for blockchain interactions.
//!
//! Sends JSON-RPC 2.0 requests to a single execution client endpoint, supporting:
//! - Per-request timeouts
//! - Exponential backoff on transient failures (connection errors, 5xx, 429)
//! - Mapping of JSON-RPC error objects to `BlockChainError::RequestError`

use async_trait::async_trait;
use reqwest::ClientBuilder;
use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use serde_json::Value;
use std::{
	sync::{
		atomic::{AtomicU64, Ordering},
		Arc,
	},
	time::Duration,
};
use url::Url;

use crate::{
	services::blockchain::{transports::BlockchainTransport, BlockChainError},
	utils::http::{create_retryable_http_client, HttpRetryConfig},
};

/// Basic HTTP transport client for JSON-RPC nodes
///
/// The client is cheap to clone and can be shared across tasks.
#[derive(Clone, Debug)]
pub struct HttpTransportClient {
	/// HTTP client with the retry middleware attached
	client: ClientWithMiddleware,
	url: Url,
	next_id: Arc<AtomicU64>,
}

impl HttpTransportClient {
	/// Creates a new HTTP transport client
	///
	/// # Arguments
	/// * `url` - JSON-RPC endpoint
	/// * `timeout` - Per-request timeout
	/// * `retry_config` - Retry policy for transient failures
	pub fn new(
		url: &str,
		timeout: Duration,
		retry_config: &HttpRetryConfig,
	) -> Result<Self, BlockChainError> {
		let url = Url::parse(url)
			.map_err(|e| BlockChainError::internal_error(format!("Invalid URL {}: {}", url, e)))?;

		let base_client = ClientBuilder::new().timeout(timeout).build().map_err(|e| {
			BlockChainError::internal_error(format!("Failed to create HTTP client: {}", e))
		})?;

		Ok(Self {
			client: create_retryable_http_client(retry_config, base_client),
			url,
			next_id: Arc::new(AtomicU64::new(1)),
		})
	}
}

#[async_trait]
impl BlockchainTransport for HttpTransportClient {
	fn get_current_url(&self) -> String {
		self.url.to_string()
	}

	/// Sends a JSON-RPC request to the node
	///
	/// # Returns
	/// * `Result<Value, BlockChainError>` - The full JSON-RPC response object
	///
	/// # Errors
	/// - `ConnectionError` when the request could not be delivered or the node answered with a
	///   non-success HTTP status
	/// - `RequestError` when the body is not valid JSON or carries a JSON-RPC `error` object
	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, BlockChainError>
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let request_body = self.customize_request(id, method, params);

		tracing::trace!(method, id, "sending JSON-RPC request");

		let response = self
			.client
			.post(self.url.clone())
			.json(&request_body)
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			let error_body = response.text().await.unwrap_or_default();
			return Err(BlockChainError::connection_error(format!(
				"{} to {} failed with status {}: {}",
				method, self.url, status, error_body
			)));
		}

		let body: Value = response.json().await.map_err(|e| {
			BlockChainError::request_error(format!("Failed to parse JSON response: {}", e))
		})?;

		if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
			let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
			let message = error
				.get("message")
				.and_then(Value::as_str)
				.unwrap_or("unknown error");
			return Err(BlockChainError::request_error(format!(
				"{} returned error {}: {}",
				method, code, message
			)));
		}

		Ok(body)
	}
}
