//! Listener configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::{collections::HashSet, path::Path, time::Duration};

use crate::models::{
	blockchain::{specifier_serde, BlockTag},
	config::{ConfigError, ConfigLoader},
	core::TriggerDefinitions,
};

fn default_max_retries() -> u32 {
	3
}

/// Configuration file for a listener instance
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ListenerConfig {
	/// JSON-RPC endpoint of the execution client
	pub rpc_url: String,
	/// Per-request timeout in milliseconds
	pub timeout_ms: u64,
	/// Retries for transient RPC failures
	#[serde(default = "default_max_retries")]
	pub max_retries: u32,
	/// Directory holding the persisted watermarks
	pub metadata_db_path: String,
	/// Poll interval in milliseconds
	pub interval_ms: u64,
	/// Confirmations to wait for when no block specifier is set
	#[serde(default)]
	pub block_delay: u64,
	/// One of `""`, `latest`, `safe` or `finalized`
	#[serde(default, with = "specifier_serde")]
	pub block_specifier: Option<BlockTag>,
	/// One-time override of the block trigger starting height
	#[serde(default)]
	pub earliest_block: Option<u64>,
	#[serde(default)]
	pub triggers: TriggerDefinitions,
}

impl ListenerConfig {
	pub fn interval(&self) -> Duration {
		Duration::from_millis(self.interval_ms)
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}
}

/// Returns the first name that is empty or appears twice.
fn check_names<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> Result<(), String> {
	let mut seen = HashSet::new();
	for name in names {
		if name.trim().is_empty() {
			return Err(format!("{} trigger name must not be empty", kind));
		}
		if !seen.insert(name) {
			return Err(format!("duplicate {} trigger name '{}'", kind, name));
		}
	}
	Ok(())
}

impl ConfigLoader for ListenerConfig {
	fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		if !Self::is_json_file(path) {
			return Err(ConfigError::file_error(format!(
				"{} is not a JSON file",
				path.display()
			)));
		}

		let file = std::fs::File::open(path)?;
		let config: ListenerConfig = serde_json::from_reader(file)?;

		// Validate the config after loading
		if let Err(validation_error) = config.validate() {
			return Err(ConfigError::validation_error(validation_error));
		}

		Ok(config)
	}

	fn validate(&self) -> Result<(), String> {
		// Validate RPC URL format
		if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
			return Err("rpc_url must start with http:// or https://".to_string());
		}
		if url::Url::parse(&self.rpc_url).is_err() {
			return Err(format!("rpc_url '{}' is not a valid URL", self.rpc_url));
		}

		if self.timeout_ms == 0 {
			return Err("timeout_ms must be greater than 0".to_string());
		}

		if self.metadata_db_path.trim().is_empty() {
			return Err("metadata_db_path must not be empty".to_string());
		}

		if self.interval_ms == 0 {
			return Err("interval_ms must be greater than 0".to_string());
		}

		check_names("block", self.triggers.blocks.iter().map(|t| t.name.as_str()))?;
		check_names(
			"transaction",
			self.triggers.transactions.iter().map(|t| t.name.as_str()),
		)?;
		check_names("event", self.triggers.events.iter().map(|t| t.name.as_str()))?;

		if let Some(trigger) = self.triggers.events.iter().find(|t| t.source.is_none()) {
			return Err(format!(
				"event trigger '{}' must declare a source address",
				trigger.name
			));
		}

		Ok(())
	}
}
