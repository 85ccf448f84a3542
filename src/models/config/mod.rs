//! Configuration loading and validation.
//!
//! The listener is configured from a single JSON file. Loaders validate what they parse so that
//! a service is never constructed from an invalid configuration.

use std::path::Path;

mod error;
mod listener_config;

pub use error::ConfigError;
pub use listener_config::ListenerConfig;

/// Common interface for loading configuration files
pub trait ConfigLoader: Sized {
	/// Load and validate a configuration from a specific file
	fn load_from_path(path: &Path) -> Result<Self, ConfigError>;

	/// Validate the loaded configuration
	fn validate(&self) -> Result<(), String>;

	fn is_json_file(path: &Path) -> bool {
		path.extension()
			.map(|ext| ext.to_string_lossy().to_lowercase() == "json")
			.unwrap_or(false)
	}
}
