//! Ethereum chain listener entry point.
//!
//! This binary loads a listener configuration, attaches logging handlers to its triggers and
//! polls the chain until interrupted.
//!
//! # Flow
//! 1. Loads environment variables and applies command line overrides
//! 2. Loads and validates the configuration file
//! 3. Builds the RPC client, metadata store and listener
//! 4. Optionally serves Prometheus metrics
//! 5. Polls until Ctrl+C, then stops the listener and closes the metadata store

use eth_listener::{
	bootstrap::initialize_listener,
	models::{ConfigLoader, ListenerConfig},
	utils::{logging::setup_logging, metrics::server::create_metrics_server},
};

use clap::{Arg, Command};
use dotenvy::dotenv;
use std::env::{set_var, var};
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "config/listener.json";
const DEFAULT_METRICS_ADDRESS: &str = "127.0.0.1:8081";

/// Main entry point for the chain listener.
///
/// # Errors
/// Returns an error if the configuration cannot be loaded or the listener cannot be built.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let matches = Command::new("eth-listener")
		.version(env!("CARGO_PKG_VERSION"))
		.about(
			"Polls an Ethereum node and hands blocks, transactions and contract events to \
			 configured triggers.",
		)
		.arg(
			Arg::new("config")
				.long("config")
				.help("Path to the listener configuration file (default: config/listener.json)")
				.value_name("PATH"),
		)
		.arg(
			Arg::new("log-level")
				.long("log-level")
				.help("Set log level (trace, debug, info, warn, error)")
				.value_name("LEVEL"),
		)
		.arg(
			Arg::new("metrics-address")
				.long("metrics-address")
				.help("Address to start the metrics server on (default: 127.0.0.1:8081)")
				.value_name("HOST:PORT"),
		)
		.arg(
			Arg::new("metrics")
				.long("metrics")
				.help("Enable metrics server")
				.action(clap::ArgAction::SetTrue),
		)
		.get_matches();

	// Load environment variables from .env file
	dotenv().ok();

	// Only apply CLI options if the corresponding environment variables are NOT already set
	if let Some(level) = matches.get_one::<String>("log-level") {
		if var("LOG_LEVEL").is_err() {
			set_var("LOG_LEVEL", level);
		}
	}

	setup_logging().unwrap_or_else(|e| {
		eprintln!("Failed to setup logging: {}", e);
	});

	let config_path = matches
		.get_one::<String>("config")
		.map(PathBuf::from)
		.or_else(|| var("LISTENER_CONFIG").ok().map(PathBuf::from))
		.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

	let config = ListenerConfig::load_from_path(&config_path).map_err(|e| {
		anyhow::anyhow!(
			"Failed to load configuration from {}: {}",
			config_path.display(),
			e
		)
	})?;

	if config.triggers.is_empty() {
		info!("No triggers configured. Exiting...");
		return Ok(());
	}

	let listener = initialize_listener(&config)
		.await
		.map_err(|e| anyhow::anyhow!("Failed to initialize listener: {}", e))?;

	let metrics_enabled =
		matches.get_flag("metrics") || var("METRICS_ENABLED").map(|v| v == "true").unwrap_or(false);

	let metrics_address = matches
		.get_one::<String>("metrics-address")
		.cloned()
		.unwrap_or_else(|| DEFAULT_METRICS_ADDRESS.to_string());

	let metrics_server = if metrics_enabled {
		info!("Metrics server enabled, starting on {}", metrics_address);
		match create_metrics_server(metrics_address) {
			Ok(server) => Some(server),
			Err(e) => {
				error!("Failed to create metrics server: {}", e);
				None
			}
		}
	} else {
		info!("Metrics server disabled. Use --metrics flag or METRICS_ENABLED=true to enable");
		None
	};

	let (shutdown_tx, shutdown_rx) = watch::channel(false);
	let handle = listener.start(shutdown_rx);

	info!("Listener started. Press Ctrl+C to shutdown");

	let ctrl_c = tokio::signal::ctrl_c();

	if let Some(metrics_future) = metrics_server {
		tokio::select! {
			result = ctrl_c => {
				if let Err(e) = result {
					error!("Error waiting for Ctrl+C: {}", e);
				}
				info!("Shutdown signal received, stopping listener...");
			}
			result = metrics_future => {
				if let Err(e) = result {
					error!("Metrics server error: {}", e);
				}
				info!("Metrics server stopped, stopping listener...");
			}
		}
	} else {
		let _ = ctrl_c.await;
		info!("Shutdown signal received, stopping listener...");
	}

	let _ = shutdown_tx.send(true);

	if let Err(e) = handle.await {
		error!("Listener task failed: {}", e);
	}

	info!("Shutdown complete");
	Ok(())
}
