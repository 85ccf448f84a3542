//! Bootstrap module for building a listener from its configuration.
//!
//! The configuration file names the triggers; this module attaches the built-in logging
//! handlers to them, creates the JSON-RPC client and opens the metadata store.

use std::sync::Arc;

use crate::{
	models::{BlockTriggerConfig, EventTriggerConfig, ListenerConfig, TxTriggerConfig},
	services::{
		blockchain::EvmClient,
		listener::{FileMetadataStore, ListenerError, ListenerParams, ListenerProviders, ListenerService},
		trigger::{
			BlockTrigger, EventTrigger, LogBlockHandler, LogEventHandler, LogTxHandler, TxTrigger,
		},
	},
	utils::http::HttpRetryConfig,
};

fn block_trigger(config: &BlockTriggerConfig) -> BlockTrigger {
	BlockTrigger::new(&config.name, Arc::new(LogBlockHandler))
		.with_earliest_block(config.earliest_block)
}

fn tx_trigger(config: &TxTriggerConfig) -> TxTrigger {
	let mut trigger =
		TxTrigger::new(&config.name, Arc::new(LogTxHandler)).with_earliest_block(config.earliest_block);
	if let Some(from) = config.from {
		trigger = trigger.with_from(from);
	}
	if let Some(to) = config.to {
		trigger = trigger.with_to(to);
	}
	trigger
}

fn event_trigger(config: &EventTriggerConfig) -> EventTrigger {
	let mut trigger = EventTrigger::new(&config.name, Arc::new(LogEventHandler))
		.with_earliest_block(config.earliest_block)
		.with_topics(config.topics.clone());
	if let Some(source) = config.source {
		trigger = trigger.with_source(source);
	}
	trigger
}

/// Translates a configuration into listener parameters with logging handlers attached
pub fn create_listener_params(config: &ListenerConfig) -> ListenerParams {
	let mut builder = ListenerParams::builder()
		.block_delay(config.block_delay)
		.block_specifier(config.block_specifier)
		.earliest_block(config.earliest_block)
		.interval(config.interval());

	for trigger in &config.triggers.blocks {
		builder = builder.block_trigger(block_trigger(trigger));
	}
	for trigger in &config.triggers.transactions {
		builder = builder.tx_trigger(tx_trigger(trigger));
	}
	for trigger in &config.triggers.events {
		builder = builder.event_trigger(event_trigger(trigger));
	}

	builder.build()
}

/// Creates the RPC client, opens the metadata store and builds the listener.
///
/// # Errors
/// Returns an error if the RPC client cannot be created, the metadata directory cannot be
/// opened, or the triggers are invalid.
pub async fn initialize_listener(config: &ListenerConfig) -> Result<ListenerService, ListenerError> {
	let retry_config = HttpRetryConfig::with_max_retries(config.max_retries);
	let client = EvmClient::new(&config.rpc_url, config.timeout(), &retry_config)?;
	let store = FileMetadataStore::open(&config.metadata_db_path).await?;

	ListenerService::new(
		create_listener_params(config),
		ListenerProviders::from_client(client),
		Arc::new(store),
	)
}
