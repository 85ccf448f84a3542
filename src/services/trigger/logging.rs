//! Handlers that log what they receive.

use async_trait::async_trait;

use crate::{
	models::{Block, Event, Transaction},
	services::trigger::{
		BlockHandler, BlockTrigger, EventHandler, EventTrigger, TriggerError, TxHandler, TxTrigger,
	},
};

/// Logs every block at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogBlockHandler;

#[async_trait]
impl BlockHandler for LogBlockHandler {
	async fn handle_block(&self, block: &Block, trigger: &BlockTrigger) -> Result<(), TriggerError> {
		tracing::info!(
			trigger = %trigger.name,
			number = block.number(),
			hash = %block.hash(),
			transactions = block.transactions().len(),
			"Block received"
		);
		Ok(())
	}
}

/// Logs every transaction at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTxHandler;

#[async_trait]
impl TxHandler for LogTxHandler {
	async fn handle_tx(&self, tx: &Transaction, trigger: &TxTrigger) {
		tracing::info!(
			trigger = %trigger.name,
			hash = %tx.hash(),
			from = %tx.sender(),
			to = ?tx.to(),
			"Transaction received"
		);
	}
}

/// Logs every event at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventHandler;

#[async_trait]
impl EventHandler for LogEventHandler {
	async fn handle_event(&self, event: &Event, trigger: &EventTrigger) -> Result<(), TriggerError> {
		tracing::info!(
			trigger = %trigger.name,
			address = %event.address(),
			block = event.block_number(),
			index = event.log_index(),
			topics = event.topics().len(),
			"Event received"
		);
		Ok(())
	}
}
