//! Handler capabilities invoked by the listener.
//!
//! Handlers are supplied by the embedding application. Block and event handlers report failure,
//! which stalls only their own trigger; transaction handlers are fire-and-forget.

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::{
	models::{Block, Event, Transaction},
	services::trigger::{BlockTrigger, EventTrigger, TriggerError, TxTrigger},
};

/// Receives every block at or above the trigger's earliest block
#[async_trait]
pub trait BlockHandler: Send + Sync {
	async fn handle_block(&self, block: &Block, trigger: &BlockTrigger) -> Result<(), TriggerError>;
}

/// Receives transactions matching the trigger's address filters
#[async_trait]
pub trait TxHandler: Send + Sync {
	async fn handle_tx(&self, tx: &Transaction, trigger: &TxTrigger);
}

/// Receives log events matching the trigger's source and topics
#[async_trait]
pub trait EventHandler: Send + Sync {
	async fn handle_event(&self, event: &Event, trigger: &EventTrigger) -> Result<(), TriggerError>;
}

/// Resolves the contract address of an event trigger at poll time
///
/// Used when the address is only known at runtime, e.g. behind a registry or proxy.
#[async_trait]
pub trait SourceResolver: Send + Sync {
	async fn resolve(&self) -> Result<Address, TriggerError>;
}
