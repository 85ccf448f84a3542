//! Core domain models for the listener.
//!
//! - Triggers: the block, transaction and event subscriptions declared in configuration

mod trigger;

pub use trigger::{BlockTriggerConfig, EventTriggerConfig, TriggerDefinitions, TxTriggerConfig};
