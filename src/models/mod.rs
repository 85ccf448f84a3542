//! Domain models and data structures for the listener.
//!
//! This module contains the plain data used throughout the application:
//!
//! - `blockchain`: Blocks, transactions, log events and block specifiers
//! - `config`: Configuration loading and validation
//! - `core`: Trigger definitions

pub mod blockchain;
mod config;
mod core;

// Re-export blockchain types
pub use blockchain::{parse_block_specifier, Block, BlockId, BlockTag, Event, Transaction};

// Re-export core types
pub use core::{BlockTriggerConfig, EventTriggerConfig, TriggerDefinitions, TxTriggerConfig};

// Re-export config types
pub use config::{ConfigError, ConfigLoader, ListenerConfig};
