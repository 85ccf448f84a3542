//! Trigger types and handler capabilities.
//!
//! This module provides the runtime side of triggers: the handler traits implemented by the
//! embedding application, the trigger structs the listener walks, the validated registry that
//! holds them, and built-in handlers that log what they receive.

mod error;
mod handler;
mod logging;
mod registry;
#[allow(clippy::module_inception)]
mod trigger;

pub use error::TriggerError;
pub use handler::{BlockHandler, EventHandler, SourceResolver, TxHandler};
pub use logging::{LogBlockHandler, LogEventHandler, LogTxHandler};
pub use registry::TriggerRegistry;
pub use trigger::{BlockTrigger, EventTrigger, TxTrigger};
