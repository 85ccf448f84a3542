//! Core services implementing the listener's functionality.
//!
//! This module contains the main business logic services:
//! - `blockchain`: Chain provider capabilities and the JSON-RPC client
//! - `listener`: Poll loop, walkers and watermark persistence
//! - `trigger`: Triggers and their handler capabilities

pub mod blockchain;
pub mod listener;
pub mod trigger;
