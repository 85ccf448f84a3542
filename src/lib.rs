//! Ethereum chain listener.
//!
//! Polls an Ethereum JSON-RPC endpoint and hands blocks, transactions and contract events to
//! named triggers, persisting per-trigger progress so processing resumes after a restart.
//!
//! # Module Structure
//! - `bootstrap`: Builds a listener from its configuration file
//! - `models`: Chain data, trigger definitions and configuration
//! - `services`: Chain client, triggers and the polling listener
//! - `utils`: Logging, metrics and HTTP retry helpers

pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;
