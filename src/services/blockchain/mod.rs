//! Blockchain client interfaces and implementations.
//!
//! Provides the provider capabilities the listener consumes and a concrete JSON-RPC
//! implementation. Includes:
//!
//! - Chain height, block and events provider traits
//! - EVM client
//! - HTTP transport
//! - Error handling for blockchain operations

mod client;
mod clients;
mod error;
mod transports;

pub use client::{BlocksProvider, ChainHeightProvider, EventsFilter, EventsProvider};
pub use clients::EvmClient;
pub use error::BlockChainError;
pub use transports::{BlockchainTransport, HttpTransportClient};
