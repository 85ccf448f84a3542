//! Blockchain client implementations.
//!
//! - EVM: JSON-RPC client for Ethereum-compatible execution clients

mod evm {
	pub mod client;
}

pub use evm::client::EvmClient;
