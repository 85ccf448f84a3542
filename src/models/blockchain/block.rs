//! Block and transaction data structures.

use alloy::{
	consensus::Transaction as _,
	primitives::{Address, Bytes, B256, U256},
	rpc::types::{Block as RpcBlock, Transaction as RpcTransaction},
};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Wrapper around the alloy RPC block carrying full transaction objects
///
/// This type provides a convenient interface for the listener while keeping every field
/// the node returns reachable through `Deref`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Block(pub RpcBlock<Transaction>);

impl Block {
	/// Get the block number
	pub fn number(&self) -> u64 {
		self.0.header.number
	}

	/// Get the block hash
	pub fn hash(&self) -> B256 {
		self.0.header.hash
	}

	/// Get the transactions in block order
	///
	/// Blocks fetched with hashes only (or uncles) yield an empty slice.
	pub fn transactions(&self) -> &[Transaction] {
		self.0.transactions.as_transactions().unwrap_or(&[])
	}
}

impl From<RpcBlock<Transaction>> for Block {
	fn from(block: RpcBlock<Transaction>) -> Self {
		Self(block)
	}
}

impl Deref for Block {
	type Target = RpcBlock<Transaction>;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Wrapper around the alloy RPC transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction(pub RpcTransaction);

impl Transaction {
	/// Get the transaction hash
	pub fn hash(&self) -> B256 {
		*self.0.inner.inner().tx_hash()
	}

	/// Get the transaction sender address
	pub fn sender(&self) -> Address {
		self.0.inner.signer()
	}

	/// Get the transaction recipient address (None for contract creation)
	pub fn to(&self) -> Option<Address> {
		self.0.inner.inner().to()
	}

	/// Get the transaction value (amount of ETH transferred)
	pub fn value(&self) -> U256 {
		self.0.inner.inner().value()
	}

	/// Get the transaction nonce
	pub fn nonce(&self) -> u64 {
		self.0.inner.inner().nonce()
	}

	/// Get the call data
	pub fn input(&self) -> &Bytes {
		self.0.inner.inner().input()
	}

	/// Get the height of the including block, if mined
	pub fn block_number(&self) -> Option<u64> {
		self.0.block_number
	}

	/// Get the position within the including block, if mined
	pub fn transaction_index(&self) -> Option<u64> {
		self.0.transaction_index
	}
}

impl From<RpcTransaction> for Transaction {
	fn from(tx: RpcTransaction) -> Self {
		Self(tx)
	}
}

impl Deref for Transaction {
	type Target = RpcTransaction;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
