//! Test doubles for the listener.
//!
//! - [`MockChainProvider`]: mockall mock of the three chain capabilities
//! - [`FakeChain`]: in-memory chain whose height can be moved between polls
//! - Recording handlers that remember what they were given and fail on demand

use std::{
	collections::HashSet,
	sync::{
		atomic::{AtomicU64, Ordering},
		Arc, Mutex,
	},
	time::Duration,
};

use alloy::{
	consensus::{transaction::Recovered, Header, Signed, TxEnvelope, TxLegacy},
	primitives::{Address, Bytes, TxKind, B256, U256},
	rpc::types::{Block as RpcBlock, BlockTransactions, Header as RpcHeader, Log},
	signers::Signature,
};
use async_trait::async_trait;
use mockall::mock;
use eth_listener::{
	models::{Block, BlockId, Event, Transaction},
	services::{
		blockchain::{
			BlockChainError, BlocksProvider, ChainHeightProvider, EventsFilter, EventsProvider,
		},
		listener::{
			ListenerParams, ListenerProviders, ListenerService, MemoryMetadataStore, MetadataDb,
		},
		trigger::{
			BlockHandler, BlockTrigger, EventHandler, EventTrigger, SourceResolver, TriggerError,
			TxHandler, TxTrigger,
		},
	},
};

mock! {
	/// Mock of every chain capability the listener uses.
	pub ChainProvider {}

	#[async_trait]
	impl ChainHeightProvider for ChainProvider {
		async fn chain_height(&self) -> Result<u64, BlockChainError>;
	}

	#[async_trait]
	impl BlocksProvider for ChainProvider {
		async fn block(&self, id: BlockId) -> Result<Block, BlockChainError>;
	}

	#[async_trait]
	impl EventsProvider for ChainProvider {
		async fn events(&self, filter: &EventsFilter) -> Result<Vec<Event>, BlockChainError>;
	}
}

/// In-memory chain. Blocks are synthesized on request; events are added by the test.
#[derive(Default)]
pub struct FakeChain {
	height: AtomicU64,
	tagged_height: Mutex<Option<u64>>,
	transactions: Mutex<Vec<Transaction>>,
	events: Mutex<Vec<Event>>,
	failing_heights: Mutex<HashSet<u64>>,
	block_requests: Mutex<Vec<BlockId>>,
	event_queries: Mutex<Vec<EventsFilter>>,
}

impl FakeChain {
	pub fn new(height: u64) -> Arc<Self> {
		let chain = Self::default();
		chain.height.store(height, Ordering::SeqCst);
		Arc::new(chain)
	}

	pub fn set_height(&self, height: u64) {
		self.height.store(height, Ordering::SeqCst);
	}

	/// Height returned for any block tag
	pub fn set_tagged_height(&self, height: u64) {
		*self.tagged_height.lock().unwrap() = Some(height);
	}

	/// Transactions included in every block
	pub fn set_transactions(&self, transactions: Vec<Transaction>) {
		*self.transactions.lock().unwrap() = transactions;
	}

	pub fn add_event(&self, event: Event) {
		self.events.lock().unwrap().push(event);
	}

	pub fn fail_block(&self, height: u64) {
		self.failing_heights.lock().unwrap().insert(height);
	}

	pub fn block_requests(&self) -> Vec<BlockId> {
		self.block_requests.lock().unwrap().clone()
	}

	pub fn event_queries(&self) -> Vec<EventsFilter> {
		self.event_queries.lock().unwrap().clone()
	}

	pub fn providers(self: &Arc<Self>) -> ListenerProviders {
		ListenerProviders {
			chain_height: self.clone(),
			blocks: self.clone(),
			events: self.clone(),
		}
	}

	fn block_at(&self, number: u64) -> Block {
		let transactions = self
			.transactions
			.lock()
			.unwrap()
			.iter()
			.cloned()
			.map(|mut tx| {
				tx.0.block_number = Some(number);
				tx
			})
			.collect();
		block(number, transactions)
	}
}

#[async_trait]
impl ChainHeightProvider for FakeChain {
	async fn chain_height(&self) -> Result<u64, BlockChainError> {
		Ok(self.height.load(Ordering::SeqCst))
	}
}

#[async_trait]
impl BlocksProvider for FakeChain {
	async fn block(&self, id: BlockId) -> Result<Block, BlockChainError> {
		self.block_requests.lock().unwrap().push(id);
		let number = match id {
			BlockId::Number(number) => number,
			BlockId::Tag(_) => match *self.tagged_height.lock().unwrap() {
				Some(number) => number,
				None => return Err(BlockChainError::block_not_found(id)),
			},
		};
		if number > self.height.load(Ordering::SeqCst) {
			return Err(BlockChainError::block_not_found(id));
		}
		if self.failing_heights.lock().unwrap().contains(&number) {
			return Err(BlockChainError::connection_error(format!(
				"block {} unavailable",
				number
			)));
		}
		Ok(self.block_at(number))
	}
}

#[async_trait]
impl EventsProvider for FakeChain {
	async fn events(&self, filter: &EventsFilter) -> Result<Vec<Event>, BlockChainError> {
		self.event_queries.lock().unwrap().push(filter.clone());
		let mut events: Vec<Event> = self
			.events
			.lock()
			.unwrap()
			.iter()
			.filter(|e| (filter.from_block..=filter.to_block).contains(&e.block_number()))
			.filter(|e| filter.address.is_none_or(|address| address == e.address()))
			.cloned()
			.collect();
		events.sort_by_key(Event::position);
		Ok(events)
	}
}

/// Chain whose height request never completes
pub struct StalledChain;

#[async_trait]
impl ChainHeightProvider for StalledChain {
	async fn chain_height(&self) -> Result<u64, BlockChainError> {
		std::future::pending().await
	}
}

#[async_trait]
impl BlocksProvider for StalledChain {
	async fn block(&self, id: BlockId) -> Result<Block, BlockChainError> {
		Err(BlockChainError::block_not_found(id))
	}
}

#[async_trait]
impl EventsProvider for StalledChain {
	async fn events(&self, _: &EventsFilter) -> Result<Vec<Event>, BlockChainError> {
		Ok(vec![])
	}
}

/// Block handler recording `(trigger, height)` and failing at chosen heights
#[derive(Default)]
pub struct RecordingBlockHandler {
	handled: Mutex<Vec<(String, u64)>>,
	failing: Mutex<HashSet<(String, u64)>>,
}

impl RecordingBlockHandler {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn fail_at(&self, trigger: &str, height: u64) {
		self.failing.lock().unwrap().insert((trigger.to_string(), height));
	}

	pub fn recover(&self) {
		self.failing.lock().unwrap().clear();
	}

	pub fn heights(&self, trigger: &str) -> Vec<u64> {
		self.handled
			.lock()
			.unwrap()
			.iter()
			.filter(|(name, _)| name == trigger)
			.map(|(_, height)| *height)
			.collect()
	}
}

#[async_trait]
impl BlockHandler for RecordingBlockHandler {
	async fn handle_block(&self, block: &Block, trigger: &BlockTrigger) -> Result<(), TriggerError> {
		if self
			.failing
			.lock()
			.unwrap()
			.contains(&(trigger.name.clone(), block.number()))
		{
			return Err(TriggerError::execution_error(format!(
				"refusing block {}",
				block.number()
			)));
		}
		self.handled
			.lock()
			.unwrap()
			.push((trigger.name.clone(), block.number()));
		Ok(())
	}
}

/// Transaction handler recording `(trigger, block, tx hash)`
#[derive(Default)]
pub struct RecordingTxHandler {
	handled: Mutex<Vec<(String, u64, B256)>>,
}

impl RecordingTxHandler {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn handled(&self, trigger: &str) -> Vec<(u64, B256)> {
		self.handled
			.lock()
			.unwrap()
			.iter()
			.filter(|(name, _, _)| name == trigger)
			.map(|(_, block, hash)| (*block, *hash))
			.collect()
	}
}

#[async_trait]
impl TxHandler for RecordingTxHandler {
	async fn handle_tx(&self, tx: &Transaction, trigger: &TxTrigger) {
		self.handled.lock().unwrap().push((
			trigger.name.clone(),
			tx.block_number().unwrap_or_default(),
			tx.hash(),
		));
	}
}

/// Event handler recording `(trigger, block, index)` and failing at chosen positions
#[derive(Default)]
pub struct RecordingEventHandler {
	handled: Mutex<Vec<(String, u64, u64)>>,
	failing: Mutex<HashSet<(u64, u64)>>,
}

impl RecordingEventHandler {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn fail_at(&self, block: u64, index: u64) {
		self.failing.lock().unwrap().insert((block, index));
	}

	pub fn recover(&self) {
		self.failing.lock().unwrap().clear();
	}

	pub fn positions(&self, trigger: &str) -> Vec<(u64, u64)> {
		self.handled
			.lock()
			.unwrap()
			.iter()
			.filter(|(name, _, _)| name == trigger)
			.map(|(_, block, index)| (*block, *index))
			.collect()
	}
}

#[async_trait]
impl EventHandler for RecordingEventHandler {
	async fn handle_event(&self, event: &Event, trigger: &EventTrigger) -> Result<(), TriggerError> {
		if self.failing.lock().unwrap().contains(&event.position()) {
			return Err(TriggerError::execution_error(format!(
				"refusing event {:?}",
				event.position()
			)));
		}
		self.handled.lock().unwrap().push((
			trigger.name.clone(),
			event.block_number(),
			event.log_index(),
		));
		Ok(())
	}
}

/// Resolver returning a fixed address, or failing when none is set
pub struct FixedResolver(pub Option<Address>);

#[async_trait]
impl SourceResolver for FixedResolver {
	async fn resolve(&self) -> Result<Address, TriggerError> {
		self.0
			.ok_or_else(|| TriggerError::execution_error("registry lookup failed"))
	}
}

pub fn event(address: Address, block_number: u64, log_index: u64) -> Event {
	Event::try_from(Log {
		inner: alloy::primitives::Log::new_unchecked(address, vec![], Bytes::new()),
		block_number: Some(block_number),
		log_index: Some(log_index),
		..Default::default()
	})
	.unwrap()
}

pub fn transaction(seed: u8, from: Address, to: Option<Address>) -> Transaction {
	let tx = TxLegacy {
		chain_id: None,
		nonce: seed as u64,
		gas_price: 0,
		gas_limit: 21_000,
		to: to.map_or(TxKind::Create, TxKind::Call),
		value: U256::ZERO,
		input: Bytes::new(),
	};
	let signature = Signature::from_scalars_and_parity(B256::ZERO, B256::ZERO, false);
	Transaction::from(alloy::rpc::types::Transaction {
		inner: Recovered::new_unchecked(
			TxEnvelope::Legacy(Signed::new_unchecked(tx, signature, B256::repeat_byte(seed))),
			from,
		),
		block_hash: None,
		block_number: None,
		transaction_index: Some(seed as u64),
		effective_gas_price: None,
	})
}

pub fn block(number: u64, transactions: Vec<Transaction>) -> Block {
	let header = RpcHeader::new(Header {
		number,
		timestamp: 1_700_000_000 + number * 12,
		..Default::default()
	});
	Block::from(RpcBlock::new(header, BlockTransactions::Full(transactions)))
}

pub fn interval() -> Duration {
	Duration::from_millis(10)
}

/// Builds a listener on `chain` backed by `store`, with a short poll interval
pub fn listener(
	params: ListenerParams,
	chain: &Arc<FakeChain>,
	store: &MemoryMetadataStore,
) -> ListenerService {
	ListenerService::new(params, chain.providers(), Arc::new(store.clone())).unwrap()
}

/// Opens a second view on a store, for reading back persisted metadata
pub fn metadata(store: &MemoryMetadataStore) -> MetadataDb {
	MetadataDb::new(Arc::new(store.clone()))
}
