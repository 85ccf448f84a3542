//! Listener service: construction, the poll cycle and the background poll loop.

use std::{future::Future, sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, error, info, trace};

use crate::{
	models::BlockTag,
	services::{
		blockchain::{BlockChainError, BlocksProvider, ChainHeightProvider, EventsProvider},
		listener::{metadata::MetadataDb, storage::MetadataStore, ListenerError},
		trigger::{BlockTrigger, EventTrigger, TriggerRegistry, TxTrigger},
	},
	utils::metrics::{monitor_failure, monitor_latest_block},
};

/// Parameters of a listener instance
#[derive(Debug, Clone, Default)]
pub struct ListenerParams {
	/// Confirmations to wait for; ignored when a block specifier is set
	pub block_delay: u64,
	/// Named block whose height bounds each poll
	pub block_specifier: Option<BlockTag>,
	/// One-time override of where block and transaction walks start
	pub earliest_block: Option<u64>,
	/// Time between the end of one poll and the start of the next
	pub interval: Duration,
	pub block_triggers: Vec<BlockTrigger>,
	pub tx_triggers: Vec<TxTrigger>,
	pub event_triggers: Vec<EventTrigger>,
}

impl ListenerParams {
	pub fn builder() -> ListenerParamsBuilder {
		ListenerParamsBuilder::default()
	}
}

/// Fluent builder for [`ListenerParams`]
#[derive(Debug, Clone, Default)]
pub struct ListenerParamsBuilder {
	params: ListenerParams,
}

impl ListenerParamsBuilder {
	pub fn block_delay(mut self, block_delay: u64) -> Self {
		self.params.block_delay = block_delay;
		self
	}

	pub fn block_specifier(mut self, block_specifier: Option<BlockTag>) -> Self {
		self.params.block_specifier = block_specifier;
		self
	}

	pub fn earliest_block(mut self, earliest_block: Option<u64>) -> Self {
		self.params.earliest_block = earliest_block;
		self
	}

	pub fn interval(mut self, interval: Duration) -> Self {
		self.params.interval = interval;
		self
	}

	pub fn block_trigger(mut self, trigger: BlockTrigger) -> Self {
		self.params.block_triggers.push(trigger);
		self
	}

	pub fn tx_trigger(mut self, trigger: TxTrigger) -> Self {
		self.params.tx_triggers.push(trigger);
		self
	}

	pub fn event_trigger(mut self, trigger: EventTrigger) -> Self {
		self.params.event_triggers.push(trigger);
		self
	}

	pub fn build(self) -> ListenerParams {
		self.params
	}
}

/// Chain capabilities used by the listener
#[derive(Clone)]
pub struct ListenerProviders {
	pub chain_height: Arc<dyn ChainHeightProvider>,
	pub blocks: Arc<dyn BlocksProvider>,
	pub events: Arc<dyn EventsProvider>,
}

impl ListenerProviders {
	/// Uses one client for all three capabilities
	pub fn from_client<C>(client: C) -> Self
	where
		C: ChainHeightProvider + BlocksProvider + EventsProvider + 'static,
	{
		let client = Arc::new(client);
		Self {
			chain_height: client.clone(),
			blocks: client.clone(),
			events: client,
		}
	}
}

/// Polls the chain and dispatches blocks, transactions and events to their triggers
pub struct ListenerService {
	pub(super) block_delay: u64,
	pub(super) block_specifier: Option<BlockTag>,
	pub(super) interval: Duration,
	pub(super) triggers: TriggerRegistry,
	pub(super) providers: ListenerProviders,
	pub(super) metadata: Arc<MetadataDb>,
	/// Pending earliest-block override for the block walker
	pub(super) blocks_override: Option<u64>,
	/// Pending earliest-block override for the transaction walker
	pub(super) txs_override: Option<u64>,
	pub(super) shutdown: watch::Receiver<bool>,
}

impl ListenerService {
	/// Creates a listener, taking exclusive ownership of `store`
	///
	/// # Errors
	/// Returns `ListenerError::ConfigurationError` if the interval is zero or the triggers are
	/// invalid.
	pub fn new(
		params: ListenerParams,
		providers: ListenerProviders,
		store: Arc<dyn MetadataStore>,
	) -> Result<Self, ListenerError> {
		if params.interval.is_zero() {
			return Err(ListenerError::configuration_error(
				"poll interval must be greater than zero",
			));
		}

		let triggers = TriggerRegistry::new(
			params.block_triggers,
			params.tx_triggers,
			params.event_triggers,
		)?;

		// Never signalled until `start` installs the caller's receiver
		let (_, shutdown) = watch::channel(false);

		Ok(Self {
			block_delay: params.block_delay,
			block_specifier: params.block_specifier,
			interval: params.interval,
			triggers,
			providers,
			metadata: Arc::new(MetadataDb::new(store)),
			blocks_override: params.earliest_block,
			txs_override: params.earliest_block,
			shutdown,
		})
	}

	pub fn triggers(&self) -> &TriggerRegistry {
		&self.triggers
	}

	/// Spawns the poll loop, which runs until `shutdown` carries `true`
	///
	/// The metadata store is closed as soon as shutdown is signalled, so walks still in flight
	/// fail at their next metadata access.
	pub fn start(mut self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
		self.shutdown = shutdown.clone();

		let metadata = self.metadata.clone();
		let mut closer_shutdown = shutdown;
		tokio::spawn(async move {
			wait_for_shutdown(&mut closer_shutdown).await;
			if let Err(e) = metadata.close().await {
				error!(error = %e, "Failed to close metadata store");
			}
		});

		tokio::spawn(self.run())
	}

	async fn run(mut self) {
		info!(
			interval_ms = self.interval.as_millis() as u64,
			block_triggers = self.triggers.blocks().len(),
			tx_triggers = self.triggers.transactions().len(),
			event_triggers = self.triggers.events().len(),
			"Listener started"
		);

		let mut shutdown = self.shutdown.clone();
		loop {
			if *shutdown.borrow() {
				break;
			}

			// Failures are logged and counted inside poll
			let _ = self.poll().await;

			tokio::select! {
				_ = tokio::time::sleep(self.interval) => {}
				_ = wait_for_shutdown(&mut shutdown) => {
					debug!("Shutdown requested");
					break;
				}
			}
		}

		if let Err(e) = self.metadata.close().await {
			error!(error = %e, "Failed to close metadata store");
		}
		info!("Listener stopped");
	}

	/// Runs one poll cycle: selects the highest block, then walks blocks, transactions and
	/// events in turn
	///
	/// Handler failures are isolated per trigger and do not fail the cycle. Provider and storage
	/// failures end the cycle; they are logged and counted here unless caused by shutdown.
	pub async fn poll(&mut self) -> Result<(), ListenerError> {
		if self.is_shutting_down() {
			debug!("Shutdown requested; skipping poll");
			return Err(ListenerError::Cancelled);
		}

		let to = match self.select_upper_bound().await {
			Ok(Some(to)) => to,
			Ok(None) => {
				trace!(
					block_delay = self.block_delay,
					"Chain is shorter than the block delay; nothing to do"
				);
				return Ok(());
			}
			Err(e) => return Err(self.record_failure("select highest block", e)),
		};
		trace!(to, "Selected highest block");
		monitor_latest_block(to);

		if let Err(e) = self.poll_blocks(to).await {
			return Err(self.record_failure("poll blocks", e));
		}
		if let Err(e) = self.poll_txs(to).await {
			return Err(self.record_failure("poll transactions", e));
		}
		if let Err(e) = self.poll_events(to).await {
			return Err(self.record_failure("poll events", e));
		}

		Ok(())
	}

	fn is_shutting_down(&self) -> bool {
		*self.shutdown.borrow()
	}

	/// Logs and counts a failed cycle. Errors caused by shutdown are not failures.
	fn record_failure(&self, stage: &str, err: ListenerError) -> ListenerError {
		if err.is_cancelled() || self.is_shutting_down() {
			debug!(stage, "Poll interrupted by shutdown");
			return ListenerError::Cancelled;
		}
		error!(stage, error = %err, "Poll failed");
		monitor_failure();
		err
	}

	/// Runs a provider request, abandoning it if shutdown is signalled first
	pub(super) async fn cancellable<T, F>(&self, request: F) -> Result<T, ListenerError>
	where
		F: Future<Output = Result<T, BlockChainError>>,
	{
		let mut shutdown = self.shutdown.clone();
		if *shutdown.borrow_and_update() {
			return Err(ListenerError::Cancelled);
		}
		tokio::select! {
			result = request => result.map_err(ListenerError::from),
			_ = wait_for_shutdown(&mut shutdown) => Err(ListenerError::Cancelled),
		}
	}
}

/// Resolves once `true` is published; never resolves if the sender is gone without it
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
	if shutdown.wait_for(|stopped| *stopped).await.is_err() {
		std::future::pending::<()>().await;
	}
}
