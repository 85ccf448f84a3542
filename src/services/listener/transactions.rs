//! Transaction walker: dispatches filtered transactions under a single shared cursor.
//!
//! Transaction handlers cannot report failure, so the cursor advances after every height no
//! matter what the handlers did.

use tracing::trace;

use crate::{
	models::BlockId,
	services::{
		listener::{metadata::TransactionsMetadata, ListenerError, ListenerService},
		trigger::TxTrigger,
	},
	utils::metrics::monitor_trigger_latest_block,
};

/// First height to walk; with no cursor yet, the lowest trigger floor
pub fn calculate_txs_from(triggers: &[TxTrigger], md: &TransactionsMetadata) -> Option<u64> {
	match md.latest_block {
		Some(latest) => Some(latest.saturating_add(1)),
		None => triggers.iter().map(|t| t.earliest_block).min(),
	}
}

impl ListenerService {
	pub(super) async fn poll_txs(&mut self, to: u64) -> Result<(), ListenerError> {
		if self.triggers.transactions().is_empty() {
			return Ok(());
		}

		let mut md = self.metadata.transactions_metadata().await?;

		if let Some(override_block) = self.txs_override {
			md.latest_block = override_block.checked_sub(1);
			self.metadata.set_transactions_metadata(&md).await?;
			// Applied once per process
			self.txs_override = None;
			trace!(override_block, "Applied earliest block override to transactions");
		}

		let Some(from) = calculate_txs_from(self.triggers.transactions(), &md) else {
			return Ok(());
		};

		if from > to {
			trace!(from, to, "Not fetching blocks for transactions");
			return Ok(());
		}

		let triggers = self.triggers.transactions();

		for height in from..=to {
			let block = self
				.cancellable(self.providers.blocks.block(BlockId::Number(height)))
				.await?;

			for trigger in triggers {
				if block.number() < trigger.earliest_block {
					trace!(trigger = %trigger.name, height, "Block too early; ignoring");
					continue;
				}
				for (index, tx) in block.transactions().iter().enumerate() {
					if !trigger.matches(tx) {
						trace!(trigger = %trigger.name, height, index, "Address filter does not match; ignoring");
						continue;
					}
					trigger.handler.handle_tx(tx, trigger).await;
				}
			}

			md.latest_block = Some(height);
			self.metadata.set_transactions_metadata(&md).await?;
			for trigger in triggers {
				monitor_trigger_latest_block("transaction", &trigger.name, height);
			}
		}

		Ok(())
	}
}
