//! Block walker: hands every block to every block trigger, isolating trigger failures.

use std::collections::HashSet;
use tracing::{error, trace};

use crate::{
	models::BlockId,
	services::{
		listener::{metadata::BlocksMetadata, ListenerError, ListenerService},
		trigger::BlockTrigger,
	},
	utils::metrics::{monitor_trigger_failure, monitor_trigger_latest_block},
};

/// First height a block trigger still has to handle
fn trigger_start(trigger: &BlockTrigger, md: &BlocksMetadata) -> u64 {
	match md.latest(&trigger.name) {
		Some(latest) => latest.saturating_add(1).max(trigger.earliest_block),
		None => trigger.earliest_block,
	}
}

/// Computes where the walk starts, applying an earliest-block override if given
///
/// An override rewinds every trigger's watermark to one below it. Otherwise the walk starts at
/// the lowest height any trigger still needs, so a lagging trigger catches up while triggers
/// ahead of it skip heights they already handled.
pub fn calculate_blocks_from(
	triggers: &[BlockTrigger],
	md: &mut BlocksMetadata,
	override_block: Option<u64>,
) -> Option<u64> {
	if let Some(override_block) = override_block {
		for trigger in triggers {
			md.set_latest(&trigger.name, override_block.checked_sub(1));
		}
		return Some(override_block);
	}

	triggers.iter().map(|t| trigger_start(t, md)).min()
}

/// Whether `trigger` should be handed the block at `height`
fn needs_height(trigger: &BlockTrigger, md: &BlocksMetadata, height: u64) -> bool {
	height >= trigger.earliest_block && md.latest(&trigger.name).is_none_or(|l| l < height)
}

impl ListenerService {
	pub(super) async fn poll_blocks(&mut self, to: u64) -> Result<(), ListenerError> {
		if self.triggers.blocks().is_empty() {
			return Ok(());
		}

		let mut md = self.metadata.blocks_metadata().await?;

		let from = match self.blocks_override {
			Some(override_block) => {
				let from = calculate_blocks_from(self.triggers.blocks(), &mut md, Some(override_block));
				self.metadata.set_blocks_metadata(&md).await?;
				// Applied once per process
				self.blocks_override = None;
				trace!(override_block, "Applied earliest block override");
				from
			}
			None => calculate_blocks_from(self.triggers.blocks(), &mut md, None),
		};
		let Some(from) = from else {
			return Ok(());
		};

		if from > to {
			trace!(from, to, "Not fetching blocks");
			return Ok(());
		}

		let triggers = self.triggers.blocks();
		let mut failed: HashSet<&str> = HashSet::new();

		for height in from..=to {
			let pending: Vec<&BlockTrigger> = triggers
				.iter()
				.filter(|t| !failed.contains(t.name.as_str()) && needs_height(t, &md, height))
				.collect();
			if pending.is_empty() {
				trace!(height, "No trigger needs block; skipping");
				continue;
			}

			let block = self
				.cancellable(self.providers.blocks.block(BlockId::Number(height)))
				.await?;

			for trigger in pending {
				trace!(trigger = %trigger.name, height, "Handling block");
				match trigger.handler.handle_block(&block, trigger).await {
					Ok(()) => {
						md.set_latest(&trigger.name, Some(height));
						monitor_trigger_latest_block("block", &trigger.name, height);
					}
					Err(e) => {
						error!(
							trigger = %trigger.name,
							height,
							error = %e,
							"Block handler failed; skipping trigger for the rest of this poll"
						);
						monitor_trigger_failure("block", &trigger.name);
						failed.insert(trigger.name.as_str());
					}
				}
			}

			self.metadata.set_blocks_metadata(&md).await?;
		}

		Ok(())
	}
}
