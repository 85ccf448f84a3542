//! Selection of the highest block a poll cycle may process.

use tracing::trace;

use crate::{
	models::BlockId,
	services::listener::{ListenerError, ListenerService},
};

/// Highest eligible height under a confirmation delay, `None` while the chain is shorter
/// than the delay
pub fn delayed_height(chain_height: u64, block_delay: u64) -> Option<u64> {
	chain_height.checked_sub(block_delay)
}

impl ListenerService {
	/// Resolves the configured specifier, or applies the block delay to the chain height
	pub(super) async fn select_upper_bound(&self) -> Result<Option<u64>, ListenerError> {
		match self.block_specifier {
			Some(tag) => {
				trace!(specifier = %tag, "Fetching chain height for specifier");
				let block = self
					.cancellable(self.providers.blocks.block(BlockId::Tag(tag)))
					.await?;
				Ok(Some(block.number()))
			}
			None => {
				let chain_height = self
					.cancellable(self.providers.chain_height.chain_height())
					.await?;
				Ok(delayed_height(chain_height, self.block_delay))
			}
		}
	}
}
