//! The immutable set of triggers a listener serves.

use std::collections::HashSet;

use crate::services::trigger::{BlockTrigger, EventTrigger, TriggerError, TxTrigger};

/// Block, transaction and event triggers, validated once at construction
#[derive(Debug, Clone, Default)]
pub struct TriggerRegistry {
	blocks: Vec<BlockTrigger>,
	transactions: Vec<TxTrigger>,
	events: Vec<EventTrigger>,
}

impl TriggerRegistry {
	/// Validates and stores the trigger lists
	///
	/// # Errors
	/// Returns `TriggerError::ConfigurationError` if a name is empty or repeated within its kind,
	/// or if an event trigger has neither a source nor a source resolver.
	pub fn new(
		blocks: Vec<BlockTrigger>,
		transactions: Vec<TxTrigger>,
		events: Vec<EventTrigger>,
	) -> Result<Self, TriggerError> {
		check_names("block", blocks.iter().map(|t| t.name.as_str()))?;
		check_names("transaction", transactions.iter().map(|t| t.name.as_str()))?;
		check_names("event", events.iter().map(|t| t.name.as_str()))?;

		if let Some(trigger) = events
			.iter()
			.find(|t| t.source.is_none() && t.source_resolver.is_none())
		{
			return Err(TriggerError::configuration_error(format!(
				"event trigger '{}' requires a source or a source resolver",
				trigger.name
			)));
		}

		Ok(Self {
			blocks,
			transactions,
			events,
		})
	}

	pub fn blocks(&self) -> &[BlockTrigger] {
		&self.blocks
	}

	pub fn transactions(&self) -> &[TxTrigger] {
		&self.transactions
	}

	pub fn events(&self) -> &[EventTrigger] {
		&self.events
	}

	pub fn is_empty(&self) -> bool {
		self.blocks.is_empty() && self.transactions.is_empty() && self.events.is_empty()
	}
}

fn check_names<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> Result<(), TriggerError> {
	let mut seen = HashSet::new();
	for name in names {
		if name.is_empty() {
			return Err(TriggerError::configuration_error(format!(
				"{} trigger has an empty name",
				kind
			)));
		}
		if !seen.insert(name) {
			return Err(TriggerError::configuration_error(format!(
				"duplicate {} trigger name '{}'",
				kind, name
			)));
		}
	}
	Ok(())
}
