//! Event walker: per-trigger windowed log queries with an intra-block cursor.
//!
//! Each trigger keeps a cursor `(block, index)`: the next block to scan and the last event index
//! already handled inside it. Windows start at the cursor block inclusive, so events at or below
//! the cursor index in that block are skipped. A handler failure stops the trigger for this poll
//! with the cursor at the last handled event; a fully handled window moves the cursor past it.

use tracing::{error, trace};

use crate::{
	models::Event,
	services::{
		blockchain::EventsFilter,
		listener::{
			metadata::{EventsEntry, EventsMetadata},
			ListenerError, ListenerService,
		},
		trigger::EventTrigger,
	},
	utils::metrics::{monitor_trigger_failure, monitor_trigger_latest_block},
};

/// Largest block range covered by a single events query
pub const MAX_BLOCKS_FOR_EVENTS: u64 = 100;

/// Where a trigger's next window starts: `(from_block, last handled index in from_block)`
///
/// A persisted cursor below the trigger's floor is ignored, so raising the floor rewinds the
/// trigger to it.
pub fn resolve_cursor(trigger: &EventTrigger, md: &EventsMetadata) -> (u64, Option<u64>) {
	match md.entries.get(&trigger.name) {
		Some(entry) if entry.latest_block >= trigger.earliest_block => {
			(entry.latest_block, entry.latest_event_index)
		}
		_ => (trigger.earliest_block, None),
	}
}

/// Upper bound of the window starting at `from_block`
pub fn window_end(from_block: u64, to: u64) -> u64 {
	to.min(from_block.saturating_add(MAX_BLOCKS_FOR_EVENTS - 1))
}

/// Whether the event was already handled in an earlier window
pub fn already_handled(event: &Event, from_block: u64, from_index: Option<u64>) -> bool {
	event.block_number() == from_block
		&& from_index.is_some_and(|index| event.log_index() <= index)
}

impl ListenerService {
	pub(super) async fn poll_events(&mut self, to: u64) -> Result<(), ListenerError> {
		if self.triggers.events().is_empty() {
			return Ok(());
		}

		let mut md = self.metadata.events_metadata().await?;

		for trigger in self.triggers.events() {
			let (from_block, from_index) = resolve_cursor(trigger, &md);
			if from_block > to {
				trace!(trigger = %trigger.name, from = from_block, to, "Not fetching events");
				continue;
			}
			let to_block = window_end(from_block, to);

			let source = match trigger.resolve_source().await {
				Ok(source) => source,
				Err(e) => {
					error!(trigger = %trigger.name, error = %e, "Failed to resolve event source");
					monitor_trigger_failure("event", &trigger.name);
					continue;
				}
			};

			trace!(trigger = %trigger.name, %source, from = from_block, to = to_block, "Fetching events");
			let filter = EventsFilter {
				from_block,
				to_block,
				address: Some(source),
				topics: trigger.topics.clone(),
			};
			let events = self
				.cancellable(self.providers.events.events(&filter))
				.await?;

			let cursor = dispatch_events(trigger, &events, from_block, from_index)
				.await
				.unwrap_or(EventsEntry {
					latest_block: to_block.saturating_add(1),
					latest_event_index: None,
				});

			md.entries.insert(trigger.name.clone(), cursor);
			self.metadata.set_events_metadata(&md).await?;
			monitor_trigger_latest_block("event", &trigger.name, cursor.latest_block);
		}

		Ok(())
	}
}

/// Hands the not yet handled events to the trigger in order
///
/// Returns the cursor to persist when a handler fails, or `None` when every event was handled.
async fn dispatch_events(
	trigger: &EventTrigger,
	events: &[Event],
	from_block: u64,
	from_index: Option<u64>,
) -> Option<EventsEntry> {
	let mut cursor = EventsEntry {
		latest_block: from_block,
		latest_event_index: from_index,
	};

	for event in events {
		if already_handled(event, from_block, from_index) {
			trace!(
				trigger = %trigger.name,
				block = event.block_number(),
				index = event.log_index(),
				"Event already handled; skipping"
			);
			continue;
		}

		if let Err(e) = trigger.handler.handle_event(event, trigger).await {
			error!(
				trigger = %trigger.name,
				block = event.block_number(),
				index = event.log_index(),
				error = %e,
				"Event handler failed; will retry from this event"
			);
			monitor_trigger_failure("event", &trigger.name);
			return Some(cursor);
		}

		cursor = EventsEntry {
			latest_block: event.block_number(),
			latest_event_index: Some(event.log_index()),
		};
	}

	None
}
