//! Persisted watermarks and the store wrapper that serializes access to them.
//!
//! Each trigger kind has one record under a fixed key:
//!
//! - blocks: `{"latest_blocks": {name: height}}`, the last height each block trigger handled
//! - transactions: `{"latest_block": height}`, the last height dispatched, `-1` when none
//! - events: `{"version": 2, "entries": {name: {"latest_block": h, "latest_event_index": i}}}`,
//!   the next block to scan and the last index already handled in it, `-1` when none
//!
//! Older events records only carry a flat `latest_blocks` map; they are migrated on read.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::Mutex;

use crate::services::listener::{storage::MetadataStore, ListenerError};

pub const BLOCKS_METADATA_KEY: &str = "listener.ethclient.blocks";
pub const TRANSACTIONS_METADATA_KEY: &str = "listener.ethclient.transactions";
pub const EVENTS_METADATA_KEY: &str = "listener.ethclient.events";

const EVENTS_METADATA_VERSION: u32 = 2;

/// `Option<u64>` stored as a signed integer with `-1` for `None`
mod sentinel {
	use super::*;

	pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
		match value {
			Some(v) => {
				let v = i64::try_from(*v).map_err(serde::ser::Error::custom)?;
				serializer.serialize_i64(v)
			}
			None => serializer.serialize_i64(-1),
		}
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
		let raw = i64::deserialize(deserializer)?;
		Ok(u64::try_from(raw).ok())
	}
}

/// Negative heights left by a rewind to before genesis read back as "no watermark"
fn deserialize_heights<'de, D: Deserializer<'de>>(
	deserializer: D,
) -> Result<BTreeMap<String, u64>, D::Error> {
	let raw = BTreeMap::<String, i64>::deserialize(deserializer)?;
	Ok(raw
		.into_iter()
		.filter_map(|(name, height)| u64::try_from(height).ok().map(|h| (name, h)))
		.collect())
}

/// Last height fully handled, per block trigger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlocksMetadata {
	#[serde(default, deserialize_with = "deserialize_heights")]
	pub latest_blocks: BTreeMap<String, u64>,
}

impl BlocksMetadata {
	pub fn latest(&self, trigger: &str) -> Option<u64> {
		self.latest_blocks.get(trigger).copied()
	}

	/// Records `height` as handled by `trigger`; `None` clears the watermark
	pub fn set_latest(&mut self, trigger: &str, height: Option<u64>) {
		match height {
			Some(height) => {
				self.latest_blocks.insert(trigger.to_string(), height);
			}
			None => {
				self.latest_blocks.remove(trigger);
			}
		}
	}
}

/// Last height whose transactions were dispatched to the transaction triggers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionsMetadata {
	#[serde(with = "sentinel")]
	pub latest_block: Option<u64>,
}

/// Event cursor of a single trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsEntry {
	/// Next block to scan; the window starts here, inclusive
	pub latest_block: u64,
	/// Last event index already handled within `latest_block`
	#[serde(with = "sentinel")]
	pub latest_event_index: Option<u64>,
}

/// Event cursors, per event trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventsMetadata {
	pub version: u32,
	pub entries: BTreeMap<String, EventsEntry>,
}

impl Default for EventsMetadata {
	fn default() -> Self {
		Self {
			version: EVENTS_METADATA_VERSION,
			entries: BTreeMap::new(),
		}
	}
}

#[derive(Deserialize)]
struct RawEventsMetadata {
	#[serde(default)]
	entries: Option<BTreeMap<String, EventsEntry>>,
	/// Flat per-trigger heights written before cursors carried an event index
	#[serde(default)]
	latest_blocks: Option<BTreeMap<String, u64>>,
}

impl<'de> Deserialize<'de> for EventsMetadata {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = RawEventsMetadata::deserialize(deserializer)?;
		let entries = match raw.entries {
			Some(entries) => entries,
			None => raw
				.latest_blocks
				.unwrap_or_default()
				.into_iter()
				.map(|(name, latest_block)| {
					(
						name,
						EventsEntry {
							latest_block,
							latest_event_index: None,
						},
					)
				})
				.collect(),
		};
		Ok(Self {
			version: EVENTS_METADATA_VERSION,
			entries,
		})
	}
}

/// Exclusive owner of the metadata store
///
/// A single async mutex serializes every access and guards the open flag, so a shutdown that
/// closes the store makes in-flight and later accesses fail instead of touching a closed store.
pub struct MetadataDb {
	store: Arc<dyn MetadataStore>,
	open: Mutex<bool>,
}

impl MetadataDb {
	pub fn new(store: Arc<dyn MetadataStore>) -> Self {
		Self {
			store,
			open: Mutex::new(true),
		}
	}

	async fn get<T>(&self, key: &str) -> Result<Option<T>, ListenerError>
	where
		T: for<'de> Deserialize<'de>,
	{
		let open = self.open.lock().await;
		if !*open {
			return Err(ListenerError::storage_error("metadata database closed"));
		}
		match self.store.get(key).await? {
			Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
			None => Ok(None),
		}
	}

	async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ListenerError> {
		let open = self.open.lock().await;
		if !*open {
			return Err(ListenerError::storage_error("metadata database closed"));
		}
		let data = serde_json::to_vec(value)?;
		self.store.set(key, &data).await
	}

	pub async fn blocks_metadata(&self) -> Result<BlocksMetadata, ListenerError> {
		Ok(self.get(BLOCKS_METADATA_KEY).await?.unwrap_or_default())
	}

	pub async fn set_blocks_metadata(&self, md: &BlocksMetadata) -> Result<(), ListenerError> {
		self.set(BLOCKS_METADATA_KEY, md).await
	}

	pub async fn transactions_metadata(&self) -> Result<TransactionsMetadata, ListenerError> {
		Ok(self.get(TRANSACTIONS_METADATA_KEY).await?.unwrap_or_default())
	}

	pub async fn set_transactions_metadata(
		&self,
		md: &TransactionsMetadata,
	) -> Result<(), ListenerError> {
		self.set(TRANSACTIONS_METADATA_KEY, md).await
	}

	pub async fn events_metadata(&self) -> Result<EventsMetadata, ListenerError> {
		Ok(self.get(EVENTS_METADATA_KEY).await?.unwrap_or_default())
	}

	pub async fn set_events_metadata(&self, md: &EventsMetadata) -> Result<(), ListenerError> {
		self.set(EVENTS_METADATA_KEY, md).await
	}

	/// Closes the underlying store. Idempotent.
	pub async fn close(&self) -> Result<(), ListenerError> {
		let mut open = self.open.lock().await;
		if !*open {
			return Ok(());
		}
		*open = false;
		self.store.close().await
	}

	pub async fn is_open(&self) -> bool {
		*self.open.lock().await
	}
}
