//! Key-value persistence for listener metadata.
//!
//! Stores are addressed by fixed string keys and hold opaque bytes. Every `set` must be durable
//! by the time it returns. Once closed, a store rejects all further access.

use async_trait::async_trait;
use std::{
	collections::HashMap,
	path::{Path, PathBuf},
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc, Mutex,
	},
};
use tokio::io::AsyncWriteExt;

use crate::services::listener::ListenerError;

/// Durable key-value store owned by a listener
#[async_trait]
pub trait MetadataStore: Send + Sync {
	/// Returns the value stored under `key`, or `None` if the key was never written
	async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ListenerError>;

	/// Stores `value` under `key`, durably
	async fn set(&self, key: &str, value: &[u8]) -> Result<(), ListenerError>;

	/// Closes the store; subsequent calls fail
	async fn close(&self) -> Result<(), ListenerError>;
}

/// Directory-backed store with one JSON file per key
///
/// Writes go to a temporary file that is synced and then renamed over the target, so a crash
/// leaves either the previous or the new value in place.
#[derive(Debug)]
pub struct FileMetadataStore {
	storage_path: PathBuf,
	closed: AtomicBool,
}

impl FileMetadataStore {
	/// Opens the store, creating `storage_path` if needed
	pub async fn open(storage_path: impl Into<PathBuf>) -> Result<Self, ListenerError> {
		let storage_path = storage_path.into();
		tokio::fs::create_dir_all(&storage_path).await.map_err(|e| {
			ListenerError::storage_error(format!(
				"failed to create metadata directory {}: {}",
				storage_path.display(),
				e
			))
		})?;

		tracing::debug!(path = %storage_path.display(), "Opened metadata store");

		Ok(Self {
			storage_path,
			closed: AtomicBool::new(false),
		})
	}

	pub fn path(&self) -> &Path {
		&self.storage_path
	}

	fn ensure_open(&self) -> Result<(), ListenerError> {
		if self.closed.load(Ordering::Acquire) {
			return Err(ListenerError::storage_error("metadata store is closed"));
		}
		Ok(())
	}

	fn file_path(&self, key: &str) -> Result<PathBuf, ListenerError> {
		let valid = !key.is_empty()
			&& !key.starts_with('.')
			&& key
				.chars()
				.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
		if !valid {
			return Err(ListenerError::storage_error(format!(
				"invalid metadata key '{}'",
				key
			)));
		}
		Ok(self.storage_path.join(format!("{}.json", key)))
	}
}

#[async_trait]
impl MetadataStore for FileMetadataStore {
	async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ListenerError> {
		self.ensure_open()?;
		let file_path = self.file_path(key)?;

		match tokio::fs::read(&file_path).await {
			Ok(data) => Ok(Some(data)),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(ListenerError::storage_error(format!(
				"failed to read {}: {}",
				file_path.display(),
				e
			))),
		}
	}

	async fn set(&self, key: &str, value: &[u8]) -> Result<(), ListenerError> {
		self.ensure_open()?;
		let file_path = self.file_path(key)?;
		let tmp_path = file_path.with_extension("json.tmp");

		if let Err(e) = replace_file(&tmp_path, &file_path, value).await {
			if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
				if cleanup.kind() != std::io::ErrorKind::NotFound {
					tracing::warn!(
						path = %tmp_path.display(),
						error = %cleanup,
						"Failed to remove temporary metadata file"
					);
				}
			}
			return Err(e);
		}

		// Persist the rename itself
		#[cfg(unix)]
		tokio::fs::File::open(&self.storage_path)
			.await?
			.sync_all()
			.await?;

		Ok(())
	}

	async fn close(&self) -> Result<(), ListenerError> {
		self.closed.store(true, Ordering::Release);
		tracing::debug!(path = %self.storage_path.display(), "Closed metadata store");
		Ok(())
	}
}

/// Writes `value` to `tmp_path`, syncs it and renames it over `file_path`
async fn replace_file(
	tmp_path: &Path,
	file_path: &Path,
	value: &[u8],
) -> Result<(), ListenerError> {
	let mut file = tokio::fs::File::create(tmp_path).await?;
	file.write_all(value).await?;
	file.sync_all().await?;
	drop(file);

	tokio::fs::rename(tmp_path, file_path).await?;
	Ok(())
}

/// In-process store
///
/// Clones share the same contents, which lets callers inspect what a listener persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryMetadataStore {
	entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
	closed: Arc<AtomicBool>,
}

impl MemoryMetadataStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::Acquire)
	}

	fn entries(
		&self,
	) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>, ListenerError> {
		if self.is_closed() {
			return Err(ListenerError::storage_error("metadata store is closed"));
		}
		self.entries
			.lock()
			.map_err(|_| ListenerError::storage_error("metadata store lock poisoned"))
	}
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
	async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ListenerError> {
		Ok(self.entries()?.get(key).cloned())
	}

	async fn set(&self, key: &str, value: &[u8]) -> Result<(), ListenerError> {
		self.entries()?.insert(key.to_string(), value.to_vec());
		Ok(())
	}

	async fn close(&self) -> Result<(), ListenerError> {
		self.closed.store(true, Ordering::Release);
		Ok(())
	}
}
