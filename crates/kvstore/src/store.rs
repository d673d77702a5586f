use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{fs, sync::RwLock};
use tracing::debug;

use crate::error::StoreError;

/// Entries of one namespace, in first-write order.
type Entries = IndexMap<String, Value>;
type Namespaces = IndexMap<String, Entries>;

/// Entry as it appears in the persisted document.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedEntry {
    key: String,
    value: Value,
}

#[derive(Serialize)]
struct PersistedEntryRef<'a> {
    key: &'a str,
    value: &'a Value,
}

/// Namespaced key-value store for arbitrary JSON values.
///
/// Namespaces are created implicitly on first write and fully isolate
/// their keys from one another. With a backing file, every mutation is
/// flushed to disk before the call returns; without one, the data lives
/// only as long as the handle.
///
/// A single coarse `RwLock` guards the data, so at most one mutation is
/// in flight at a time and the on-disk document never interleaves
/// concurrent writes.
pub struct Store {
    inner: RwLock<Namespaces>,
    backing: Option<PathBuf>,
}

impl Store {
    /// Open a store. `None` gives a volatile in-memory store; with a
    /// path, the document at that path is loaded if it exists, created
    /// empty otherwise, and kept up to date by every mutation.
    ///
    /// A backing file that exists but cannot be read or parsed fails
    /// the open rather than starting from an empty document.
    pub async fn open(backing: Option<PathBuf>) -> Result<Arc<Self>, StoreError> {
        let namespaces = match &backing {
            None => {
                debug!("opening in-memory store");
                Namespaces::new()
            }
            Some(path) => {
                debug!(path = %path.display(), "opening file-backed store");
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent).await.map_err(|source| StoreError::Io {
                            path: path.clone(),
                            source,
                        })?;
                    }
                }
                match fs::read(path).await {
                    Ok(bytes) => decode_document(path, &bytes)?,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        let empty = Namespaces::new();
                        write_document(path, &empty).await?;
                        empty
                    }
                    Err(source) => {
                        return Err(StoreError::Io {
                            path: path.clone(),
                            source,
                        })
                    }
                }
            }
        };

        Ok(Arc::new(Self {
            inner: RwLock::new(namespaces),
            backing,
        }))
    }

    /// Upsert `value` under `key` in `namespace` and persist.
    ///
    /// An existing key keeps its position in the namespace; only its
    /// value is replaced. The namespace is created if needed.
    pub async fn store(&self, namespace: &str, key: &str, value: Value) -> Result<(), StoreError> {
        let mut namespaces = self.inner.write().await;
        namespaces
            .entry(namespace.to_string())
            .or_insert_with(Entries::new)
            .insert(key.to_string(), value);
        self.flush(&namespaces).await
    }

    /// Current value for `key` in `namespace`, or `None` if the key (or
    /// the whole namespace) has never been written. Absence is not an
    /// error.
    pub async fn retrieve(&self, namespace: &str, key: &str) -> Option<Value> {
        let namespaces = self.inner.read().await;
        namespaces
            .get(namespace)
            .and_then(|entries| entries.get(key))
            .cloned()
    }

    /// Remove `key` from `namespace` if present. Deleting an absent key
    /// is a successful no-op.
    pub async fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
        let mut namespaces = self.inner.write().await;
        let existed = namespaces
            .get_mut(namespace)
            .and_then(|entries| entries.shift_remove(key))
            .is_some();
        if existed {
            self.flush(&namespaces).await?;
        }
        Ok(())
    }

    /// All keys currently present in `namespace`, in first-write order;
    /// overwrites keep a key's original position and deletions close
    /// the gap. Empty for a namespace that was never written.
    pub async fn keys(&self, namespace: &str) -> Vec<String> {
        let namespaces = self.inner.read().await;
        namespaces
            .get(namespace)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Flush the store to its backing file. Mutations persist eagerly,
    /// so this is a final safety write; it is idempotent and a no-op
    /// for memory stores.
    pub async fn close(&self) -> Result<(), StoreError> {
        let namespaces = self.inner.read().await;
        self.flush(&namespaces).await
    }

    async fn flush(&self, namespaces: &Namespaces) -> Result<(), StoreError> {
        let Some(path) = &self.backing else {
            return Ok(());
        };
        write_document(path, namespaces).await
    }
}

/// Persisted layout: one object field per namespace, each holding a
/// list of `{"key": ..., "value": ...}` entry objects.
async fn write_document(path: &Path, namespaces: &Namespaces) -> Result<(), StoreError> {
    let document: IndexMap<&str, Vec<PersistedEntryRef<'_>>> = namespaces
        .iter()
        .map(|(namespace, entries)| {
            let entries = entries
                .iter()
                .map(|(key, value)| PersistedEntryRef { key, value })
                .collect();
            (namespace.as_str(), entries)
        })
        .collect();

    let data = serde_json::to_vec(&document).map_err(StoreError::Serialize)?;
    fs::write(path, data).await.map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn decode_document(path: &Path, bytes: &[u8]) -> Result<Namespaces, StoreError> {
    let document: IndexMap<String, Vec<PersistedEntry>> =
        serde_json::from_slice(bytes).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(document
        .into_iter()
        .map(|(namespace, entries)| {
            let entries = entries.into_iter().map(|e| (e.key, e.value)).collect();
            (namespace, entries)
        })
        .collect())
}
