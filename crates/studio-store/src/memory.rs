//! In-process asset store
//!
//! Keeps records in a `DashMap` keyed by asset ID. Behaves like the remote
//! table as far as the manager can tell:
//! - IDs (UUID v4) and `created_at` are assigned on insert
//! - `is_favorite` defaults to false
//! - listing is filtered by owner and sorted newest first
//! - updating or deleting a missing ID succeeds and changes nothing
//!
//! With a snapshot path the collection is loaded on open and rewritten on
//! every mutation. The new row set is written to a sibling temp file and
//! renamed over the snapshot before the map changes, so a failed write leaves
//! both the file and the map as they were.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use studio_core::{
    AssetFieldUpdate, AssetId, AssetStore, ImageAsset, NewAsset, StoreError, UserId,
};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct StoredAsset {
    /// Insertion order, breaks `created_at` ties
    seq: u64,
    asset: ImageAsset,
}

/// `DashMap`-backed asset store
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    records: DashMap<AssetId, StoredAsset>,
    next_seq: AtomicU64,
    snapshot: Option<PathBuf>,
    /// Serializes mutations with their snapshot writes
    write_lock: Mutex<()>,
}

impl MemoryAssetStore {
    /// Empty, non-persistent store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with records (kept as given, IDs included)
    #[must_use]
    pub fn with_assets(assets: impl IntoIterator<Item = ImageAsset>) -> Self {
        let store = Self::new();
        for asset in assets {
            store.put(asset);
        }
        store
    }

    /// Store backed by a JSON snapshot file
    ///
    /// A missing file starts an empty collection; the file is created on the
    /// first mutation.
    ///
    /// # Errors
    /// `StoreError::Persist` when the file exists but cannot be read or parsed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut store = Self::new();

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let assets: Vec<ImageAsset> = serde_json::from_slice(&bytes).map_err(|e| {
                    StoreError::Persist(format!("{}: {e}", path.display()))
                })?;
                tracing::debug!(path = %path.display(), count = assets.len(), "snapshot loaded");
                // Oldest first so insertion order matches creation order
                for asset in assets.into_iter().rev() {
                    store.put(asset);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no snapshot yet");
            }
            Err(e) => {
                return Err(StoreError::Persist(format!("{}: {e}", path.display())));
            }
        }

        store.snapshot = Some(path);
        Ok(store)
    }

    /// Number of records across all owners
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record by ID, regardless of owner
    #[must_use]
    pub fn get(&self, id: &AssetId) -> Option<ImageAsset> {
        self.records.get(id).map(|r| r.asset.clone())
    }

    /// Snapshot file, if persistent
    #[must_use]
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    fn put(&self, asset: ImageAsset) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.records
            .insert(asset.id.clone(), StoredAsset { seq, asset });
    }

    fn rows(&self) -> Vec<StoredAsset> {
        self.records.iter().map(|r| r.value().clone()).collect()
    }

    fn sorted(&self, owner: Option<&UserId>) -> Vec<ImageAsset> {
        let rows = self
            .rows()
            .into_iter()
            .filter(|r| owner.map_or(true, |o| &r.asset.owner_id == o))
            .collect();
        newest_first(rows)
    }

    /// Write the row set built by `rows` as the new snapshot, if persistent
    ///
    /// Callers hold `write_lock` and commit to the map only on success.
    async fn persist(&self, rows: impl FnOnce() -> Vec<StoredAsset>) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        let body = serde_json::to_vec_pretty(&newest_first(rows()))
            .map_err(|e| StoreError::Persist(e.to_string()))?;

        let tmp = temp_path(path);
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| StoreError::Persist(format!("{}: {e}", tmp.display())))?;
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::Persist(format!("{}: {e}", path.display())));
        }
        tracing::trace!(path = %path.display(), "snapshot written");
        Ok(())
    }
}

fn newest_first(mut rows: Vec<StoredAsset>) -> Vec<ImageAsset> {
    rows.sort_by(|a, b| {
        b.asset
            .created_at
            .cmp(&a.asset.created_at)
            .then(b.seq.cmp(&a.seq))
    });
    rows.into_iter().map(|r| r.asset).collect()
}

/// `assets.json` -> `assets.json.tmp`, in the snapshot's own directory
fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<ImageAsset>, StoreError> {
        Ok(self.sorted(Some(owner)))
    }

    async fn insert(&self, asset: NewAsset) -> Result<ImageAsset, StoreError> {
        if asset.owner_id.as_str().is_empty() {
            return Err(StoreError::Rejected {
                status: 400,
                message: "null value in column \"user_id\" violates not-null constraint"
                    .to_string(),
            });
        }

        let record = ImageAsset {
            id: AssetId::new(uuid::Uuid::new_v4().to_string()),
            owner_id: asset.owner_id,
            image_url: asset.image_url,
            title: asset.title,
            prompt: asset.prompt,
            operation_type: asset.operation_type,
            is_favorite: false,
            created_at: Utc::now(),
        };
        let _guard = self.write_lock.lock().await;
        let row = StoredAsset {
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            asset: record.clone(),
        };
        self.persist(|| {
            let mut rows = self.rows();
            rows.push(row.clone());
            rows
        })
        .await?;

        self.records.insert(record.id.clone(), row);
        tracing::debug!(asset = %record.id, owner = %record.owner_id, "record inserted");
        Ok(record)
    }

    async fn update_field(&self, id: &AssetId, update: AssetFieldUpdate) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let Some(mut row) = self.records.get(id).map(|r| r.value().clone()) else {
            return Ok(());
        };
        update.apply(&mut row.asset);
        self.persist(|| {
            self.rows()
                .into_iter()
                .map(|r| if &r.asset.id == id { row.clone() } else { r })
                .collect()
        })
        .await?;

        self.records.insert(id.clone(), row);
        Ok(())
    }

    async fn delete_by_id(&self, id: &AssetId) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        if !self.records.contains_key(id) {
            return Ok(());
        }
        self.persist(|| {
            self.rows()
                .into_iter()
                .filter(|r| &r.asset.id != id)
                .collect()
        })
        .await?;

        self.records.remove(id);
        Ok(())
    }
}
