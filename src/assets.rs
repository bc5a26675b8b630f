//! Model asset resolution.
//!
//! Two providers exist: [`BundledAssets`] resolves models shipped next to the application, and
//! [`RecordStoreAssets`] looks models up by name in a persistent record store. Callers only
//! learn whether resolution succeeded; causes are logged.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AssetStoreError;

/// File extension of loadable model files.
pub const USDZ_EXTENSION: &str = "usdz";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetOrigin {
    Bundled,
    RecordStore,
}

/// A resolved, loadable model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetHandle {
    pub name: String,
    pub location: PathBuf,
    pub origin: AssetOrigin,
}

/// Resolves a model name to a loadable asset.
///
/// Each call completes at most once; `None` covers every failure (not found, I/O error,
/// malformed record) without distinguishing the cause.
#[async_trait]
pub trait AssetProvider: Send + Sync {
    async fn resolve(&self, model_name: &str) -> Option<AssetHandle>;
}

#[async_trait]
impl<T: AssetProvider + ?Sized> AssetProvider for Arc<T> {
    async fn resolve(&self, model_name: &str) -> Option<AssetHandle> {
        (**self).resolve(model_name).await
    }
}

/// Models bundled in a local directory as `<name>.usdz`.
#[derive(Debug, Clone)]
pub struct BundledAssets {
    directory: PathBuf,
}

impl BundledAssets {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Where a model of this name would live. Does not check existence.
    pub fn path_for(&self, model_name: &str) -> PathBuf {
        self.directory.join(format!("{model_name}.{USDZ_EXTENSION}"))
    }
}

#[async_trait]
impl AssetProvider for BundledAssets {
    async fn resolve(&self, model_name: &str) -> Option<AssetHandle> {
        if model_name.is_empty() || model_name.contains(|c: char| c == '/' || c == '\\') {
            warn!(model_name, "rejecting model name that is not a plain file stem");
            return None;
        }

        let location = self.path_for(model_name);
        match tokio::fs::metadata(&location).await {
            Ok(meta) if meta.is_file() => {
                debug!(model_name, ?location, "resolved bundled model");
                Some(AssetHandle {
                    name: model_name.to_string(),
                    location,
                    origin: AssetOrigin::Bundled,
                })
            }
            Ok(_) => {
                warn!(model_name, ?location, "bundled model path is not a file");
                None
            }
            Err(e) => {
                warn!(model_name, ?location, error = %e, "bundled model not found");
                None
            }
        }
    }
}

/// A model record as kept in the record store, keyed by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub name: String,
    /// Local path of the downloaded model file, if the record carries one.
    #[serde(default)]
    pub usdz_file: Option<PathBuf>,
}

/// Model records persisted in sled, one tree per record type.
pub struct RecordStoreAssets {
    db: sled::Db,
    record_type: String,
}

impl std::fmt::Debug for RecordStoreAssets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStoreAssets")
            .field("record_type", &self.record_type)
            .field("records", &self.record_count())
            .finish()
    }
}

impl RecordStoreAssets {
    /// Opens (or creates) the record store at `path`.
    pub fn open(
        path: impl AsRef<Path>,
        record_type: impl Into<String>,
    ) -> Result<Self, AssetStoreError> {
        Ok(Self::from_db(sled::open(path)?, record_type))
    }

    /// Wraps an already-open database handle.
    pub fn from_db(db: sled::Db, record_type: impl Into<String>) -> Self {
        Self {
            db,
            record_type: record_type.into(),
        }
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    fn records(&self) -> Result<sled::Tree, sled::Error> {
        self.db.open_tree(self.record_type.as_bytes())
    }

    /// Inserts or replaces the record with this name and flushes it to disk.
    pub fn put_record(&self, record: &AssetRecord) -> Result<(), AssetStoreError> {
        let tree = self.records()?;
        let value = serde_json::to_vec(record)?;

        tree.insert(record.name.as_bytes(), value)?;
        tree.flush()?;
        Ok(())
    }

    /// Number of stored records; zero if the tree cannot be opened.
    pub fn record_count(&self) -> usize {
        self.records().map(|tree| tree.len()).unwrap_or(0)
    }

    fn find_record(&self, model_name: &str) -> Option<AssetRecord> {
        let raw = match self.records().and_then(|tree| tree.get(model_name.as_bytes())) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                warn!(model_name, record_type = %self.record_type, "no model record found");
                return None;
            }
            Err(e) => {
                warn!(model_name, error = %e, "failed to query model records");
                return None;
            }
        };

        match serde_json::from_slice::<AssetRecord>(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(model_name, error = %e, "malformed model record");
                None
            }
        }
    }
}

#[async_trait]
impl AssetProvider for RecordStoreAssets {
    async fn resolve(&self, model_name: &str) -> Option<AssetHandle> {
        let record = self.find_record(model_name)?;

        let Some(location) = record.usdz_file else {
            warn!(model_name, "model record has no usdz file");
            return None;
        };

        debug!(model_name, ?location, "resolved model from record store");
        Some(AssetHandle {
            name: record.name,
            location,
            origin: AssetOrigin::RecordStore,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DEFAULT_MODEL_NAME, USDZ_RECORD_TYPE};

    fn temp_store() -> RecordStoreAssets {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .expect("failed to open temporary sled db");
        RecordStoreAssets::from_db(db, USDZ_RECORD_TYPE)
    }

    #[tokio::test]
    async fn bundled_model_resolves_when_file_exists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let assets = BundledAssets::new(dir.path());
        std::fs::write(assets.path_for(DEFAULT_MODEL_NAME), b"usdz").expect("write model");

        let handle = assets
            .resolve(DEFAULT_MODEL_NAME)
            .await
            .expect("bundled model should resolve");

        assert_eq!(handle.name, DEFAULT_MODEL_NAME);
        assert_eq!(handle.origin, AssetOrigin::Bundled);
        assert_eq!(handle.location, dir.path().join("FeedBack Now.usdz"));
    }

    #[tokio::test]
    async fn bundled_model_missing_or_unsafe_name_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("folder.usdz")).expect("create dir");
        let assets = BundledAssets::new(dir.path());

        assert_eq!(assets.resolve("missing").await, None);
        assert_eq!(assets.resolve("folder").await, None);
        assert_eq!(assets.resolve("../escape").await, None);
        assert_eq!(assets.resolve("").await, None);
    }

    #[tokio::test]
    async fn record_store_resolves_by_name() {
        let store = temp_store();
        store
            .put_record(&AssetRecord {
                name: DEFAULT_MODEL_NAME.to_string(),
                usdz_file: Some(PathBuf::from("/cache/feedback.usdz")),
            })
            .expect("store record");

        let handle = store
            .resolve(DEFAULT_MODEL_NAME)
            .await
            .expect("record should resolve");

        assert_eq!(handle.origin, AssetOrigin::RecordStore);
        assert_eq!(handle.location, PathBuf::from("/cache/feedback.usdz"));
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn record_store_failures_are_opaque() {
        let store = temp_store();
        store
            .put_record(&AssetRecord {
                name: "no-file".to_string(),
                usdz_file: None,
            })
            .expect("store record");
        store
            .db
            .open_tree(USDZ_RECORD_TYPE)
            .and_then(|tree| tree.insert("garbled", &b"{not json"[..]))
            .expect("store raw bytes");

        assert_eq!(store.resolve("unknown").await, None);
        assert_eq!(store.resolve("no-file").await, None);
        assert_eq!(store.resolve("garbled").await, None);
    }
}
