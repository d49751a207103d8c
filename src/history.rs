//! Rolling history of completed generations.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Storage key the history list lives under.
pub const HISTORY_KEY: &str = "adgenius_history";

/// Maximum number of entries kept.
pub const HISTORY_CAPACITY: usize = 10;

/// Product name recorded when the user left it blank.
pub const UNTITLED_PRODUCT: &str = "Untitled";

/// Lifecycle of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    /// Generation started but not finished.
    Pending,
    /// Video generated and stored.
    Completed,
    /// Generation failed.
    Failed,
}

/// One past generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Creation timestamp as a decimal string.
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Product name at generation time.
    pub product_name: String,
    /// Prompt the video was generated from.
    pub prompt: String,
    /// Storyboard at generation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storyboard: Option<String>,
    /// Voice script at generation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_script: Option<String>,
    /// Mood reference images (data URIs).
    #[serde(default)]
    pub reference_images: Vec<String>,
    /// Talent images (data URIs).
    #[serde(default)]
    pub talent_images: Vec<String>,
    /// Product images (data URIs).
    #[serde(default)]
    pub product_images: Vec<String>,
    /// Local location of the video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Entry status.
    pub status: GenerationStatus,
}

impl HistoryEntry {
    /// Creates a completed entry stamped with the current time.
    pub fn completed(product_name: &str, prompt: impl Into<String>) -> Self {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let product_name = if product_name.trim().is_empty() {
            UNTITLED_PRODUCT.to_string()
        } else {
            product_name.to_string()
        };
        Self {
            id: timestamp.to_string(),
            timestamp,
            product_name,
            prompt: prompt.into(),
            storyboard: None,
            voice_script: None,
            reference_images: Vec::new(),
            talent_images: Vec::new(),
            product_images: Vec::new(),
            video_url: None,
            status: GenerationStatus::Completed,
        }
    }

    /// Returns the creation time.
    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// String key/value persistence, overwritten wholesale per key.
pub trait Storage: Send + Sync {
    /// Reads a value.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates a storage rooted at `dir`. The directory is created on write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the file backing a key.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Returns the storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-process storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The most recent generations, newest first.
pub struct HistoryStore {
    storage: Arc<dyn Storage>,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Loads history from storage.
    ///
    /// Missing, unreadable or corrupt data yields an empty history.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let entries = match storage.get(HISTORY_KEY) {
            Ok(Some(text)) => match serde_json::from_str::<Vec<HistoryEntry>>(&text) {
                Ok(mut entries) => {
                    entries.truncate(HISTORY_CAPACITY);
                    entries
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to parse history, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read history, starting empty");
                Vec::new()
            }
        };
        Self { storage, entries }
    }

    /// Prepends an entry, evicts beyond capacity and persists the list.
    ///
    /// The in-memory list only changes once the write succeeded.
    pub fn record(&mut self, entry: HistoryEntry) -> Result<()> {
        let mut entries = Vec::with_capacity(HISTORY_CAPACITY);
        entries.push(entry);
        entries.extend(self.entries.iter().take(HISTORY_CAPACITY - 1).cloned());

        let text = serde_json::to_string(&entries)?;
        self.storage.set(HISTORY_KEY, &text)?;
        self.entries = entries;
        Ok(())
    }

    /// Returns the entries, newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> HistoryEntry {
        let mut e = HistoryEntry::completed(&format!("Product {n}"), format!("prompt {n}"));
        e.id = n.to_string();
        e
    }

    #[test]
    fn test_capacity_and_order_for_any_insertion_count() {
        for total in 0..=25 {
            let storage = Arc::new(MemoryStorage::new());
            let mut history = HistoryStore::load(storage.clone());
            for n in 0..total {
                history.record(entry(n)).unwrap();
                assert!(history.len() <= HISTORY_CAPACITY);
            }

            let expected: Vec<String> = (0..total)
                .rev()
                .take(HISTORY_CAPACITY)
                .map(|n| n.to_string())
                .collect();
            let ids: Vec<String> = history.entries().iter().map(|e| e.id.clone()).collect();
            assert_eq!(ids, expected);

            let reloaded = HistoryStore::load(storage);
            assert_eq!(reloaded.entries(), history.entries());
        }
    }

    #[test]
    fn test_corrupt_history_loads_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(HISTORY_KEY, "{not json").unwrap();
        let history = HistoryStore::load(storage);
        assert!(history.is_empty());
    }

    #[test]
    fn test_serialized_shape_is_camel_case() {
        let storage = Arc::new(MemoryStorage::new());
        let mut history = HistoryStore::load(storage.clone());
        let mut e = entry(1);
        e.video_url = Some("/tmp/1.mp4".into());
        e.talent_images = vec!["data:image/png;base64,AAAA".into()];
        history.record(e).unwrap();

        let text = storage.get(HISTORY_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json[0]["productName"], "Product 1");
        assert_eq!(json[0]["videoUrl"], "/tmp/1.mp4");
        assert_eq!(json[0]["status"], "completed");
        assert_eq!(json[0]["talentImages"][0], "data:image/png;base64,AAAA");
        assert!(json[0].get("storyboard").is_none());
    }

    #[test]
    fn test_reads_entries_with_missing_optional_fields() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(
                HISTORY_KEY,
                r#"[{"id":"1","timestamp":1700000000000,"productName":"Kopi","prompt":"p","status":"failed"}]"#,
            )
            .unwrap();
        let history = HistoryStore::load(storage);
        assert_eq!(history.len(), 1);
        assert_eq!(history.entries()[0].status, GenerationStatus::Failed);
        assert!(history.entries()[0].reference_images.is_empty());
        assert!(history.entries()[0].created_at().is_some());
    }

    struct ReadOnlyStorage;

    impl Storage for ReadOnlyStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }
    }

    #[test]
    fn test_failed_write_leaves_entries_unchanged() {
        let mut history = HistoryStore::load(Arc::new(ReadOnlyStorage));
        let err = history.record(entry(1)).unwrap_err();
        assert!(matches!(err, crate::error::AdGeniusError::Io(_)));
        assert!(history.is_empty());
    }

    #[test]
    fn test_blank_product_name_is_untitled() {
        assert_eq!(HistoryEntry::completed("  ", "p").product_name, UNTITLED_PRODUCT);
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("data"));
        assert_eq!(storage.get(HISTORY_KEY).unwrap(), None);

        let mut history = HistoryStore::load(Arc::new(storage.clone()));
        history.record(entry(7)).unwrap();
        assert!(storage.path_for(HISTORY_KEY).exists());

        let reloaded = HistoryStore::load(Arc::new(storage));
        assert_eq!(reloaded.entries()[0].id, "7");
    }
}
