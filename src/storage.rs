use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_VERSION: u32 = 1;

pub const USER_KEY: &str = "gyaanmitra_user";
pub const ONBOARDED_KEY: &str = "gyaanmitra_onboarded";
pub const ACTIVITIES_KEY: &str = "gyaanmitra_activities";
pub const PROJECTS_KEY: &str = "gyaanmitra_projects";
pub const COURSES_KEY: &str = "gyaanmitra_courses";
pub const TRADE_OFFERS_KEY: &str = "gyaanmitra_trade_offers";

/// String-keyed durable side-store, the local-storage of this app.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create data directory {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Some(raw))
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, value)
            .with_context(|| format!("failed to write {}", temp_path.display()))?;
        std::fs::rename(&temp_path, &path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub use memory::MemoryStore;


#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    data: T,
}

pub fn encode_snapshot<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let envelope = Envelope {
        version: SNAPSHOT_VERSION,
        data: value,
    };
    serde_json::to_string(&envelope).context("failed to serialize snapshot")
}

pub fn decode_snapshot<T: DeserializeOwned>(raw: &str) -> anyhow::Result<T> {
    let envelope: Envelope<serde_json::Value> =
        serde_json::from_str(raw).context("snapshot is not valid JSON")?;
    if envelope.version != SNAPSHOT_VERSION {
        anyhow::bail!(
            "snapshot version {} does not match {}",
            envelope.version,
            SNAPSHOT_VERSION
        );
    }
    serde_json::from_value(envelope.data).context("snapshot has an unexpected shape")
}

/// Reads a snapshot, treating a missing or unreadable record as no prior state.
pub fn load_snapshot<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to read snapshot, starting fresh");
            return None;
        }
    };

    match decode_snapshot(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, error = %err, "discarding malformed snapshot");
            None
        }
    }
}

/// Fire-and-forget write. Failures are logged and never undo the in-memory change.
pub fn save_snapshot<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let result = encode_snapshot(value).and_then(|raw| store.set(key, &raw));
    match result {
        Ok(()) => tracing::debug!(key, "snapshot written"),
        Err(err) => tracing::warn!(key, error = %err, "failed to persist snapshot"),
    }
}

pub fn clear_snapshot(store: &dyn KeyValueStore, key: &str) {
    if let Err(err) = store.remove(key) {
        tracing::warn!(key, error = %err, "failed to clear snapshot");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_persists_between_handles() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        save_snapshot(&store, ACTIVITIES_KEY, &vec![1u32, 2, 3]);

        let reopened = FileStore::open(dir.path()).unwrap();
        let loaded: Option<Vec<u32>> = load_snapshot(&reopened, ACTIVITIES_KEY);
        assert_eq!(loaded, Some(vec![1, 2, 3]));
    }

    #[test]
    fn remove_clears_file_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        save_snapshot(&store, ONBOARDED_KEY, &true);
        clear_snapshot(&store, ONBOARDED_KEY);
        assert_eq!(store.get(ONBOARDED_KEY).unwrap(), None);
        clear_snapshot(&store, ONBOARDED_KEY);
    }

    #[test]
    fn memory_store_sets_and_removes() {
        let store = MemoryStore::new();
        assert_eq!(store.get(USER_KEY).unwrap(), None);
        store.set(USER_KEY, "{}").unwrap();
        assert_eq!(store.get(USER_KEY).unwrap().as_deref(), Some("{}"));
        store.remove(USER_KEY).unwrap();
        assert_eq!(store.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn corrupt_snapshot_falls_back_to_none() {
        let store = MemoryStore::new();
        store.set(USER_KEY, "{not json").unwrap();
        let loaded: Option<Vec<u32>> = load_snapshot(&store, USER_KEY);
        assert_eq!(loaded, None);
    }

    #[test]
    fn mismatched_version_is_rejected() {
        let store = MemoryStore::new();
        store
            .set(PROJECTS_KEY, r#"{"version":99,"data":[1,2]}"#)
            .unwrap();
        let loaded: Option<Vec<u32>> = load_snapshot(&store, PROJECTS_KEY);
        assert_eq!(loaded, None);
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let store = MemoryStore::new();
        store
            .set(PROJECTS_KEY, r#"{"version":1,"data":{"a":1}}"#)
            .unwrap();
        let loaded: Option<Vec<u32>> = load_snapshot(&store, PROJECTS_KEY);
        assert_eq!(loaded, None);
    }

    #[test]
    fn unversioned_payload_is_rejected() {
        let store = MemoryStore::new();
        store.set(PROJECTS_KEY, "[1,2]").unwrap();
        let loaded: Option<Vec<u32>> = load_snapshot(&store, PROJECTS_KEY);
        assert_eq!(loaded, None);
    }
}
