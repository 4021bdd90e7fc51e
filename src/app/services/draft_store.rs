use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::app::infrastructure::error::Result;

/// The one slot the editor draft lives in.
pub const DRAFT_KEY: &str = "markdown-draft";

/// A flat string key-value store, last write wins.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// Removing a key that is not present is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Stores each key as a plain text file in one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store under the user data directory: data_dir/markpress/store/
    pub fn open_default() -> Self {
        Self::new(Self::default_location())
    }

    pub fn default_location() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("markpress");
        path.push("store");
        path
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.root.join(format!("{}.txt", file_name))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        // Write beside the target and rename so a crash never leaves half a draft.
        let temp = path.with_extension("tmp");
        fs::write(&temp, value)?;
        fs::rename(&temp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Read the stored draft. Read failures are logged and treated as "no draft".
pub fn load_draft(store: &dyn KeyValueStore) -> Option<String> {
    match store.get(DRAFT_KEY) {
        Ok(draft) => draft,
        Err(e) => {
            tracing::warn!("Failed to read stored draft: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("store"));

        assert_eq!(store.get(DRAFT_KEY).unwrap(), None);

        store.set(DRAFT_KEY, "# Hello\n").unwrap();
        assert_eq!(store.get(DRAFT_KEY).unwrap().as_deref(), Some("# Hello\n"));

        store.set(DRAFT_KEY, "# Second").unwrap();
        assert_eq!(store.get(DRAFT_KEY).unwrap().as_deref(), Some("# Second"));

        store.remove(DRAFT_KEY).unwrap();
        assert_eq!(store.get(DRAFT_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        assert!(store.remove("never-written").is_ok());
    }

    #[test]
    fn test_file_store_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.set(DRAFT_KEY, "body").unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["markdown-draft.txt".to_string()]);
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let store = FileStore::new("/data");
        assert_eq!(store.path_for("../escape"), PathBuf::from("/data/___escape.txt"));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        store.set("k", "v").unwrap();
        assert!(store.contains("k"));
        store.remove("k").unwrap();
        assert!(!store.contains("k"));
    }

    #[test]
    fn test_load_draft_missing() {
        let store = MemoryStore::new();
        assert_eq!(load_draft(&store), None);
    }
}
