//! Process-wide parameters: the lowest layer of every job's argument context.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::Result;
use crate::paths;

#[derive(Debug)]
pub struct ParameterStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl ParameterStore {
    /// Open `.autostep/parameters.yaml` under `root`; a missing file is an
    /// empty store.
    pub fn open(root: &Path) -> Result<Self> {
        Self::open_file(paths::parameters_path(root))
    }

    pub fn open_file(path: PathBuf) -> Result<Self> {
        let values = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            if data.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_yaml::from_str(&data)?
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored value, or `""` when unset.
    pub fn get(&self, key: &str) -> String {
        self.lock().get(key).cloned().unwrap_or_default()
    }

    pub fn all(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.lock();
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    /// Returns whether the key existed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let mut values = self.lock();
        if values.remove(key).is_none() {
            return Ok(false);
        }
        self.persist(&values)?;
        Ok(true)
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let data = serde_yaml::to_string(values)?;
        crate::io::atomic_write(&self.path, data.as_bytes())
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.values.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = ParameterStore::open(dir.path()).unwrap();
        assert!(store.all().is_empty());
        assert_eq!(store.get("lbc_email"), "");
    }

    #[test]
    fn set_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let store = ParameterStore::open(dir.path()).unwrap();
        store.set("lbc_email", "me@example.com").unwrap();
        store.set("lbc_password", "hunter2").unwrap();

        let reopened = ParameterStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("lbc_email"), "me@example.com");
        assert_eq!(reopened.all().len(), 2);
    }

    #[test]
    fn remove_reports_presence() {
        let dir = TempDir::new().unwrap();
        let store = ParameterStore::open(dir.path()).unwrap();
        store.set("k", "v").unwrap();
        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
        assert!(ParameterStore::open(dir.path()).unwrap().all().is_empty());
    }
}
