//! Local key-value storage backends for the override blob.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{PnError, PnResult};

/// String key-value storage. Absence of a key on first run is `Ok(None)`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> PnResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> PnResult<()>;
    fn remove(&mut self, key: &str) -> PnResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> PnResult<Option<String>> {
        (**self).get(key)
    }
    fn set(&mut self, key: &str, value: &str) -> PnResult<()> {
        (**self).set(key, value)
    }
    fn remove(&mut self, key: &str) -> PnResult<()> {
        (**self).remove(key)
    }
}

/// In-memory store for tests and headless runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self { entries }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> PnResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> PnResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> PnResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PnResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(storage_error(key, "key must be a plain file name"));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> PnResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(storage_error(key, err)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> PnResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|err| storage_error(key, err))?;
        fs::write(&path, value).map_err(|err| storage_error(key, err))
    }

    fn remove(&mut self, key: &str) -> PnResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_error(key, err)),
        }
    }
}

fn storage_error(key: &str, message: impl ToString) -> PnError {
    PnError::Storage {
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
#[path = "tests/storage_tests.rs"]
mod tests;
