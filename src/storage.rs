//! A small JSON key-value file standing in for browser local storage.
//!
//! The whole file is one JSON object; each key maps to an arbitrary JSON
//! value. Writes go through a temp file and a rename so a crash never leaves
//! a half-written store behind.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, TrainerError};

#[derive(Debug, Clone)]
pub struct KeyValueStore {
    path: PathBuf,
}

impl KeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        KeyValueStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode `key`. Missing file, missing key, or a value that no
    /// longer decodes all yield `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let map = self.read_map().ok()?;
        let value = map.get(key)?.clone();
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(err) => {
                warn!(key, %err, "stored value no longer decodes; ignoring");
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut map = self.read_map().unwrap_or_default();
        let value =
            serde_json::to_value(value).map_err(|e| TrainerError::Storage(e.to_string()))?;
        map.insert(key.to_string(), value);
        self.write_map(&map)
    }

    /// Remove `key`. Removing an absent key is not an error.
    pub fn remove(&self, key: &str) -> Result<()> {
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(_) => return Ok(()),
        };
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }

    fn read_map(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let data = fs::read(&self.path)?;
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        match serde_json::from_slice::<Value>(&data) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(TrainerError::Storage(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
            Err(err) => Err(TrainerError::Storage(format!(
                "failed to parse {}: {err}",
                self.path.display()
            ))),
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let bytes = serde_json::to_vec_pretty(map)
            .map_err(|e| TrainerError::Storage(e.to_string()))?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, bytes)?;
        match fs::rename(&tmp_path, &self.path) {
            Ok(()) => {}
            Err(rename_err) => {
                if self.path.exists() {
                    fs::remove_file(&self.path)?;
                    fs::rename(&tmp_path, &self.path)?;
                } else {
                    return Err(rename_err.into());
                }
            }
        }
        debug!(path = %self.path.display(), keys = map.len(), "store written");
        Ok(())
    }
}
