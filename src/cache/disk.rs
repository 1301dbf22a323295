use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::Result;

/// Data about to be applied to an entity, tagged with where it came from.
#[derive(Debug, Clone)]
pub struct Record {
    pub data: Value,
    /// True when the data was just fetched from the network.
    pub fetched: bool,
}

impl Record {
    pub fn from_disk(data: Value) -> Self {
        Self {
            data,
            fetched: false,
        }
    }

    pub fn fetched(data: Value) -> Self {
        Self {
            data,
            fetched: true,
        }
    }
}

/// One JSON document per record name under a root directory.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Reads a record. Missing files, unreadable files and malformed JSON are
    /// all reported as `None`.
    pub async fn load(&self, name: &str) -> Option<Value> {
        let path = self.path(name);
        let content = match async_fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                debug!("no cache record for {} ({})", name, e);
                return None;
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Some(Value::Object(map)),
            Ok(_) => {
                debug!("cache record for {} is not an object", name);
                None
            }
            Err(e) => {
                debug!("discarding malformed cache record for {}: {}", name, e);
                None
            }
        }
    }

    /// Writes a record, replacing any previous one.
    pub async fn persist(&self, name: &str, data: &Value) -> Result<()> {
        async_fs::create_dir_all(&self.root).await?;
        let json = serde_json::to_string(data)?;
        async_fs::write(self.path(name), json).await?;
        Ok(())
    }
}
