//! Local cache mirror - the last-known value of every key, on local disk.
//!
//! One `<key>.json` file per collection under the mirror directory. The mirror
//! is written on every mutation and read whenever the remote store cannot
//! answer, so the workflow keeps working while offline or signed out.

use super::{DataKey, KeyValueStore, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::trace;

/// Directory-backed mirror of the key-value store.
#[derive(Clone, Debug)]
pub struct LocalMirror {
    dir: PathBuf,
}

impl LocalMirror {
    /// Opens (and creates if needed) the mirror directory.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StoreError::Mirror {
                key: dir.display().to_string(),
                source,
            })?;
        Ok(Self { dir })
    }

    /// Directory the JSON files live in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: DataKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

#[async_trait]
impl KeyValueStore for LocalMirror {
    async fn get(&self, key: DataKey) -> Result<Value, StoreError> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(key.empty_value()),
            Err(source) => {
                return Err(StoreError::Mirror {
                    key: key.to_string(),
                    source,
                });
            }
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })
    }

    async fn set(&self, key: DataKey, value: Value) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&value).map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })?;
        let path = self.path_for(key);
        // Write-then-rename so a concurrent reader never sees a torn file.
        let tmp = path.with_extension("json.tmp");
        let io_err = |source| StoreError::Mirror {
            key: key.to_string(),
            source,
        };
        tokio::fs::write(&tmp, &bytes).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &path).await.map_err(io_err)?;
        trace!(key = %key, bytes = bytes.len(), "mirror written");
        Ok(())
    }
}
