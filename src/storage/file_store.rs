//! File-Backed Key-Value Store
//!
//! One file per key under a directory. Every operation goes to disk, so two
//! processes sharing the directory see each other's writes; concurrent
//! writers to the same key are last-writer-wins.

use std::fs;
use std::path::{Path, PathBuf};

use writedeck_core::{CoreError, CoreResult, KeyValueStore};

use crate::utils::paths::{ensure_dir, write_atomic};

const FILE_EXTENSION: &str = "json";

/// `KeyValueStore` persisted as files in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> CoreResult<Self> {
        let dir = dir.into();
        ensure_dir(&dir).map_err(|e| CoreError::storage(e.to_string()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> CoreResult<PathBuf> {
        if key.is_empty() {
            return Err(CoreError::validation("Key cannot be empty"));
        }
        Ok(self
            .dir
            .join(format!("{}.{}", encode_key(key), FILE_EXTENSION)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes go to a temp file in the same directory which is then renamed
    /// over the target, so readers never observe a partial value.
    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let path = self.path_for(key)?;
        write_atomic(&path, value.as_bytes())
            .map_err(|e| CoreError::storage(format!("Failed to write '{}': {}", key, e)))?;
        tracing::debug!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> CoreResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(key) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(decode_key)
            {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Percent-encode reserved characters so any key maps to a portable file
/// name (`history:quiz-generator` -> `history%3Aquiz-generator`).
fn encode_key(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}

fn decode_key(stem: &str) -> Option<String> {
    urlencoding::decode(stem).ok().map(|key| key.into_owned())
}
