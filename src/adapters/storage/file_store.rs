use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::ports::{KeyValueStore, StoreError, StoreResult};

/// Stores each key as `<dir>/<key>.json`.
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn write_error(key: &str, e: std::io::Error) -> StoreError {
        StoreError::Write {
            key: key.to_string(),
            message: e.to_string(),
        }
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Read {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Self::write_error(key, e))?;

        // Write beside the target and rename over it so readers never see a
        // partial value.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| Self::write_error(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| Self::write_error(key, e))?;

        tracing::trace!(key, path = %path.display(), bytes = value.len(), "wrote value");
        Ok(())
    }
}
