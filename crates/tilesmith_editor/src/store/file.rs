//! File-backed store
//!
//! Layout: `<root>/<name>/v<version>/<collection>/<key>.json`. Each value is
//! written to a sibling temp file and renamed into place, so a reader never
//! sees a half-written value.

use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::{debug, warn};

use super::{validate_key, KeyValueStore, StoreConfig, StoreError};

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) the collection directory under `root`
    pub async fn open(root: impl AsRef<Path>, config: &StoreConfig) -> Result<Self, StoreError> {
        let dir = root
            .as_ref()
            .join(&config.name)
            .join(format!("v{}", config.version))
            .join(&config.collection);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| io_error(&dir, source))?;
        debug!("Opened file store at {}", dir.display());
        Ok(Self { dir })
    }

    /// Platform data directory, e.g. `~/.local/share/tilesmith` on Linux
    pub fn default_root() -> Option<PathBuf> {
        ProjectDirs::from("", "", "tilesmith").map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Collection directory holding the key files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_error(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.key_path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    async fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.key_path(key)?;
        let temp = self.dir.join(format!(".{key}.json.tmp"));
        tokio::fs::write(&temp, value)
            .await
            .map_err(|e| io_error(&temp, e))?;
        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&temp).await {
                warn!("Failed to remove {}: {}", temp.display(), cleanup);
            }
            return Err(io_error(&path, e));
        }
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), StoreError> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_error(&self.dir, e)),
        }
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))
    }
}
