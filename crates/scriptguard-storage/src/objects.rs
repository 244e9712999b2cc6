//! `FsObjectStorage`: artifact blobs as files under a root directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use scriptguard_core::errors::StorageError;
use scriptguard_core::traits::IObjectStorage;
use tracing::debug;

pub struct FsObjectStorage {
    root: PathBuf,
}

impl FsObjectStorage {
    /// Create the root directory if it does not exist.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StorageError::ObjectWriteFailed {
            path: root.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative object path under the root. Absolute paths and
    /// `..` components are rejected.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let valid = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(StorageError::InvalidObjectPath {
                path: path.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl IObjectStorage for FsObjectStorage {
    fn put_object(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError> {
        let target = self.resolve(path)?;
        let write_failed = |e: std::io::Error| StorageError::ObjectWriteFailed {
            path: path.to_string(),
            message: e.to_string(),
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }
        fs::write(&target, bytes).map_err(write_failed)?;
        debug!(path, bytes = bytes.len(), content_type, "object stored");
        Ok(())
    }

    fn get_object(&self, path: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let target = self.resolve(path)?;
        match fs::read(&target) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ObjectReadFailed {
                path: path.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStorage::open(dir.path()).unwrap();
        for bad in ["../x", "a/../../x", "/etc/passwd", "", "./a"] {
            assert!(
                matches!(
                    store.put_object(bad, b"x", "text/plain"),
                    Err(StorageError::InvalidObjectPath { .. })
                ),
                "{bad}"
            );
        }
    }

    #[test]
    fn missing_object_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStorage::open(dir.path()).unwrap();
        assert_eq!(store.get_object("user/nothing.lua").unwrap(), None);
    }
}
