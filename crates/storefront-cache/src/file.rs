//! Directory-backed store: one file per slot.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::kv::validate_key;
use crate::{CacheError, KvStore};

/// A `KvStore` persisting each slot as a file inside one directory.
///
/// Writes land in a hidden temporary file which is then renamed over the
/// slot file, so a slot is always replaced as a whole.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| CacheError::OpenError(format!("{}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    /// The directory backing this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, CacheError> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.slot_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let path = self.slot_path(key)?;
        let tmp = self.dir.join(format!(".{}.tmp", key));
        fs::write(&tmp, value).map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                CacheError::Unavailable(e.to_string())
            }
            _ => CacheError::StoreError(e.to_string()),
        })?;
        fs::rename(&tmp, &path)?;
        tracing::trace!(slot = key, bytes = value.len(), "slot written");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let path = self.slot_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with('.') {
                keys.push(name);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        store.set("cart", br#"[{"a":1}]"#).unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("cart").unwrap(), Some(br#"[{"a":1}]"#.to_vec()));
    }

    #[test]
    fn test_file_store_keys_skip_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.set("cart", b"[]").unwrap();
        store.set("admin_token", b"\"t\"").unwrap();
        fs::write(dir.path().join(".cart.tmp"), b"partial").unwrap();

        assert_eq!(store.keys().unwrap(), vec!["admin_token", "cart"]);
    }

    #[test]
    fn test_file_store_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.set("cart", b"[]").unwrap();
        store.delete("cart").unwrap();
        store.delete("cart").unwrap();
        assert_eq!(store.get("cart").unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert!(matches!(
            store.set("../outside", b"x"),
            Err(CacheError::InvalidKey(_))
        ));
    }
}
