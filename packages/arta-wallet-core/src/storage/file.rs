//! File-backed storage.
//!
//! One file per key inside a directory. Writes go to a hidden temporary
//! file that is synced and then renamed over the target, so a crash leaves
//! either the old value or the new one, never a partial write.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::WalletStorage;
use crate::error::{Error, Result};

const VALUE_EXTENSION: &str = "json";

/// Directory-backed [`WalletStorage`]
#[derive(Debug)]
pub struct FileStorage {
    directory: PathBuf,
    // Serializes writers so two temp files for one key never race
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory
    pub fn open<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory).map_err(|e| {
            Error::StorageWriteError(format!(
                "Failed to create storage directory '{}': {}",
                directory.display(),
                e
            ))
        })?;

        Ok(Self {
            directory,
            write_lock: Mutex::new(()),
        })
    }

    /// The storage directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn value_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.directory.join(format!("{}.{}", key, VALUE_EXTENSION)))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.directory.join(format!(".{}.tmp", key))
    }
}

impl WalletStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.value_path(key)?;

        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::StorageReadError(format!(
                "Failed to read '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let final_path = self.value_path(key)?;
        let temp_path = self.temp_path(key);
        let _guard = self.write_lock.lock();

        let write_err = |e: std::io::Error| {
            Error::StorageWriteError(format!("Failed to write '{}': {}", temp_path.display(), e))
        };

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(write_err)?;
        file.write_all(value.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        drop(file);

        fs::rename(&temp_path, &final_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            Error::StorageWriteError(format!(
                "Failed to rename '{}' to '{}': {}",
                temp_path.display(),
                final_path.display(),
                e
            ))
        })?;

        // Make the rename durable where the platform allows it
        if let Ok(dir) = File::open(&self.directory) {
            let _ = dir.sync_all();
        }

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let path = self.value_path(key)?;
        let _guard = self.write_lock.lock();

        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::StorageWriteError(format!(
                "Failed to delete '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.directory)?;

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.starts_with('.') {
                    keys.push(stem.to_string());
                }
            }
        }

        Ok(keys)
    }
}

/// Keys become file names, so only a conservative character set is allowed
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');

    if valid {
        Ok(())
    } else {
        Err(Error::StorageWriteError(format!("Invalid storage key: {:?}", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        {
            let storage = FileStorage::open(dir.path()).unwrap();
            storage.set("arta_wallets", "[]").unwrap();
            storage.set("icp_auth_state", "authenticated").unwrap();
        }

        let storage = FileStorage::open(dir.path()).unwrap();
        assert_eq!(storage.get("arta_wallets").unwrap().as_deref(), Some("[]"));
        assert_eq!(
            storage.get("icp_auth_state").unwrap().as_deref(),
            Some("authenticated")
        );

        let mut keys = storage.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["arta_wallets", "icp_auth_state"]);
    }

    #[test]
    fn test_overwrite_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        storage.set("k", "one").unwrap();
        storage.set("k", "two").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("two"));

        assert!(storage.delete("k").unwrap());
        assert!(!storage.delete("k").unwrap());
        assert!(storage.get("k").unwrap().is_none());
    }

    #[test]
    fn test_no_temp_files_left() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        storage.set("k", "v").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["k.json"]);
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        assert!(storage.set("../escape", "x").is_err());
        assert!(storage.get("a/b").is_err());
        assert!(storage.set("", "x").is_err());
    }
}
