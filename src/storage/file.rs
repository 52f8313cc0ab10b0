//! File-backed storage
//!
//! Each key maps to `<data_dir>/<encoded key>.json`, where the key is
//! percent-encoded (uppercase letters included) so distinct keys never share
//! a file, even on case-insensitive filesystems. Writes go to a temporary
//! file first and are renamed into place, so a crash never leaves a
//! half-written value behind.

use crate::storage::backend::StorageBackend;
use crate::storage::error::{StorageError, StorageResult};
use std::path::{Path, PathBuf};

/// Directory of one-file-per-key values
#[derive(Debug, Clone)]
pub struct FileStorage {
    data_dir: PathBuf,
    quota: Option<usize>,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory
    pub fn open(data_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir,
            quota: None,
        })
    }

    /// Builder method: cap the total size of stored values
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the file holding `key`
    ///
    /// The file stem percent-decodes back to `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let encoded = urlencoding::encode(key);
        let mut name = String::with_capacity(encoded.len());
        let mut chars = encoded.chars();
        while let Some(c) = chars.next() {
            match c {
                '%' => {
                    name.push('%');
                    name.extend(chars.by_ref().take(2));
                }
                c if c.is_ascii_uppercase() => name.push_str(&format!("%{:02X}", c as u8)),
                c => name.push(c),
            }
        }
        self.data_dir.join(format!("{}.json", name))
    }

    /// Bytes used by every stored value except `exclude`
    fn used_bytes_except(&self, exclude: &Path) -> StorageResult<usize> {
        let mut total = 0usize;
        for entry in std::fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if path == exclude || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            total += std::fs::metadata(&path)?.len() as usize;
        }
        Ok(total)
    }
}

impl StorageBackend for FileStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key);

        if let Some(limit) = self.quota {
            let needed = self.used_bytes_except(&path)? + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        tracing::debug!("Wrote {} bytes to {:?}", value.len(), path);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
