//! File-backed cache store
//!
//! Entries are stored as JSON files in the system's standard cache
//! directory, one file per key, so cached responses survive between runs.

use super::{CacheEntry, CacheError, CacheStore};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A cache store persisting each entry as a JSON file
///
/// File names are the BLAKE3 hash of the key; the key itself is kept inside
/// the file. This keeps arbitrary keys (colons, user input) off the file
/// system namespace.
#[derive(Debug)]
pub struct FileStore {
    /// The directory where cached entries are stored
    cache_dir: PathBuf,
}

impl FileStore {
    /// Opens or creates a cache store with the given name
    ///
    /// The store lives in the system's standard cache directory under a
    /// subdirectory named after the application and the provided name.
    /// The name will be sanitized (lowercased, non-alphanumeric characters
    /// replaced with underscores).
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the store, used as the directory name
    ///
    /// # Returns
    ///
    /// A store ready for use, or an error if the cache directory cannot be
    /// determined or created
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let store = FileStore::open("responses")?;
    /// ```
    pub fn open(name: &str) -> Result<Self, CacheError> {
        let proj_dirs = directories::ProjectDirs::from("dev", "reelcache", "reelcache")
            .ok_or(CacheError::CacheDirectoryNotFound)?;

        Self::at(proj_dirs.cache_dir().join(sanitize_name(name)))
    }

    /// Opens or creates a cache store rooted at an explicit directory
    ///
    /// # Arguments
    ///
    /// * `cache_dir` - Directory holding the entry files; created if missing
    ///
    /// # Returns
    ///
    /// A store ready for use, or `DirectoryCreationFailed`
    pub fn at(cache_dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let cache_dir = cache_dir.into();

        fs::create_dir_all(&cache_dir).map_err(|e| CacheError::DirectoryCreationFailed {
            path: cache_dir.clone(),
            source: e,
        })?;

        Ok(Self { cache_dir })
    }

    /// Returns the path to the cache directory
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Counts the stored entries and their combined size in bytes
    pub fn usage(&self) -> Result<(usize, u64), CacheError> {
        let mut count = 0;
        let mut bytes = 0;

        for path in self.files_with_extension(&["json"])? {
            if let Ok(metadata) = fs::metadata(&path) {
                count += 1;
                bytes += metadata.len();
            }
        }

        Ok((count, bytes))
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}.json", blake3::hash(key.as_bytes()).to_hex()))
    }

    fn files_with_extension(&self, extensions: &[&str]) -> Result<Vec<PathBuf>, CacheError> {
        let entries = fs::read_dir(&self.cache_dir).map_err(|e| CacheError::ReadFailed {
            path: self.cache_dir.clone(),
            source: e,
        })?;

        Ok(entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| extensions.iter().any(|wanted| ext == *wanted))
            })
            .collect())
    }
}

impl CacheStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let file_path = self.entry_path(key);

        let content = match fs::read_to_string(&file_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CacheError::ReadFailed {
                    path: file_path,
                    source: e,
                });
            }
        };

        let entry: CacheEntry =
            serde_json::from_str(&content).map_err(|e| CacheError::DeserializationFailed {
                path: file_path,
                source: e,
            })?;

        // Hash collisions are not expected, but never serve another key's data
        if entry.key != key {
            return Ok(None);
        }

        Ok(Some(entry))
    }

    fn set(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let file_path = self.entry_path(&entry.key);
        let content = serde_json::to_string(&entry)?;

        // Write to a temporary name first so readers never see half a file
        let temp_path = file_path.with_extension("tmp");
        fs::write(&temp_path, content).map_err(|e| CacheError::WriteFailed {
            path: temp_path.clone(),
            source: e,
        })?;
        fs::rename(&temp_path, &file_path).map_err(|e| CacheError::WriteFailed {
            path: file_path,
            source: e,
        })?;

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let file_path = self.entry_path(key);

        match fs::remove_file(&file_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::DeleteFailed {
                path: file_path,
                source: e,
            }),
        }
    }

    fn flush(&self) -> Result<(), CacheError> {
        // Leftover temp files from interrupted writes go too
        for path in self.files_with_extension(&["json", "tmp"])? {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(CacheError::DeleteFailed { path, source: e }),
            }
        }

        Ok(())
    }
}

/// Sanitizes a name for use in file paths
///
/// Converts to lowercase and replaces all characters that are not
/// a-z, 0-9, or hyphen with underscores.
fn sanitize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
