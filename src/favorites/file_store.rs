//! JSON file favorites store
//!
//! Keeps every user's favorites in a single JSON document in the system's
//! standard data directory. Intended for a single process; the whole file
//! is rewritten on each change.

use super::{Favorite, FavoritesError, FavoritesStore, NewFavorite};
use chrono::Utc;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// A favorites store persisted as one JSON file
#[derive(Debug)]
pub struct FileFavoritesStore {
    path: PathBuf,
    /// All favorites in insertion order
    favorites: Mutex<Vec<Favorite>>,
}

impl FileFavoritesStore {
    /// Opens the store in the application's data directory
    pub fn open() -> Result<Self, FavoritesError> {
        let proj_dirs = directories::ProjectDirs::from("dev", "reelcache", "reelcache")
            .ok_or(FavoritesError::DataDirectoryNotFound)?;

        Self::at(proj_dirs.data_dir().join("favorites.json"))
    }

    /// Opens the store backed by an explicit file, creating it lazily
    pub fn at(path: impl Into<PathBuf>) -> Result<Self, FavoritesError> {
        let path = path.into();

        let favorites = match fs::read_to_string(&path) {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| FavoritesError::Corrupted {
                    path: path.clone(),
                    source: e,
                })?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(FavoritesError::ReadFailed {
                    path: path.clone(),
                    source: e,
                });
            }
        };

        Ok(Self {
            path,
            favorites: Mutex::new(favorites),
        })
    }

    /// Returns the path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Favorite>>, FavoritesError> {
        self.favorites
            .lock()
            .map_err(|_| FavoritesError::LockPoisoned)
    }

    fn persist(&self, favorites: &[Favorite]) -> Result<(), FavoritesError> {
        let write_failed = |e: std::io::Error| FavoritesError::WriteFailed {
            path: self.path.clone(),
            source: e,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }

        let content = serde_json::to_string_pretty(favorites).map_err(|e| {
            FavoritesError::WriteFailed {
                path: self.path.clone(),
                source: std::io::Error::new(ErrorKind::InvalidData, e),
            }
        })?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, content).map_err(write_failed)?;
        fs::rename(&temp_path, &self.path).map_err(write_failed)?;

        Ok(())
    }
}

impl FavoritesStore for FileFavoritesStore {
    fn list(&self, user_id: u64, genre: Option<&str>) -> Result<Vec<Favorite>, FavoritesError> {
        let favorites = self.lock()?;

        // Newest first; among equal timestamps the later insertion wins
        let mut listed: Vec<Favorite> = favorites
            .iter()
            .rev()
            .filter(|f| f.user_id == user_id)
            .filter(|f| genre.is_none_or(|g| f.has_genre(g)))
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(listed)
    }

    fn is_favorite(&self, user_id: u64, tmdb_id: u64) -> Result<bool, FavoritesError> {
        Ok(self
            .lock()?
            .iter()
            .any(|f| f.user_id == user_id && f.tmdb_id == tmdb_id))
    }

    fn insert(&self, user_id: u64, favorite: NewFavorite) -> Result<Favorite, FavoritesError> {
        let mut favorites = self.lock()?;

        if favorites
            .iter()
            .any(|f| f.user_id == user_id && f.tmdb_id == favorite.tmdb_id)
        {
            return Err(FavoritesError::AlreadyFavorite {
                user_id,
                tmdb_id: favorite.tmdb_id,
            });
        }

        let created = Favorite {
            id: ulid::Ulid::new().to_string(),
            user_id,
            tmdb_id: favorite.tmdb_id,
            title: favorite.title,
            poster_path: favorite.poster_path,
            overview: favorite.overview,
            release_date: favorite.release_date,
            genres: favorite.genres,
            created_at: Utc::now(),
        };

        favorites.push(created.clone());
        if let Err(e) = self.persist(&favorites) {
            favorites.pop();
            return Err(e);
        }

        debug!(user_id, tmdb_id = created.tmdb_id, "favorite stored");
        Ok(created)
    }

    fn remove(&self, user_id: u64, favorite_id: &str) -> Result<bool, FavoritesError> {
        let mut favorites = self.lock()?;

        let Some(index) = favorites
            .iter()
            .position(|f| f.user_id == user_id && f.id == favorite_id)
        else {
            return Ok(false);
        };

        let removed = favorites.remove(index);
        if let Err(e) = self.persist(&favorites) {
            favorites.insert(index, removed);
            return Err(e);
        }

        debug!(user_id, favorite_id, "favorite removed");
        Ok(true)
    }
}
