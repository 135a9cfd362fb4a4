//! Per-user favorites
//!
//! This module defines the favorites record, the storage contract the
//! persistent store must fulfil, and a caching wrapper that keeps the
//! read paths behind the response cache and invalidates them on writes.

mod cached;
mod file_store;

pub use cached::CachedFavorites;
pub use file_store::FileFavoritesStore;

use crate::catalog::MovieDetails;
use crate::filter::percentage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or changing favorites
#[derive(Debug, Error)]
pub enum FavoritesError {
    /// Failed to determine data directory location
    #[error("Failed to determine data directory location")]
    DataDirectoryNotFound,

    /// Failed to read the favorites file
    #[error("Failed to read favorites file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the favorites file
    #[error("Failed to write favorites file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The favorites file could not be parsed
    #[error("Failed to parse favorites file {path}: {source}")]
    Corrupted {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A writer panicked while holding the store
    #[error("Favorites store is unusable after a failed write")]
    LockPoisoned,

    /// The movie is already in the user's favorites
    #[error("Movie {tmdb_id} is already in the favorites of user {user_id}")]
    AlreadyFavorite { user_id: u64, tmdb_id: u64 },

    /// No favorite with that id belongs to the user
    #[error("Favorite {favorite_id} not found for user {user_id}")]
    NotFound { user_id: u64, favorite_id: String },

    /// The catalog could not provide the movie's details
    #[error("Could not retrieve details for movie {0}")]
    MovieUnavailable(u64),
}

/// A movie saved by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    /// Unique, sortable identifier (ULID)
    pub id: String,
    pub user_id: u64,
    /// Catalog id of the movie
    pub tmdb_id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    /// Genre names at the time the favorite was added
    #[serde(default)]
    pub genres: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    /// Whether the favorite is tagged with `genre`
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

/// The data needed to create a favorite
#[derive(Debug, Clone, PartialEq)]
pub struct NewFavorite {
    pub tmdb_id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub genres: Vec<String>,
}

impl From<&MovieDetails> for NewFavorite {
    fn from(details: &MovieDetails) -> Self {
        Self {
            tmdb_id: details.id,
            title: details.title.clone(),
            poster_path: details.poster_path.clone(),
            overview: details.overview.clone(),
            release_date: details.release_date.clone(),
            genres: details.genres.iter().map(|g| g.name.clone()).collect(),
        }
    }
}

/// Persistent storage for favorites
///
/// Implementations must keep `(user_id, tmdb_id)` unique.
pub trait FavoritesStore {
    /// Lists a user's favorites, newest first, optionally narrowed to a genre
    fn list(&self, user_id: u64, genre: Option<&str>) -> Result<Vec<Favorite>, FavoritesError>;

    /// Whether the user already saved the movie
    fn is_favorite(&self, user_id: u64, tmdb_id: u64) -> Result<bool, FavoritesError>;

    /// Saves a new favorite
    ///
    /// # Errors
    ///
    /// Returns `FavoritesError::AlreadyFavorite` if the movie is already saved.
    fn insert(&self, user_id: u64, favorite: NewFavorite) -> Result<Favorite, FavoritesError>;

    /// Deletes a favorite, returning whether it existed for that user
    fn remove(&self, user_id: u64, favorite_id: &str) -> Result<bool, FavoritesError>;
}

/// How complete a user's favorites are
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FavoritesStats {
    pub total: usize,
    pub with_image: usize,
    pub with_description: usize,
    pub percentage_with_image: f64,
    pub percentage_with_description: f64,
}

impl FavoritesStats {
    /// Summarizes a list of favorites
    pub fn from_favorites(favorites: &[Favorite]) -> Self {
        let total = favorites.len();
        let with_image = favorites
            .iter()
            .filter(|f| f.poster_path.as_deref().is_some_and(|p| !p.is_empty()))
            .count();
        let with_description = favorites
            .iter()
            .filter(|f| f.overview.as_deref().is_some_and(|o| !o.is_empty()))
            .count();

        Self {
            total,
            with_image,
            with_description,
            percentage_with_image: percentage(with_image, total),
            percentage_with_description: percentage(with_description, total),
        }
    }
}

/// Distinct genre names across favorites, sorted
pub fn distinct_genres(favorites: &[Favorite]) -> Vec<String> {
    let mut genres: Vec<String> = favorites
        .iter()
        .flat_map(|f| f.genres.iter().cloned())
        .collect();
    genres.sort();
    genres.dedup();
    genres
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Genre;

    fn favorite(genres: &[&str], poster: Option<&str>, overview: Option<&str>) -> Favorite {
        Favorite {
            id: ulid::Ulid::new().to_string(),
            user_id: 1,
            tmdb_id: 603,
            title: "The Matrix".to_string(),
            poster_path: poster.map(str::to_string),
            overview: overview.map(str::to_string),
            release_date: None,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_favorite_from_details() {
        let details = MovieDetails {
            id: 603,
            title: "Matrix".to_string(),
            poster_path: Some("/m.jpg".to_string()),
            overview: None,
            release_date: Some("1999-03-31".to_string()),
            vote_average: Some(8.2),
            runtime: Some(136),
            genres: vec![
                Genre { id: 28, name: "Ação".to_string() },
                Genre { id: 878, name: "Ficção científica".to_string() },
            ],
        };

        let new = NewFavorite::from(&details);
        assert_eq!(new.tmdb_id, 603);
        assert_eq!(new.genres, vec!["Ação", "Ficção científica"]);
        assert_eq!(new.release_date.as_deref(), Some("1999-03-31"));
    }

    #[test]
    fn test_distinct_genres_sorted_and_deduplicated() {
        let favorites = vec![
            favorite(&["Drama", "Ação"], None, None),
            favorite(&["Ação", "Comédia"], None, None),
            favorite(&[], None, None),
        ];
        assert_eq!(distinct_genres(&favorites), vec!["Ação", "Comédia", "Drama"]);
    }

    #[test]
    fn test_favorites_stats() {
        let favorites = vec![
            favorite(&[], Some("/a.jpg"), Some("plot")),
            favorite(&[], Some(""), Some("plot")),
            favorite(&[], None, None),
        ];
        let stats = FavoritesStats::from_favorites(&favorites);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.with_image, 1);
        assert_eq!(stats.with_description, 2);
        assert_eq!(stats.percentage_with_image, 33.3);
        assert_eq!(stats.percentage_with_description, 66.7);

        assert_eq!(FavoritesStats::from_favorites(&[]), FavoritesStats::default());
    }
}
