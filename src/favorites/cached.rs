//! Cached favorites reads with write-triggered invalidation

use super::{
    Favorite, FavoritesError, FavoritesStats, FavoritesStore, NewFavorite, distinct_genres,
};
use crate::cache::{ResponseCache, key};
use crate::catalog::{CachedCatalog, CatalogProvider};
use crate::config::CachePolicy;
use tracing::info;

/// A caching wrapper for a favorites store
///
/// The per-user listing and genre set are served from the response cache.
/// Adding or removing a favorite invalidates the unfiltered listing and the
/// genre set of that user. Genre-filtered listings are not invalidated and
/// may stay stale until their TTL runs out.
pub struct CachedFavorites<S>
where
    S: FavoritesStore,
{
    /// The underlying persistent store
    store: S,
    /// Shared response cache
    cache: ResponseCache,
    /// TTLs per kind of response
    policy: CachePolicy,
}

impl<S> CachedFavorites<S>
where
    S: FavoritesStore,
{
    /// Creates a new cached wrapper around the given store
    pub fn new(store: S, cache: ResponseCache, policy: CachePolicy) -> Self {
        Self {
            store,
            cache,
            policy,
        }
    }

    /// Lists a user's favorites, newest first, optionally narrowed to a genre
    ///
    /// A blank genre counts as no genre.
    pub fn list(&self, user_id: u64, genre: Option<&str>) -> Result<Vec<Favorite>, FavoritesError> {
        let genre = genre.filter(|g| !g.trim().is_empty());

        self.cache.get_or_try_compute(
            &key::favorites_list(user_id, genre),
            self.policy.favorites_list,
            || self.store.list(user_id, genre),
        )
    }

    /// Distinct, sorted genre names across all of a user's favorites
    pub fn genres(&self, user_id: u64) -> Result<Vec<String>, FavoritesError> {
        self.cache.get_or_try_compute(
            &key::favorites_genres(user_id),
            self.policy.favorites_genres,
            || {
                self.store
                    .list(user_id, None)
                    .map(|favorites| distinct_genres(&favorites))
            },
        )
    }

    /// Completeness summary of a user's favorites
    pub fn stats(&self, user_id: u64) -> Result<FavoritesStats, FavoritesError> {
        Ok(FavoritesStats::from_favorites(&self.list(user_id, None)?))
    }

    /// Adds a favorite for the user
    ///
    /// # Errors
    ///
    /// Returns `FavoritesError::AlreadyFavorite` if the movie is already saved.
    pub fn add(&self, user_id: u64, favorite: NewFavorite) -> Result<Favorite, FavoritesError> {
        if self.store.is_favorite(user_id, favorite.tmdb_id)? {
            return Err(FavoritesError::AlreadyFavorite {
                user_id,
                tmdb_id: favorite.tmdb_id,
            });
        }

        let created = self.store.insert(user_id, favorite)?;
        self.invalidate_user(user_id);

        info!(user_id, tmdb_id = created.tmdb_id, "favorite added");
        Ok(created)
    }

    /// Looks a movie up in the catalog and adds it to the user's favorites
    ///
    /// The duplicate check runs before the catalog is consulted.
    pub fn add_movie<P>(
        &self,
        user_id: u64,
        tmdb_id: u64,
        catalog: &CachedCatalog<P>,
    ) -> Result<Favorite, FavoritesError>
    where
        P: CatalogProvider,
    {
        if self.store.is_favorite(user_id, tmdb_id)? {
            return Err(FavoritesError::AlreadyFavorite { user_id, tmdb_id });
        }

        let details = catalog
            .details(tmdb_id)
            .ok_or(FavoritesError::MovieUnavailable(tmdb_id))?;

        self.add(user_id, NewFavorite::from(&details))
    }

    /// Removes one of the user's favorites
    ///
    /// # Errors
    ///
    /// Returns `FavoritesError::NotFound` if no such favorite belongs to the user.
    pub fn remove(&self, user_id: u64, favorite_id: &str) -> Result<(), FavoritesError> {
        if !self.store.remove(user_id, favorite_id)? {
            return Err(FavoritesError::NotFound {
                user_id,
                favorite_id: favorite_id.to_string(),
            });
        }

        self.invalidate_user(user_id);

        info!(user_id, favorite_id, "favorite removed");
        Ok(())
    }

    fn invalidate_user(&self, user_id: u64) {
        self.cache.invalidate(&key::favorites_list(user_id, None));
        self.cache.invalidate(&key::favorites_genres(user_id));
    }
}
