//! Cached catalog implementation
//!
//! This module provides a caching wrapper for catalog providers that stores
//! upstream responses in the response cache and degrades upstream failures
//! to empty results.

use super::tmdb_types::TmdbGenreList;
use super::{
    CatalogProvider, CatalogQuery, DiscoverFilters, FetchError, Genre, MovieDetails, ResultPage,
    resolve_page,
};
use crate::cache::{ResponseCache, key};
use crate::config::CachePolicy;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::warn;

/// A caching wrapper for catalog providers
///
/// Search, details, discover and the genre list are served from the
/// response cache while live. The popular list is always fetched fresh.
///
/// The typed accessors (`search`, `details`, ...) are fail-soft: any
/// upstream failure is logged and surfaces as `None` or an empty list.
pub struct CachedCatalog<P>
where
    P: CatalogProvider,
{
    /// The underlying catalog provider
    provider: P,
    /// Shared response cache
    cache: ResponseCache,
    /// TTLs per kind of response
    policy: CachePolicy,
}

impl<P> CachedCatalog<P>
where
    P: CatalogProvider,
{
    /// Creates a new cached catalog wrapping the given provider
    ///
    /// # Arguments
    ///
    /// * `provider` - The upstream catalog to fetch from on a miss
    /// * `cache` - Response cache shared with the other services
    /// * `policy` - TTLs for each kind of cached response
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let tmdb = TmdbProvider::new(&config)?;
    /// let cache = ResponseCache::new(Arc::new(FileStore::open("responses")?));
    /// let catalog = CachedCatalog::new(tmdb, cache, CachePolicy::default());
    /// ```
    pub fn new(provider: P, cache: ResponseCache, policy: CachePolicy) -> Self {
        Self {
            provider,
            cache,
            policy,
        }
    }

    /// Returns the wrapped provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The cache key and TTL for a query, or `None` if it is never cached
    ///
    /// The popular list is deliberately left uncached so it is always fresh.
    fn cache_slot(&self, query: &CatalogQuery) -> Option<(String, Duration)> {
        match query {
            CatalogQuery::SearchByTitle { text, page } => {
                Some((key::search(text, resolve_page(*page)), self.policy.general))
            }
            CatalogQuery::DetailsById { id } => Some((key::details(*id), self.policy.general)),
            CatalogQuery::GenreList => Some((key::GENRE_LIST.to_string(), self.policy.genre_list)),
            CatalogQuery::Discover { filters, page } => Some((
                key::discover(resolve_page(*page), &filters.to_params()),
                self.policy.general,
            )),
            CatalogQuery::PopularList { .. } => None,
        }
    }

    /// Fetches a query, mapping any failure to `None`
    pub fn fetch_or_none(&self, query: &CatalogQuery) -> Option<serde_json::Value> {
        match self.fetch(query) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(
                    operation = query.operation(),
                    error = %e,
                    "catalog unavailable, returning empty result"
                );
                None
            }
        }
    }

    /// Searches movies by title
    pub fn search(&self, text: &str, page: Option<u32>) -> Option<ResultPage> {
        self.fetch_typed(&CatalogQuery::SearchByTitle {
            text: text.to_string(),
            page,
        })
    }

    /// Fetches the details of one movie
    pub fn details(&self, id: u64) -> Option<MovieDetails> {
        self.fetch_typed(&CatalogQuery::DetailsById { id })
    }

    /// Lists all movie genres, or nothing if the catalog is unavailable
    pub fn genres(&self) -> Vec<Genre> {
        self.fetch_typed::<TmdbGenreList>(&CatalogQuery::GenreList)
            .map(|list| list.genres)
            .unwrap_or_default()
    }

    /// Discovers movies matching server-side filters
    pub fn discover(&self, filters: &DiscoverFilters, page: Option<u32>) -> Option<ResultPage> {
        self.fetch_typed(&CatalogQuery::Discover {
            filters: filters.clone(),
            page,
        })
    }

    /// Fetches the current popularity ranking
    pub fn popular(&self, page: Option<u32>) -> Option<ResultPage> {
        self.fetch_typed(&CatalogQuery::PopularList { page })
    }

    fn fetch_typed<T>(&self, query: &CatalogQuery) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let value = self.fetch_or_none(query)?;

        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                warn!(
                    operation = query.operation(),
                    error = %e,
                    "catalog payload has unexpected shape"
                );
                None
            }
        }
    }
}

impl<P> CatalogProvider for CachedCatalog<P>
where
    P: CatalogProvider,
{
    fn fetch(&self, query: &CatalogQuery) -> Result<serde_json::Value, FetchError> {
        match self.cache_slot(query) {
            Some((key, ttl)) => self
                .cache
                .get_or_try_compute(&key, ttl, || self.provider.fetch(query)),
            None => self.provider.fetch(query),
        }
    }
}
