//! reelcache - Browse, filter and favorite movies from TMDB
//!
//! This library provides a cached, fail-soft client for the TMDB movie
//! catalog, local filtering and completeness statistics over result pages,
//! and per-user favorites whose cached reads are invalidated on writes.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod favorites;
pub mod filter;
pub mod maintenance;

use cache::{FileStore, ResponseCache};
use catalog::{CachedCatalog, TmdbProvider};
use favorites::{CachedFavorites, FileFavoritesStore};
use std::sync::Arc;
use thiserror::Error;

// Re-export error types
pub use cache::CacheError;
pub use catalog::FetchError;
pub use config::ConfigError;
pub use favorites::FavoritesError;

// Re-export the everyday types
pub use catalog::{CatalogQuery, DiscoverFilters, Genre, MovieDetails, MovieSummary, ResultPage};
pub use config::{CachePolicy, CatalogConfig};
pub use filter::{CompletenessStats, FilterCriteria, compute_stats, filter_page};

/// Top-level error type for reelcache operations
#[derive(Debug, Error)]
pub enum ReelCacheError {
    /// Error in configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error talking to the catalog
    #[error("Catalog error: {0}")]
    Fetch(#[from] FetchError),

    /// Error during cache operations
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Error during favorites operations
    #[error("Favorites error: {0}")]
    Favorites(#[from] FavoritesError),
}

/// The catalog and favorites services sharing one response cache
pub struct Services {
    /// Handle to the shared response cache
    pub cache: ResponseCache,
    /// Cached TMDB catalog
    pub catalog: CachedCatalog<TmdbProvider>,
    /// Cached favorites
    pub favorites: CachedFavorites<FileFavoritesStore>,
    /// Where cached responses are stored on disk
    pub store: Arc<FileStore>,
}

/// Wires up the services with file-backed storage in the standard locations
///
/// Responses are cached under the system cache directory, favorites are kept
/// under the system data directory.
///
/// # Examples
///
/// ```no_run
/// use reelcache::{CachePolicy, CatalogConfig, FilterCriteria, filter_page, open_services};
///
/// let config = CatalogConfig::from_env().unwrap();
/// let services = open_services(&config, CachePolicy::default()).unwrap();
///
/// if let Some(page) = services.catalog.search("Matrix", None) {
///     let only_posterless = FilterCriteria {
///         exclude_has_image: true,
///         exclude_has_overview: false,
///     };
///     let page = filter_page(page, &only_posterless);
///     println!("{} movies without a poster", page.results.len());
/// }
/// ```
pub fn open_services(
    config: &CatalogConfig,
    policy: CachePolicy,
) -> Result<Services, ReelCacheError> {
    let store = Arc::new(FileStore::open("responses")?);
    let cache = ResponseCache::new(store.clone());

    let catalog = CachedCatalog::new(TmdbProvider::new(config)?, cache.clone(), policy);
    let favorites = CachedFavorites::new(FileFavoritesStore::open()?, cache.clone(), policy);

    Ok(Services {
        cache,
        catalog,
        favorites,
        store,
    })
}
