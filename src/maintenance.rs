//! Cache maintenance
//!
//! Drops every cached response and warms the entries that every page needs.

use crate::cache::{CacheError, ResponseCache};
use crate::catalog::{CachedCatalog, CatalogProvider};
use tracing::{info, warn};

/// Outcome of a cache rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildReport {
    /// Number of genres cached again after the flush
    pub genres_cached: usize,
}

/// Flushes the whole cache store, then eagerly refetches the genre list
///
/// An unavailable catalog does not fail the rebuild; the genre list is
/// simply left cold and `genres_cached` is zero.
pub fn rebuild_cache<P>(
    cache: &ResponseCache,
    catalog: &CachedCatalog<P>,
) -> Result<RebuildReport, CacheError>
where
    P: CatalogProvider,
{
    cache.flush()?;
    info!("response cache flushed");

    let genres_cached = catalog.genres().len();
    if genres_cached == 0 {
        warn!("genre list could not be rebuilt");
    } else {
        info!(genres_cached, "genre list rebuilt");
    }

    Ok(RebuildReport { genres_cached })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ManualClock, MemoryStore, key};
    use crate::catalog::{CatalogQuery, FetchError};
    use crate::config::CachePolicy;
    use serde_json::{Value, json};
    use std::cell::Cell;
    use std::sync::Arc;
    use std::time::Duration;

    struct GenreProvider {
        calls: Cell<usize>,
    }

    impl CatalogProvider for GenreProvider {
        fn fetch(&self, query: &CatalogQuery) -> Result<Value, FetchError> {
            self.calls.set(self.calls.get() + 1);
            match query {
                CatalogQuery::GenreList => Ok(json!({"genres": [
                    {"id": 28, "name": "Ação"},
                    {"id": 35, "name": "Comédia"},
                    {"id": 18, "name": "Drama"}
                ]})),
                _ => Err(FetchError::UpstreamUnavailable("unexpected".to_string())),
            }
        }
    }

    #[test]
    fn test_rebuild_flushes_and_warms_genres() {
        let store = Arc::new(MemoryStore::new());
        let cache = ResponseCache::with_clock(store.clone(), Arc::new(ManualClock::new()));
        let catalog = CachedCatalog::new(
            GenreProvider { calls: Cell::new(0) },
            cache.clone(),
            CachePolicy::default(),
        );

        cache.set_with_ttl(&key::details(603), &json!({"id": 603}), Duration::from_secs(60));
        cache.set_with_ttl(key::GENRE_LIST, &json!({"genres": []}), Duration::from_secs(60));

        let report = rebuild_cache(&cache, &catalog).unwrap();

        assert_eq!(report.genres_cached, 3);
        assert_eq!(catalog.provider().calls.get(), 1);
        // Only the freshly fetched genre list remains
        assert_eq!(store.len(), 1);

        // Warm: no further upstream call
        assert_eq!(catalog.genres().len(), 3);
        assert_eq!(catalog.provider().calls.get(), 1);
    }
}
