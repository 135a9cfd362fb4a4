//! Data structures and traits for movie catalog retrieval.
//!
//! This module provides the query vocabulary understood by the upstream
//! catalog, the typed views of its responses (result pages, movie details,
//! genres), and the provider trait implemented by the HTTP client and its
//! caching wrapper.
mod cached;
mod tmdb;
mod tmdb_types;

pub use cached::CachedCatalog;
pub use tmdb::TmdbProvider;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sort order used by discover unless the caller overrides it
pub const DEFAULT_SORT: &str = "popularity.desc";

/// Errors that can occur while talking to the upstream catalog.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The catalog answered with a non-success status or could not be reached
    #[error("Upstream catalog unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The catalog answered, but not with the JSON we expected
    #[error("Malformed catalog response: {0}")]
    MalformedResponse(String),
}

/// Resolves an optional page number, defaulting missing or zero pages to 1
pub fn resolve_page(page: Option<u32>) -> u32 {
    match page {
        Some(page) if page > 0 => page,
        _ => 1,
    }
}

/// Server-side filters for the discover operation.
///
/// A filter only reaches the upstream request when it is set to a
/// non-empty value; zero and blank values count as unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoverFilters {
    /// Genre id to restrict results to
    pub genre: Option<u32>,
    /// Primary release year
    pub year: Option<u16>,
    /// Minimum vote average
    pub vote_average_gte: Option<f32>,
    /// Maximum vote average
    pub vote_average_lte: Option<f32>,
    /// Upstream sort expression, e.g. `vote_average.desc`
    pub sort_by: Option<String>,
}

impl DiscoverFilters {
    /// The effective sort expression
    pub fn sort_by(&self) -> &str {
        match self.sort_by.as_deref().map(str::trim) {
            Some(sort) if !sort.is_empty() => sort,
            _ => DEFAULT_SORT,
        }
    }

    /// Upstream query parameters for these filters, sort included
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("sort_by", self.sort_by().to_string())];

        if let Some(genre) = self.genre.filter(|g| *g != 0) {
            params.push(("with_genres", genre.to_string()));
        }
        if let Some(year) = self.year.filter(|y| *y != 0) {
            params.push(("primary_release_year", year.to_string()));
        }
        if let Some(vote) = self.vote_average_gte.filter(|v| *v != 0.0) {
            params.push(("vote_average.gte", vote.to_string()));
        }
        if let Some(vote) = self.vote_average_lte.filter(|v| *v != 0.0) {
            params.push(("vote_average.lte", vote.to_string()));
        }

        params
    }
}

/// A named request against the upstream catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogQuery {
    /// Full-text title search
    SearchByTitle { text: String, page: Option<u32> },
    /// Details for one movie
    DetailsById { id: u64 },
    /// All movie genres known to the catalog
    GenreList,
    /// Filtered discovery
    Discover {
        filters: DiscoverFilters,
        page: Option<u32>,
    },
    /// The catalog's popularity ranking
    PopularList { page: Option<u32> },
}

impl CatalogQuery {
    /// Short operation name, used in logs
    pub fn operation(&self) -> &'static str {
        match self {
            CatalogQuery::SearchByTitle { .. } => "search",
            CatalogQuery::DetailsById { .. } => "details",
            CatalogQuery::GenreList => "genres",
            CatalogQuery::Discover { .. } => "discover",
            CatalogQuery::PopularList { .. } => "popular",
        }
    }

    /// The resolved page for paged operations
    pub fn page(&self) -> Option<u32> {
        match self {
            CatalogQuery::SearchByTitle { page, .. }
            | CatalogQuery::Discover { page, .. }
            | CatalogQuery::PopularList { page } => Some(resolve_page(*page)),
            CatalogQuery::DetailsById { .. } | CatalogQuery::GenreList => None,
        }
    }
}

/// Read-only projection of a movie as listed in result pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub poster_path: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub popularity: Option<f64>,
}

impl MovieSummary {
    /// Whether the movie has a non-empty poster path
    pub fn has_image(&self) -> bool {
        self.poster_path.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Whether the movie has a non-empty synopsis
    pub fn has_overview(&self) -> bool {
        self.overview.as_deref().is_some_and(|o| !o.is_empty())
    }
}

/// One page of movies as returned by search, discover and popular.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<MovieSummary>,
    #[serde(default = "first_page")]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

/// A movie genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// Full details of a single movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub poster_path: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

/// Trait for providers that can answer catalog queries.
///
/// Implementors return the raw JSON payload of the upstream response; typed
/// views are derived by the caller.
pub trait CatalogProvider {
    /// Performs the query against the catalog.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::UpstreamUnavailable` on transport failures and
    /// non-success statuses.
    fn fetch(&self, query: &CatalogQuery) -> Result<serde_json::Value, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_page() {
        assert_eq!(resolve_page(None), 1);
        assert_eq!(resolve_page(Some(0)), 1);
        assert_eq!(resolve_page(Some(4)), 4);
    }

    #[test]
    fn test_empty_filters_only_carry_default_sort() {
        let filters = DiscoverFilters {
            genre: Some(0),
            year: None,
            vote_average_gte: Some(0.0),
            vote_average_lte: None,
            sort_by: Some("  ".to_string()),
        };
        assert_eq!(filters.to_params(), vec![("sort_by", "popularity.desc".to_string())]);
    }

    #[test]
    fn test_filters_map_to_upstream_names() {
        let filters = DiscoverFilters {
            genre: Some(28),
            year: Some(1999),
            vote_average_gte: Some(7.5),
            vote_average_lte: Some(9.0),
            sort_by: Some("vote_average.desc".to_string()),
        };
        assert_eq!(
            filters.to_params(),
            vec![
                ("sort_by", "vote_average.desc".to_string()),
                ("with_genres", "28".to_string()),
                ("primary_release_year", "1999".to_string()),
                ("vote_average.gte", "7.5".to_string()),
                ("vote_average.lte", "9".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pages() {
        assert_eq!(CatalogQuery::PopularList { page: None }.page(), Some(1));
        assert_eq!(
            CatalogQuery::SearchByTitle { text: "Matrix".into(), page: Some(3) }.page(),
            Some(3)
        );
        assert_eq!(CatalogQuery::GenreList.page(), None);
        assert_eq!(CatalogQuery::DetailsById { id: 603 }.operation(), "details");
    }

    #[test]
    fn test_result_page_tolerates_missing_counters() {
        let page: ResultPage = serde_json::from_value(serde_json::json!({
            "results": [{"id": 603, "title": "Matrix", "poster_path": null}]
        }))
        .unwrap();

        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_results, 0);
        assert!(!page.results[0].has_image());
        assert!(!page.results[0].has_overview());
    }
}
