/// TMDB catalog provider implementation.
use super::{CatalogProvider, CatalogQuery, FetchError};
use crate::config::CatalogConfig;
use tracing::{debug, warn};

/// Catalog provider for The Movie Database (TMDB) v3 API.
///
/// Every request carries the API key and the configured response language.
/// The provider performs no caching of its own; see `CachedCatalog`.
pub struct TmdbProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl TmdbProvider {
    /// Creates a new TMDB provider from the given configuration.
    pub fn new(config: &CatalogConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::UpstreamUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        })
    }

    /// Builds the endpoint URL and query parameters for a query.
    ///
    /// The API key and language come first, followed by the
    /// operation-specific parameters.
    fn request_for(&self, query: &CatalogQuery) -> (String, Vec<(&'static str, String)>) {
        let mut params = vec![
            ("api_key", self.api_key.clone()),
            ("language", self.language.clone()),
        ];

        let path = match query {
            CatalogQuery::SearchByTitle { text, .. } => {
                params.push(("query", text.clone()));
                "/search/movie".to_string()
            }
            CatalogQuery::DetailsById { id } => format!("/movie/{}", id),
            CatalogQuery::GenreList => "/genre/movie/list".to_string(),
            CatalogQuery::Discover { filters, .. } => {
                params.extend(filters.to_params());
                "/discover/movie".to_string()
            }
            CatalogQuery::PopularList { .. } => "/movie/popular".to_string(),
        };

        if let Some(page) = query.page() {
            params.push(("page", page.to_string()));
        }

        (format!("{}{}", self.base_url, path), params)
    }
}

impl CatalogProvider for TmdbProvider {
    fn fetch(&self, query: &CatalogQuery) -> Result<serde_json::Value, FetchError> {
        let operation = query.operation();
        let (url, params) = self.request_for(query);

        debug!(operation, url = %url, "requesting catalog");

        // Make the HTTP request with query parameters
        let response = self.client.get(&url).query(&params).send().map_err(|e| {
            // Strip the URL so the API key never ends up in logs
            let e = e.without_url();
            warn!(operation, error = %e, "catalog request failed");
            FetchError::UpstreamUnavailable(e.to_string())
        })?;

        // Ensure request was successful
        let status = response.status();
        if !status.is_success() {
            warn!(operation, status = status.as_u16(), "catalog returned non-success status");
            return Err(FetchError::UpstreamUnavailable(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        // Parse the JSON response
        response.json().map_err(|e| {
            let e = e.without_url();
            warn!(operation, error = %e, "catalog response was not valid JSON");
            FetchError::MalformedResponse(e.to_string())
        })
    }
}
