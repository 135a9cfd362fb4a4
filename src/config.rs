//! Configuration for the catalog client and the cache policy

use std::time::Duration;
use thiserror::Error;

/// Default TMDB v3 API root
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Default root for poster images
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Image shown for movies without a poster
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/500x750?text=Sem+Imagem";

/// Locale every upstream request is pinned to
pub const DEFAULT_LANGUAGE: &str = "pt-BR";

/// Environment variable holding the TMDB API key
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

/// Errors that can occur while assembling configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No API key was provided
    #[error("No TMDB API key configured (set TMDB_API_KEY)")]
    MissingApiKey,
}

/// Settings for talking to the upstream catalog
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    /// API key sent with every request
    pub api_key: String,
    /// API root, without a trailing slash
    pub base_url: String,
    /// Root that poster paths are appended to
    pub image_base_url: String,
    /// Response language sent with every request
    pub language: String,
    /// Transport timeout for a single upstream call
    pub timeout: Duration,
}

impl CatalogConfig {
    /// Creates a configuration with default endpoints for the given key
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: Duration::from_secs(10),
        })
    }

    /// Reads the API key from `TMDB_API_KEY`
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| ConfigError::MissingApiKey)?;
        Self::new(api_key)
    }

    /// Returns the full URL for a poster path, or a placeholder when absent
    pub fn image_url(&self, poster_path: Option<&str>) -> String {
        match poster_path {
            Some(path) if !path.is_empty() => format!("{}{}", self.image_base_url, path),
            _ => PLACEHOLDER_IMAGE_URL.to_string(),
        }
    }
}

/// How long each kind of cached response stays valid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Search, details and discover responses
    pub general: Duration,
    /// The upstream genre list
    pub genre_list: Duration,
    /// A user's favorites listing
    pub favorites_list: Duration,
    /// The distinct genres across a user's favorites
    pub favorites_genres: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            general: Duration::from_secs(60 * 60),
            genre_list: Duration::from_secs(24 * 60 * 60),
            favorites_list: Duration::from_secs(5 * 60),
            favorites_genres: Duration::from_secs(60 * 60),
        }
    }
}
