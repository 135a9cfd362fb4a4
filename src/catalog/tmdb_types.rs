/// TMDB API response envelopes for deserialization.
///
/// Most TMDB payloads map directly onto our public types; only envelopes
/// that wrap them live here.
use super::Genre;
use serde::Deserialize;

/// The response of the `/genre/movie/list` endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbGenreList {
    /// All known movie genres
    #[serde(default)]
    pub genres: Vec<Genre>,
}
