//! Cache key construction
//!
//! All keys are produced by pure functions so the same logical request always
//! lands on the same entry. Parameter sets are normalized (sorted by name)
//! before hashing, which makes keys independent of insertion order.

/// Constant key for the upstream genre list
pub const GENRE_LIST: &str = "genres:list";

/// Hashes a parameter set into a stable hex fingerprint
///
/// Parameters are sorted by name (then value) and every name and value is
/// fed to BLAKE3 behind its length, so no choice of separators inside a
/// value can make two different parameter sets hash alike.
///
/// # Examples
///
/// ```
/// use reelcache::cache::key::fingerprint;
///
/// let a = fingerprint(&[("year", "1999"), ("with_genres", "28")]);
/// let b = fingerprint(&[("with_genres", "28"), ("year", "1999")]);
/// assert_eq!(a, b);
/// ```
pub fn fingerprint<K, V>(params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(&str, &str)> = params
        .iter()
        .map(|(k, v)| (k.as_ref(), v.as_ref()))
        .collect();
    pairs.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for (name, value) in pairs {
        for part in [name, value] {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
    }

    hasher.finalize().to_hex().to_string()
}

/// Builds a key from an operation name and its parameters
///
/// The per-operation keys below are all built on top of this.
pub fn cache_key<K, V>(operation: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    format!("{}:{}", operation, fingerprint(params))
}

/// Key for a title search page
pub fn search(text: &str, page: u32) -> String {
    format!("{}:page:{}", cache_key("search", &[("query", text)]), page)
}

/// Key for the details of a single movie
pub fn details(id: u64) -> String {
    format!("details:{}", id)
}

/// Key for a discover page given its upstream filter parameters
pub fn discover<K, V>(page: u32, filter_params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    cache_key(&format!("discover:page:{}", page), filter_params)
}

/// Key for a user's favorites list, optionally narrowed to one genre
///
/// The unfiltered list lives under `genre:all`; a genre name is hashed, so no
/// genre (not even one called "all") can land on the unfiltered key.
pub fn favorites_list(user_id: u64, genre: Option<&str>) -> String {
    let prefix = format!("favorites:user:{}:genre", user_id);
    match genre {
        None => format!("{}:all", prefix),
        Some(genre) => cache_key(&prefix, &[("name", genre)]),
    }
}

/// Key for the distinct genres across a user's favorites
pub fn favorites_genres(user_id: u64) -> String {
    format!("favorites:user:{}:genres", user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_ignores_parameter_order() {
        let a = fingerprint(&[("sort_by", "popularity.desc"), ("year", "1999"), ("with_genres", "28")]);
        let b = fingerprint(&[("with_genres", "28"), ("sort_by", "popularity.desc"), ("year", "1999")]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_distinguishes_values() {
        assert_ne!(
            fingerprint(&[("year", "1999")]),
            fingerprint(&[("year", "2000")])
        );
        assert_ne!(
            fingerprint(&[("year", "1999")]),
            fingerprint(&[("with_genres", "1999")])
        );
    }

    #[test]
    fn test_fingerprint_separators_inside_values() {
        let smuggled = fingerprint(&[("sort_by", "vote_average.desc&with_genres=28")]);
        let genuine = fingerprint(&[("sort_by", "vote_average.desc"), ("with_genres", "28")]);
        assert_ne!(smuggled, genuine);

        assert_ne!(fingerprint(&[("a", "b=c")]), fingerprint(&[("a=b", "c")]));
    }

    #[test]
    fn test_genre_named_all_has_its_own_key() {
        assert_ne!(favorites_list(42, Some("all")), favorites_list(42, None));
        assert_ne!(favorites_list(42, Some("")), favorites_list(42, None));
    }

    #[test]
    fn test_operation_keys() {
        assert_eq!(details(603), "details:603");
        assert_eq!(favorites_list(42, None), "favorites:user:42:genre:all");
        assert!(favorites_list(42, Some("Drama")).starts_with("favorites:user:42:genre:"));
        assert_ne!(favorites_list(42, Some("Drama")), favorites_list(42, Some("Ação")));
        assert_eq!(favorites_genres(42), "favorites:user:42:genres");

        let key = search("Matrix", 2);
        assert!(key.starts_with("search:"));
        assert!(key.ends_with(":page:2"));
        assert_ne!(search("Matrix", 1), search("Matrix", 2));
        assert_ne!(search("Matrix", 1), search("Alien", 1));
    }

    #[test]
    fn test_discover_key_is_stable_across_orderings() {
        let a = discover(3, &[("with_genres", "28"), ("sort_by", "popularity.desc")]);
        let b = discover(3, &[("sort_by", "popularity.desc"), ("with_genres", "28")]);
        assert_eq!(a, b);
        assert!(a.starts_with("discover:page:3:"));

        let empty: [(&str, &str); 0] = [];
        assert_ne!(discover(1, &empty), discover(2, &empty));
    }

    #[test]
    fn test_generic_cache_key() {
        let key = cache_key("details", &[("id", "603")]);
        assert!(key.starts_with("details:"));
        assert_eq!(key, cache_key("details", &[("id", "603")]));
    }
}
