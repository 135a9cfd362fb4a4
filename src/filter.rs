//! Local filtering and completeness statistics
//!
//! Both operate on already-fetched data only. Filtering is a presentation
//! concern: it never touches the pagination counters of a page, so the
//! number of visible results may disagree with `total_results`.

use crate::catalog::{MovieSummary, ResultPage};

/// Which movies to drop from a fetched page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Drop movies that have a poster, keeping only those without one
    pub exclude_has_image: bool,
    /// Drop movies that have a synopsis, keeping only those without one
    pub exclude_has_overview: bool,
}

impl FilterCriteria {
    /// Whether a movie survives these criteria
    pub fn keeps(&self, movie: &MovieSummary) -> bool {
        !(self.exclude_has_image && movie.has_image())
            && !(self.exclude_has_overview && movie.has_overview())
    }

    /// Whether the criteria would drop anything at all
    pub fn is_active(&self) -> bool {
        self.exclude_has_image || self.exclude_has_overview
    }
}

/// Applies `criteria` to the results of a page, preserving their order
pub fn filter_page(mut page: ResultPage, criteria: &FilterCriteria) -> ResultPage {
    if criteria.is_active() {
        page.results.retain(|movie| criteria.keeps(movie));
    }
    page
}

/// How many movies in a set lack a poster, a synopsis, or both
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompletenessStats {
    pub total: usize,
    pub without_image: usize,
    pub without_description: usize,
    pub without_both: usize,
    pub percentage_without_image: f64,
    pub percentage_without_description: f64,
    pub percentage_without_both: f64,
}

/// Computes completeness statistics in a single pass
///
/// Percentages are rounded to one decimal and are all zero for an empty
/// input.
pub fn compute_stats(movies: &[MovieSummary]) -> CompletenessStats {
    let mut stats = CompletenessStats {
        total: movies.len(),
        ..Default::default()
    };

    for movie in movies {
        let has_image = movie.has_image();
        let has_overview = movie.has_overview();

        if !has_image {
            stats.without_image += 1;
        }
        if !has_overview {
            stats.without_description += 1;
        }
        if !has_image && !has_overview {
            stats.without_both += 1;
        }
    }

    stats.percentage_without_image = percentage(stats.without_image, stats.total);
    stats.percentage_without_description = percentage(stats.without_description, stats.total);
    stats.percentage_without_both = percentage(stats.without_both, stats.total);

    stats
}

/// `count / total * 100`, rounded to one decimal; zero when `total` is zero
pub(crate) fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u64, poster: Option<&str>, overview: Option<&str>) -> MovieSummary {
        MovieSummary {
            id,
            title: format!("Movie {}", id),
            poster_path: poster.map(str::to_string),
            overview: overview.map(str::to_string),
            release_date: None,
            vote_average: None,
            popularity: None,
        }
    }

    fn sample_page() -> ResultPage {
        ResultPage {
            page: 1,
            results: vec![
                movie(1, Some("/a.jpg"), Some("A plot")),
                movie(2, None, Some("B plot")),
                movie(3, Some(""), None),
                movie(4, Some("/d.jpg"), Some("")),
                movie(5, None, None),
            ],
            total_pages: 7,
            total_results: 137,
        }
    }

    fn ids(page: &ResultPage) -> Vec<u64> {
        page.results.iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_inactive_criteria_keep_everything() {
        let filtered = filter_page(sample_page(), &FilterCriteria::default());
        assert_eq!(filtered, sample_page());
    }

    #[test]
    fn test_exclude_has_image_keeps_posterless_in_order() {
        let criteria = FilterCriteria {
            exclude_has_image: true,
            exclude_has_overview: false,
        };
        let filtered = filter_page(sample_page(), &criteria);

        assert_eq!(ids(&filtered), vec![2, 3, 5]);
        // Pagination counters are left alone
        assert_eq!(filtered.total_pages, 7);
        assert_eq!(filtered.total_results, 137);
    }

    #[test]
    fn test_exclude_both() {
        let criteria = FilterCriteria {
            exclude_has_image: true,
            exclude_has_overview: true,
        };
        assert_eq!(ids(&filter_page(sample_page(), &criteria)), vec![3, 5]);

        let criteria = FilterCriteria {
            exclude_has_image: false,
            exclude_has_overview: true,
        };
        assert_eq!(ids(&filter_page(sample_page(), &criteria)), vec![3, 4, 5]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        for (image, overview) in [(false, false), (true, false), (false, true), (true, true)] {
            let criteria = FilterCriteria {
                exclude_has_image: image,
                exclude_has_overview: overview,
            };
            let once = filter_page(sample_page(), &criteria);
            let twice = filter_page(once.clone(), &criteria);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_stats_counts_and_percentages() {
        let stats = compute_stats(&sample_page().results);

        assert_eq!(stats.total, 5);
        assert_eq!(stats.without_image, 3);
        assert_eq!(stats.without_description, 3);
        assert_eq!(stats.without_both, 2);
        assert_eq!(stats.percentage_without_image, 60.0);
        assert_eq!(stats.percentage_without_both, 40.0);
    }

    #[test]
    fn test_stats_invariants() {
        let page = sample_page();
        for end in 0..=page.results.len() {
            let stats = compute_stats(&page.results[..end]);
            assert!(stats.without_both <= stats.without_image.min(stats.without_description));
            for pct in [
                stats.percentage_without_image,
                stats.percentage_without_description,
                stats.percentage_without_both,
            ] {
                assert!((0.0..=100.0).contains(&pct));
            }
        }
    }

    #[test]
    fn test_stats_on_empty_input() {
        let stats = compute_stats(&[]);
        assert_eq!(stats, CompletenessStats::default());
    }

    #[test]
    fn test_percentage_rounds_to_one_decimal() {
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(3, 3), 100.0);
        assert_eq!(percentage(5, 0), 0.0);
    }
}
