use clap::{Args, Parser, Subcommand};
use reelcache::config::{DEFAULT_BASE_URL, DEFAULT_LANGUAGE};
use reelcache::favorites::Favorite;
use reelcache::maintenance::rebuild_cache;
use reelcache::{
    CachePolicy, CatalogConfig, CompletenessStats, DiscoverFilters, FilterCriteria,
    ReelCacheError, ResultPage, Services, compute_stats, filter_page, open_services,
};
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Browse, filter and favorite movies from TMDB
#[derive(Debug, Parser)]
#[command(name = "reelcache", version, about)]
struct Cli {
    /// TMDB API key
    #[arg(long, env = "TMDB_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Response language sent to the catalog
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    language: String,

    /// Catalog API root
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Timeout for a single catalog request, in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

/// Local post-filters applied to a fetched page
#[derive(Debug, Args)]
struct LocalFilter {
    /// Only show movies without a poster
    #[arg(long)]
    only_without_image: bool,

    /// Only show movies without a synopsis
    #[arg(long)]
    only_without_overview: bool,
}

impl LocalFilter {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            exclude_has_image: self.only_without_image,
            exclude_has_overview: self.only_without_overview,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search movies by title
    Search {
        query: String,
        #[arg(long)]
        page: Option<u32>,
        #[command(flatten)]
        filter: LocalFilter,
    },
    /// Show the details of one movie
    Details { id: u64 },
    /// List all movie genres
    Genres,
    /// Discover movies with server-side filters
    Discover {
        /// Genre id
        #[arg(long)]
        genre: Option<u32>,
        /// Primary release year
        #[arg(long)]
        year: Option<u16>,
        /// Minimum vote average
        #[arg(long)]
        min_vote: Option<f32>,
        /// Maximum vote average
        #[arg(long)]
        max_vote: Option<f32>,
        /// Sort expression, e.g. vote_average.desc
        #[arg(long)]
        sort_by: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[command(flatten)]
        filter: LocalFilter,
    },
    /// Show the currently popular movies
    Popular {
        #[arg(long)]
        page: Option<u32>,
        #[command(flatten)]
        filter: LocalFilter,
    },
    /// Completeness statistics for popular and discovered movies
    Stats,
    /// Manage a user's favorites
    Favorites {
        /// Id of the user whose favorites to use
        #[arg(long)]
        user: u64,
        #[command(subcommand)]
        action: FavoritesCommand,
    },
    /// Clear all cached responses and rebuild the genre list
    ClearCache {
        /// Do not ask for confirmation
        #[arg(long)]
        force: bool,
    },
    /// Show where responses are cached and how much space they use
    CacheInfo,
}

#[derive(Debug, Subcommand)]
enum FavoritesCommand {
    /// List favorites, newest first
    List {
        #[arg(long)]
        genre: Option<String>,
    },
    /// Add a movie by its TMDB id
    Add { tmdb_id: u64 },
    /// Remove a favorite by its id
    Remove { favorite_id: String },
    /// List the genres across all favorites
    Genres,
    /// Completeness of the favorites
    Stats,
}

/// Prints one page of results
fn print_page(page: &ResultPage, config: &CatalogConfig) {
    if page.results.is_empty() {
        println!("No movies found.");
        return;
    }

    for movie in &page.results {
        println!(
            "[{}] {} ({})",
            movie.id,
            movie.title,
            movie.release_date.as_deref().unwrap_or("unknown date")
        );
        println!("  Poster: {}", config.image_url(movie.poster_path.as_deref()));
        if let Some(vote) = movie.vote_average {
            println!("  Rating: {:.1}", vote);
        }
        match movie.overview.as_deref() {
            Some(overview) if !overview.is_empty() => println!("  {}", overview),
            _ => println!("  Synopsis not available."),
        }
    }

    println!(
        "\nPage {}/{} ({} results in total)",
        page.page, page.total_pages, page.total_results
    );
}

fn print_filtered(page: Option<ResultPage>, filter: &LocalFilter, config: &CatalogConfig) {
    match page {
        Some(page) => print_page(&filter_page(page, &filter.criteria()), config),
        None => println!("No movies found."),
    }
}

fn print_stats(heading: &str, stats: &CompletenessStats) {
    println!("=== {} ===", heading);
    println!("  Total:               {}", stats.total);
    println!(
        "  Without image:       {} ({}%)",
        stats.without_image, stats.percentage_without_image
    );
    println!(
        "  Without description: {} ({}%)",
        stats.without_description, stats.percentage_without_description
    );
    println!(
        "  Without both:        {} ({}%)",
        stats.without_both, stats.percentage_without_both
    );
}

fn print_favorite(favorite: &Favorite) {
    println!("{}  [{}] {}", favorite.id, favorite.tmdb_id, favorite.title);
    if !favorite.genres.is_empty() {
        println!("  Genres: {}", favorite.genres.join(", "));
    }
}

fn run_favorites(
    services: &Services,
    user: u64,
    action: FavoritesCommand,
) -> Result<(), ReelCacheError> {
    let favorites = &services.favorites;

    match action {
        FavoritesCommand::List { genre } => {
            let listed = favorites.list(user, genre.as_deref())?;
            if listed.is_empty() {
                println!("No favorites yet.");
            }
            for favorite in &listed {
                print_favorite(favorite);
            }
        }
        FavoritesCommand::Add { tmdb_id } => {
            let favorite = favorites.add_movie(user, tmdb_id, &services.catalog)?;
            println!("Added '{}' to favorites ({}).", favorite.title, favorite.id);
        }
        FavoritesCommand::Remove { favorite_id } => {
            favorites.remove(user, &favorite_id)?;
            println!("Removed favorite {}.", favorite_id);
        }
        FavoritesCommand::Genres => {
            for genre in favorites.genres(user)? {
                println!("{}", genre);
            }
        }
        FavoritesCommand::Stats => {
            let stats = favorites.stats(user)?;
            println!("Total favorites:  {}", stats.total);
            println!(
                "With image:       {} ({}%)",
                stats.with_image, stats.percentage_with_image
            );
            println!(
                "With description: {} ({}%)",
                stats.with_description, stats.percentage_with_description
            );
        }
    }

    Ok(())
}

fn run(cli: Cli) -> Result<(), ReelCacheError> {
    let mut config = CatalogConfig::new(cli.api_key)?;
    config.language = cli.language;
    config.base_url = cli.base_url;
    config.timeout = Duration::from_secs(cli.timeout_secs);

    let services = open_services(&config, CachePolicy::default())?;
    let catalog = &services.catalog;

    match cli.command {
        Command::Search {
            query,
            page,
            filter,
        } => print_filtered(catalog.search(&query, page), &filter, &config),
        Command::Details { id } => match catalog.details(id) {
            Some(details) => {
                println!("[{}] {}", details.id, details.title);
                println!("  Poster: {}", config.image_url(details.poster_path.as_deref()));
                if let Some(date) = &details.release_date {
                    println!("  Released: {}", date);
                }
                if let Some(runtime) = details.runtime {
                    println!("  Runtime: {} min", runtime);
                }
                let genres: Vec<&str> = details.genres.iter().map(|g| g.name.as_str()).collect();
                println!("  Genres: {}", genres.join(", "));
                println!(
                    "  {}",
                    details.overview.as_deref().unwrap_or("Synopsis not available.")
                );
            }
            None => println!("Movie {} could not be retrieved.", id),
        },
        Command::Genres => {
            for genre in catalog.genres() {
                println!("{:>6}  {}", genre.id, genre.name);
            }
        }
        Command::Discover {
            genre,
            year,
            min_vote,
            max_vote,
            sort_by,
            page,
            filter,
        } => {
            let filters = DiscoverFilters {
                genre,
                year,
                vote_average_gte: min_vote,
                vote_average_lte: max_vote,
                sort_by,
            };
            print_filtered(catalog.discover(&filters, page), &filter, &config);
        }
        Command::Popular { page, filter } => {
            print_filtered(catalog.popular(page), &filter, &config)
        }
        Command::Stats => {
            let popular = catalog.popular(None).map(|p| p.results).unwrap_or_default();
            let discovered = catalog
                .discover(&DiscoverFilters::default(), None)
                .map(|p| p.results)
                .unwrap_or_default();

            print_stats("Popular movies", &compute_stats(&popular));
            println!();
            print_stats("Discovered movies", &compute_stats(&discovered));
        }
        Command::Favorites { user, action } => run_favorites(&services, user, action)?,
        Command::ClearCache { force } => {
            let confirmed = force
                || dialoguer::Confirm::new()
                    .with_prompt("This will clear all cached responses. Continue?")
                    .default(false)
                    .interact()
                    .unwrap_or(false);

            if !confirmed {
                println!("Operation cancelled.");
                return Ok(());
            }

            let report = rebuild_cache(&services.cache, catalog)?;
            println!("✓ Response cache cleared");
            println!("✓ Genre list rebuilt ({} genres)", report.genres_cached);
        }
        Command::CacheInfo => {
            let (entries, bytes) = services.store.usage()?;
            println!("Cache directory: {}", services.store.cache_dir().display());
            println!(
                "Entries: {} ({})",
                entries,
                humansize::format_size(bytes, humansize::DECIMAL)
            );
        }
    }

    Ok(())
}

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reelcache=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
