//! linkwalk main entry point
//!
//! This is the command-line interface for the linkwalk link integrity crawler.

use anyhow::{Context, Result};
use clap::Parser;
use linkwalk::config::{load_config_with_hash, Config};
use linkwalk::crawler::run_crawl;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// linkwalk: a bounded breadth-first link integrity crawler
///
/// linkwalk starts from a set of seed URLs, follows every link it finds up to
/// a discovery cap, and reports which ones are broken. The process exits with
/// a non-zero status when at least one broken link was found.
#[derive(Parser, Debug)]
#[command(name = "linkwalk")]
#[command(version)]
#[command(about = "A bounded breadth-first link integrity crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the latest run stored in the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
        Ok(())
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config, &config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkwalk=info,warn"),
            1 => EnvFilter::new("linkwalk=debug,info"),
            2 => EnvFilter::new("linkwalk=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== linkwalk Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Discovery cap: {}", config.crawler.max_links);
    println!("  Relaunch interval: {}", config.crawler.relaunch_interval);
    println!(
        "  Navigation timeout: {}ms",
        config.crawler.navigation_timeout
    );
    println!("  Wait until: {:?}", config.crawler.wait_until);

    println!("\nEngine:");
    println!("  Kind: {}", config.engine.kind.as_str());
    println!("  User agent: {}", config.engine.user_agent);

    println!("\nDomain Restriction:");
    match (&config.domain.allow, config.domain.enforce) {
        (Some(allow), true) => println!("  {} ({:?})", allow, config.domain.mode),
        _ => println!("  (none)"),
    }

    let shots = &config.screenshots;
    println!("\nScreenshots:");
    if shots.any_enabled() {
        println!("  Source annotation: {}", shots.source_annotation);
        println!("  On success: {}", shots.destination_success);
        println!("  On failure: {}", shots.destination_failure);
        println!("  Full page: {}", shots.full_page);
        println!("  Directory: {}", shots.directory);
    } else {
        println!("  (disabled)");
    }

    println!("\nOutput:");
    println!(
        "  Summary: {}",
        config.output.summary_path.as_deref().unwrap_or("(none)")
    );
    println!(
        "  Database: {}",
        config.output.database_path.as_deref().unwrap_or("(none)")
    );

    println!("\nSeeds ({}):", config.crawler.seeds.len());
    for seed in &config.crawler.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would check up to {} links starting from {} seed URLs",
        config.crawler.max_links,
        config.crawler.seeds.len()
    );
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<()> {
    use linkwalk::output::{load_statistics, print_statistics};
    use std::path::Path;

    let path = config
        .output
        .database_path
        .as_deref()
        .context("--stats requires output.database-path in the configuration")?;

    println!("Database: {}\n", path);

    let stats = load_statistics(Path::new(path))
        .with_context(|| format!("Failed to load statistics from {}", path))?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: &str) -> Result<()> {
    tracing::info!(
        "Seeds: {}, discovery cap: {}, engine: {}",
        config.crawler.seeds.len(),
        config.crawler.max_links,
        config.engine.kind.as_str()
    );

    let outcome = run_crawl(config, config_hash)
        .await
        .context("Crawl failed")?;

    let verdict = outcome.verdict;
    println!("Links checked: {}", verdict.total_checked);
    println!("Broken links: {}", verdict.total_broken);

    verdict.into_result()?;
    tracing::info!("No broken links found");
    Ok(())
}
