//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that ties the components
//! together:
//! - Seeding and draining the frontier in FIFO order
//! - Preparing the page through the session manager
//! - Navigating and classifying each link
//! - Recording results and merging newly extracted links back into the
//!   frontier

use crate::config::{Config, EngineKind};
use crate::crawler::capture::Capturer;
use crate::crawler::extractor::LinkExtractor;
use crate::crawler::frontier::Frontier;
use crate::crawler::navigator::Navigator;
use crate::crawler::policy::RequestPolicy;
use crate::crawler::session::SessionManager;
use crate::engine::http::HttpBrowser;
use crate::engine::{Browser, NavigationOptions};
use crate::output::{build_report_sinks, CrawlVerdict, DirectorySink, Report, ReportAggregator, ReportSink};
use crate::state::LinkState;
use crate::url::normalize_url;
use crate::LinkwalkError;

/// Everything a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub verdict: CrawlVerdict,
    pub report: Report,
}

/// Main crawler coordinator structure
pub struct Coordinator<B: Browser> {
    frontier: Frontier,
    session: SessionManager<B>,
    navigator: Navigator,
    extractor: LinkExtractor,
    report: ReportAggregator,
    capturer: Option<Capturer>,
}

impl<B: Browser> Coordinator<B> {
    /// Creates a coordinator with its frontier seeded
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `browser` - Engine session, not yet launched
    /// * `sinks` - Report sinks receiving every processed link
    /// * `config_hash` - Hash of the configuration, recorded with the report
    pub fn new(
        config: &Config,
        browser: B,
        sinks: Vec<Box<dyn ReportSink + Send>>,
        config_hash: &str,
    ) -> Self {
        let crawler = &config.crawler;
        let options = NavigationOptions {
            timeout: crawler.timeout(),
            wait_until: crawler.wait_until,
        };

        let mut frontier = Frontier::new(crawler.max_links);
        let seeds: Vec<String> = crawler
            .seeds
            .iter()
            .filter_map(|seed| match normalize_url(seed) {
                Ok(url) => Some(url.to_string()),
                Err(e) => {
                    tracing::warn!("Skipping invalid seed {}: {}", seed, e);
                    None
                }
            })
            .collect();
        let seeded = frontier.seed(seeds);
        tracing::debug!("Seeded frontier with {} URL(s)", seeded);

        let screenshots = &config.screenshots;
        let capturer = screenshots.any_enabled().then(|| {
            Capturer::new(
                Box::new(DirectorySink::new(&screenshots.directory)),
                screenshots.full_page,
                crawler.timeout(),
            )
        });

        Self {
            frontier,
            session: SessionManager::new(
                browser,
                options,
                crawler.relaunch_interval,
                crawler.max_links,
            ),
            navigator: Navigator::new(options, screenshots),
            extractor: LinkExtractor::new(
                crawler.timeout(),
                crawler.max_links,
                screenshots.source_annotation,
                screenshots.highlight_style.clone(),
            ),
            report: ReportAggregator::new(config_hash, sinks),
            capturer,
        }
    }

    /// Runs the crawl until the frontier is exhausted
    ///
    /// Broken links do not make this fail; they are part of the returned
    /// verdict. Only infrastructure failures (the browser cannot be launched)
    /// abort the crawl, after the partial report has been handed to the
    /// sinks.
    pub async fn run(mut self) -> Result<CrawlOutcome, LinkwalkError> {
        let max_links = self.frontier.max_links();
        tracing::info!(
            "Starting crawl: {} seed(s), discovery cap {}",
            self.frontier.pending_len(),
            max_links
        );

        let mut processed = 0;
        while let Some(link) = self.frontier.dequeue() {
            let page = match self.session.prepare().await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!("Browser session could not be prepared: {}", e);
                    self.session.shutdown().await;
                    self.report.finish();
                    return Err(e.into());
                }
            };
            processed += 1;

            let link = self
                .navigator
                .visit(page, link, self.capturer.as_mut())
                .await;

            let state = link.state();
            let url = link.url().to_string();
            match link.failure_reason() {
                Some(reason) => {
                    tracing::info!("[{}/{}] {} {}: {}", processed, max_links, state, url, reason)
                }
                None => tracing::info!("[{}/{}] {} {}", processed, max_links, state, url),
            }
            self.report.add_link(link);

            if state != LinkState::Succeeded || self.frontier.is_full() {
                continue;
            }

            let candidates = self
                .extractor
                .extract(page, &url, self.frontier.seen(), self.capturer.as_mut())
                .await;
            let accepted = self.frontier.offer(candidates);
            if accepted > 0 {
                tracing::debug!("Queued {} new link(s) from {}", accepted, url);
            }
        }

        self.session.shutdown().await;

        let (verdict, report) = self.report.finish();
        tracing::info!(
            "Crawl completed: {} checked, {} broken, {} relaunch(es)",
            verdict.total_checked,
            verdict.total_broken,
            self.session.relaunches()
        );

        Ok(CrawlOutcome { verdict, report })
    }
}

/// Runs a complete crawl with the engine selected by the configuration
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `config_hash` - Hash of the configuration file
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - The crawl ran to completion (it may still have
///   found broken links, see `CrawlVerdict::into_result`)
/// * `Err(LinkwalkError)` - The crawl could not run
///
/// # Example
///
/// ```no_run
/// use linkwalk::config::load_config_with_hash;
/// use linkwalk::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("linkwalk.toml"))?;
/// let outcome = run_crawl(config, &hash).await?;
/// outcome.verdict.into_result()?;
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, config_hash: &str) -> Result<CrawlOutcome, LinkwalkError> {
    let policy = RequestPolicy::from_config(&config.domain)?;
    tracing::debug!("Using {} engine", config.engine.kind.as_str());

    match config.engine.kind {
        EngineKind::Http => {
            let browser = HttpBrowser::new(&config.engine, policy);
            crawl_with(&config, browser, config_hash).await
        }
        EngineKind::Chrome => crawl_with_chrome(&config, policy, config_hash).await,
    }
}

async fn crawl_with<B: Browser>(
    config: &Config,
    browser: B,
    config_hash: &str,
) -> Result<CrawlOutcome, LinkwalkError> {
    let sinks = build_report_sinks(&config.output, config_hash)?;
    Coordinator::new(config, browser, sinks, config_hash).run().await
}

#[cfg(feature = "chrome")]
async fn crawl_with_chrome(
    config: &Config,
    policy: RequestPolicy,
    config_hash: &str,
) -> Result<CrawlOutcome, LinkwalkError> {
    let browser = crate::engine::chrome::ChromeBrowser::new(&config.engine, policy);
    crawl_with(config, browser, config_hash).await
}

#[cfg(not(feature = "chrome"))]
async fn crawl_with_chrome(
    _config: &Config,
    _policy: RequestPolicy,
    _config_hash: &str,
) -> Result<CrawlOutcome, LinkwalkError> {
    Err(crate::ConfigError::EngineUnavailable(EngineKind::Chrome.as_str().to_string()).into())
}
