//! Crawl driver.
//!
//! The crawl is a queue of fetch tasks processed one at a time. Each task
//! names the request to make and the stage that handles its response:
//!
//! ```text
//! YearIndex ──► discover links ──► Detail × N
//! Detail    ──► extract fields ──► Image, or write row without image
//! Image     ──► name + save file ─► write row
//! ```
//!
//! Continuations are pushed to the front of the queue in order, so a year's
//! detail pages (and each page's image) are fetched before the next year's
//! index. Only one request is ever in flight, which is what makes the
//! unsynchronised CSV appends safe.
//!
//! Index and detail URLs are requested at most once per run, however many
//! times or under however many years they are listed. Image requests are not
//! filtered.

use crate::config::CrawlConfig;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::models::{FinalistDetails, FinalistLink, FinalistRecord, ImageAsset, YearTask};
use crate::outputs::csv::CsvStore;
use crate::outputs::images::ImageStore;
use crate::scrapers::{detail, index};
use crate::utils::{derive_image_name, truncate_for_log};
use scraper::Html;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// A pending request and the stage that consumes its response.
#[derive(Debug)]
enum Task {
    YearIndex(YearTask),
    Detail(FinalistLink),
    Image {
        details: FinalistDetails,
        image_url: Url,
    },
}

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlStats {
    pub years: usize,
    pub links: usize,
    pub rows_written: usize,
    pub images_saved: usize,
    /// Detail pages without a heading.
    pub records_skipped: usize,
    pub failed_fetches: usize,
    /// Tasks dropped because a stop was requested.
    pub abandoned: usize,
    pub elapsed: Duration,
}

/// Owns the fetcher and both stores for the duration of a run.
pub struct Crawler {
    config: CrawlConfig,
    fetcher: Fetcher,
    store: CsvStore,
    images: ImageStore,
    stop: Arc<AtomicBool>,
    /// Index and detail URLs already queued this run.
    requested: HashSet<Url>,
}

impl Crawler {
    /// Build a crawler from a validated configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Crawl settings; checked with [`CrawlConfig::validate`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] or [`Error::UrlParse`] for an unusable
    /// configuration and [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(config: CrawlConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = Fetcher::new(&config)?;
        let store = CsvStore::new(config.csv_file());
        let images = ImageStore::new(&config.project_root, &config.images_dir);
        Ok(Self {
            config,
            fetcher,
            store,
            images,
            stop: Arc::new(AtomicBool::new(false)),
            requested: HashSet::new(),
        })
    }

    /// Flag that, once set, stops the crawl before its next request.
    ///
    /// The request in flight when the flag is set still completes, including
    /// its row write.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Crawl every configured year.
    ///
    /// # Returns
    ///
    /// Counters for the run, including how many queued tasks were abandoned
    /// if a stop was requested.
    ///
    /// # Errors
    ///
    /// Only storage failures end the run early; per-page problems are logged
    /// and counted in the returned [`CrawlStats`].
    #[instrument(
        level = "info",
        skip_all,
        fields(first_year = self.config.first_year, last_year = self.config.last_year)
    )]
    pub async fn run(&mut self) -> Result<CrawlStats> {
        let started = Instant::now();
        self.requested.clear();
        self.store.initialize()?;
        info!(path = %self.store.path().display(), "CSV store ready");

        let mut stats = CrawlStats::default();
        let mut queue: VecDeque<Task> = self
            .config
            .years()
            .map(|year| Task::YearIndex(YearTask { year }))
            .collect();

        while let Some(task) = queue.pop_front() {
            if self.stop.load(Ordering::SeqCst) {
                stats.abandoned = queue.len() + 1;
                warn!(
                    abandoned = stats.abandoned,
                    "Stop requested; not issuing further requests"
                );
                break;
            }

            let outcome = match task {
                Task::YearIndex(year) => Ok(self.handle_year(year, &mut stats).await),
                Task::Detail(link) => self.handle_detail(link, &mut stats).await,
                Task::Image { details, image_url } => self
                    .handle_image(details, image_url, &mut stats)
                    .await
                    .map(|()| Vec::new()),
            };

            match outcome {
                Ok(next) => {
                    for task in next.into_iter().rev() {
                        queue.push_front(task);
                    }
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!(error = %e, "Task failed; continuing"),
            }
        }

        stats.elapsed = started.elapsed();
        Ok(stats)
    }

    #[instrument(level = "info", skip_all, fields(year = task.year))]
    async fn handle_year(&mut self, task: YearTask, stats: &mut CrawlStats) -> Vec<Task> {
        stats.years += 1;
        let year = task.year;

        let urls = Url::parse(&self.config.index_url_for(year))
            .map_err(Error::from)
            .and_then(|url| Ok((url, self.config.year_path_prefix(year)?)));
        let (index_url, prefix) = match urls {
            Ok(urls) => urls,
            Err(e) => {
                warn!(error = %e, "Invalid year-index URL; skipping year");
                return Vec::new();
            }
        };

        if !self.requested.insert(index_url.clone()) {
            debug!(url = %index_url, "Year index already requested");
            return Vec::new();
        }

        let (base, body) = match self.fetch_text(&index_url).await {
            Ok(page) => page,
            Err(e) => {
                stats.failed_fetches += 1;
                warn!(url = %index_url, error = %e, "Year index fetch failed; skipping year");
                return Vec::new();
            }
        };

        let hrefs = index::discover_links(&Html::parse_document(&body), &prefix);
        let mut links = Vec::with_capacity(hrefs.len());
        for href in &hrefs {
            let url = match base.join(href) {
                Ok(url) => url,
                Err(e) => {
                    warn!(%href, error = %e, "Unresolvable finalist link");
                    continue;
                }
            };
            if !self.requested.insert(url.clone()) {
                debug!(%url, "Finalist already requested; dropping duplicate link");
                continue;
            }
            links.push(Task::Detail(FinalistLink { year, url }));
        }

        info!("Year {}: found {} finalists", year, links.len());
        debug!(?hrefs, "Finalist links");
        stats.links += links.len();
        links
    }

    #[instrument(level = "info", skip_all, fields(url = %link.url))]
    async fn handle_detail(
        &mut self,
        link: FinalistLink,
        stats: &mut CrawlStats,
    ) -> Result<Vec<Task>> {
        let (page_url, body) = match self.fetch_text(&link.url).await {
            Ok(page) => page,
            Err(e) => {
                stats.failed_fetches += 1;
                warn!(error = %e, "Detail page fetch failed");
                return Ok(Vec::new());
            }
        };

        let details = match detail::extract_details(
            &Html::parse_document(&body),
            page_url.as_str(),
            link.year,
        ) {
            Ok(details) => details,
            Err(_) => {
                stats.records_skipped += 1;
                warn!("No heading found on {}", page_url);
                return Ok(Vec::new());
            }
        };
        debug!(
            artist = %details.artist,
            title = %details.title,
            description = %truncate_for_log(&details.description, 120),
            "Extracted finalist"
        );

        let image_url = match details.image_url.as_str() {
            "" => None,
            raw => match page_url.join(raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(image_url = raw, error = %e, "Unresolvable image URL");
                    None
                }
            },
        };

        match image_url {
            Some(image_url) => Ok(vec![Task::Image { details, image_url }]),
            None => {
                warn!("No image found for {} - {}", details.artist, details.title);
                self.write(FinalistRecord::new(details, None), stats)?;
                Ok(Vec::new())
            }
        }
    }

    #[instrument(level = "info", skip_all, fields(%image_url))]
    async fn handle_image(
        &mut self,
        details: FinalistDetails,
        image_url: Url,
        stats: &mut CrawlStats,
    ) -> Result<()> {
        let fetched = self.fetch_bytes(&image_url).await;

        let image = match fetched {
            Ok((final_url, bytes)) => {
                let name =
                    derive_image_name(details.year, &details.artist, &details.title, &final_url);
                let asset = ImageAsset { name, bytes };
                let saved = self.images.save(&asset).await?;
                stats.images_saved += 1;
                Some(saved)
            }
            Err(e) => {
                stats.failed_fetches += 1;
                warn!(error = %e, "Image fetch failed; writing record without image");
                None
            }
        };

        self.write(FinalistRecord::new(details, image), stats)
    }

    fn write(&self, record: FinalistRecord, stats: &mut CrawlStats) -> Result<()> {
        self.store.append(&record)?;
        stats.rows_written += 1;
        Ok(())
    }

    /// GET an image and return its final URL with the raw body.
    async fn fetch_bytes(&mut self, url: &Url) -> Result<(Url, Vec<u8>)> {
        let response = self.fetcher.get(url).await?;
        let final_url = response.url().clone();
        let bytes = response.bytes().await?;
        Ok((final_url, bytes.to_vec()))
    }

    /// GET a page and return its final URL with the decoded body.
    async fn fetch_text(&mut self, url: &Url) -> Result<(Url, String)> {
        let response = self.fetcher.get(url).await?;
        let final_url = response.url().clone();
        let body = response.text().await?;
        Ok((final_url, body))
    }
}
