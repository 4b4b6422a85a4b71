//! Startup configuration for the crawler.
//!
//! Every knob has a default equal to the values the archive was originally
//! built with, so running without a config file reproduces the reference crawl:
//! Wynne Prize years 2011 through 2025, one request per second, one request in
//! flight, robots.txt honoured.
//!
//! A YAML file may override any subset of fields:
//!
//! ```yaml
//! first_year: 2019
//! last_year: 2021
//! project_root: /srv/wynne
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// Placeholder substituted with the year in [`CrawlConfig::index_url_template`].
pub const YEAR_PLACEHOLDER: &str = "{year}";

/// Configuration for a crawl run
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CrawlConfig {
    /// First prize year to crawl (inclusive)
    pub first_year: i32,

    /// Last prize year to crawl (inclusive)
    pub last_year: i32,

    /// Year-index URL with a `{year}` placeholder
    pub index_url_template: String,

    /// Minimum delay between consecutive requests, in milliseconds
    pub request_delay_ms: u64,

    /// Number of requests allowed in flight; must stay 1
    pub max_concurrent_requests: usize,

    /// User agent sent with every request; its product token is matched against robots.txt
    pub user_agent: String,

    /// Whether to consult robots.txt before each request
    pub respect_robots_txt: bool,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Directory that `csv_path`, `images_dir` and recorded image paths are relative to
    pub project_root: PathBuf,

    /// Tabular store, relative to `project_root`
    pub csv_path: PathBuf,

    /// Image asset directory, relative to `project_root`
    pub images_dir: PathBuf,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            first_year: 2011,
            last_year: 2025,
            index_url_template: "https://www.artgallery.nsw.gov.au/prizes/wynne/{year}/"
                .to_string(),
            request_delay_ms: 1000,
            max_concurrent_requests: 1,
            user_agent: "WynneResearchBot/1.0 (+educational research)".to_string(),
            respect_robots_txt: true,
            request_timeout_secs: 60,
            project_root: PathBuf::from("."),
            csv_path: PathBuf::from("data/wynne_finalists.csv"),
            images_dir: PathBuf::from("data/images"),
        }
    }
}

impl CrawlConfig {
    /// Check invariants the crawl relies on.
    pub fn validate(&self) -> Result<()> {
        if self.first_year > self.last_year {
            return Err(Error::Config(format!(
                "first_year {} is after last_year {}",
                self.first_year, self.last_year
            )));
        }
        if !self.index_url_template.contains(YEAR_PLACEHOLDER) {
            return Err(Error::Config(format!(
                "index_url_template must contain {YEAR_PLACEHOLDER}"
            )));
        }
        // The CSV append path assumes a single writer.
        if self.max_concurrent_requests != 1 {
            return Err(Error::Config(format!(
                "max_concurrent_requests must be 1, got {}",
                self.max_concurrent_requests
            )));
        }
        Url::parse(&self.index_url_for(self.first_year))?;
        Ok(())
    }

    /// Years to crawl, ascending.
    pub fn years(&self) -> RangeInclusive<i32> {
        self.first_year..=self.last_year
    }

    /// Year-index URL for `year`.
    pub fn index_url_for(&self, year: i32) -> String {
        self.index_url_template
            .replace(YEAR_PLACEHOLDER, &year.to_string())
    }

    /// Path prefix that detail pages of `year` live under, e.g. `/prizes/wynne/2020/`.
    pub fn year_path_prefix(&self, year: i32) -> Result<String> {
        let url = Url::parse(&self.index_url_for(year))?;
        Ok(url.path().to_string())
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn csv_file(&self) -> PathBuf {
        self.project_root.join(&self.csv_path)
    }

    pub fn images_path(&self) -> PathBuf {
        self.project_root.join(&self.images_dir)
    }
}

/// Load a YAML config file; keys that are absent keep their defaults.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn load_config(path: impl AsRef<Path>) -> Result<CrawlConfig> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let config: CrawlConfig = serde_yaml::from_str(&text)?;
    info!("Loaded configuration");
    Ok(config)
}
