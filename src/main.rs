//! # Wynne Finalists
//!
//! Crawls the Art Gallery of NSW Wynne Prize pages year by year and keeps a
//! CSV archive of every finalist, with the artwork image saved alongside.
//!
//! ## Usage
//!
//! ```sh
//! wynne_finalists -r ./archive
//! ```
//!
//! ## Architecture
//!
//! The crawl is a single sequential pipeline:
//! 1. **Year index**: list finalist detail links for each prize year
//! 2. **Detail**: extract artist, title, medium, description, winner flag
//! 3. **Image**: download the artwork and name it after the finalist
//! 4. **Output**: append one CSV row per finalist
//!
//! Requests go out one at a time, at most one per second, with robots.txt
//! honoured and a dedicated user agent.

use clap::Parser;
use std::error::Error;
use std::sync::atomic::Ordering;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod crawler;
mod error;
mod fetch;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use config::{CrawlConfig, load_config};
use crawler::Crawler;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("wynne_finalists starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let base = match &args.config {
        Some(path) => load_config(path)?,
        None => CrawlConfig::default(),
    };
    let config = args.apply(base);
    config.validate()?;
    debug!(?config, "Configuration in effect");

    // Early check: the image directory must be writable before any request goes out
    let images_dir = config.images_path();
    if let Err(e) = ensure_writable_dir(&images_dir).await {
        error!(
            path = %images_dir.display(),
            error = %e,
            "Image directory is not writable (fix perms or choose a different root)"
        );
        return Err(e.into());
    }

    let mut crawler = Crawler::new(config)?;

    // Ctrl-C lets the request in flight finish, then stops the queue.
    let stop = crawler.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; finishing current request");
            stop.store(true, Ordering::SeqCst);
        }
    });

    let stats = match crawler.run().await {
        Ok(stats) => stats,
        Err(e) => {
            error!(error = %e, "Crawl aborted");
            return Err(e.into());
        }
    };

    info!(
        years = stats.years,
        links = stats.links,
        rows_written = stats.rows_written,
        images_saved = stats.images_saved,
        records_skipped = stats.records_skipped,
        failed_fetches = stats.failed_fetches,
        abandoned = stats.abandoned,
        secs = stats.elapsed.as_secs(),
        "Execution complete"
    );

    Ok(())
}
