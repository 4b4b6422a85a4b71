//! Command-line interface definitions for the finalist crawler.
//!
//! Everything the crawl needs has a built-in default; these options only
//! point it at a config file or override where output lands and which years
//! are visited.

use crate::config::CrawlConfig;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the finalist crawler.
///
/// # Examples
///
/// ```sh
/// # Full crawl into ./data
/// wynne_finalists
///
/// # Custom config, output under /srv/wynne
/// wynne_finalists -c crawl.yaml -r /srv/wynne
///
/// # Only re-crawl two years
/// wynne_finalists --first-year 2023 --last-year 2024
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "WYNNE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Project root that the CSV and image paths are relative to
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// First prize year to crawl
    #[arg(long)]
    pub first_year: Option<i32>,

    /// Last prize year to crawl
    #[arg(long)]
    pub last_year: Option<i32>,
}

impl Cli {
    /// Apply command-line overrides on top of `config`.
    pub fn apply(&self, mut config: CrawlConfig) -> CrawlConfig {
        if let Some(root) = &self.root {
            config.project_root = root.clone();
        }
        if let Some(year) = self.first_year {
            config.first_year = year;
        }
        if let Some(year) = self.last_year {
            config.last_year = year;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["wynne_finalists"]);
        assert!(cli.root.is_none());
        assert!(cli.first_year.is_none());
        assert_eq!(cli.apply(CrawlConfig::default()), CrawlConfig::default());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["wynne_finalists", "-c", "/tmp/crawl.yaml", "-r", "/srv/wynne"]);

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/crawl.yaml")));
        assert_eq!(cli.root, Some(PathBuf::from("/srv/wynne")));
    }

    #[test]
    fn test_cli_year_overrides() {
        let cli = Cli::parse_from([
            "wynne_finalists",
            "--first-year",
            "2023",
            "--last-year",
            "2024",
            "--root",
            "/srv/wynne",
        ]);

        let config = cli.apply(CrawlConfig::default());
        assert_eq!(config.years().collect::<Vec<_>>(), vec![2023, 2024]);
        assert_eq!(config.project_root, PathBuf::from("/srv/wynne"));
        assert_eq!(config.request_delay_ms, 1000);
    }
}
