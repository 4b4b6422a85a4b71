//! Error types for the finalist crawler.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for crawler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for crawler operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The remote answered with a non-success status
    #[error("unexpected status {status} for {url}")]
    Status {
        /// Requested URL
        url: String,
        /// Status code returned by the server
        status: StatusCode,
    },

    /// A redirect chain longer than the fetcher follows
    #[error("too many redirects starting at {0}")]
    TooManyRedirects(String),

    /// The site's robots policy forbids the request
    #[error("blocked by robots.txt: {0}")]
    RobotsDisallowed(String),

    /// A detail page without the artist/title heading
    #[error("no heading found on {0}")]
    MissingHeading(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV store error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration file could not be parsed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration is well-formed but unusable
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error must end the run.
    ///
    /// Only storage failures are fatal; everything else costs at most one record.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Csv(_))
    }
}
