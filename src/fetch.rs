//! Polite HTTP fetching.
//!
//! Every request the crawler makes goes through [`Fetcher::get`], which
//!
//! 1. consults the origin's robots.txt (fetched once per origin and cached),
//! 2. waits on a rate limiter so consecutive requests are at least
//!    `request_delay_ms` apart,
//! 3. sends the request with the crawler's user agent, and
//! 4. turns non-success statuses into [`Error::Status`].
//!
//! Redirects are followed here rather than by the HTTP client, so every hop
//! goes through steps 1 and 2 as its own request.
//!
//! There is no retry or backoff. A failed request is reported once and the
//! caller decides what to skip.

use crate::config::CrawlConfig;
use crate::error::{Error, Result};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use std::collections::HashMap;
use texting_robots::Robot;
use tracing::{debug, debug_span, instrument, warn, Instrument};
use url::Url;

/// Redirect hops followed before a request is abandoned.
pub const MAX_REDIRECTS: usize = 10;

/// HTTP client with robots.txt and rate-limit enforcement.
pub struct Fetcher {
    client: Client,
    limiter: Option<DefaultDirectRateLimiter>,
    /// Product token matched against robots.txt `User-agent` lines.
    robots_agent: String,
    respect_robots_txt: bool,
    /// Parsed robots.txt per origin; `None` means everything is allowed.
    robots: HashMap<String, Option<Robot>>,
}

impl Fetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .redirect(Policy::none())
            .build()?;

        let limiter = Quota::with_period(config.request_delay()).map(RateLimiter::direct);

        Ok(Self {
            client,
            limiter,
            robots_agent: robots_agent(&config.user_agent).to_string(),
            respect_robots_txt: config.respect_robots_txt,
            robots: HashMap::new(),
        })
    }

    /// GET `url` and return the successful response.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL to request
    ///
    /// # Returns
    ///
    /// The response of the last hop, with its body unread. [`Response::url`]
    /// is the final URL after redirects.
    ///
    /// # Errors
    ///
    /// [`Error::RobotsDisallowed`] when robots.txt forbids any hop,
    /// [`Error::Status`] for a non-success final status or a redirect without
    /// a usable `Location`, [`Error::TooManyRedirects`] past [`MAX_REDIRECTS`]
    /// hops, and [`Error::Http`] for transport failures.
    #[instrument(level = "debug", skip_all, fields(%url))]
    pub async fn get(&mut self, url: &Url) -> Result<Response> {
        let mut current = url.clone();

        for hop in 0..=MAX_REDIRECTS {
            if self.respect_robots_txt && !self.allowed(&current).await {
                warn!(url = %current, "Disallowed by robots.txt");
                return Err(Error::RobotsDisallowed(current.to_string()));
            }

            self.pace().await;
            debug!(url = %current, hop, "Sending GET request");
            let response = self.client.get(current.clone()).send().await?;

            let status = response.status();
            if status.is_redirection() {
                let next = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|location| current.join(location).ok());
                match next {
                    Some(next) => {
                        debug!(from = %current, to = %next, %status, "Following redirect");
                        current = next;
                        continue;
                    }
                    None => {
                        return Err(Error::Status {
                            url: current.to_string(),
                            status,
                        });
                    }
                }
            }

            if !status.is_success() {
                return Err(Error::Status {
                    url: current.to_string(),
                    status,
                });
            }
            return Ok(response);
        }

        Err(Error::TooManyRedirects(url.to_string()))
    }

    async fn pace(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().instrument(debug_span!("limiter")).await;
        }
    }

    async fn allowed(&mut self, url: &Url) -> bool {
        let origin = url.origin().ascii_serialization();
        if !self.robots.contains_key(&origin) {
            let robot = self.load_robots(&origin).await;
            self.robots.insert(origin.clone(), robot);
        }
        match self.robots.get(&origin) {
            Some(Some(robot)) => robot.allowed(url.as_str()),
            _ => true,
        }
    }

    /// Fetch and parse `{origin}/robots.txt`.
    ///
    /// A missing, failing or unparseable robots file allows everything.
    #[instrument(level = "debug", skip(self))]
    async fn load_robots(&self, origin: &str) -> Option<Robot> {
        let robots_url = format!("{origin}/robots.txt");
        self.pace().await;

        let response = match self.client.get(&robots_url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!(status = %response.status(), "No robots.txt; allowing all");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "robots.txt fetch failed; allowing all");
                return None;
            }
        };

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "robots.txt body unreadable; allowing all");
                return None;
            }
        };

        match Robot::new(&self.robots_agent, &body) {
            Ok(robot) => Some(robot),
            Err(e) => {
                warn!(error = %e, "robots.txt unparseable; allowing all");
                None
            }
        }
    }
}

/// Product token of a user-agent string, e.g. `WynneResearchBot` for
/// `WynneResearchBot/1.0 (+educational research)`.
///
/// robots.txt groups name crawlers by this token, not by the full header.
fn robots_agent(user_agent: &str) -> &str {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .find(|token| !token.is_empty())
        .unwrap_or(user_agent)
}
