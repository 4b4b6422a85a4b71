//! Finalist link discovery on year-index pages.
//!
//! Index pages list each finalist as an `a.card-artwork-link` card. Older or
//! restyled pages may lack the card class, in which case any link under the
//! year's path whose last segment is a numeric id is taken instead.

use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

static CARD_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.card-artwork-link[href]").expect("valid selector"));
static ANY_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Collect detail-page hrefs from a year-index document.
///
/// `year_prefix` is the year-scoped path, e.g. `/prizes/wynne/2020/`. Hrefs
/// are returned as written in the page, unique, in first-seen order. An empty
/// result is valid.
#[instrument(level = "debug", skip(document))]
pub fn discover_links(document: &Html, year_prefix: &str) -> Vec<String> {
    let mut links: Vec<String> = document
        .select(&CARD_LINK)
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect();

    if links.is_empty() {
        debug!("No finalist cards; falling back to year-scoped links");
        links = document
            .select(&ANY_LINK)
            .filter_map(|a| a.value().attr("href"))
            .filter(|href| is_detail_href(href, year_prefix))
            .map(str::to_string)
            .collect();
    }

    links.into_iter().unique().collect()
}

/// True when `href` sits under `year_prefix` and its last path segment is an
/// all-digit id, e.g. `/prizes/wynne/2020/12/` or
/// `/prizes/wynne/2020/finalists/12/`.
///
/// The index page itself and named sub-pages like `/2020/about/` are rejected.
///
/// # Arguments
///
/// * `href` - Link target as written in the page, relative or absolute
/// * `year_prefix` - Year-scoped path, e.g. `/prizes/wynne/2020/`
pub fn is_detail_href(href: &str, year_prefix: &str) -> bool {
    let Some(pos) = href.find(year_prefix) else {
        return false;
    };
    let rest = href[pos + year_prefix.len()..].trim_matches('/');
    rest.rsplit('/')
        .next()
        .is_some_and(|last| !last.is_empty() && last.chars().all(|c| c.is_ascii_digit()))
}
