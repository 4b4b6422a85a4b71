//! Field extraction for finalist detail pages.
//!
//! The page header renders as
//!
//! ```html
//! <h2 class="articleHeader-titleArtistWork">Jane Doe <span class="articleHeader-subtitle">Untitled</span></h2>
//! <p class="articleHeader-medium">oil on linen</p>
//! <p class="articleHeader-winnerText">Winner</p>
//! ```
//!
//! followed by a text module holding the description and an `og:image` meta
//! tag pointing at the full-resolution artwork.

use crate::error::{Error, Result};
use crate::models::FinalistDetails;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::instrument;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static HEADING: Lazy<Selector> = Lazy::new(|| selector("h2.articleHeader-titleArtistWork"));
static SUBTITLE: Lazy<Selector> = Lazy::new(|| selector("span.articleHeader-subtitle"));
static MEDIUM: Lazy<Selector> = Lazy::new(|| selector("p.articleHeader-medium"));
static WINNER_TEXT: Lazy<Selector> = Lazy::new(|| selector("p.articleHeader-winnerText"));
static DESCRIPTION: Lazy<Selector> = Lazy::new(|| selector("div.textModule div.grid.text p"));
static OG_IMAGE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:image"]"#));
static HEADER_IMAGE: Lazy<Selector> = Lazy::new(|| selector("img.articleHeader-image"));

/// Extract finalist metadata from a detail page.
///
/// `url` and `year` are carried into the result unchanged.
///
/// # Errors
///
/// [`Error::MissingHeading`] when the artist/title heading is absent. Every
/// other field falls back to an empty string or `false`.
#[instrument(level = "debug", skip(document))]
pub fn extract_details(document: &Html, url: &str, year: i32) -> Result<FinalistDetails> {
    let heading = document
        .select(&HEADING)
        .next()
        .ok_or_else(|| Error::MissingHeading(url.to_string()))?;

    // The artist is the heading's first text node, before the subtitle span.
    let artist = heading.text().next().unwrap_or_default().trim().to_string();

    let title = heading
        .select(&SUBTITLE)
        .next()
        .map(own_text)
        .unwrap_or_default();

    let medium = first_own_text(document, &MEDIUM);
    let winner = !first_own_text(document, &WINNER_TEXT).is_empty();

    let description = document
        .select(&DESCRIPTION)
        .flat_map(|p| p.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Ok(FinalistDetails {
        year,
        artist,
        title,
        medium,
        description,
        winner,
        image_url: image_url(document),
        url: url.to_string(),
    })
}

/// `og:image` content if set, else the header image `src`, else empty.
pub fn image_url(document: &Html) -> String {
    let attr = |sel: &Selector, name: &str| {
        document
            .select(sel)
            .next()
            .and_then(|el| el.value().attr(name))
            .unwrap_or_default()
            .to_string()
    };

    let og = attr(&OG_IMAGE, "content");
    if og.is_empty() {
        attr(&HEADER_IMAGE, "src")
    } else {
        og
    }
}

/// First direct text child of an element, trimmed.
fn own_text(el: ElementRef<'_>) -> String {
    el.children()
        .find_map(|node| node.value().as_text().map(|t| t.trim().to_string()))
        .unwrap_or_default()
}

fn first_own_text(document: &Html, sel: &Selector) -> String {
    document.select(sel).next().map(own_text).unwrap_or_default()
}
