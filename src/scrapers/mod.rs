//! HTML extraction for the two page kinds the crawler visits.
//!
//! Both submodules are pure functions over an already parsed
//! [`scraper::Html`] document; fetching and URL resolution stay in the driver.
//!
//! | Page | Module | Produces |
//! |------|--------|----------|
//! | Year index (`/prizes/wynne/{year}/`) | [`index`] | detail-page hrefs, deduplicated |
//! | Finalist detail page | [`detail`] | [`FinalistDetails`](crate::models::FinalistDetails) |
//!
//! Every selector has a fallback or an empty default; the only hard failure is
//! a detail page without its artist/title heading.

pub mod detail;
pub mod index;
