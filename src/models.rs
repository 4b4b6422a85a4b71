//! Data models for the crawl pipeline.
//!
//! A record is assembled across two request/response cycles:
//! - [`YearTask`]: one prize year, turned into a year-index request
//! - [`FinalistLink`]: an absolute detail-page URL discovered under a year
//! - [`FinalistDetails`]: metadata pulled from a detail page
//! - [`FinalistRecord`]: details plus the optional [`SavedImage`], written once
//!
//! [`ImageName`] and [`ImageAsset`] only live for the duration of one image
//! response.

use url::Url;

/// Column order of the CSV store.
pub const CSV_FIELDS: [&str; 9] = [
    "year",
    "artist",
    "title",
    "medium",
    "description",
    "winner",
    "image_path",
    "image_stem",
    "url",
];

/// A single prize year to crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearTask {
    pub year: i32,
}

/// A resolved detail-page URL and the year it was listed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalistLink {
    pub year: i32,
    pub url: Url,
}

/// Metadata extracted from one detail page.
///
/// `image_url` is the raw attribute value; the driver resolves it against the
/// page URL before fetching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalistDetails {
    /// The prize year the page was discovered under.
    pub year: i32,
    /// Text before the subtitle span in the heading.
    pub artist: String,
    /// Title of the work.
    pub title: String,
    /// Medium line, e.g. "oil on linen".
    pub medium: String,
    /// Body text fragments joined with single spaces.
    pub description: String,
    /// True when the winner announcement paragraph has text.
    pub winner: bool,
    /// `og:image` content, else the header image `src`, else empty.
    pub image_url: String,
    /// URL of the detail page itself.
    pub url: String,
}

/// File name parts for a downloaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageName {
    pub stem: String,
    pub extension: &'static str,
}

impl ImageName {
    /// Stem plus extension, e.g. `2019_Jane Doe_Untitled.jpg`.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.stem, self.extension)
    }
}

/// Image bytes paired with the name they will be stored under.
#[derive(Debug)]
pub struct ImageAsset {
    pub name: ImageName,
    pub bytes: Vec<u8>,
}

/// An image that has been written to the asset directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    /// Path relative to the project root.
    pub path: String,
    pub stem: String,
}

/// One output row.
///
/// The image is a single `Option`, so a row can never carry a path without a
/// stem or the other way round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalistRecord {
    pub details: FinalistDetails,
    pub image: Option<SavedImage>,
}

impl FinalistRecord {
    pub fn new(details: FinalistDetails, image: Option<SavedImage>) -> Self {
        Self { details, image }
    }

    /// Fields in [`CSV_FIELDS`] order.
    ///
    /// `winner` is written as `True`/`False` to stay compatible with existing
    /// archive files.
    pub fn csv_row(&self) -> [String; 9] {
        let d = &self.details;
        let (image_path, image_stem) = match &self.image {
            Some(image) => (image.path.clone(), image.stem.clone()),
            None => (String::new(), String::new()),
        };
        [
            d.year.to_string(),
            d.artist.clone(),
            d.title.clone(),
            d.medium.clone(),
            d.description.clone(),
            if d.winner { "True" } else { "False" }.to_string(),
            image_path,
            image_stem,
            d.url.clone(),
        ]
    }
}
