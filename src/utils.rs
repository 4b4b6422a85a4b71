//! Utility functions for image naming, string handling, and file system checks.
//!
//! This module provides helpers used throughout the crawler:
//! - File name derivation for downloaded images (sanitize, stem, extension)
//! - String truncation for logging
//! - File system validation for output directories

use crate::error::Result;
use crate::models::ImageName;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

/// Longest stem, in characters, that [`derive_stem`] produces.
pub const MAX_STEM_CHARS: usize = 120;

/// Byte cap on a stem, leaving room for the longest extension under the
/// common 255-byte file name limit.
pub const MAX_STEM_BYTES: usize = 240;

/// Extensions kept as-is; anything else becomes [`DEFAULT_EXTENSION`].
pub const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

pub const DEFAULT_EXTENSION: &str = ".jpg";

/// Make a string safe to use inside a file name.
///
/// Every character that is not alphanumeric, a space, or a hyphen is replaced
/// with a single underscore, so the output has as many characters as the input.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(sanitize_component("Jane O'Brien!!"), "Jane O_Brien__");
/// assert_eq!(sanitize_component("Sky / Water"), "Sky _ Water");
/// ```
pub fn sanitize_component(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Build `{year}_{artist}_{title}` from sanitized parts.
///
/// # Arguments
///
/// * `year` - Prize year the finalist was listed under
/// * `artist` - Raw artist name
/// * `title` - Raw title of the work
///
/// # Returns
///
/// The first [`MAX_STEM_CHARS`] characters of the joined name. The cut is a
/// plain character cut and may land mid-word. Names in multi-byte scripts are
/// cut further, on a character boundary, so the stem never exceeds
/// [`MAX_STEM_BYTES`] bytes.
pub fn derive_stem(year: i32, artist: &str, title: &str) -> String {
    let joined = format!(
        "{}_{}_{}",
        year,
        sanitize_component(artist),
        sanitize_component(title)
    );

    let mut stem = String::with_capacity(MAX_STEM_BYTES);
    for c in joined.chars().take(MAX_STEM_CHARS) {
        if stem.len() + c.len_utf8() > MAX_STEM_BYTES {
            break;
        }
        stem.push(c);
    }
    stem
}

/// Pick the file extension for an image from the URL it was served from.
///
/// Only the path is considered, so query strings never leak into the name.
/// Matching is case-sensitive.
///
/// # Arguments
///
/// * `url` - Final URL of the image response
///
/// # Returns
///
/// One of [`IMAGE_EXTENSIONS`], or [`DEFAULT_EXTENSION`] when the suffix is
/// missing or unrecognised.
pub fn resolve_extension(url: &Url) -> &'static str {
    let suffix = Path::new(url.path())
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"));

    match suffix {
        Some(suffix) => IMAGE_EXTENSIONS
            .iter()
            .copied()
            .find(|known| *known == suffix)
            .unwrap_or(DEFAULT_EXTENSION),
        None => DEFAULT_EXTENSION,
    }
}

/// Name an image after the finalist it belongs to.
///
/// `image_url` should be the final URL of the image response.
pub fn derive_image_name(year: i32, artist: &str, title: &str, image_url: &Url) -> ImageName {
    ImageName {
        stem: derive_stem(year, artist, title),
        extension: resolve_extension(image_url),
    }
}

/// Truncate a string for logging purposes.
///
/// # Arguments
///
/// * `s` - The string to potentially truncate
/// * `max` - Maximum number of characters to keep
///
/// # Returns
///
/// The original string if it fits, otherwise its first `max` characters with
/// `"…(+N chars)"` appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 chars)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let total = s.chars().count();
    if total <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max).collect();
        format!("{}…(+{} chars)", kept, total - max)
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable
/// (permission denied, read-only filesystem, etc.).
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await?;
    // A small sync write keeps the error surface simple.
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_sanitize_replaces_one_for_one() {
        assert_eq!(sanitize_component("Jane O'Brien!!"), "Jane O_Brien__");
        assert_eq!(sanitize_component("Sky / Water"), "Sky _ Water");
        assert_eq!(sanitize_component("Self-portrait"), "Self-portrait");
        assert_eq!(sanitize_component("Émile Zoë"), "Émile Zoë");
        assert_eq!(sanitize_component(""), "");
    }

    #[test]
    fn test_derive_stem_layout() {
        let stem = derive_stem(2019, "Jane O'Brien!!", "Sky / Water");
        assert!(stem.starts_with("2019_Jane O_Brien__"));
        assert_eq!(stem, "2019_Jane O_Brien___Sky _ Water");
    }

    #[test]
    fn test_derive_stem_with_empty_parts() {
        assert_eq!(derive_stem(2011, "", ""), "2011__");
    }

    #[test]
    fn test_derive_stem_truncates() {
        let title = "a".repeat(300);
        let stem = derive_stem(2020, "Jane Doe", &title);
        assert_eq!(stem.chars().count(), MAX_STEM_CHARS);
        assert!(stem.starts_with("2020_Jane Doe_aaa"));
    }

    #[test]
    fn test_derive_stem_truncates_on_char_boundary() {
        let title = "é".repeat(300);
        let stem = derive_stem(2020, "Zoë", &title);
        assert_eq!(stem.chars().count(), MAX_STEM_CHARS);
    }

    #[test]
    fn test_resolve_extension_ignores_query() {
        assert_eq!(
            resolve_extension(&url("https://example.com/media/photo.jpeg?size=full")),
            ".jpeg"
        );
    }

    #[test]
    fn test_resolve_extension_defaults() {
        assert_eq!(resolve_extension(&url("https://example.com/media/photo")), ".jpg");
        assert_eq!(resolve_extension(&url("https://example.com/media/photo.bmp")), ".jpg");
        assert_eq!(resolve_extension(&url("https://example.com/")), ".jpg");
        assert_eq!(resolve_extension(&url("https://example.com/media/photo.JPG")), ".jpg");
    }

    #[test]
    fn test_resolve_extension_allowed() {
        assert_eq!(resolve_extension(&url("https://example.com/a.png")), ".png");
        assert_eq!(resolve_extension(&url("https://example.com/a.gif")), ".gif");
        assert_eq!(resolve_extension(&url("https://example.com/x/a.b.webp")), ".webp");
    }

    #[test]
    fn test_derive_image_name() {
        let name = derive_image_name(
            2022,
            "Jane Doe",
            "Dusk",
            &url("https://cdn.example.com/img/dusk.png?w=1200"),
        );
        assert_eq!(name.stem, "2022_Jane Doe_Dusk");
        assert_eq!(name.file_name(), "2022_Jane Doe_Dusk.png");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 chars)"));
    }

    #[test]
    fn test_derive_stem_caps_bytes_for_wide_scripts() {
        let title = "水".repeat(200);
        let stem = derive_stem(2021, "李", &title);
        assert!(stem.len() <= MAX_STEM_BYTES);
        assert!(stem.starts_with("2021_李_水"));
        assert!(stem.chars().count() < MAX_STEM_CHARS);
        assert!(format!("{stem}.jpeg").len() <= 255);
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data").join("images");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert_eq!(std::fs::read_dir(&nested).unwrap().count(), 0);
    }
}
