//! Append-only CSV store for finalist records.
//!
//! Each append opens the file, writes one row, flushes and closes it again, so
//! a run interrupted at any point leaves only whole rows behind. Rows are never
//! deduplicated against earlier runs.

use crate::error::Result;
use crate::models::{CSV_FIELDS, FinalistRecord};
use csv::{Terminator, WriterBuilder};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Single-writer handle to the finalist table.
#[derive(Debug)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with its header row if it is missing or empty.
    ///
    /// Returns `true` when a header was written.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub fn initialize(&self) -> Result<bool> {
        if !self.needs_header()? {
            debug!("CSV store already initialized");
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::CRLF)
            .from_writer(File::create(&self.path)?);
        writer.write_record(CSV_FIELDS)?;
        writer.flush()?;
        info!("Wrote CSV header");
        Ok(true)
    }

    /// Append one record, writing the header first if the file is missing or empty.
    #[instrument(level = "debug", skip_all, fields(url = %record.details.url))]
    pub fn append(&self, record: &FinalistRecord) -> Result<()> {
        self.initialize()?;

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::CRLF)
            .from_writer(file);
        writer.write_record(record.csv_row())?;
        writer.flush()?;

        let d = &record.details;
        info!("Wrote CSV row: {} - {} - {}", d.year, d.artist, d.title);
        Ok(())
    }

    fn needs_header(&self) -> Result<bool> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() == 0),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FinalistDetails, SavedImage};

    const HEADER: &str = "year,artist,title,medium,description,winner,image_path,image_stem,url";

    fn record(year: i32, artist: &str, image: bool) -> FinalistRecord {
        let details = FinalistDetails {
            year,
            artist: artist.to_string(),
            title: "Untitled".to_string(),
            medium: "oil on linen".to_string(),
            description: "Light, water, \"air\".".to_string(),
            winner: false,
            image_url: String::new(),
            url: format!("https://example.com/prizes/wynne/{year}/1/"),
        };
        let image = image.then(|| SavedImage {
            path: format!("data/images/{year}_{artist}_Untitled.jpg"),
            stem: format!("{year}_{artist}_Untitled"),
        });
        FinalistRecord::new(details, image)
    }

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_first_append_creates_file_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("data").join("finalists.csv"));

        store.append(&record(2019, "Jane Doe", true)).unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with(&format!("{HEADER}\r\n")));
        let rows = read_rows(store.path());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], CSV_FIELDS);
        assert_eq!(rows[1][0], "2019");
        assert_eq!(rows[1][4], "Light, water, \"air\".");
        assert_eq!(rows[1][5], "False");
    }

    #[test]
    fn test_initialize_fills_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("finalists.csv");
        std::fs::write(&path, "").unwrap();

        let store = CsvStore::new(&path);
        assert!(store.initialize().unwrap());
        assert!(!store.initialize().unwrap());
        assert_eq!(read_rows(&path), vec![CSV_FIELDS.to_vec()]);
    }

    #[test]
    fn test_second_run_appends_without_second_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("finalists.csv");

        let first_run = CsvStore::new(&path);
        first_run.initialize().unwrap();
        for artist in ["A", "B", "C"] {
            first_run.append(&record(2020, artist, true)).unwrap();
        }

        let second_run = CsvStore::new(&path);
        second_run.initialize().unwrap();
        for artist in ["A", "D"] {
            second_run.append(&record(2020, artist, false)).unwrap();
        }

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 1 + 3 + 2);
        assert_eq!(rows.iter().filter(|r| r[0] == "year").count(), 1);
        // Same finalist in both runs is kept twice.
        assert_eq!(rows.iter().filter(|r| r[1] == "A").count(), 2);
    }

    #[test]
    fn test_image_columns_are_paired() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("finalists.csv"));
        store.append(&record(2011, "With", true)).unwrap();
        store.append(&record(2011, "Without", false)).unwrap();

        for row in read_rows(store.path()).iter().skip(1) {
            assert_eq!(row[6].is_empty(), row[7].is_empty(), "row {row:?}");
        }
    }

    #[test]
    fn test_unwritable_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be.
        let path = dir.path().join("finalists.csv");
        std::fs::create_dir(&path).unwrap();

        let store = CsvStore::new(&path);
        let err = store.append(&record(2011, "A", false)).unwrap_err();
        assert!(err.is_fatal());
    }
}
