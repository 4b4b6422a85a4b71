//! Artwork file storage.

use crate::error::Result;
use crate::models::{ImageAsset, SavedImage};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Writes image assets under `project_root/images_dir`.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    dir: PathBuf,
}

impl ImageStore {
    /// `dir` is relative to `root`; recorded paths are `dir/file_name`.
    pub fn new(root: impl Into<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dir: dir.into(),
        }
    }

    pub fn absolute_dir(&self) -> PathBuf {
        self.root.join(&self.dir)
    }

    /// Write the asset's bytes, replacing any file of the same name.
    #[instrument(level = "debug", skip_all, fields(stem = %asset.name.stem))]
    pub async fn save(&self, asset: &ImageAsset) -> Result<SavedImage> {
        let file_name = asset.name.file_name();
        let dir = self.absolute_dir();
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(&file_name), &asset.bytes).await?;
        info!("Saved image: {}", file_name);

        Ok(SavedImage {
            path: relative_path(&self.dir, &file_name),
            stem: asset.name.stem.clone(),
        })
    }
}

/// `dir/file_name` with `/` separators regardless of platform.
fn relative_path(dir: &Path, file_name: &str) -> String {
    let mut parts: Vec<String> = dir
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .filter(|c| c != ".")
        .collect();
    parts.push(file_name.to_string());
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageName;

    #[tokio::test]
    async fn test_save_writes_bytes_and_returns_relative_path() {
        let root = tempfile::tempdir().unwrap();
        let store = ImageStore::new(root.path(), "data/images");
        let asset = ImageAsset {
            name: ImageName {
                stem: "2019_Jane Doe_Untitled".to_string(),
                extension: ".png",
            },
            bytes: vec![0x89, b'P', b'N', b'G'],
        };

        let saved = store.save(&asset).await.unwrap();
        assert_eq!(saved.path, "data/images/2019_Jane Doe_Untitled.png");
        assert_eq!(saved.stem, "2019_Jane Doe_Untitled");

        let on_disk = std::fs::read(root.path().join(&saved.path)).unwrap();
        assert_eq!(on_disk, asset.bytes);
    }

    #[test]
    fn test_relative_path_skips_current_dir() {
        assert_eq!(
            relative_path(Path::new("./data/images"), "a.jpg"),
            "data/images/a.jpg"
        );
    }
}
