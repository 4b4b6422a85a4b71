//! Durable outputs of a crawl.
//!
//! # Submodules
//!
//! - [`csv`]: append-only finalist table, one row per record
//! - [`images`]: artwork files named after year, artist and title
//!
//! # Output Structure
//!
//! ```text
//! project_root/
//! └── data/
//!     ├── wynne_finalists.csv
//!     └── images/
//!         ├── 2011_Jane Doe_Untitled.jpg
//!         └── 2012_Sam Lee_Harbour at dusk.png
//! ```
//!
//! The `image_path` column holds the image path relative to `project_root`.

pub mod csv;
pub mod images;
