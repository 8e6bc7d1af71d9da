//! Builds the naked-eye star catalog for the Stella star map.
//!
//! A run downloads the HYG catalog from the first candidate URL that answers
//! with real data, gunzips it, keeps the stars brighter than the visibility
//! limit and writes them brightest first as a sparse JSON array.

pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod report;

pub use config::PipelineConfig;
pub use error::{CatalogError, Result};
pub use pipeline::run;
pub use process::{Catalog, CatalogEntry, CatalogStats};
pub use report::RunReport;
