// src/report.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::{
    error::Result,
    process::{CatalogEntry, CatalogStats},
};

/// What a finished run did, for logs and the optional report file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// URL or local path the catalog came from.
    pub source: String,
    /// Size of the acquired artifact, before decompression.
    pub artifact_bytes: u64,
    pub rows_seen: u64,
    pub rows_retained: u64,
    pub named: u64,
    pub with_distance: u64,
    pub mag_limit: f64,
    pub output: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn new(
        source: String,
        artifact_bytes: u64,
        stats: CatalogStats,
        mag_limit: f64,
        output: PathBuf,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source,
            artifact_bytes,
            rows_seen: stats.rows_seen,
            rows_retained: stats.rows_retained,
            named: stats.named,
            with_distance: stats.with_distance,
            mag_limit,
            output,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut f = fs::File::create(path)?;
        serde_json::to_writer_pretty(&mut f, self)?;
        f.write_all(b"\n")?;
        Ok(())
    }
}

/// Final statistics plus the `top` brightest entries.
pub fn log_summary(report: &RunReport, entries: &[CatalogEntry], top: usize) {
    info!("total stars processed: {}", report.rows_seen);
    info!(
        "visible stars (mag < {}): {}",
        report.mag_limit, report.rows_retained
    );
    info!("named stars: {}", report.named);
    info!("stars with distance data: {}", report.with_distance);

    for line in brightest_lines(entries, top) {
        info!("{}", line);
    }
}

fn brightest_lines(entries: &[CatalogEntry], top: usize) -> Vec<String> {
    entries
        .iter()
        .take(top)
        .enumerate()
        .map(|(i, e)| {
            format!(
                "{}. {} (mag: {:.2})",
                i + 1,
                e.name.as_deref().unwrap_or("Unnamed"),
                e.mag
            )
        })
        .collect()
}
