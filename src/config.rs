// src/config.rs

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Candidate locations of the HYG v4.2 catalog, tried in this order.
pub static DEFAULT_SOURCE_URLS: &[&str] = &[
    "https://codeberg.org/astronexus/hyg/raw/branch/main/data/hyg/CURRENT/hyg_v42.csv.gz",
    "https://codeberg.org/astronexus/hyg/media/branch/main/data/hyg/CURRENT/hyg_v42.csv.gz",
    "https://codeberg.org/astronexus/hyg/raw/branch/main/data/hyg/CURRENT/hyg_v41.csv.gz",
    "https://codeberg.org/astronexus/hyg/raw/branch/main/hyg/CURRENT/hyg_v42.csv.gz",
    "https://codeberg.org/astronexus/hyg/raw/branch/main/hyg_v42.csv.gz",
    "https://raw.githubusercontent.com/astronexus/hyg-database/master/data/hyg_v42.csv.gz",
    "https://github.com/astronexus/hyg-database/raw/master/data/hyg_v42.csv.gz",
    "https://www.astronexus.com/files/downloads/hygdata_v42.csv.gz",
    "https://astronexus.com/downloads/hygdata_v42.csv.gz",
];

/// Naked-eye visibility limit.
pub const DEFAULT_MAG_LIMIT: f64 = 6.5;

/// Anything at or below this size is an error page or an LFS pointer, not a catalog.
pub const DEFAULT_MIN_ARTIFACT_BYTES: u64 = 1_000_000;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_ARTIFACT_STEM: &str = "hyg_v42";

pub const DEFAULT_OUTPUT: &str = "stella_stars.json";

pub const DEFAULT_TOP: usize = 10;

/// Everything a single pipeline run needs to know.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Ordered candidate URLs.
    pub sources: Vec<String>,
    /// Local `.csv` / `.csv.gz`; when set the network is never touched.
    pub input: Option<PathBuf>,
    /// Directory for downloaded and decompressed artifacts.
    pub work_dir: PathBuf,
    pub artifact_stem: String,
    pub output: PathBuf,
    pub mag_limit: f64,
    /// A download must be strictly larger than this to count.
    pub min_artifact_bytes: u64,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Keep the `.csv.gz` once the run succeeded.
    pub keep_artifacts: bool,
    pub report: Option<PathBuf>,
    /// Number of brightest entries listed in the summary log.
    pub top: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sources: DEFAULT_SOURCE_URLS.iter().map(|s| s.to_string()).collect(),
            input: None,
            work_dir: PathBuf::from("."),
            artifact_stem: DEFAULT_ARTIFACT_STEM.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            mag_limit: DEFAULT_MAG_LIMIT,
            min_artifact_bytes: DEFAULT_MIN_ARTIFACT_BYTES,
            timeout: DEFAULT_TIMEOUT,
            keep_artifacts: false,
            report: None,
            top: DEFAULT_TOP,
        }
    }
}

impl PipelineConfig {
    pub fn artifacts(&self) -> ArtifactPaths {
        ArtifactPaths::new(&self.work_dir, &self.artifact_stem)
    }
}

/// Where the compressed and plain catalog artifacts live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub gz: PathBuf,
    pub csv: PathBuf,
}

impl ArtifactPaths {
    pub fn new(work_dir: impl AsRef<Path>, stem: &str) -> Self {
        let dir = work_dir.as_ref();
        Self {
            gz: dir.join(format!("{}.csv.gz", stem)),
            csv: dir.join(format!("{}.csv", stem)),
        }
    }
}
