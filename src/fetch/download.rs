// src/fetch/download.rs

use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt, time::Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::sources::{CandidateList, Compression, SourceCandidate};
use crate::{
    config::ArtifactPaths,
    error::{CatalogError, Result},
};

/// Log download progress every this many bytes.
const PROGRESS_STEP: u64 = 4 * 1024 * 1024;

/// The artifact produced by the first candidate that worked.
#[derive(Debug, Clone)]
pub struct Acquired {
    pub url: Url,
    pub path: PathBuf,
    pub compression: Compression,
    pub bytes: u64,
}

/// Why a single candidate was abandoned. Never escapes `acquire`.
#[derive(Error, Debug)]
enum AttemptError {
    #[error("HTTP status {0}")]
    Status(StatusCode),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("payload too small ({bytes} bytes, need more than {min})")]
    TooSmall { bytes: u64, min: u64 },
    #[error("writing artifact: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP client shared by all attempts; `timeout` bounds each request end to end.
///
/// This is a total limit, not an idle one, so it must cover the whole body
/// transfer on a slow link.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(format!("stella-catalog/{}", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Try every candidate in order and keep the first complete, large-enough download.
///
/// Gzip candidates land on `artifacts.gz`, plain ones on `artifacts.csv`.
/// A failed attempt leaves nothing behind on disk.
#[instrument(level = "info", skip_all, fields(candidates = candidates.len()))]
pub async fn acquire(
    client: &Client,
    candidates: &CandidateList,
    artifacts: &ArtifactPaths,
    min_bytes: u64,
) -> Result<Acquired> {
    for (idx, candidate) in candidates.iter().enumerate() {
        let attempt = idx + 1;
        let dest = match candidate.compression {
            Compression::Gzip => &artifacts.gz,
            Compression::Plain => &artifacts.csv,
        };

        info!(attempt, url = %candidate, "downloading");
        let start = Instant::now();
        match download_candidate(client, candidate, dest, min_bytes).await {
            Ok(bytes) => {
                info!(attempt, bytes, elapsed = ?start.elapsed(), path = %dest.display(), "downloaded");
                return Ok(Acquired {
                    url: candidate.url.clone(),
                    path: dest.clone(),
                    compression: candidate.compression,
                    bytes,
                });
            }
            Err(reason) => {
                warn!(attempt, url = %candidate, %reason, "source failed, trying next");
            }
        }
    }

    Err(CatalogError::SourceExhausted {
        attempts: candidates.len(),
    })
}

async fn download_candidate(
    client: &Client,
    candidate: &SourceCandidate,
    dest: &Path,
    min_bytes: u64,
) -> std::result::Result<u64, AttemptError> {
    let part = part_path(dest);
    match stream_to_file(client, candidate, &part, min_bytes).await {
        Ok(bytes) => {
            if let Err(e) = fs::rename(&part, dest).await {
                let _ = fs::remove_file(&part).await;
                return Err(e.into());
            }
            Ok(bytes)
        }
        Err(e) => {
            let _ = fs::remove_file(&part).await;
            Err(e)
        }
    }
}

async fn stream_to_file(
    client: &Client,
    candidate: &SourceCandidate,
    part: &Path,
    min_bytes: u64,
) -> std::result::Result<u64, AttemptError> {
    let resp = client.get(candidate.url.clone()).send().await?;
    let status = resp.status();
    if status != StatusCode::OK {
        return Err(AttemptError::Status(status));
    }

    let total = resp.content_length();
    if let Some(parent) = part.parent() {
        fs::create_dir_all(parent).await?;
    }
    let mut file = fs::File::create(part).await?;

    let mut stream = resp.bytes_stream();
    let mut downloaded = 0u64;
    let mut next_report = PROGRESS_STEP;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;

        if downloaded >= next_report {
            next_report += PROGRESS_STEP;
            match total {
                Some(total) if total > 0 => debug!(
                    "progress: {:.1}% ({:.1} MB)",
                    downloaded as f64 / total as f64 * 100.0,
                    downloaded as f64 / 1_048_576.0
                ),
                _ => debug!("progress: {:.1} MB", downloaded as f64 / 1_048_576.0),
            }
        }
    }
    file.flush().await?;

    if downloaded <= min_bytes {
        return Err(AttemptError::TooSmall {
            bytes: downloaded,
            min: min_bytes,
        });
    }
    Ok(downloaded)
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
