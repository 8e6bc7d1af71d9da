// src/pipeline.rs

use chrono::Utc;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tokio::task;
use tracing::{info, instrument, warn};

use crate::{
    config::{ArtifactPaths, PipelineConfig},
    error::{CatalogError, Result},
    fetch::{acquire, build_client, CandidateList, Compression},
    output::write_catalog,
    process::{decompress::gunzip_file, process_csv_file},
    report::{log_summary, RunReport},
};

/// The plain CSV a run will parse, and where it came from.
#[derive(Debug, Clone)]
struct ResolvedCsv {
    csv: PathBuf,
    source: String,
    artifact_bytes: u64,
}

/// One full run: acquire, decompress, filter, sort, write.
///
/// Nothing is written to `config.output` unless every earlier stage succeeded.
#[instrument(level = "info", skip_all, fields(output = %config.output.display()))]
pub async fn run(config: &PipelineConfig) -> Result<RunReport> {
    let started_at = Utc::now();
    let artifacts = config.artifacts();

    let resolved = resolve_csv(config, &artifacts).await?;

    info!(csv = %resolved.csv.display(), "processing stars");
    let catalog = task::spawn_blocking({
        let csv = resolved.csv.clone();
        let mag_limit = config.mag_limit;
        move || process_csv_file(&csv, mag_limit)
    })
    .await??;

    write_catalog(&config.output, &catalog.entries)?;

    if config.input.is_none() && !config.keep_artifacts {
        remove_artifact(&artifacts.gz);
    }

    let report = RunReport::new(
        resolved.source,
        resolved.artifact_bytes,
        catalog.stats,
        config.mag_limit,
        config.output.clone(),
        started_at,
    );
    log_summary(&report, &catalog.entries, config.top);

    if let Some(path) = &config.report {
        report.write(path)?;
        info!(path = %path.display(), "wrote run report");
    }

    Ok(report)
}

/// Local input first, then an existing CSV, then an existing archive, and
/// only then the network.
async fn resolve_csv(config: &PipelineConfig, artifacts: &ArtifactPaths) -> Result<ResolvedCsv> {
    if let Some(input) = &config.input {
        return resolve_local(input, artifacts).await;
    }

    if artifacts.csv.exists() {
        info!(path = %artifacts.csv.display(), "found existing catalog, skipping download");
        return Ok(ResolvedCsv {
            csv: artifacts.csv.clone(),
            source: artifacts.csv.display().to_string(),
            artifact_bytes: fs::metadata(&artifacts.csv)?.len(),
        });
    }

    let (source, artifact_bytes) = if artifacts.gz.exists() {
        info!(path = %artifacts.gz.display(), "found existing archive, skipping download");
        (
            artifacts.gz.display().to_string(),
            fs::metadata(&artifacts.gz)?.len(),
        )
    } else {
        let candidates = CandidateList::parse(&config.sources)?;
        let client = build_client(config.timeout)?;
        let acquired = acquire(&client, &candidates, artifacts, config.min_artifact_bytes).await?;
        if acquired.compression == Compression::Plain {
            return Ok(ResolvedCsv {
                csv: acquired.path,
                source: acquired.url.to_string(),
                artifact_bytes: acquired.bytes,
            });
        }
        (acquired.url.to_string(), acquired.bytes)
    };

    gunzip_blocking(artifacts.gz.clone(), artifacts.csv.clone()).await?;
    Ok(ResolvedCsv {
        csv: artifacts.csv.clone(),
        source,
        artifact_bytes,
    })
}

async fn resolve_local(input: &Path, artifacts: &ArtifactPaths) -> Result<ResolvedCsv> {
    let meta = match fs::metadata(input) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CatalogError::MissingInputFile {
                path: input.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };
    let source = input.display().to_string();

    let is_gzip = Compression::from_path(&input.to_string_lossy()) == Compression::Gzip;
    if !is_gzip {
        info!(path = %source, "using local catalog");
        return Ok(ResolvedCsv {
            csv: input.to_path_buf(),
            source,
            artifact_bytes: meta.len(),
        });
    }

    info!(path = %source, "using local archive");
    gunzip_blocking(input.to_path_buf(), artifacts.csv.clone()).await?;
    Ok(ResolvedCsv {
        csv: artifacts.csv.clone(),
        source,
        artifact_bytes: meta.len(),
    })
}

async fn gunzip_blocking(src: PathBuf, dst: PathBuf) -> Result<u64> {
    if let Some(parent) = dst.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    task::spawn_blocking(move || gunzip_file(&src, &dst)).await?
}

fn remove_artifact(path: &Path) {
    if !path.exists() {
        return;
    }
    match fs::remove_file(path) {
        Ok(()) => info!(path = %path.display(), "removed temporary archive"),
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove archive"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression as GzLevel};
    use std::io::Write;
    use tempfile::tempdir;

    const CSV: &str = "id,proper,ra,dec,dist,mag,con,spect\n\
        1,Rigel,5.242298,-8.20164,264.5503,0.180,Ori,B8Ia\n\
        2,,3.0,10.0,,8.000,,\n\
        3,Capella,5.278155,45.99799,13.1234,0.080,Aur,G6III\n";

    fn config_in(dir: &Path) -> PipelineConfig {
        PipelineConfig {
            sources: Vec::new(),
            work_dir: dir.to_path_buf(),
            output: dir.join("stella_stars.json"),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn existing_csv_skips_network() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let config = config_in(dir.path());
        fs::write(&config.artifacts().csv, CSV)?;

        let report = run(&config).await?;
        assert_eq!(report.rows_seen, 3);
        assert_eq!(report.rows_retained, 2);

        let text = fs::read_to_string(&config.output)?;
        let names: Vec<String> = serde_json::from_str::<Vec<serde_json::Value>>(&text)?
            .iter()
            .map(|v| v["name"].as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(names, vec!["Capella", "Rigel"]);
        Ok(())
    }

    #[tokio::test]
    async fn existing_archive_is_extracted_then_removed() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let config = config_in(dir.path());
        let artifacts = config.artifacts();
        let mut enc = GzEncoder::new(fs::File::create(&artifacts.gz)?, GzLevel::default());
        enc.write_all(CSV.as_bytes())?;
        enc.finish()?;

        let report = run(&config).await?;
        assert_eq!(report.rows_retained, 2);
        assert!(artifacts.csv.exists());
        assert!(!artifacts.gz.exists());
        assert!(config.output.exists());
        Ok(())
    }

    #[tokio::test]
    async fn keep_artifacts_leaves_archive() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let config = PipelineConfig {
            keep_artifacts: true,
            ..config_in(dir.path())
        };
        let artifacts = config.artifacts();
        let mut enc = GzEncoder::new(fs::File::create(&artifacts.gz)?, GzLevel::default());
        enc.write_all(CSV.as_bytes())?;
        enc.finish()?;

        run(&config).await?;
        assert!(artifacts.gz.exists());
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_archive_aborts_without_output() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let config = config_in(dir.path());
        fs::write(&config.artifacts().gz, b"definitely not gzip")?;

        let err = run(&config).await.unwrap_err();
        assert!(matches!(err, CatalogError::CorruptArtifact { .. }));
        assert!(!config.output.exists());
        Ok(())
    }

    #[tokio::test]
    async fn missing_local_input_is_reported() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let config = PipelineConfig {
            input: Some(dir.path().join("nowhere.csv")),
            ..config_in(dir.path())
        };
        let err = run(&config).await.unwrap_err();
        assert!(matches!(err, CatalogError::MissingInputFile { .. }));
        assert!(!config.output.exists());
        Ok(())
    }

    #[tokio::test]
    async fn local_input_is_never_deleted() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let input = dir.path().join("mine.csv.gz");
        let mut enc = GzEncoder::new(fs::File::create(&input)?, GzLevel::default());
        enc.write_all(CSV.as_bytes())?;
        enc.finish()?;

        let config = PipelineConfig {
            input: Some(input.clone()),
            report: Some(dir.path().join("report.json")),
            ..config_in(dir.path())
        };
        let report = run(&config).await?;
        assert!(input.exists());
        assert_eq!(report.source, input.display().to_string());
        assert!(dir.path().join("report.json").exists());
        Ok(())
    }
}
