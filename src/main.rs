use anyhow::Result;
use clap::Parser;
use stella_catalog::{
    config::{
        PipelineConfig, DEFAULT_ARTIFACT_STEM, DEFAULT_MAG_LIMIT, DEFAULT_MIN_ARTIFACT_BYTES,
        DEFAULT_OUTPUT, DEFAULT_SOURCE_URLS, DEFAULT_TOP,
    },
    pipeline,
};
use std::{path::PathBuf, process::ExitCode, time::Duration};
use tracing::{error, info, Level};
use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "stella-catalog")]
#[command(about = "Download the HYG star catalog and build the naked-eye JSON catalog")]
#[command(version)]
struct Cli {
    /// Candidate catalog URL; repeat to build the ordered fallback list
    #[arg(long = "source")]
    sources: Vec<String>,

    /// Comma-separated candidate URLs, tried after any --source.
    /// URLs containing a comma must be passed with --source instead
    #[arg(long, env = "STELLA_SOURCES", value_delimiter = ',')]
    source_list: Vec<String>,

    /// Local .csv or .csv.gz to process instead of downloading
    #[arg(long, env = "STELLA_INPUT")]
    input: Option<PathBuf>,

    /// Directory for downloaded artifacts
    #[arg(long, env = "STELLA_WORK_DIR", default_value = ".")]
    work_dir: PathBuf,

    /// Base name of the downloaded artifacts
    #[arg(long, env = "STELLA_ARTIFACT", default_value = DEFAULT_ARTIFACT_STEM)]
    artifact: String,

    /// Output JSON file
    #[arg(short, long, env = "STELLA_OUTPUT", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Keep stars strictly brighter than this magnitude
    #[arg(long, env = "STELLA_MAG_LIMIT", default_value_t = DEFAULT_MAG_LIMIT)]
    mag_limit: f64,

    /// Downloads at or below this many bytes are treated as failures
    #[arg(long, env = "STELLA_MIN_BYTES", default_value_t = DEFAULT_MIN_ARTIFACT_BYTES)]
    min_bytes: u64,

    /// Per-source timeout in seconds
    #[arg(long, env = "STELLA_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Keep the downloaded .csv.gz after a successful run
    #[arg(long)]
    keep_artifacts: bool,

    /// Write a JSON run report here
    #[arg(long, env = "STELLA_REPORT")]
    report: Option<PathBuf>,

    /// Number of brightest stars listed in the summary
    #[arg(long, default_value_t = DEFAULT_TOP)]
    top: usize,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn into_config(self) -> PipelineConfig {
        let mut sources = self.sources;
        sources.extend(self.source_list.into_iter().filter(|s| !s.trim().is_empty()));
        if sources.is_empty() {
            sources = DEFAULT_SOURCE_URLS.iter().map(|s| s.to_string()).collect();
        }
        PipelineConfig {
            sources,
            input: self.input,
            work_dir: self.work_dir,
            artifact_stem: self.artifact,
            output: self.output,
            mag_limit: self.mag_limit,
            min_artifact_bytes: self.min_bytes,
            timeout: Duration::from_secs(self.timeout_secs),
            keep_artifacts: self.keep_artifacts,
            report: self.report,
            top: self.top,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ─── 1) init logging ─────────────────────────────────────────────
    let default_directive: Directive = cli.log_level.parse().unwrap_or(Level::INFO.into());
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default_directive));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) build config ─────────────────────────────────────────────
    let config = cli.into_config();
    info!(
        sources = config.sources.len(),
        output = %config.output.display(),
        "startup"
    );

    // ─── 3) run the pipeline ─────────────────────────────────────────
    match pipeline::run(&config).await {
        Ok(report) => {
            info!(
                stars = report.rows_retained,
                output = %report.output.display(),
                "catalog ready"
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("{:#}", anyhow::Error::from(e));
            Ok(ExitCode::FAILURE)
        }
    }
}
