// src/output.rs

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

use crate::{
    error::{CatalogError, Result},
    process::CatalogEntry,
};

/// Brightest first. `sort_by` is stable, so equal magnitudes keep encounter order.
pub fn sort_by_brightness(entries: &mut [CatalogEntry]) {
    entries.sort_by(|a, b| a.mag.total_cmp(&b.mag));
}

/// Pretty-printed JSON array (two-space indent) followed by a newline.
pub fn to_writer<W: Write>(mut writer: W, entries: &[CatalogEntry]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, entries)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write atomically: to a hidden tmp file next to `path`, then rename over it.
#[instrument(level = "info", skip_all, fields(path = %path.display(), entries = entries.len()))]
pub fn write_catalog(path: &Path, entries: &[CatalogEntry]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = tmp_path(path);
    let written = File::create(&tmp_path)
        .map_err(CatalogError::from)
        .and_then(|f| to_writer(BufWriter::new(f), entries));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    fs::rename(&tmp_path, path)?;

    info!("wrote catalog");
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "catalog.json".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}
