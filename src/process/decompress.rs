// src/process/decompress.rs

use flate2::read::MultiGzDecoder;
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, ErrorKind, Read, Write},
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

use crate::error::{CatalogError, Result};

/// Gunzip `src` into `dst`, returning the number of decompressed bytes.
///
/// Output goes through a temporary sibling; a corrupt stream leaves no `dst`.
#[instrument(level = "info", skip_all, fields(src = %src.display()))]
pub fn gunzip_file(src: &Path, dst: &Path) -> Result<u64> {
    let input = match File::open(src) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CatalogError::MissingInputFile {
                path: src.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    let tmp = tmp_path(dst);
    let result = decode_into(src, input, &tmp);
    let bytes = match result {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
    };
    fs::rename(&tmp, dst)?;

    info!(bytes, dst = %dst.display(), "extraction complete");
    Ok(bytes)
}

fn decode_into(src: &Path, input: File, tmp: &Path) -> Result<u64> {
    let mut decoder = MultiGzDecoder::new(BufReader::new(input));
    let mut out = BufWriter::new(File::create(tmp)?);
    let mut buf = vec![0u8; 64 * 1024];
    let mut total = 0u64;

    loop {
        let n = match decoder.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(CatalogError::CorruptArtifact {
                    path: src.to_path_buf(),
                    source,
                })
            }
        };
        out.write_all(&buf[..n])?;
        total += n as u64;
    }
    out.flush()?;
    Ok(total)
}

fn tmp_path(dst: &Path) -> PathBuf {
    let mut name = dst.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
