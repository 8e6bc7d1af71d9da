// src/fetch/sources.rs

use std::fmt;
use url::Url;

use crate::error::{CatalogError, Result};

/// How the bytes behind a candidate are encoded, judged by the URL path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Plain,
}

impl Compression {
    pub fn from_path(path: &str) -> Self {
        if path.to_ascii_lowercase().ends_with(".gz") {
            Compression::Gzip
        } else {
            Compression::Plain
        }
    }
}

/// A single place the catalog might be downloaded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceCandidate {
    pub url: Url,
    pub compression: Compression,
}

impl SourceCandidate {
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw.trim()).map_err(|e| CatalogError::InvalidSource {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CatalogError::InvalidSource {
                url: raw.to_string(),
                reason: format!("unsupported scheme `{}`", url.scheme()),
            });
        }
        let compression = Compression::from_path(url.path());
        Ok(Self { url, compression })
    }
}

impl fmt::Display for SourceCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.url.fmt(f)
    }
}

/// Ordered candidates. Iteration yields them in configured order; acquisition
/// walks them one at a time and stops at the first that works.
#[derive(Clone, Debug, Default)]
pub struct CandidateList {
    candidates: Vec<SourceCandidate>,
}

impl CandidateList {
    pub fn parse<S: AsRef<str>>(urls: &[S]) -> Result<Self> {
        let candidates = urls
            .iter()
            .map(|u| SourceCandidate::parse(u.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { candidates })
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SourceCandidate> {
        self.candidates.iter()
    }
}

impl<'a> IntoIterator for &'a CandidateList {
    type Item = &'a SourceCandidate;
    type IntoIter = std::slice::Iter<'a, SourceCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
