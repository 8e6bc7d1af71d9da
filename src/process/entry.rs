// src/process/entry.rs

use serde::{Deserialize, Serialize};

use super::row::RawRow;

/// Parsecs to light years, as the front end has always displayed it.
pub const LY_PER_PARSEC: f64 = 3.26;

/// One visible star as handed to the renderer. Absent options are left out
/// of the JSON entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    /// Degrees, `[0, 360)`.
    pub ra: f64,
    pub dec: f64,
    pub mag: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist_ly: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constellation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectral: Option<String>,
}

impl CatalogEntry {
    /// Builds the entry for `row`, or `None` when the row is too faint or its
    /// coordinates are unusable. `ordinal` is the 1-based position of the row
    /// and stands in for an unreadable id. A literal id of `0` (Sol in HYG)
    /// is readable and stays `0`.
    pub fn from_row(row: &RawRow, ordinal: u64, mag_limit: f64) -> Option<Self> {
        let ra = row.ra_degrees().filter(|ra| (0.0..360.0).contains(ra))?;
        let dec = row.dec()?;
        let mag = row.mag().filter(|m| *m < mag_limit)?;

        let dist = row.dist();
        Some(Self {
            id: row.id().unwrap_or(ordinal as i64),
            ra,
            dec,
            mag,
            name: row.proper().map(str::to_string),
            dist,
            dist_ly: dist.map(light_years),
            constellation: row.con().map(str::to_string),
            spectral: row.spect().map(str::to_string),
        })
    }
}

/// `parsecs * 3.26`, one decimal place.
pub fn light_years(parsecs: f64) -> String {
    format!("{:.1}", parsecs * LY_PER_PARSEC)
}
