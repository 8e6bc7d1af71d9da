// src/process/filter.rs

use serde::Serialize;
use tracing::{debug, trace};

use super::{entry::CatalogEntry, row::RawRow};
use crate::output::sort_by_brightness;

/// Emit a progress line every this many rows.
const PROGRESS_EVERY: u64 = 10_000;

/// Counters kept while streaming; reporting only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub rows_seen: u64,
    pub rows_retained: u64,
    pub named: u64,
    pub with_distance: u64,
}

/// Sorted entries plus the statistics of the pass that produced them.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
    pub stats: CatalogStats,
}

/// Single-pass filter: feed rows in source order, then `finalize`.
pub struct CatalogProcessor {
    mag_limit: f64,
    entries: Vec<CatalogEntry>,
    stats: CatalogStats,
}

impl CatalogProcessor {
    pub fn new(mag_limit: f64) -> Self {
        Self {
            mag_limit,
            entries: Vec::new(),
            stats: CatalogStats::default(),
        }
    }

    pub fn process_row(&mut self, row: &RawRow) {
        self.stats.rows_seen += 1;
        let ordinal = self.stats.rows_seen;

        match CatalogEntry::from_row(row, ordinal, self.mag_limit) {
            Some(entry) => {
                self.stats.rows_retained += 1;
                if entry.name.is_some() {
                    self.stats.named += 1;
                }
                if entry.dist.is_some() {
                    self.stats.with_distance += 1;
                }
                self.entries.push(entry);
            }
            None => trace!(row = ordinal, "dropped"),
        }

        self.report_progress();
    }

    /// Counts a record the reader could not decode. It is dropped like any
    /// other unusable row.
    pub fn skip_malformed(&mut self) {
        self.stats.rows_seen += 1;
        trace!(row = self.stats.rows_seen, "undecodable record dropped");
        self.report_progress();
    }

    pub fn finalize(self) -> Catalog {
        let mut entries = self.entries;
        sort_by_brightness(&mut entries);
        Catalog {
            entries,
            stats: self.stats,
        }
    }

    fn report_progress(&self) {
        if self.stats.rows_seen % PROGRESS_EVERY == 0 {
            debug!(
                "processed {} rows, found {} visible stars",
                self.stats.rows_seen, self.stats.rows_retained
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, ra: &str, mag: &str) -> RawRow {
        RawRow {
            id: Some(id.into()),
            ra: Some(ra.into()),
            dec: Some("1".into()),
            mag: Some(mag.into()),
            ..Default::default()
        }
    }

    #[test]
    fn keeps_visible_rows_and_counts_everything() {
        let mut p = CatalogProcessor::new(6.5);
        p.process_row(&row("1", "1", "2.0"));
        p.process_row(&row("2", "1", "7.0"));
        p.skip_malformed();
        let mut named = row("4", "300", "0.5");
        named.proper = Some("Vega".into());
        named.dist = Some("7.68".into());
        p.process_row(&named);

        let catalog = p.finalize();
        assert_eq!(
            catalog.stats,
            CatalogStats {
                rows_seen: 4,
                rows_retained: 2,
                named: 1,
                with_distance: 1,
            }
        );
        let ids: Vec<_> = catalog.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![4, 1]);
    }

    #[test]
    fn ordinal_counts_dropped_rows_too() {
        let mut p = CatalogProcessor::new(6.5);
        p.process_row(&row("x", "1", "9"));
        p.skip_malformed();
        p.process_row(&row("x", "1", "1"));
        let catalog = p.finalize();
        assert_eq!(catalog.entries.len(), 1);
        assert_eq!(catalog.entries[0].id, 3);
    }

    #[test]
    fn equal_magnitudes_keep_encounter_order() {
        let mut p = CatalogProcessor::new(6.5);
        for id in ["10", "11", "12"] {
            p.process_row(&row(id, "1", "3.0"));
        }
        p.process_row(&row("13", "1", "1.0"));
        let ids: Vec<_> = p.finalize().entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![13, 10, 11, 12]);
    }
}
