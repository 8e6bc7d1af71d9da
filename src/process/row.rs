// src/process/row.rs

use serde::Deserialize;

/// One catalog record, keyed by header name. Unused columns are ignored and
/// empty cells come through as `None`.
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
pub struct RawRow {
    pub id: Option<String>,
    pub ra: Option<String>,
    pub dec: Option<String>,
    pub mag: Option<String>,
    pub proper: Option<String>,
    pub dist: Option<String>,
    pub con: Option<String>,
    pub spect: Option<String>,
}

impl RawRow {
    /// Right ascension in degrees, after the hours heuristic.
    pub fn ra_degrees(&self) -> Option<f64> {
        self.ra.as_deref().and_then(leading_float).map(normalize_ra)
    }

    pub fn dec(&self) -> Option<f64> {
        self.dec.as_deref().and_then(leading_float)
    }

    pub fn mag(&self) -> Option<f64> {
        self.mag.as_deref().and_then(leading_float)
    }

    pub fn id(&self) -> Option<i64> {
        self.id.as_deref().and_then(leading_int)
    }

    /// Distance in parsecs, only when strictly positive.
    pub fn dist(&self) -> Option<f64> {
        self.dist
            .as_deref()
            .and_then(leading_float)
            .filter(|d| *d > 0.0)
    }

    pub fn proper(&self) -> Option<&str> {
        non_empty(&self.proper)
    }

    pub fn con(&self) -> Option<&str> {
        non_empty(&self.con)
    }

    pub fn spect(&self) -> Option<&str> {
        non_empty(&self.spect)
    }
}

/// Values below 24 are hours and get scaled to degrees; anything else is
/// taken as degrees already. A degree value under 24 is misread as hours.
pub fn normalize_ra(ra: f64) -> f64 {
    if ra < 24.0 {
        ra * 15.0
    } else {
        ra
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Reads the longest decimal number at the start of `raw` (after leading
/// whitespace) and ignores whatever follows. `None` when there is no number
/// or it is not finite.
pub fn leading_float(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let b = s.as_bytes();
    let mut end = 0;

    if end < b.len() && (b[end] == b'+' || b[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < b.len() && b[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < b.len() && b[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < b.len() && b[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < b.len() && (b[end] == b'e' || b[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < b.len() && (b[exp_end] == b'+' || b[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < b.len() && b[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reads the signed integer at the start of `raw`, ignoring the rest.
pub fn leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let b = s.as_bytes();
    let mut end = 0;
    if end < b.len() && (b[end] == b'+' || b[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < b.len() && b[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    s[..end].parse().ok()
}
