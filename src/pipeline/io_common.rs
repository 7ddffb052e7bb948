use std::fs;
use std::io;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use county_results::UNKNOWN_YEAR;

use crate::pipeline::REQUIRED_COLUMNS;

static LEADING_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})\d{4}(?:\D|$)").unwrap());

pub fn simplify_file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// The year of an extract, from the 8 digit date that starts its name.
pub fn year_from_filename(file_name: &str) -> String {
    LEADING_DATE
        .captures(file_name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_YEAR.to_string())
}

/// The positions of the required columns in a header, or None if one is missing.
///
/// Header names are compared after trimming, without regard to case.
pub fn required_column_indexes<'a>(
    header: impl IntoIterator<Item = &'a str>,
) -> Option<[usize; 5]> {
    let names: Vec<String> = header
        .into_iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
        .collect();
    let mut res = [0usize; 5];
    for (slot, col) in res.iter_mut().zip(REQUIRED_COLUMNS.iter()) {
        *slot = names.iter().position(|n| n == col)?;
    }
    Some(res)
}

/// Replaces the file at `path` in one step: the content goes to a temporary
/// sibling first, which is then renamed over the target.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
