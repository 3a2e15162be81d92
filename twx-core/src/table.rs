//! CSV reading helpers shared by the tourism, bed and weather parsers.

use csv::{Reader, ReaderBuilder, StringRecord};

/// Pick `;` when the header line uses it more than `,`.
///
/// Statistical-office exports with localized settings are semicolon separated.
pub fn sniff_delimiter(csv_data: &str) -> u8 {
    let header = csv_data.lines().next().unwrap_or("");
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// A flexible, headered reader over an in-memory CSV string.
pub fn reader(csv_data: &str) -> Reader<&[u8]> {
    ReaderBuilder::new()
        .delimiter(sniff_delimiter(csv_data))
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes())
}

/// Header cells with byte-order mark and surrounding whitespace removed.
pub fn clean_headers(headers: &StringRecord) -> Vec<String> {
    headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect()
}

/// Index of the first header (not in `exclude`) matching any of `patterns`.
pub fn find_column(headers: &[String], patterns: &[&str], exclude: &[usize]) -> Option<usize> {
    headers
        .iter()
        .enumerate()
        .filter(|(i, _)| !exclude.contains(i))
        .find(|(_, h)| twx_utils::names::header_matches(h, patterns))
        .map(|(i, _)| i)
}

/// Trimmed cell value, empty when the row is short.
pub fn cell<'a>(record: &'a StringRecord, index: usize) -> &'a str {
    record.get(index).unwrap_or("").trim()
}
