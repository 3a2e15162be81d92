//! Shared utility functions for TWX crates.

/// Reporting-period (bucket) label helpers.
///
/// The canonical bucket label is `YYYYMmm` (e.g. `2021M02`): year-major with a
/// zero-padded month, so plain string ordering equals calendar ordering.
pub mod buckets {
    use crate::error::BucketError;
    use chrono::{Datelike, NaiveDate};

    /// Separator between year and month in a canonical bucket label.
    pub const BUCKET_SEPARATOR: char = 'M';

    /// Format a year/month pair as a canonical bucket label.
    pub fn format_bucket(year: i32, month: u32) -> String {
        format!("{:04}{}{:02}", year, BUCKET_SEPARATOR, month)
    }

    /// Canonical bucket label for the month containing `date`.
    pub fn bucket_for_date(date: &NaiveDate) -> String {
        format_bucket(date.year(), date.month())
    }

    /// Parse a bucket or date label into `(year, month)`.
    ///
    /// Accepted forms:
    /// - `2021M02` / `2021m2` (statistical office style)
    /// - `2021-02`
    /// - `2021-02-15`, `20210215`, `15.02.2021` (day is dropped)
    pub fn parse_bucket_label(s: &str) -> Result<(i32, u32), BucketError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(BucketError("empty bucket label".to_string()));
        }

        if let Some((year, month)) = s.split_once(|c: char| c == 'M' || c == 'm') {
            return year_month(year, month, s);
        }

        for format in ["%Y-%m-%d", "%Y%m%d", "%d.%m.%Y"] {
            if let Ok(date) = NaiveDate::parse_from_str(s, format) {
                return year_month_checked(date.year(), date.month(), s);
            }
        }

        if let Some((year, month)) = s.split_once('-') {
            return year_month(year, month, s);
        }

        Err(BucketError(format!("unrecognized bucket label '{}'", s)))
    }

    /// Parse any accepted label straight into its canonical form.
    pub fn canonical_bucket(s: &str) -> Result<String, BucketError> {
        let (year, month) = parse_bucket_label(s)?;
        Ok(format_bucket(year, month))
    }

    /// Year of a bucket label: the leading four-digit component.
    pub fn bucket_year(label: &str) -> Option<i32> {
        let head = label.trim().get(0..4)?;
        if !head.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        head.parse().ok()
    }

    /// First calendar day of a bucket, if the label is valid.
    pub fn first_day_of_bucket(label: &str) -> Option<NaiveDate> {
        let (year, month) = parse_bucket_label(label).ok()?;
        NaiveDate::from_ymd_opt(year, month, 1)
    }

    fn year_month(year: &str, month: &str, original: &str) -> Result<(i32, u32), BucketError> {
        let year = year.trim();
        let month = month.trim();
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(BucketError(format!("malformed bucket label '{}'", original)));
        }
        let year: i32 = year
            .parse()
            .map_err(|_| BucketError(format!("bad year in '{}'", original)))?;
        let month: u32 = month
            .parse()
            .map_err(|_| BucketError(format!("bad month in '{}'", original)))?;
        year_month_checked(year, month, original)
    }

    fn year_month_checked(year: i32, month: u32, original: &str) -> Result<(i32, u32), BucketError> {
        if !(1000..=9999).contains(&year) || !(1..=12).contains(&month) {
            return Err(BucketError(format!("out of range bucket '{}'", original)));
        }
        Ok((year, month))
    }

}

/// Region name helpers.
pub mod names {
    /// Join key for a region label: trimmed and lowercased.
    ///
    /// Labels coming from different source files disagree on casing and
    /// trailing whitespace, so every join goes through this key.
    pub fn region_key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// True if the lowercased `header` contains any of `patterns`.
    pub fn header_matches(header: &str, patterns: &[&str]) -> bool {
        let header = header.trim().to_lowercase();
        patterns.iter().any(|p| header.contains(p))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_region_key_ignores_case_and_whitespace() {
            assert_eq!(region_key("Ajdovščina "), region_key("ajdovščina"));
            assert_eq!(region_key("  ŠKOFJA LOKA"), "škofja loka");
        }

        #[test]
        fn test_header_matches() {
            assert!(header_matches("MUNICIPALITIES", &["municipal"]));
            assert!(!header_matches("MONTH", &["municipal", "region"]));
        }
    }
}

/// Numeric coercion helpers.
pub mod numbers {
    /// Parse a table cell as a number.
    ///
    /// Spaces (including non-breaking) used as thousands separators are
    /// ignored. Anything else that is not a finite number yields `None`.
    pub fn parse_number(s: &str) -> Option<f64> {
        let cleaned: String = s
            .trim()
            .chars()
            .filter(|c| *c != ' ' && *c != '\u{a0}')
            .collect();
        if cleaned.is_empty() {
            return None;
        }
        cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// `numerator / denominator`, or 0 when the denominator is not positive.
    pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
        if denominator > 0.0 {
            let ratio = numerator / denominator;
            if ratio.is_finite() {
                return ratio;
            }
        }
        0.0
    }

}

/// Error types
pub mod error {
    use std::fmt;

    #[derive(Debug, Clone, PartialEq)]
    pub struct BucketError(pub String);

    impl fmt::Display for BucketError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Bucket error: {}", self.0)
        }
    }

    impl std::error::Error for BucketError {}
}
