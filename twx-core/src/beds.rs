use crate::table::{cell, clean_headers, find_column, reader};
use anyhow::bail;
use serde::Serialize;
use twx_utils::buckets::bucket_year;
use twx_utils::numbers::parse_number;

use crate::tourism::REGION_HEADER_PATTERNS;

/// Header fragments identifying the year column.
pub const YEAR_HEADER_PATTERNS: &[&str] = &["year", "leto"];

/// Header fragments identifying the bed count column.
pub const BEDS_HEADER_PATTERNS: &[&str] = &["bed", "postelj", "capacity"];

/// Column positions of the beds table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BedSchema {
    pub region_column: usize,
    pub year_column: usize,
    pub beds_column: usize,
}

impl BedSchema {
    /// Match columns by header name, falling back to positions 0, 1, 2.
    pub fn infer(headers: &[String]) -> anyhow::Result<Self> {
        if headers.len() < 3 {
            bail!("beds header needs region, year and beds columns");
        }
        let year_column = find_column(headers, YEAR_HEADER_PATTERNS, &[]).unwrap_or(1);
        let beds_column = find_column(headers, BEDS_HEADER_PATTERNS, &[year_column]).unwrap_or(2);
        let region_column =
            find_column(headers, REGION_HEADER_PATTERNS, &[year_column, beds_column])
                .or_else(|| (0..headers.len()).find(|i| *i != year_column && *i != beds_column))
                .unwrap_or(0);
        if year_column == beds_column || region_column == year_column || region_column == beds_column {
            bail!("beds header columns are ambiguous: {:?}", headers);
        }
        Ok(BedSchema {
            region_column,
            year_column,
            beds_column,
        })
    }
}

/// Accommodation capacity of one region in one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BedRecord {
    pub region: String,
    pub year: i32,
    /// `None` when the source cell was not numeric.
    pub beds: Option<f64>,
}

impl BedRecord {
    /// Parse a beds CSV string. Rows without a region or a readable year are skipped.
    ///
    /// # Example CSV
    /// ```text
    /// MUNICIPALITIES,YEAR,BEDS
    /// Bled,2022,5400
    /// ```
    pub fn parse_beds_csv(csv_data: &str) -> anyhow::Result<Vec<BedRecord>> {
        let mut rdr = reader(csv_data);
        let headers = clean_headers(rdr.headers()?);
        let schema = BedSchema::infer(&headers)?;

        let mut records = Vec::new();
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let region = cell(&r, schema.region_column);
            let year_str = cell(&r, schema.year_column);
            let year = year_str.parse::<i32>().ok().or_else(|| bucket_year(year_str));
            let year = match year {
                Some(y) if !region.is_empty() => y,
                _ => {
                    skipped += 1;
                    continue;
                }
            };
            records.push(BedRecord {
                region: region.to_string(),
                year,
                beds: parse_number(cell(&r, schema.beds_column)),
            });
        }
        log::info!(
            "[TWX] beds: parsed {} rows, skipped {}",
            records.len(),
            skipped
        );
        Ok(records)
    }
}
