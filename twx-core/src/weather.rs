//! Weather observations of a single station.
//!
//! Station files are already scoped to one station, so no station column is
//! required. The schema is inferred from the header plus the first data row:
//! the date column is found by name (or by being the first parseable date),
//! and every other column whose first value is numeric becomes a selectable
//! attribute.

use crate::bucket::TimeBucket;
use crate::table::{cell, clean_headers, find_column, reader};
use anyhow::{anyhow, bail};
use serde::Serialize;
use std::collections::BTreeMap;
use twx_utils::numbers::parse_number;

/// Header fragments identifying the date/month column.
pub const DATE_HEADER_PATTERNS: &[&str] = &["date", "month", "datum", "time", "period", "mesec"];

/// Header fragments of identity columns that are never attributes, even when numeric.
pub const STATION_HEADER_PATTERNS: &[&str] = &["station", "postaj"];

/// Attribute name and its column position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeColumn {
    pub name: String,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSchema {
    pub date_column: usize,
    /// Numeric attributes in header order.
    pub attributes: Vec<AttributeColumn>,
}

impl WeatherSchema {
    /// Infer the schema from cleaned headers and the first data row.
    pub fn infer(headers: &[String], first_row: &csv::StringRecord) -> anyhow::Result<Self> {
        let date_column = find_column(headers, DATE_HEADER_PATTERNS, &[])
            .or_else(|| (0..headers.len()).find(|i| TimeBucket::parse(cell(first_row, *i)).is_ok()))
            .ok_or_else(|| anyhow!("weather table has no date column"))?;

        let attributes: Vec<AttributeColumn> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != date_column)
            .filter(|(_, h)| !is_identity_header(h))
            .filter(|(i, _)| parse_number(cell(first_row, *i)).is_some())
            .map(|(i, h)| AttributeColumn {
                name: h.clone(),
                column: i,
            })
            .collect();

        if attributes.is_empty() {
            bail!("weather table has no numeric attribute columns");
        }
        Ok(WeatherSchema {
            date_column,
            attributes,
        })
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes.iter().map(|a| a.name.clone()).collect()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }
}

fn is_identity_header(header: &str) -> bool {
    let lower = header.trim().to_lowercase();
    lower == "id" || lower == "wmo" || twx_utils::names::header_matches(&lower, STATION_HEADER_PATTERNS)
}

/// One row of a station file. Only numeric attribute values are kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherObservation {
    /// Date text as it appeared in the source.
    pub label: String,
    pub bucket: TimeBucket,
    pub attributes: BTreeMap<String, f64>,
}

impl WeatherObservation {
    pub fn value(&self, attribute: &str) -> Option<f64> {
        self.attributes.get(attribute).copied()
    }
}

/// All observations of one station, sorted by bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationObservations {
    pub station_id: String,
    pub schema: WeatherSchema,
    pub observations: Vec<WeatherObservation>,
}

impl StationObservations {
    /// Parse a station CSV string.
    ///
    /// # Example CSV
    /// ```text
    /// station,date,tavg,precipitation
    /// Ljubljana,2021-02-01,3.4,41.0
    /// ```
    pub fn parse_csv(station_id: &str, csv_data: &str) -> anyhow::Result<Self> {
        let mut rdr = reader(csv_data);
        let headers = clean_headers(rdr.headers()?);
        let rows = rdr.records().collect::<Result<Vec<_>, _>>()?;
        let first_row = rows
            .first()
            .ok_or_else(|| anyhow!("weather table for station {} is empty", station_id))?;
        let schema = WeatherSchema::infer(&headers, first_row)?;

        let mut observations = Vec::with_capacity(rows.len());
        let mut skipped = 0u32;
        for r in &rows {
            let label = cell(r, schema.date_column);
            let bucket = match TimeBucket::parse(label) {
                Ok(b) => b,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            let attributes = schema
                .attributes
                .iter()
                .filter_map(|a| parse_number(cell(r, a.column)).map(|v| (a.name.clone(), v)))
                .collect();
            observations.push(WeatherObservation {
                label: label.to_string(),
                bucket,
                attributes,
            });
        }
        observations.sort_by(|a, b| a.bucket.cmp(&b.bucket));

        log::info!(
            "[TWX] weather: station {} parsed {} rows, {} attributes, skipped {}",
            station_id,
            observations.len(),
            schema.attributes.len(),
            skipped
        );
        Ok(StationObservations {
            station_id: station_id.to_string(),
            schema,
            observations,
        })
    }

    /// Attributes discovered from the numeric fields of the first row.
    pub fn attributes_available(&self) -> Vec<String> {
        self.schema.attribute_names()
    }
}
