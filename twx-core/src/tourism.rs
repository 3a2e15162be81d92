//! Monthly tourism indicators: arrivals and overnight stays per region,
//! bucket and country of origin.
//!
//! The table is wide: one row per (region, bucket) and two columns per
//! country, suffixed `(Arrivals)` and `(Overnight stays)`. The country set is
//! discovered from those suffixes rather than enumerated.

use crate::bucket::TimeBucket;
use crate::table::{cell, clean_headers, find_column, reader};
use anyhow::bail;
use serde::Serialize;
use std::collections::BTreeMap;
use twx_utils::numbers::parse_number;

/// Header suffix of per-country arrivals columns.
pub const ARRIVALS_SUFFIX: &str = "(Arrivals)";

/// Header suffix of per-country overnight-stay columns.
pub const OVERNIGHTS_SUFFIX: &str = "(Overnight stays)";

/// Header fragments identifying the region label column.
pub const REGION_HEADER_PATTERNS: &[&str] = &["municipal", "region", "občin", "obcin", "name"];

/// Header fragments identifying the bucket label column.
pub const BUCKET_HEADER_PATTERNS: &[&str] = &["month", "bucket", "period", "mesec", "date"];

/// Column positions of one discovered country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryColumns {
    pub country: String,
    pub arrivals: Option<usize>,
    pub overnights: Option<usize>,
}

/// Typed schema inferred once from the tourism table header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TourismSchema {
    pub region_column: usize,
    pub bucket_column: usize,
    /// Countries in header order.
    pub countries: Vec<CountryColumns>,
}

impl TourismSchema {
    /// Infer the schema from cleaned header cells.
    pub fn infer(headers: &[String]) -> anyhow::Result<Self> {
        let mut countries: Vec<CountryColumns> = Vec::new();
        let mut measure_columns = Vec::new();

        for (i, header) in headers.iter().enumerate() {
            let (country, is_arrivals) = if let Some(c) = header.strip_suffix(ARRIVALS_SUFFIX) {
                (c.trim(), true)
            } else if let Some(c) = header.strip_suffix(OVERNIGHTS_SUFFIX) {
                (c.trim(), false)
            } else {
                continue;
            };
            measure_columns.push(i);

            let idx = match countries.iter().position(|c| c.country == country) {
                Some(idx) => idx,
                None => {
                    countries.push(CountryColumns {
                        country: country.to_string(),
                        arrivals: None,
                        overnights: None,
                    });
                    countries.len() - 1
                }
            };
            if is_arrivals {
                countries[idx].arrivals = Some(i);
            } else {
                countries[idx].overnights = Some(i);
            }
        }

        if countries.is_empty() {
            bail!(
                "no '{}' or '{}' columns in tourism header",
                ARRIVALS_SUFFIX,
                OVERNIGHTS_SUFFIX
            );
        }

        let label_columns: Vec<usize> = (0..headers.len())
            .filter(|i| !measure_columns.contains(i))
            .collect();
        if label_columns.len() < 2 {
            bail!("tourism header needs a region column and a bucket column");
        }

        let region_column = find_column(headers, REGION_HEADER_PATTERNS, &measure_columns)
            .unwrap_or(label_columns[0]);
        let mut taken = measure_columns.clone();
        taken.push(region_column);
        let bucket_column = find_column(headers, BUCKET_HEADER_PATTERNS, &taken)
            .or_else(|| label_columns.iter().copied().find(|i| *i != region_column))
            .unwrap_or(label_columns[1]);

        Ok(TourismSchema {
            region_column,
            bucket_column,
            countries,
        })
    }

    pub fn country_names(&self) -> Vec<String> {
        self.countries.iter().map(|c| c.country.clone()).collect()
    }
}

/// One (region, bucket) row. Malformed numeric cells are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TourismRecord {
    pub region: String,
    pub bucket: TimeBucket,
    pub arrivals_by_country: BTreeMap<String, Option<f64>>,
    pub overnights_by_country: BTreeMap<String, Option<f64>>,
}

/// Parsed tourism table with its inferred schema.
#[derive(Debug, Clone)]
pub struct TourismTable {
    pub schema: TourismSchema,
    pub records: Vec<TourismRecord>,
    /// Rows dropped for a missing region or an unparseable bucket.
    pub skipped: usize,
}

impl TourismTable {
    /// Parse a tourism CSV string.
    ///
    /// # Example CSV
    /// ```text
    /// MUNICIPALITIES,MONTH,Germany (Arrivals),Germany (Overnight stays)
    /// Ajdovščina,2021M02,10,20
    /// ```
    pub fn parse_csv(csv_data: &str) -> anyhow::Result<Self> {
        let mut rdr = reader(csv_data);
        let headers = clean_headers(rdr.headers()?);
        let schema = TourismSchema::infer(&headers)?;

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for result in rdr.records() {
            let r = result?;
            let region = cell(&r, schema.region_column);
            let bucket = match TimeBucket::parse(cell(&r, schema.bucket_column)) {
                Ok(b) => b,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            if region.is_empty() {
                skipped += 1;
                continue;
            }

            let mut arrivals_by_country = BTreeMap::new();
            let mut overnights_by_country = BTreeMap::new();
            for columns in &schema.countries {
                let arrivals = columns.arrivals.and_then(|i| parse_number(cell(&r, i)));
                let overnights = columns.overnights.and_then(|i| parse_number(cell(&r, i)));
                arrivals_by_country.insert(columns.country.clone(), arrivals);
                overnights_by_country.insert(columns.country.clone(), overnights);
            }

            records.push(TourismRecord {
                region: region.to_string(),
                bucket,
                arrivals_by_country,
                overnights_by_country,
            });
        }

        log::info!(
            "[TWX] tourism: parsed {} rows, {} countries, skipped {}",
            records.len(),
            schema.countries.len(),
            skipped
        );
        Ok(TourismTable {
            schema,
            records,
            skipped,
        })
    }
}
