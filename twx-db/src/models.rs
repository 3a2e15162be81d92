//! Query result model structs for the raw data store.
//!
//! Measures are `Option<f64>`: `None` means every contributing cell was
//! malformed (SQL `NULL`), which the aggregation layer resolves to zero.

use serde::Serialize;
use twx_core::bucket::TimeBucket;

/// Arrivals and overnight stays for one bucket.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BucketMeasures {
    pub bucket: TimeBucket,
    pub arrivals: Option<f64>,
    pub overnights: Option<f64>,
}

/// Bed count for one year.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct YearBeds {
    pub year: i32,
    pub beds: Option<f64>,
}

/// A region known to the store.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RegionInfo {
    /// Join key: trimmed, lowercased label.
    pub key: String,
    /// First label seen for the key.
    pub label: String,
}
