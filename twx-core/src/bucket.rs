use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use twx_utils::buckets::{bucket_year, canonical_bucket, first_day_of_bucket, format_bucket};
use twx_utils::error::BucketError;

/// One monthly reporting period.
///
/// Always held in canonical `YYYYMmm` form, so the derived `Ord` (plain
/// string ordering) is also calendar ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeBucket(String);

impl TimeBucket {
    /// Parse any accepted bucket/date label (see [`twx_utils::buckets::parse_bucket_label`]).
    pub fn parse(label: &str) -> Result<Self, BucketError> {
        canonical_bucket(label).map(TimeBucket)
    }

    pub fn from_year_month(year: i32, month: u32) -> Result<Self, BucketError> {
        Self::parse(&format_bucket(year, month))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading year component; uses the same rule as label parsing.
    pub fn year(&self) -> i32 {
        bucket_year(&self.0).unwrap_or_default()
    }

    pub fn month(&self) -> u32 {
        self.0
            .get(5..)
            .and_then(|m| m.parse().ok())
            .unwrap_or_default()
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        first_day_of_bucket(&self.0)
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TimeBucket {
    type Err = BucketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TimeBucket {
    type Error = BucketError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TimeBucket> for String {
    fn from(value: TimeBucket) -> Self {
        value.0
    }
}
