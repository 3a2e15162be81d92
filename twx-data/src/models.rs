//! Derived datasets handed to the rendering collaborator.
//!
//! All structs derive `Serialize`; none carry rendering-specific fields
//! beyond the group colour.

use crate::palette::color_for;
use crate::state::Layer;
use serde::Serialize;
use std::collections::BTreeSet;
use twx_core::bucket::TimeBucket;
use twx_utils::numbers::ratio_or_zero;

/// Key of the aggregate pseudo-region shown when nothing is selected.
pub const COMBINED_KEY: &str = "combined";

/// Display label of the aggregate pseudo-region.
pub const COMBINED_LABEL: &str = "All regions";

/// Tourism measures of one group at one bucket.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DerivedSeriesPoint {
    /// Region key, or [`COMBINED_KEY`].
    pub region: String,
    pub bucket: TimeBucket,
    pub arrivals: f64,
    pub overnights: f64,
    /// `overnights / arrivals`, 0 when there were no arrivals.
    pub average_stay: f64,
}

impl DerivedSeriesPoint {
    pub fn new(region: &str, bucket: TimeBucket, arrivals: f64, overnights: f64) -> Self {
        Self {
            region: region.to_string(),
            bucket,
            arrivals,
            overnights,
            average_stay: ratio_or_zero(overnights, arrivals),
        }
    }
}

/// One line of the tourism chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SeriesGroup {
    pub key: String,
    pub label: String,
    pub color: &'static str,
    pub points: Vec<DerivedSeriesPoint>,
}

impl SeriesGroup {
    pub fn new(key: &str, label: &str, points: Vec<DerivedSeriesPoint>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            color: color_for(key),
            points,
        }
    }
}

/// Beds of one group in one year.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DerivedBedPoint {
    pub region: String,
    pub year: i32,
    pub beds: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BedGroup {
    pub key: String,
    pub label: String,
    pub color: &'static str,
    pub points: Vec<DerivedBedPoint>,
}

impl BedGroup {
    pub fn new(key: &str, label: &str, points: Vec<DerivedBedPoint>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            color: color_for(key),
            points,
        }
    }

    /// Beds in `year`, 0 when the group has no point for it.
    pub fn beds_in(&self, year: i32) -> f64 {
        self.points
            .iter()
            .find(|p| p.year == year)
            .map(|p| p.beds)
            .unwrap_or(0.0)
    }
}

/// One numeric weather value of the active station.
///
/// Daily files yield several points per bucket, told apart by `label`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeatherPoint {
    pub bucket: TimeBucket,
    /// Date text from the station file.
    pub label: String,
    pub value: f64,
}

/// Bed total of one year inside a brushed range.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct YearTotal {
    pub year: i32,
    pub beds: f64,
}

/// Brush summary of one group.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RangeSummary {
    pub key: String,
    pub label: String,
    pub arrivals: f64,
    pub overnights: f64,
    /// Sum-then-divide over the range, 0 without arrivals.
    pub average_stay: f64,
    /// Beds per year spanned by the brushed buckets, ascending.
    pub beds_by_year: Vec<YearTotal>,
}

/// Everything the chart needs after one state change.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DerivedView {
    pub country: String,
    pub layers: BTreeSet<Layer>,
    pub tourism: Vec<SeriesGroup>,
    pub beds: Vec<BedGroup>,
    pub station: Option<String>,
    pub attribute: Option<String>,
    /// Empty unless a station and attribute are active and loaded.
    pub weather: Vec<WeatherPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_stay_is_zero_without_arrivals() {
        let bucket = TimeBucket::parse("2021M02").unwrap();
        let point = DerivedSeriesPoint::new("b", bucket.clone(), 0.0, 5.0);
        assert_eq!(point.average_stay, 0.0);

        let point = DerivedSeriesPoint::new(COMBINED_KEY, bucket, 10.0, 25.0);
        assert!((point.average_stay - 2.5).abs() < 0.01);
    }

    #[test]
    fn beds_in_missing_year_is_zero() {
        let group = BedGroup::new(
            "c",
            "C",
            vec![DerivedBedPoint {
                region: "c".to_string(),
                year: 2021,
                beds: 40.0,
            }],
        );
        assert_eq!(group.beds_in(2021), 40.0);
        assert_eq!(group.beds_in(2022), 0.0);
    }

    #[test]
    fn view_serializes_layers_snake_case() {
        let view = DerivedView {
            country: "Total".to_string(),
            layers: BTreeSet::from([Layer::AverageStay]),
            tourism: Vec::new(),
            beds: Vec::new(),
            station: None,
            attribute: None,
            weather: Vec::new(),
        };
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"average_stay\""));
    }
}
