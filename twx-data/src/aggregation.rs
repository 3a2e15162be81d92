//! Aggregation engine: raw tables + interaction state -> derived series.
//!
//! Every function here recomputes from scratch; nothing is cached between
//! calls. Two rules shape all tourism output:
//!
//! - the earliest bucket of the raw data is a baseline period and never shown
//!   ([`DROPPED_BASELINE_BUCKETS`]);
//! - every group has exactly one point per remaining bucket, zero-filled
//!   where the source is sparse or malformed.

use crate::models::{
    BedGroup, DerivedBedPoint, DerivedSeriesPoint, DerivedView, SeriesGroup, WeatherPoint,
    COMBINED_KEY, COMBINED_LABEL,
};
use crate::state::InteractionState;
use std::collections::HashMap;
use twx_core::bucket::TimeBucket;
use twx_core::weather::StationObservations;
use twx_db::models::{BucketMeasures, RegionInfo, YearBeds};
use twx_db::Database;
use twx_utils::names::region_key;

/// Number of leading buckets excluded from every view.
///
/// The first reporting period is treated as an incomplete baseline. This is a
/// product rule pending confirmation, kept as a constant so it stays visible.
pub const DROPPED_BASELINE_BUCKETS: usize = 1;

/// Ascending bucket domain of the tourism table minus the baseline.
pub fn bucket_domain(db: &Database) -> anyhow::Result<Vec<TimeBucket>> {
    let buckets = db.query_buckets()?;
    Ok(buckets.into_iter().skip(DROPPED_BASELINE_BUCKETS).collect())
}

/// Selected regions that exist in the raw data, in selection order.
///
/// Unknown names are dropped here, so selecting only unknown names behaves
/// like an empty selection.
pub fn active_regions(
    db: &Database,
    state: &InteractionState,
) -> anyhow::Result<Vec<RegionInfo>> {
    let mut regions: Vec<RegionInfo> = Vec::new();
    for name in state.selected_regions() {
        let key = region_key(name);
        if regions.iter().any(|r| r.key == key) {
            continue;
        }
        match db.query_region(&key)? {
            Some(region) => regions.push(region),
            None => log::debug!("[TWX] engine: selected region '{}' not in data", name),
        }
    }
    Ok(regions)
}

fn fill_tourism(
    region: &str,
    domain: &[TimeBucket],
    rows: Vec<BucketMeasures>,
) -> Vec<DerivedSeriesPoint> {
    let by_bucket: HashMap<TimeBucket, BucketMeasures> =
        rows.into_iter().map(|m| (m.bucket.clone(), m)).collect();
    domain
        .iter()
        .map(|bucket| {
            let measures = by_bucket.get(bucket);
            let arrivals = measures.and_then(|m| m.arrivals).unwrap_or(0.0);
            let overnights = measures.and_then(|m| m.overnights).unwrap_or(0.0);
            DerivedSeriesPoint::new(region, bucket.clone(), arrivals, overnights)
        })
        .collect()
}

fn fill_beds(region: &str, years: &[i32], rows: Vec<YearBeds>) -> Vec<DerivedBedPoint> {
    let by_year: HashMap<i32, Option<f64>> = rows.into_iter().map(|r| (r.year, r.beds)).collect();
    years
        .iter()
        .map(|year| DerivedBedPoint {
            region: region.to_string(),
            year: *year,
            beds: by_year.get(year).copied().flatten().unwrap_or(0.0),
        })
        .collect()
}

/// Tourism series for the active country.
///
/// With no (known) region selected this is a single combined group whose
/// arrivals and overnights are summed over *all* regions, with average stay
/// computed from those sums. Otherwise one group per selected region, in
/// selection order.
pub fn derive_tourism_series(
    db: &Database,
    state: &InteractionState,
) -> anyhow::Result<Vec<SeriesGroup>> {
    let domain = bucket_domain(db)?;
    let regions = active_regions(db, state)?;
    let country = state.active_country();

    if regions.is_empty() {
        let totals = db.query_total_tourism(country)?;
        let points = fill_tourism(COMBINED_KEY, &domain, totals);
        return Ok(vec![SeriesGroup::new(COMBINED_KEY, COMBINED_LABEL, points)]);
    }

    regions
        .iter()
        .map(|region| {
            let rows = db.query_region_tourism(&region.key, country)?;
            let points = fill_tourism(&region.key, &domain, rows);
            Ok(SeriesGroup::new(&region.key, &region.label, points))
        })
        .collect()
}

/// Bed series keyed by year, with the same combined-vs-per-region branching
/// as [`derive_tourism_series`].
pub fn derive_bed_series(db: &Database, state: &InteractionState) -> anyhow::Result<Vec<BedGroup>> {
    let years = db.query_bed_years()?;
    let regions = active_regions(db, state)?;

    if regions.is_empty() {
        let totals = db.query_total_beds()?;
        let points = fill_beds(COMBINED_KEY, &years, totals);
        return Ok(vec![BedGroup::new(COMBINED_KEY, COMBINED_LABEL, points)]);
    }

    regions
        .iter()
        .map(|region| {
            let rows = db.query_region_beds(&region.key)?;
            let points = fill_beds(&region.key, &years, rows);
            Ok(BedGroup::new(&region.key, &region.label, points))
        })
        .collect()
}

/// Weather values of `attribute`, skipping rows where it is missing or non-numeric.
///
/// One point per source row. Daily station files therefore repeat a bucket
/// once per day, in file order within the month; `label` keeps the date.
pub fn derive_weather_series(observations: &StationObservations, attribute: &str) -> Vec<WeatherPoint> {
    observations
        .observations
        .iter()
        .filter_map(|obs| {
            obs.value(attribute).map(|value| WeatherPoint {
                bucket: obs.bucket.clone(),
                label: obs.label.clone(),
                value,
            })
        })
        .collect()
}

/// Derive every dataset for the current state in one pass.
///
/// `station` is the loaded observation set of the active station, if any.
pub fn derive_view(
    db: &Database,
    state: &InteractionState,
    station: Option<&StationObservations>,
) -> anyhow::Result<DerivedView> {
    let weather = match (station, state.active_attribute()) {
        (Some(observations), Some(attribute)) => derive_weather_series(observations, attribute),
        _ => Vec::new(),
    };
    Ok(DerivedView {
        country: state.active_country().to_string(),
        layers: state.enabled_layers().clone(),
        tourism: derive_tourism_series(db, state)?,
        beds: derive_bed_series(db, state)?,
        station: state.active_station().map(str::to_string),
        attribute: state.active_attribute().map(str::to_string),
        weather,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOURISM_CSV: &str = "\
MUNICIPALITIES,MONTH,X (Arrivals),X (Overnight stays),Y (Arrivals),Y (Overnight stays)
A,2021M01,99,99,1,1
A,2021M02,10,20,3,6
B,2021M02,0,5,1,1
A,2021M03,4,bad,0,0
B,2021M04,2,3,0,0
";

    const BEDS_CSV: &str = "\
MUNICIPALITIES,YEAR,BEDS
A,2021,100
B,2021,50
C,2021,30
A,2022,120
B,2022,55
";

    fn sample_db() -> Database {
        let db = Database::new().unwrap();
        db.load_tourism(TOURISM_CSV).unwrap();
        db.load_beds(BEDS_CSV).unwrap();
        db
    }

    fn labels(buckets: &[TimeBucket]) -> Vec<&str> {
        buckets.iter().map(|b| b.as_str()).collect()
    }

    #[test]
    fn domain_drops_first_bucket() {
        let db = sample_db();
        let domain = bucket_domain(&db).unwrap();
        assert_eq!(labels(&domain), vec!["2021M02", "2021M03", "2021M04"]);
    }

    #[test]
    fn combined_series_sums_then_divides() {
        let db = sample_db();
        let state = InteractionState::new("X");
        let groups = derive_tourism_series(&db, &state).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, COMBINED_KEY);

        let feb = &groups[0].points[0];
        assert_eq!(feb.bucket.as_str(), "2021M02");
        assert!((feb.arrivals - 10.0).abs() < 0.01);
        assert!((feb.overnights - 25.0).abs() < 0.01);
        assert!((feb.average_stay - 2.5).abs() < 0.01);
    }

    #[test]
    fn per_region_series_zero_arrivals() {
        let db = sample_db();
        let mut state = InteractionState::new("X");
        state.toggle_region("B");
        let groups = derive_tourism_series(&db, &state).unwrap();
        assert_eq!(groups.len(), 1);
        let feb = &groups[0].points[0];
        assert_eq!(feb.arrivals, 0.0);
        assert!((feb.overnights - 5.0).abs() < 0.01);
        assert_eq!(feb.average_stay, 0.0);
    }

    #[test]
    fn per_region_series_fill_full_domain() {
        let db = sample_db();
        let mut state = InteractionState::new("X");
        state.toggle_region("B");
        state.toggle_region("A");
        let groups = derive_tourism_series(&db, &state).unwrap();

        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"], "selection order is preserved");

        let domain = bucket_domain(&db).unwrap();
        for group in &groups {
            let buckets: Vec<TimeBucket> = group.points.iter().map(|p| p.bucket.clone()).collect();
            assert_eq!(buckets, domain);
        }
        // B has no 2021M03 row
        assert_eq!(groups[0].points[1].arrivals, 0.0);
        // A's malformed overnights cell resolves to 0
        assert!((groups[1].points[1].arrivals - 4.0).abs() < 0.01);
        assert_eq!(groups[1].points[1].overnights, 0.0);
    }

    #[test]
    fn average_stay_never_nan() {
        let db = sample_db();
        for country in ["X", "Y"] {
            let mut state = InteractionState::new(country);
            for selection in [vec![], vec!["A"], vec!["A", "B"]] {
                state.clear_selection();
                for name in selection {
                    state.toggle_region(name);
                }
                for group in derive_tourism_series(&db, &state).unwrap() {
                    for point in &group.points {
                        assert!(point.average_stay.is_finite());
                        if point.arrivals == 0.0 {
                            assert_eq!(point.average_stay, 0.0);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn combined_equals_sum_of_all_regions() {
        let db = sample_db();
        let combined = derive_tourism_series(&db, &InteractionState::new("X")).unwrap();

        let mut all = InteractionState::new("X");
        for region in db.query_regions().unwrap() {
            all.toggle_region(&region.label);
        }
        let per_region = derive_tourism_series(&db, &all).unwrap();

        for (i, point) in combined[0].points.iter().enumerate() {
            let arrivals: f64 = per_region.iter().map(|g| g.points[i].arrivals).sum();
            let overnights: f64 = per_region.iter().map(|g| g.points[i].overnights).sum();
            assert!((point.arrivals - arrivals).abs() < 0.01);
            assert!((point.overnights - overnights).abs() < 0.01);
        }
    }

    #[test]
    fn region_matching_ignores_case_and_whitespace() {
        let db = Database::new().unwrap();
        db.load_tourism(
            "MUNICIPALITIES,MONTH,X (Arrivals),X (Overnight stays)\najdovščina,2021M01,1,1\najdovščina,2021M02,7,14\n",
        )
        .unwrap();
        let mut state = InteractionState::new("X");
        state.toggle_region("Ajdovščina ");
        let groups = derive_tourism_series(&db, &state).unwrap();
        assert_eq!(groups[0].key, "ajdovščina");
        assert!((groups[0].points[0].arrivals - 7.0).abs() < 0.01);
    }

    #[test]
    fn unknown_region_selection_has_no_effect() {
        let db = sample_db();
        let mut state = InteractionState::new("X");
        state.toggle_region("Atlantis");
        let groups = derive_tourism_series(&db, &state).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, COMBINED_KEY);
    }

    #[test]
    fn bed_series_missing_year_is_zero() {
        let db = sample_db();
        let mut state = InteractionState::new("X");
        state.toggle_region("C");
        let groups = derive_bed_series(&db, &state).unwrap();
        assert_eq!(groups.len(), 1);
        let years: Vec<i32> = groups[0].points.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2021, 2022]);
        assert!((groups[0].points[0].beds - 30.0).abs() < 0.01);
        assert_eq!(groups[0].points[1].beds, 0.0);
    }

    #[test]
    fn bed_series_combined_sums_years() {
        let db = sample_db();
        let groups = derive_bed_series(&db, &InteractionState::new("X")).unwrap();
        assert_eq!(groups[0].key, COMBINED_KEY);
        assert!((groups[0].points[0].beds - 180.0).abs() < 0.01);
        assert!((groups[0].points[1].beds - 175.0).abs() < 0.01);
    }

    #[test]
    fn weather_series_skips_missing_values() {
        let station = StationObservations::parse_csv(
            "LJ",
            "date,tavg,rain\n2021-01-01,1.5,3\n2021-02-01,,4\n2021-03-01,6.0,x\n",
        )
        .unwrap();
        let tavg = derive_weather_series(&station, "tavg");
        assert_eq!(tavg.len(), 2);
        assert_eq!(tavg[1].bucket.as_str(), "2021M03");
        assert_eq!(derive_weather_series(&station, "rain").len(), 2);
        assert!(derive_weather_series(&station, "wind").is_empty());
    }

    #[test]
    fn weather_series_keeps_daily_rows_in_shared_bucket() {
        let station = StationObservations::parse_csv(
            "LJ",
            "date,tavg\n2021-02-01,1.0\n2021-02-02,2.0\n2021-01-31,-3.0\n",
        )
        .unwrap();
        let series = derive_weather_series(&station, "tavg");
        let rows: Vec<(&str, &str)> = series
            .iter()
            .map(|p| (p.bucket.as_str(), p.label.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("2021M01", "2021-01-31"),
                ("2021M02", "2021-02-01"),
                ("2021M02", "2021-02-02"),
            ]
        );
    }

    #[test]
    fn view_without_station_has_no_weather() {
        let db = sample_db();
        let view = derive_view(&db, &InteractionState::new("Y"), None).unwrap();
        assert_eq!(view.country, "Y");
        assert!(view.weather.is_empty());
        assert_eq!(view.tourism.len(), 1);
        assert_eq!(view.beds.len(), 1);
    }
}
