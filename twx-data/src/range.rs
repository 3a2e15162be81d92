//! Range (brush) queries over already derived series.

use crate::models::{BedGroup, RangeSummary, SeriesGroup, YearTotal};
use std::collections::BTreeSet;
use twx_core::bucket::TimeBucket;
use twx_utils::numbers::ratio_or_zero;

/// Buckets of `domain` between `from` and `to`, inclusive.
///
/// Reversed bounds are swapped. Bounds need not be members of the domain.
pub fn bucket_range(domain: &[TimeBucket], from: &TimeBucket, to: &TimeBucket) -> Vec<TimeBucket> {
    let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
    domain
        .iter()
        .filter(|b| *b >= lo && *b <= hi)
        .cloned()
        .collect()
}

/// Summarize each tourism group over `buckets`.
///
/// Returns `None` for an empty range. Average stay is computed from the range
/// sums, never by averaging per-bucket ratios. Beds are looked up per year
/// spanned by the range in the bed group with the same key, 0 when absent.
pub fn summarize_range(
    buckets: &[TimeBucket],
    tourism: &[SeriesGroup],
    beds: &[BedGroup],
) -> Option<Vec<RangeSummary>> {
    if buckets.is_empty() {
        return None;
    }
    let in_range: BTreeSet<&TimeBucket> = buckets.iter().collect();
    let years: BTreeSet<i32> = buckets.iter().map(TimeBucket::year).collect();

    let summaries = tourism
        .iter()
        .map(|group| {
            let (arrivals, overnights) = group
                .points
                .iter()
                .filter(|p| in_range.contains(&p.bucket))
                .fold((0.0, 0.0), |(a, o), p| (a + p.arrivals, o + p.overnights));

            let bed_group = beds.iter().find(|b| b.key == group.key);
            let beds_by_year = years
                .iter()
                .map(|year| YearTotal {
                    year: *year,
                    beds: bed_group.map(|b| b.beds_in(*year)).unwrap_or(0.0),
                })
                .collect();

            RangeSummary {
                key: group.key.clone(),
                label: group.label.clone(),
                arrivals,
                overnights,
                average_stay: ratio_or_zero(overnights, arrivals),
                beds_by_year,
            }
        })
        .collect();
    Some(summaries)
}
