//! Typed query methods over the raw tables.
//!
//! All measure columns may be NULL; `SUM` skips NULL cells, and a group
//! whose cells are all NULL yields `None`.

use crate::models::{BucketMeasures, RegionInfo, YearBeds};
use crate::Database;
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use twx_core::bucket::TimeBucket;

/// Read a bucket label column as a validated [`TimeBucket`].
fn bucket_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<TimeBucket> {
    let label: String = row.get(idx)?;
    TimeBucket::parse(&label)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn measures_row(row: &Row<'_>) -> rusqlite::Result<BucketMeasures> {
    Ok(BucketMeasures {
        bucket: bucket_at(row, 0)?,
        arrivals: row.get(1)?,
        overnights: row.get(2)?,
    })
}

fn beds_row(row: &Row<'_>) -> rusqlite::Result<YearBeds> {
    Ok(YearBeds {
        year: row.get(0)?,
        beds: row.get(1)?,
    })
}

impl Database {
    // ───────────────────── Dimensions ─────────────────────

    /// Discovered countries in header order.
    pub fn query_countries(&self) -> anyhow::Result<Vec<String>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare("SELECT name FROM countries ORDER BY position")?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(rows)
    }

    /// Every region present in the tourism or beds table, ordered by label.
    pub fn query_regions(&self) -> anyhow::Result<Vec<RegionInfo>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare("SELECT region_key, label FROM regions ORDER BY label")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(RegionInfo {
                    key: row.get(0)?,
                    label: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Look up a region by its normalized key.
    pub fn query_region(&self, key: &str) -> anyhow::Result<Option<RegionInfo>> {
        let conn = self.conn.borrow();
        let region = conn
            .query_row(
                "SELECT region_key, label FROM regions WHERE region_key = ?1",
                params![key],
                |row| {
                    Ok(RegionInfo {
                        key: row.get(0)?,
                        label: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(region)
    }

    /// All buckets present in the tourism table, ascending.
    pub fn query_buckets(&self) -> anyhow::Result<Vec<TimeBucket>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare("SELECT DISTINCT bucket FROM tourism ORDER BY bucket")?;
        let rows = stmt
            .query_map([], |row| bucket_at(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// All years present in the beds table, ascending.
    pub fn query_bed_years(&self) -> anyhow::Result<Vec<i32>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare("SELECT DISTINCT year FROM beds ORDER BY year")?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<i32>, _>>()?;
        Ok(rows)
    }

    // ───────────────────── Tourism ─────────────────────

    /// Arrivals and overnights summed over all regions, per bucket, for one country.
    pub fn query_total_tourism(&self, country: &str) -> anyhow::Result<Vec<BucketMeasures>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT bucket, SUM(arrivals), SUM(overnights)
             FROM tourism
             WHERE country = ?1
             GROUP BY bucket
             ORDER BY bucket",
        )?;
        let rows = stmt
            .query_map(params![country], measures_row)?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "[TWX] query: query_total_tourism({}) returned {} records",
            country,
            rows.len()
        );
        Ok(rows)
    }

    /// Arrivals and overnights of one region for one country, ordered by bucket.
    pub fn query_region_tourism(
        &self,
        key: &str,
        country: &str,
    ) -> anyhow::Result<Vec<BucketMeasures>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT bucket, arrivals, overnights
             FROM tourism
             WHERE region_key = ?1 AND country = ?2
             ORDER BY bucket",
        )?;
        let rows = stmt
            .query_map(params![key, country], measures_row)?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "[TWX] query: query_region_tourism({}, {}) returned {} records",
            key,
            country,
            rows.len()
        );
        Ok(rows)
    }

    // ───────────────────── Beds ─────────────────────

    /// Beds summed over all regions, per year.
    pub fn query_total_beds(&self) -> anyhow::Result<Vec<YearBeds>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT year, SUM(beds) FROM beds GROUP BY year ORDER BY year",
        )?;
        let rows = stmt
            .query_map([], beds_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Beds of one region, ordered by year.
    pub fn query_region_beds(&self, key: &str) -> anyhow::Result<Vec<YearBeds>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT year, beds FROM beds WHERE region_key = ?1 ORDER BY year",
        )?;
        let rows = stmt
            .query_map(params![key], beds_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn sample_db() -> Database {
        let db = Database::new().unwrap();
        db.load_tourism(
            "\
MUNICIPALITIES,MONTH,X (Arrivals),X (Overnight stays),Y (Arrivals),Y (Overnight stays)
A,2021M01,1,2,100,100
A,2021M02,10,20,100,100
B,2021M02,0,5,100,100
B,2021M03,bad,7,100,100
",
        )
        .unwrap();
        db.load_beds(
            "\
MUNICIPALITIES,YEAR,BEDS
A,2021,100
B,2021,50
A,2022,120
C,2021,n/a
",
        )
        .unwrap();
        db
    }

    #[test]
    fn query_countries_in_header_order() {
        let db = sample_db();
        assert_eq!(db.query_countries().unwrap(), vec!["X", "Y"]);
    }

    #[test]
    fn query_regions_union_of_tables() {
        let db = sample_db();
        let keys: Vec<String> = db.query_regions().unwrap().into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(db.query_region("c").unwrap().unwrap().label, "C");
        assert!(db.query_region("nope").unwrap().is_none());
    }

    #[test]
    fn query_buckets_ascending() {
        let db = sample_db();
        let buckets: Vec<String> = db
            .query_buckets()
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(buckets, vec!["2021M01", "2021M02", "2021M03"]);
    }

    #[test]
    fn query_total_tourism_sums_regions() {
        let db = sample_db();
        let totals = db.query_total_tourism("X").unwrap();
        assert_eq!(totals.len(), 3);
        // 2021M02: A(10, 20) + B(0, 5)
        assert!((totals[1].arrivals.unwrap() - 10.0).abs() < 0.01);
        assert!((totals[1].overnights.unwrap() - 25.0).abs() < 0.01);
        // 2021M03: only B with a malformed arrivals cell
        assert!(totals[2].arrivals.is_none());
        assert!((totals[2].overnights.unwrap() - 7.0).abs() < 0.01);
    }

    #[test]
    fn query_region_tourism_filters_region_and_country() {
        let db = sample_db();
        let rows = db.query_region_tourism("b", "X").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].bucket.as_str(), "2021M02");
        assert_eq!(rows[0].arrivals, Some(0.0));
        assert!(db.query_region_tourism("b", "Z").unwrap().is_empty());
    }

    #[test]
    fn query_beds() {
        let db = sample_db();
        assert_eq!(db.query_bed_years().unwrap(), vec![2021, 2022]);

        let totals = db.query_total_beds().unwrap();
        assert_eq!(totals.len(), 2);
        assert!((totals[0].beds.unwrap() - 150.0).abs() < 0.01);
        assert!((totals[1].beds.unwrap() - 120.0).abs() < 0.01);

        let a = db.query_region_beds("a").unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a[1].year, 2022);
        let c = db.query_region_beds("c").unwrap();
        assert_eq!(c[0].beds, None);
    }
}
