//! SQL schema definitions for the in-memory SQLite database.
//!
//! The wide tourism table is stored long: one row per
//! (region, bucket, country). Region labels are joined through
//! `region_key` (trimmed, lowercased) because tourism and bed sources
//! disagree on casing.

/// Returns the full SQL schema as a single batch string.
///
/// - `regions` - region key and the first display label seen for it
/// - `countries` - discovered countries with their header position
/// - `tourism` - arrivals/overnights per region, bucket and country (NULL = malformed)
/// - `beds` - bed capacity per region and year (NULL = malformed)
///
/// Combined totals are derived on-the-fly via `GROUP BY` + `SUM`, which
/// skips NULL cells.
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS regions (
        region_key TEXT PRIMARY KEY,
        label TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS countries (
        name TEXT PRIMARY KEY,
        position INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS tourism (
        region_key TEXT NOT NULL,
        bucket TEXT NOT NULL,
        country TEXT NOT NULL,
        arrivals REAL,
        overnights REAL,
        PRIMARY KEY (region_key, bucket, country)
    );
    CREATE INDEX IF NOT EXISTS idx_tourism_bucket ON tourism(bucket);
    CREATE INDEX IF NOT EXISTS idx_tourism_country ON tourism(country);

    CREATE TABLE IF NOT EXISTS beds (
        region_key TEXT NOT NULL,
        year INTEGER NOT NULL,
        beds REAL,
        PRIMARY KEY (region_key, year)
    );
    CREATE INDEX IF NOT EXISTS idx_beds_year ON beds(year);
    "#
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn count_objects(conn: &Connection, kind: &str, name: &str) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = ?1 AND name = ?2",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema()).unwrap();

        for table in ["regions", "countries", "tourism", "beds"] {
            assert_eq!(count_objects(&conn, "table", table), 1, "Table '{}' should exist", table);
        }
    }

    #[test]
    fn schema_creates_indexes() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema()).unwrap();

        for idx in ["idx_tourism_bucket", "idx_tourism_country", "idx_beds_year"] {
            assert_eq!(count_objects(&conn, "index", idx), 1, "Index '{}' should exist", idx);
        }
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema()).unwrap();
        conn.execute_batch(create_schema())
            .expect("Applying schema twice should succeed due to IF NOT EXISTS");
    }
}
