//! Loading parsed tables into the in-memory SQLite database.
//!
//! CSV parsing and schema inference live in `twx-core`; this module only
//! writes the parsed records. Rows are upserted, so a repeated
//! (region, bucket) or (region, year) keeps the last value.

use crate::Database;
use rusqlite::params;
use twx_core::beds::BedRecord;
use twx_core::tourism::TourismTable;
use twx_utils::names::region_key;

impl Database {
    /// Parse and load the tourism table.
    ///
    /// See [`TourismTable::parse_csv`] for the expected layout.
    pub fn load_tourism(&self, csv_data: &str) -> anyhow::Result<()> {
        let table = TourismTable::parse_csv(csv_data)?;
        self.load_tourism_table(&table)
    }

    /// Load an already parsed tourism table.
    pub fn load_tourism_table(&self, table: &TourismTable) -> anyhow::Result<()> {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        {
            let known: i64 = tx.query_row("SELECT COUNT(*) FROM countries", [], |row| row.get(0))?;
            let mut insert_country =
                tx.prepare("INSERT OR IGNORE INTO countries (name, position) VALUES (?1, ?2)")?;
            for (i, country) in table.schema.countries.iter().enumerate() {
                insert_country.execute(params![country.country, known + i as i64])?;
            }

            let mut insert_region =
                tx.prepare("INSERT OR IGNORE INTO regions (region_key, label) VALUES (?1, ?2)")?;
            let mut insert_row = tx.prepare(
                "INSERT OR REPLACE INTO tourism (region_key, bucket, country, arrivals, overnights)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            let mut count = 0u32;
            for record in &table.records {
                let key = region_key(&record.region);
                insert_region.execute(params![key, record.region.trim()])?;
                for country in &table.schema.countries {
                    let name = &country.country;
                    let arrivals = record.arrivals_by_country.get(name).copied().flatten();
                    let overnights = record.overnights_by_country.get(name).copied().flatten();
                    insert_row.execute(params![key, record.bucket.as_str(), name, arrivals, overnights])?;
                }
                count += 1;
            }
            log::info!(
                "[TWX] loader: Loaded {} tourism rows for {} countries",
                count,
                table.schema.countries.len()
            );
        }
        tx.commit()?;
        Ok(())
    }

    /// Parse and load the beds table.
    ///
    /// See [`BedRecord::parse_beds_csv`] for the expected layout.
    pub fn load_beds(&self, csv_data: &str) -> anyhow::Result<()> {
        let records = BedRecord::parse_beds_csv(csv_data)?;
        self.load_bed_records(&records)
    }

    /// Load already parsed bed records.
    pub fn load_bed_records(&self, records: &[BedRecord]) -> anyhow::Result<()> {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        {
            let mut insert_region =
                tx.prepare("INSERT OR IGNORE INTO regions (region_key, label) VALUES (?1, ?2)")?;
            let mut insert_row = tx.prepare(
                "INSERT OR REPLACE INTO beds (region_key, year, beds) VALUES (?1, ?2, ?3)",
            )?;
            for record in records {
                let key = region_key(&record.region);
                insert_region.execute(params![key, record.region.trim()])?;
                insert_row.execute(params![key, record.year, record.beds])?;
            }
            log::info!("[TWX] loader: Loaded {} bed rows", records.len());
        }
        tx.commit()?;
        Ok(())
    }
}
