//! In-memory SQLite raw data store for regional tourism and bed capacity.
//!
//! The store is loaded once per session from CSV strings and is read-only
//! afterwards. Typed query methods return serializable models consumed by
//! the aggregation engine.
//!
//! # Architecture
//!
//! - `Rc<RefCell<Connection>>` wrapper; the session is single-threaded
//! - In-memory SQLite via `rusqlite`
//! - Region labels are joined through a normalized key (see [`twx_utils::names::region_key`])
//!
//! # Usage
//!
//! ```rust
//! use twx_db::Database;
//!
//! let db = Database::new().unwrap();
//! db.load_tourism("MUNICIPALITIES,MONTH,Germany (Arrivals),Germany (Overnight stays)\nBled,2021M02,10,20\n").unwrap();
//! db.load_beds("MUNICIPALITIES,YEAR,BEDS\nBled,2021,5300\n").unwrap();
//!
//! let totals = db.query_total_tourism("Germany").unwrap();
//! assert_eq!(totals.len(), 1);
//! ```

pub mod models;
pub mod schema;
mod loader;
mod queries;

use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory SQLite database holding the raw tourism and beds tables.
///
/// Cheaply cloneable (via `Rc`); clones share the same connection.
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    pub fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_creates_successfully() {
        assert!(Database::new().is_ok());
    }

    #[test]
    fn database_is_cloneable() {
        let db = Database::new().unwrap();
        let db2 = db.clone();
        db.load_beds("MUNICIPALITIES,YEAR,BEDS\nBled,2021,5300\n")
            .unwrap();
        let regions = db2.query_regions().unwrap();
        assert_eq!(regions.len(), 1, "Clone should see same data via shared Rc");
    }

    #[test]
    fn database_starts_empty() {
        let db = Database::new().unwrap();
        assert!(db.query_regions().unwrap().is_empty());
        assert!(db.query_buckets().unwrap().is_empty());
        assert!(db.query_countries().unwrap().is_empty());
    }
}
