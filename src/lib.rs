//! Read-only SQLite virtual tables over Parquet files.
//!
//! A declared table maps straight onto a file; queries stream out of the
//! columnar data without materializing intermediate copies:
//!
//! ```no_run
//! use rusqlite::Connection;
//!
//! # fn main() -> rusqlite::Result<()> {
//! let conn = Connection::open_in_memory()?;
//! strata::register_parquet_module(&conn)?;
//! conn.execute_batch("CREATE VIRTUAL TABLE demo USING parquet('/data/demo.parquet')")?;
//! let count: i64 = conn.query_row("SELECT count(*) FROM demo WHERE id > 100", [], |row| {
//!     row.get(0)
//! })?;
//! # Ok(())
//! # }
//! ```
//!
//! Scans push constraints down two levels before a row ever reaches the
//! host. Per row group, min/max statistics and null counts exclude groups
//! that cannot match; what a completed scan *observes* per group is
//! persisted in a shadow table (`_<name>_rowgroups`), so repeated queries
//! skip groups that statistics alone could not rule out. Per row, each
//! constraint's own column is decoded lazily and checked before the row is
//! handed over — columns nobody asks about are never decoded at all.
//!
//! Both filters only ever answer "definitely not" or "maybe": SQLite
//! re-checks every predicate against the values it reads back, so false
//! positives cost time, never correctness.

mod bitmap;
mod cache;
mod constraint;
mod cursor;
mod error;
mod prune;
mod row;
mod scanner;
mod schema;
mod table;
mod vtab;

pub use error::StrataError;
pub use vtab::register_parquet_module;
