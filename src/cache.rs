//! The learned-bitmap cache: a shadow table in the host database, keyed by
//! constraint fingerprint. Everything here is advisory — a broken or
//! missing cache degrades scans back to statistics-only skipping, so every
//! failure is logged and swallowed rather than surfaced.

use rusqlite::{ffi, Connection, OptionalExtension};

/// Handle to one table's `_<name>_rowgroups` shadow table.
pub(crate) struct BitmapCache {
    db: *mut ffi::sqlite3,
    shadow_table: String,
}

impl BitmapCache {
    pub(crate) fn new(db: *mut ffi::sqlite3, table_name: &str) -> Self {
        Self {
            db,
            shadow_table: format!("_{table_name}_rowgroups"),
        }
    }

    /// Create the shadow table. Called from `xCreate`; idempotent.
    pub(crate) fn create_shadow_table(&self) {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS \"{t}\"(clause TEXT PRIMARY KEY, estimate BLOB, actual BLOB); \
             CREATE UNIQUE INDEX IF NOT EXISTS \"{t}_index\" ON \"{t}\"(clause);",
            t = self.shadow_table
        );
        if let Err(err) = self.with_connection(|conn| conn.execute_batch(&sql)) {
            log::debug!("failed to create shadow table {}: {err}", self.shadow_table);
        }
    }

    /// Drop the shadow table and everything it learned. Called from
    /// `xDestroy`.
    pub(crate) fn drop_shadow_table(&self) {
        let sql = format!("DROP TABLE IF EXISTS \"{}\";", self.shadow_table);
        if let Err(err) = self.with_connection(|conn| conn.execute_batch(&sql)) {
            log::debug!("failed to drop shadow table {}: {err}", self.shadow_table);
        }
    }

    /// Fetch the actual-membership blob a prior scan recorded for this
    /// clause, if any.
    pub(crate) fn load(&self, clause: &str) -> Option<Vec<u8>> {
        let result = self.with_connection(|conn| {
            conn.query_row(
                &format!(
                    "SELECT actual FROM \"{}\" WHERE clause = ?1",
                    self.shadow_table
                ),
                [clause],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()
        });
        match result {
            Ok(blob) => blob,
            Err(err) => {
                log::debug!("cache load failed for {clause:?}: {err}");
                None
            }
        }
    }

    /// Record what a completed scan learned. Callers only invoke this when
    /// the estimate and the observation diverge; once they agree the cache
    /// is converged and stays untouched.
    pub(crate) fn save(&self, clause: &str, estimate: &[u8], actual: &[u8]) {
        let result = self.with_connection(|conn| {
            conn.execute(
                &format!(
                    "INSERT OR REPLACE INTO \"{}\"(clause, estimate, actual) VALUES (?1, ?2, ?3)",
                    self.shadow_table
                ),
                rusqlite::params![clause, estimate, actual],
            )
        });
        if let Err(err) = result {
            log::debug!("cache save failed for {clause:?}: {err}");
        }
    }

    /// Borrow the host's connection for one operation. The handle belongs
    /// to the host; `from_handle` leaves ownership there, so dropping the
    /// `Connection` does not close it.
    fn with_connection<R>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<R>,
    ) -> rusqlite::Result<R> {
        let conn = unsafe { Connection::from_handle(self.db) }?;
        f(&conn)
    }
}
