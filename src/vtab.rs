//! The SQLite adapter: everything that touches the host ABI lives here.
//! The scan engine below this layer deals only in typed constraints,
//! cells, and bitmaps — no raw host pointers cross the boundary.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::os::raw::c_int;
use std::sync::Arc;

use parquet::basic::Type as PhysicalType;
use rusqlite::ffi;
use rusqlite::types::{Null, Value};
use rusqlite::vtab::{
    read_only_module, sqlite3_vtab, sqlite3_vtab_cursor, Context, CreateVTab, Filters,
    IndexConstraintOp, IndexInfo, VTab, VTabConnection, VTabCursor, VTabKind,
};
use rusqlite::Connection;

use crate::bitmap::RowGroupBitmap;
use crate::cache::BitmapCache;
use crate::constraint::{Constraint, ConstraintOp, ConstraintValue};
use crate::cursor::ScanCursor;
use crate::error::StrataError;
use crate::table::ParquetTable;

/// Register the `parquet` virtual-table module on a connection:
///
/// ```sql
/// CREATE VIRTUAL TABLE demo USING parquet('/path/to/file.parquet');
/// SELECT * FROM demo;
/// ```
pub fn register_parquet_module(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_module("parquet", read_only_module::<ParquetVTab>(), None)
}

#[repr(C)]
pub struct ParquetVTab {
    base: sqlite3_vtab,
    db: *mut ffi::sqlite3,
    table: Arc<ParquetTable>,
}

impl ParquetVTab {
    /// Exactly one module argument: the file path in single quotes.
    fn parse_path(args: &[&[u8]]) -> Result<String, StrataError> {
        let usage = || StrataError::InvalidArgs {
            message:
                "usage: CREATE VIRTUAL TABLE <name> USING parquet('/path/to/file.parquet')"
                    .to_string(),
        };
        // module name, database name, table name, then the user arguments
        if args.len() != 4 {
            return Err(usage());
        }
        let arg = std::str::from_utf8(args[3]).map_err(|_| usage())?.trim();
        let path = arg
            .strip_prefix('\'')
            .and_then(|rest| rest.strip_suffix('\''))
            .ok_or_else(usage)?;
        if path.is_empty() {
            return Err(usage());
        }
        Ok(path.replace("''", "'"))
    }
}

unsafe impl<'vtab> VTab<'vtab> for ParquetVTab {
    type Aux = ();
    type Cursor = ParquetVTabCursor<'vtab>;

    fn connect(
        db: &mut VTabConnection,
        _aux: Option<&()>,
        args: &[&[u8]],
    ) -> rusqlite::Result<(String, Self)> {
        let path = Self::parse_path(args)?;
        let table_name = String::from_utf8_lossy(args[2]).into_owned();
        let table = ParquetTable::open(path, table_name)?;
        let sql = table.declaration_sql();
        let db = unsafe { db.handle() };
        Ok((
            sql,
            ParquetVTab {
                base: sqlite3_vtab::default(),
                db,
                table: Arc::new(table),
            },
        ))
    }

    fn best_index(&self, info: &mut IndexInfo) -> rusqlite::Result<()> {
        // every constraint we can represent gets advertised; the ones the
        // filters cannot evaluate still pass through them untouched
        let mut usable = Vec::new();
        for (i, constraint) in info.constraints().enumerate() {
            if !constraint.is_usable() {
                continue;
            }
            let Some(op) = op_from_sqlite(constraint.operator()) else {
                continue;
            };
            usable.push((i, constraint.column(), op));
        }

        let mut descriptor = String::new();
        for (argv, (i, column, op)) in usable.iter().enumerate() {
            info.constraint_usage(*i).set_argv_index(argv as c_int + 1);
            // omit stays false: the host re-checks every predicate, which
            // is what lets the row filter over-approximate
            descriptor.push_str(&format!("{}:{};", column, op_code(*op)));
        }

        // rows already come out in ascending rowid order
        let order_by: Vec<(c_int, bool)> = info
            .order_bys()
            .map(|o| (o.column(), o.is_order_by_desc()))
            .collect();
        if let [(-1, false)] = order_by[..] {
            info.set_order_by_consumed(true);
        }

        info.set_estimated_cost(if usable.is_empty() { 1e12 } else { 1.0 });
        info.set_idx_num(i32::from(!usable.is_empty()));
        info.set_idx_str(&descriptor);
        Ok(())
    }

    fn open(&mut self) -> rusqlite::Result<ParquetVTabCursor<'vtab>> {
        let cursor = ScanCursor::open(&self.table)?;
        Ok(ParquetVTabCursor::new(cursor))
    }
}

impl<'vtab> CreateVTab<'vtab> for ParquetVTab {
    const KIND: VTabKind = VTabKind::Default;

    fn create(
        db: &mut VTabConnection,
        aux: Option<&()>,
        args: &[&[u8]],
    ) -> rusqlite::Result<(String, Self)> {
        let (sql, vtab) = Self::connect(db, aux, args)?;
        BitmapCache::new(vtab.db, vtab.table.name()).create_shadow_table();
        Ok((sql, vtab))
    }

    fn destroy(&self) -> rusqlite::Result<()> {
        BitmapCache::new(self.db, self.table.name()).drop_shadow_table();
        Ok(())
    }
}

#[repr(C)]
pub struct ParquetVTabCursor<'vtab> {
    base: sqlite3_vtab_cursor,
    /// The engine cursor. `xColumn` is `&self` in the host ABI while
    /// materializing a value advances scanner state, so the interior
    /// mutability lives here at the seam; cursors are single-threaded.
    cursor: RefCell<ScanCursor>,
    /// Whether this scan already wrote its learned bitmaps.
    done: bool,
    phantom: PhantomData<&'vtab ParquetVTab>,
}

impl ParquetVTabCursor<'_> {
    fn new(cursor: ScanCursor) -> Self {
        ParquetVTabCursor {
            base: sqlite3_vtab_cursor::default(),
            cursor: RefCell::new(cursor),
            done: false,
            phantom: PhantomData,
        }
    }

    /// Accessor to the associated virtual table
    fn vtab(&self) -> &ParquetVTab {
        unsafe { &*(self.base.pVtab as *const ParquetVTab) }
    }

    /// On the transition into eof, write back what the scan learned —
    /// once, and only the constraints whose estimate and observation
    /// diverged.
    fn finish_scan_if_done(&mut self) {
        if self.done || !self.cursor.borrow().eof() {
            return;
        }
        self.done = true;
        let vtab = self.vtab();
        let cache = BitmapCache::new(vtab.db, vtab.table.name());
        for constraint in self.cursor.borrow().constraints() {
            if constraint.bitmap.refined() {
                cache.save(
                    &constraint.fingerprint(),
                    constraint.bitmap.estimated_bytes(),
                    constraint.bitmap.actual_bytes(),
                );
            }
        }
    }
}

unsafe impl VTabCursor for ParquetVTabCursor<'_> {
    fn filter(
        &mut self,
        _idx_num: c_int,
        idx_str: Option<&str>,
        args: &Filters<'_>,
    ) -> rusqlite::Result<()> {
        let (db, table) = {
            let vtab = self.vtab();
            (vtab.db, vtab.table.clone())
        };
        let cache = BitmapCache::new(db, table.name());
        let num_row_groups = table.num_row_groups();

        let mut constraints = Vec::new();
        for (j, (column, op)) in parse_descriptor(idx_str)?.into_iter().enumerate() {
            let value = match args.get::<Value>(j)? {
                Value::Null => ConstraintValue::Null,
                Value::Integer(v) => ConstraintValue::Integer(v),
                Value::Real(v) => ConstraintValue::Double(v),
                Value::Text(v) => ConstraintValue::Text(v),
                Value::Blob(v) => ConstraintValue::Blob(v),
            };
            let (column, name) = if column < 0 {
                (None, "rowid".to_string())
            } else {
                let idx = column as usize;
                (Some(idx), table.column_name(idx).to_string())
            };
            let mut constraint = Constraint::new(
                column,
                name,
                op,
                value,
                RowGroupBitmap::new(num_row_groups),
            );
            if let Some(cached) = cache.load(&constraint.fingerprint()) {
                constraint.bitmap = RowGroupBitmap::with_cached_actual(num_row_groups, cached);
            }
            constraints.push(constraint);
        }

        {
            let mut cursor = self.cursor.borrow_mut();
            cursor.reset(constraints);
            cursor.next().map_err(rusqlite::Error::from)?;
        }
        self.done = false;
        self.finish_scan_if_done();
        Ok(())
    }

    fn next(&mut self) -> rusqlite::Result<()> {
        self.cursor
            .borrow_mut()
            .next()
            .map_err(rusqlite::Error::from)?;
        self.finish_scan_if_done();
        Ok(())
    }

    fn eof(&self) -> bool {
        self.cursor.borrow().eof()
    }

    fn column(&self, ctx: &mut Context, i: c_int) -> rusqlite::Result<()> {
        let column = i as usize;
        let mut cursor = self.cursor.borrow_mut();
        cursor.ensure_column(column).map_err(rusqlite::Error::from)?;
        if cursor.is_null(column) {
            return ctx.set_result(&Null);
        }
        let spec = cursor.column_spec(column);
        let cell = cursor.cell(column);
        match spec.physical {
            PhysicalType::BOOLEAN | PhysicalType::INT32 => {
                ctx.set_result(&(cell.value.int() as i32))
            }
            PhysicalType::INT64 | PhysicalType::INT96 => ctx.set_result(&cell.value.int()),
            PhysicalType::FLOAT | PhysicalType::DOUBLE => ctx.set_result(&cell.value.double()),
            PhysicalType::BYTE_ARRAY if spec.is_utf8() => {
                let text =
                    std::str::from_utf8(cell.value.bytes()).map_err(|_| {
                        rusqlite::Error::from(StrataError::CorruptFile {
                            message: format!("column {column} holds invalid UTF-8"),
                        })
                    })?;
                ctx.set_result(&text)
            }
            PhysicalType::BYTE_ARRAY | PhysicalType::FIXED_LEN_BYTE_ARRAY => {
                ctx.set_result(&cell.value.bytes())
            }
        }
    }

    fn rowid(&self) -> rusqlite::Result<i64> {
        Ok(self.cursor.borrow().row_id())
    }
}

fn op_from_sqlite(op: IndexConstraintOp) -> Option<ConstraintOp> {
    match op {
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_EQ => Some(ConstraintOp::Eq),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_GT => Some(ConstraintOp::Gt),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_LE => Some(ConstraintOp::LtEq),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_LT => Some(ConstraintOp::Lt),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_GE => Some(ConstraintOp::GtEq),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_MATCH => Some(ConstraintOp::Match),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_LIKE => Some(ConstraintOp::Like),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_GLOB => Some(ConstraintOp::Glob),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_REGEXP => Some(ConstraintOp::Regexp),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_NE => Some(ConstraintOp::NotEq),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_ISNOT => Some(ConstraintOp::IsNot),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_ISNOTNULL => Some(ConstraintOp::IsNotNull),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_ISNULL => Some(ConstraintOp::IsNull),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_IS => Some(ConstraintOp::Is),
        _ => None,
    }
}

fn op_code(op: ConstraintOp) -> u8 {
    match op {
        ConstraintOp::Eq => 0,
        ConstraintOp::Gt => 1,
        ConstraintOp::LtEq => 2,
        ConstraintOp::Lt => 3,
        ConstraintOp::GtEq => 4,
        ConstraintOp::Match => 5,
        ConstraintOp::Like => 6,
        ConstraintOp::Glob => 7,
        ConstraintOp::Regexp => 8,
        ConstraintOp::NotEq => 9,
        ConstraintOp::IsNot => 10,
        ConstraintOp::IsNotNull => 11,
        ConstraintOp::IsNull => 12,
        ConstraintOp::Is => 13,
    }
}

fn op_from_code(code: u8) -> Option<ConstraintOp> {
    Some(match code {
        0 => ConstraintOp::Eq,
        1 => ConstraintOp::Gt,
        2 => ConstraintOp::LtEq,
        3 => ConstraintOp::Lt,
        4 => ConstraintOp::GtEq,
        5 => ConstraintOp::Match,
        6 => ConstraintOp::Like,
        7 => ConstraintOp::Glob,
        8 => ConstraintOp::Regexp,
        9 => ConstraintOp::NotEq,
        10 => ConstraintOp::IsNot,
        11 => ConstraintOp::IsNotNull,
        12 => ConstraintOp::IsNull,
        13 => ConstraintOp::Is,
        _ => return None,
    })
}

/// Decode the `(column, op)` pairs `best_index` packed into `idx_str`.
fn parse_descriptor(idx_str: Option<&str>) -> rusqlite::Result<Vec<(c_int, ConstraintOp)>> {
    let malformed = || rusqlite::Error::ModuleError("malformed scan descriptor".to_string());
    let Some(descriptor) = idx_str else {
        return Ok(Vec::new());
    };
    let mut pairs = Vec::new();
    for token in descriptor.split(';').filter(|t| !t.is_empty()) {
        let (column, code) = token.split_once(':').ok_or_else(malformed)?;
        let column: c_int = column.parse().map_err(|_| malformed())?;
        let code: u8 = code.parse().map_err(|_| malformed())?;
        let op = op_from_code(code).ok_or_else(malformed)?;
        pairs.push((column, op));
    }
    Ok(pairs)
}
