use std::fs::File;
use std::sync::Arc;

use parquet::file::metadata::ParquetMetaData;
use parquet::file::reader::{FileReader, SerializedFileReader};

use crate::constraint::Constraint;
use crate::error::Result;
use crate::prune;
use crate::row;
use crate::scanner::{Cell, ColumnScanner};
use crate::schema::ColumnSpec;
use crate::table::ParquetTable;

/// The scan state machine. One per host cursor; reset by every `filter`
/// call and advanced one row at a time.
///
/// Rowids are 1-based (SQLite style) and strictly ascending within a scan;
/// `row_id > num_rows` is the eof state. Row groups advance only through
/// [`advance_row_group`](Self::advance_row_group), which is also where
/// skipped groups get both their membership bits cleared and finished
/// groups get their observed membership folded in.
pub(crate) struct ScanCursor {
    reader: SerializedFileReader<File>,
    metadata: Arc<ParquetMetaData>,
    columns: Arc<Vec<ColumnSpec>>,
    num_rows: i64,
    num_row_groups: usize,

    row_id: i64,
    /// Group currently being scanned; `None` between `reset` and the first
    /// `next`.
    group: Option<usize>,
    /// Rows preceding the current group (also the current group's first
    /// rowid minus one).
    group_start: i64,
    group_size: i64,
    rows_left: i64,

    scanners: Vec<Option<ColumnScanner>>,
    cells: Vec<Cell>,
    constraints: Vec<Constraint>,
}

impl ScanCursor {
    pub(crate) fn open(table: &ParquetTable) -> Result<Self> {
        let reader = table.open_reader()?;
        // scan decisions all run off the metadata read once at connect
        let metadata = table.metadata().clone();
        let columns = table.columns().clone();
        let num_rows = metadata.file_metadata().num_rows();
        let num_row_groups = metadata.num_row_groups();
        let num_columns = columns.len();
        Ok(Self {
            reader,
            metadata,
            columns,
            num_rows,
            num_row_groups,
            row_id: 0,
            group: None,
            group_start: 0,
            group_size: 0,
            rows_left: 0,
            scanners: (0..num_columns).map(|_| None).collect(),
            cells: vec![Cell::default(); num_columns],
            constraints: Vec::new(),
        })
    }

    /// Full reset: new constraints, position before the first row. The
    /// underlying reader is reused; it carries no scan position.
    pub(crate) fn reset(&mut self, constraints: Vec<Constraint>) {
        self.constraints = constraints;
        self.row_id = 0;
        self.group = None;
        self.group_start = 0;
        self.group_size = 0;
        self.rows_left = 0;
        for scanner in &mut self.scanners {
            *scanner = None;
        }
        for cell in &mut self.cells {
            *cell = Cell::default();
        }
    }

    pub(crate) fn row_id(&self) -> i64 {
        self.row_id
    }

    pub(crate) fn eof(&self) -> bool {
        self.row_id > self.num_rows
    }

    pub(crate) fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub(crate) fn column_spec(&self, column: usize) -> &ColumnSpec {
        &self.columns[column]
    }

    pub(crate) fn cell(&self, column: usize) -> &Cell {
        &self.cells[column]
    }

    pub(crate) fn is_null(&self, column: usize) -> bool {
        self.cells[column].null
    }

    /// Advance to the next row that may satisfy the constraints, or to eof.
    pub(crate) fn next(&mut self) -> Result<()> {
        loop {
            if self.rows_left == 0 {
                if !self.advance_row_group()? {
                    // past the edge so eof() reads true
                    self.row_id = self.num_rows + 1;
                    return Ok(());
                }
            }
            self.rows_left -= 1;
            self.row_id += 1;
            if self.constraints.is_empty() || self.row_satisfies_constraints()? {
                return Ok(());
            }
        }
    }

    /// Move to the next row group that might hold matching rows, clearing
    /// membership bits for every group the filter proves empty along the
    /// way. Returns false when the file is exhausted.
    fn advance_row_group(&mut self) -> Result<bool> {
        loop {
            let start = self.group_start + self.group_size;
            let candidate = match self.group {
                None => 0,
                Some(g) => g + 1,
            };

            // The group we just left was fully scanned: what we observed
            // becomes its actual membership. Folding clears the marker so
            // the observation cannot be applied twice.
            if let Some(finished) = self.group {
                for constraint in &mut self.constraints {
                    if constraint.row_group_id == Some(finished) {
                        constraint.bitmap.set_actual(finished, constraint.had_rows);
                        constraint.row_group_id = None;
                    }
                    constraint.had_rows = false;
                }
            }

            if candidate >= self.num_row_groups {
                return Ok(false);
            }

            self.group = Some(candidate);
            self.group_start = start;
            let metadata = self.metadata.clone();
            let row_group = metadata.row_group(candidate);
            self.group_size = row_group.num_rows();
            self.rows_left = self.group_size;
            for scanner in &mut self.scanners {
                *scanner = None;
            }
            for cell in &mut self.cells {
                *cell = Cell {
                    row_id: start,
                    ..Cell::default()
                };
            }

            if prune::admit_row_group(
                &mut self.constraints,
                &self.columns,
                row_group,
                candidate,
                start + 1,
                self.group_size,
            ) {
                for constraint in &mut self.constraints {
                    constraint.row_group_id = Some(candidate);
                }
                return Ok(true);
            }
            // proven empty; try the next one
        }
    }

    /// Evaluate every constraint against the current row, materializing
    /// each constraint's own column on the way. All constraints are
    /// evaluated even after one fails: each acceptance feeds that
    /// constraint's `had_rows`, which is what refines the learned bitmap.
    fn row_satisfies_constraints(&mut self) -> Result<bool> {
        let mut all_match = true;
        for i in 0..self.constraints.len() {
            let column = self.constraints[i].column;
            if let Some(column) = column {
                self.ensure_column(column)?;
            }
            let constraint = &self.constraints[i];
            let accepted = match column {
                None => row::row_may_match(constraint, None, self.row_id),
                Some(column) => row::row_may_match(
                    constraint,
                    Some((&self.columns[column], &self.cells[column])),
                    self.row_id,
                ),
            };
            if accepted {
                self.constraints[i].had_rows = true;
            }
            all_match = all_match && accepted;
        }
        Ok(all_match)
    }

    /// Materialize `column` at the current row. Creates the lazy scanner on
    /// first touch within the group and fast-forwards it past any rows the
    /// host never asked about.
    pub(crate) fn ensure_column(&mut self, column: usize) -> Result<()> {
        if self.cells[column].row_id == self.row_id {
            return Ok(());
        }

        if self.scanners[column].is_none() {
            let row_group = self.reader.get_row_group(self.group.unwrap_or(0))?;
            self.scanners[column] = Some(ColumnScanner::create(row_group.as_ref(), column)?);
        }

        let lag = self.row_id - 1 - self.cells[column].row_id;
        if let Some(scanner) = self.scanners[column].as_mut() {
            if lag > 0 {
                scanner.skip(lag as usize, column)?;
            }
            let (null, value) = scanner.advance(column)?;
            let cell = &mut self.cells[column];
            cell.row_id = self.row_id;
            cell.null = null;
            cell.value = value;
        }
        Ok(())
    }
}
