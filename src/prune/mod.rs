//! The row-group filter: decides, from per-group statistics alone, whether
//! a group *may* contain rows matching a constraint. Only a definite "no"
//! excludes a group; anything the statistics cannot prove passes through.

use parquet::basic::Type as PhysicalType;
use parquet::file::metadata::RowGroupMetaData;
use parquet::file::statistics::Statistics;

use crate::constraint::{Constraint, ConstraintOp};
use crate::schema::ColumnSpec;

mod cmp;
mod like;
mod rowid;
mod stats;

/// Evaluate every constraint against one row group, folding in what earlier
/// scans learned. Returns whether the group should be opened.
///
/// On the first rejecting constraint both of its membership bits for the
/// group drop to zero and evaluation stops: one impossible constraint is
/// enough to skip the group, and the zeroed `actual` bit short-circuits
/// future scans before they consult statistics at all.
///
/// `group_first_row_id` is the rowid of the group's first row (rowids are
/// 1-based, SQLite style).
pub(crate) fn admit_row_group(
    constraints: &mut [Constraint],
    columns: &[ColumnSpec],
    row_group: &RowGroupMetaData,
    group_id: usize,
    group_first_row_id: i64,
    group_size: i64,
) -> bool {
    for constraint in constraints.iter_mut() {
        let admitted = match constraint.column {
            None => rowid::group_may_contain(constraint, group_first_row_id, group_size),
            Some(col) => {
                let chunk = row_group.column(col);
                column_may_contain(
                    constraint,
                    &columns[col],
                    chunk.statistics(),
                    chunk.num_values(),
                )
            }
        };
        let admitted = admitted && constraint.bitmap.actual(group_id);
        if !admitted {
            constraint.bitmap.set_estimated(group_id, false);
            constraint.bitmap.set_actual(group_id, false);
            return false;
        }
    }
    true
}

/// One constraint against one column chunk's statistics.
///
/// Dispatch happens on the *column's* type, not the constraint's: SQLite is
/// loose with types (the text `'30.0'` may be compared against an integer
/// column), so a payload whose family does not match the column simply
/// passes through.
fn column_may_contain(
    constraint: &Constraint,
    spec: &ColumnSpec,
    statistics: Option<&Statistics>,
    num_values: i64,
) -> bool {
    let Some(statistics) = statistics else {
        return true;
    };

    match constraint.op {
        ConstraintOp::IsNull => statistics.null_count_opt().map_or(true, |nulls| nulls > 0),
        ConstraintOp::IsNotNull => statistics
            .null_count_opt()
            .map_or(true, |nulls| num_values as u64 > nulls),
        _ => match spec.physical {
            PhysicalType::BYTE_ARRAY if spec.is_utf8() => {
                text_may_contain(constraint, statistics)
            }
            PhysicalType::BYTE_ARRAY => blob_may_contain(constraint, statistics),
            PhysicalType::INT32
            | PhysicalType::INT64
            | PhysicalType::INT96
            | PhysicalType::BOOLEAN => integer_may_contain(constraint, statistics),
            PhysicalType::FLOAT | PhysicalType::DOUBLE => {
                double_may_contain(constraint, statistics)
            }
            // FLBA statistics are not trusted yet; never exclude on them
            PhysicalType::FIXED_LEN_BYTE_ARRAY => true,
        },
    }
}

fn text_may_contain(constraint: &Constraint, statistics: &Statistics) -> bool {
    let Some(value) = constraint.value.text() else {
        return true;
    };
    let Some((min, max)) = stats::byte_min_max(statistics) else {
        return true;
    };
    match constraint.op {
        ConstraintOp::Like => {
            let prefix = constraint.like_prefix.as_deref().unwrap_or("");
            like::group_may_contain(prefix.as_bytes(), min, max)
        }
        op => cmp::interval_may_contain(op, value, min, max),
    }
}

fn blob_may_contain(constraint: &Constraint, statistics: &Statistics) -> bool {
    let Some(value) = constraint.value.blob() else {
        return true;
    };
    let Some((min, max)) = stats::byte_min_max(statistics) else {
        return true;
    };
    cmp::interval_may_contain(constraint.op, value, min, max)
}

fn integer_may_contain(constraint: &Constraint, statistics: &Statistics) -> bool {
    let Some(value) = constraint.value.integer() else {
        return true;
    };
    let Some((min, max)) = stats::integer_min_max(statistics) else {
        return true;
    };
    cmp::interval_may_contain(constraint.op, &value, &min, &max)
}

fn double_may_contain(constraint: &Constraint, statistics: &Statistics) -> bool {
    let Some(value) = constraint.value.double() else {
        return true;
    };
    let Some((min, max)) = stats::double_min_max(statistics) else {
        return true;
    };
    cmp::interval_may_contain(constraint.op, &value, &min, &max)
}
