//! The row filter: once a row's constraint columns are materialized, decide
//! whether the row can match. Like the row-group filter this only answers
//! "definitely not" vs "maybe" — LIKE degrades to a prefix test and several
//! operators pass through — because the host re-checks every predicate
//! against the values it reads back.

use parquet::basic::Type as PhysicalType;

use crate::constraint::{Constraint, ConstraintOp};
use crate::scanner::Cell;
use crate::schema::ColumnSpec;

/// Evaluate one constraint against the current row. `column` is `None` for
/// the synthetic rowid; `row_id` is the row's (1-based) id.
pub(crate) fn row_may_match(
    constraint: &Constraint,
    column: Option<(&ColumnSpec, &Cell)>,
    row_id: i64,
) -> bool {
    let null = column.is_some_and(|(_, cell)| cell.null);
    match constraint.op {
        ConstraintOp::IsNull => return null,
        ConstraintOp::IsNotNull => return !null,
        _ => {}
    }

    match column {
        None => integer_matches(constraint, row_id, false),
        Some((spec, cell)) => {
            if spec.is_utf8() {
                text_matches(constraint, cell)
            } else {
                match spec.physical {
                    PhysicalType::BOOLEAN
                    | PhysicalType::INT32
                    | PhysicalType::INT64
                    | PhysicalType::INT96 => integer_matches(constraint, cell.value.int(), null),
                    PhysicalType::FLOAT | PhysicalType::DOUBLE => {
                        double_matches(constraint, cell.value.double(), null)
                    }
                    // blobs are left entirely to the host's re-check
                    PhysicalType::BYTE_ARRAY | PhysicalType::FIXED_LEN_BYTE_ARRAY => true,
                }
            }
        }
    }
}

fn integer_matches(constraint: &Constraint, value: i64, null: bool) -> bool {
    let Some(target) = constraint.value.integer() else {
        return true;
    };
    match constraint.op {
        ConstraintOp::Is | ConstraintOp::Eq => !null && value == target,
        ConstraintOp::NotEq => !null && value != target,
        ConstraintOp::Gt => !null && value > target,
        ConstraintOp::GtEq => !null && value >= target,
        ConstraintOp::Lt => !null && value < target,
        ConstraintOp::LtEq => !null && value <= target,
        _ => true,
    }
}

fn double_matches(constraint: &Constraint, value: f64, null: bool) -> bool {
    let Some(target) = constraint.value.double() else {
        return true;
    };
    match constraint.op {
        ConstraintOp::Is | ConstraintOp::Eq => !null && value == target,
        ConstraintOp::NotEq => !null && value != target,
        ConstraintOp::Gt => !null && value > target,
        ConstraintOp::GtEq => !null && value >= target,
        ConstraintOp::Lt => !null && value < target,
        ConstraintOp::LtEq => !null && value <= target,
        _ => true,
    }
}

fn text_matches(constraint: &Constraint, cell: &Cell) -> bool {
    let Some(target) = constraint.value.text() else {
        return true;
    };
    if cell.null {
        // a null never compares true; pass-through ops still pass
        return !matches!(
            constraint.op,
            ConstraintOp::Is
                | ConstraintOp::Eq
                | ConstraintOp::NotEq
                | ConstraintOp::Gt
                | ConstraintOp::GtEq
                | ConstraintOp::Lt
                | ConstraintOp::LtEq
                | ConstraintOp::Like
        );
    }
    let value = cell.value.bytes();
    match constraint.op {
        ConstraintOp::Is | ConstraintOp::Eq => value == target,
        ConstraintOp::NotEq => value != target,
        ConstraintOp::Gt => value > target,
        ConstraintOp::GtEq => value >= target,
        ConstraintOp::Lt => value < target,
        ConstraintOp::LtEq => value <= target,
        ConstraintOp::Like => {
            let prefix = constraint
                .like_prefix
                .as_deref()
                .map(str::as_bytes)
                .unwrap_or(target);
            value.len() >= prefix.len() && &value[..prefix.len()] == prefix
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use parquet::basic::ConvertedType;

    use super::*;
    use crate::bitmap::RowGroupBitmap;
    use crate::constraint::ConstraintValue;
    use crate::scanner::CellValue;

    fn spec(physical: PhysicalType, converted: ConvertedType) -> ColumnSpec {
        ColumnSpec {
            name: "c".to_string(),
            physical,
            converted,
            type_length: 0,
        }
    }

    fn constraint(op: ConstraintOp, value: ConstraintValue) -> Constraint {
        Constraint::new(Some(0), "c", op, value, RowGroupBitmap::new(1))
    }

    fn int_cell(value: i64) -> Cell {
        Cell {
            row_id: 1,
            null: false,
            value: CellValue::Int(value),
        }
    }

    fn text_cell(value: &str) -> Cell {
        Cell {
            row_id: 1,
            null: false,
            value: CellValue::Bytes(value.as_bytes().to_vec()),
        }
    }

    fn null_cell() -> Cell {
        Cell {
            row_id: 1,
            null: true,
            value: CellValue::None,
        }
    }

    #[test]
    fn integer_comparisons_are_exact() {
        let spec = spec(PhysicalType::INT32, ConvertedType::NONE);
        let cell = int_cell(42);
        let cases = [
            (ConstraintOp::Eq, 42, true),
            (ConstraintOp::Eq, 41, false),
            (ConstraintOp::NotEq, 41, true),
            (ConstraintOp::Gt, 41, true),
            (ConstraintOp::Gt, 42, false),
            (ConstraintOp::GtEq, 42, true),
            (ConstraintOp::Lt, 43, true),
            (ConstraintOp::LtEq, 41, false),
        ];
        for (op, target, expected) in cases {
            let c = constraint(op, ConstraintValue::Integer(target));
            assert_eq!(
                row_may_match(&c, Some((&spec, &cell)), 1),
                expected,
                "{op:?} {target}"
            );
        }
    }

    #[test]
    fn rowid_compares_against_row_id() {
        let c = Constraint::new(
            None,
            "rowid",
            ConstraintOp::Eq,
            ConstraintValue::Integer(550),
            RowGroupBitmap::new(1),
        );
        assert!(row_may_match(&c, None, 550));
        assert!(!row_may_match(&c, None, 549));
    }

    #[test]
    fn null_semantics() {
        let spec = spec(PhysicalType::INT32, ConvertedType::NONE);
        let cell = null_cell();

        let is_null = constraint(ConstraintOp::IsNull, ConstraintValue::Null);
        assert!(row_may_match(&is_null, Some((&spec, &cell)), 1));
        assert!(!row_may_match(&is_null, Some((&spec, &int_cell(1))), 1));

        let is_not_null = constraint(ConstraintOp::IsNotNull, ConstraintValue::Null);
        assert!(!row_may_match(&is_not_null, Some((&spec, &cell)), 1));

        // a null cell never satisfies a comparison
        let eq = constraint(ConstraintOp::Eq, ConstraintValue::Integer(0));
        assert!(!row_may_match(&eq, Some((&spec, &cell)), 1));
    }

    #[test]
    fn text_comparisons_are_bytewise() {
        let spec = spec(PhysicalType::BYTE_ARRAY, ConvertedType::UTF8);
        let cell = text_cell("cherry");

        let eq = constraint(
            ConstraintOp::Eq,
            ConstraintValue::Text("cherry".to_string()),
        );
        assert!(row_may_match(&eq, Some((&spec, &cell)), 1));

        let gt = constraint(
            ConstraintOp::Gt,
            ConstraintValue::Text("banana".to_string()),
        );
        assert!(row_may_match(&gt, Some((&spec, &cell)), 1));

        let lt = constraint(
            ConstraintOp::Lt,
            ConstraintValue::Text("banana".to_string()),
        );
        assert!(!row_may_match(&lt, Some((&spec, &cell)), 1));
    }

    #[test]
    fn like_is_a_prefix_test() {
        let spec = spec(PhysicalType::BYTE_ARRAY, ConvertedType::UTF8);
        let like = constraint(
            ConstraintOp::Like,
            ConstraintValue::Text("ch%".to_string()),
        );
        assert!(row_may_match(&like, Some((&spec, &text_cell("cherry"))), 1));
        assert!(!row_may_match(&like, Some((&spec, &text_cell("date"))), 1));
        assert!(!row_may_match(&like, Some((&spec, &text_cell("c"))), 1));
        // over-approximation: the prefix matches even though the full
        // pattern might not; the host settles it
        let like = constraint(
            ConstraintOp::Like,
            ConstraintValue::Text("ch_rry".to_string()),
        );
        assert!(row_may_match(&like, Some((&spec, &text_cell("chXrry"))), 1));
        assert!(row_may_match(&like, Some((&spec, &text_cell("chair"))), 1));
    }

    #[test]
    fn blob_columns_pass_through() {
        let spec = spec(PhysicalType::BYTE_ARRAY, ConvertedType::NONE);
        let c = constraint(ConstraintOp::Eq, ConstraintValue::Blob(vec![9, 9]));
        assert!(row_may_match(&c, Some((&spec, &text_cell("anything"))), 1));
    }

    #[test]
    fn mismatched_families_pass_through() {
        let spec = spec(PhysicalType::INT32, ConvertedType::NONE);
        let c = constraint(
            ConstraintOp::Eq,
            ConstraintValue::Text("30.0".to_string()),
        );
        assert!(row_may_match(&c, Some((&spec, &int_cell(30))), 1));
    }

    #[test]
    fn double_comparisons() {
        let spec = spec(PhysicalType::DOUBLE, ConvertedType::NONE);
        let cell = Cell {
            row_id: 1,
            null: false,
            value: CellValue::Double(1.5),
        };
        let c = constraint(ConstraintOp::Gt, ConstraintValue::Double(1.0));
        assert!(row_may_match(&c, Some((&spec, &cell)), 1));
        let c = constraint(ConstraintOp::Lt, ConstraintValue::Double(1.0));
        assert!(!row_may_match(&c, Some((&spec, &cell)), 1));
    }
}
