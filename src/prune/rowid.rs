use crate::constraint::{Constraint, ConstraintOp};

/// The synthetic-rowid variant of the row-group filter: the group's rowids
/// are exactly `[first, first + size)`, so no statistics are involved.
///
/// A non-integer payload passes through (SQLite may hand down a text
/// literal; the row filter settles it).
pub(super) fn group_may_contain(constraint: &Constraint, first: i64, size: i64) -> bool {
    let Some(target) = constraint.value.integer() else {
        return true;
    };
    match constraint.op {
        // rowid is never null
        ConstraintOp::IsNull => false,
        ConstraintOp::Is | ConstraintOp::Eq => target >= first && target < first + size,
        ConstraintOp::Gt | ConstraintOp::GtEq => first + size > target,
        ConstraintOp::Lt => target > first,
        ConstraintOp::LtEq => target >= first,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::RowGroupBitmap;
    use crate::constraint::ConstraintValue;

    fn rowid_constraint(op: ConstraintOp, value: ConstraintValue) -> Constraint {
        Constraint::new(None, "rowid", op, value, RowGroupBitmap::new(1))
    }

    #[test]
    fn equality_targets_one_group() {
        // group holding rowids 501..=600
        let c = rowid_constraint(ConstraintOp::Eq, ConstraintValue::Integer(550));
        assert!(group_may_contain(&c, 501, 100));
        assert!(!group_may_contain(&c, 401, 100));
        assert!(!group_may_contain(&c, 601, 100));
    }

    #[test]
    fn interval_edges() {
        let c = rowid_constraint(ConstraintOp::Eq, ConstraintValue::Integer(501));
        assert!(group_may_contain(&c, 501, 100));
        let c = rowid_constraint(ConstraintOp::Eq, ConstraintValue::Integer(600));
        assert!(group_may_contain(&c, 501, 100));
        let c = rowid_constraint(ConstraintOp::Eq, ConstraintValue::Integer(601));
        assert!(!group_may_contain(&c, 501, 100));
    }

    #[test]
    fn ordering_ops() {
        let gt = rowid_constraint(ConstraintOp::Gt, ConstraintValue::Integer(650));
        assert!(!group_may_contain(&gt, 501, 100));
        let gt = rowid_constraint(ConstraintOp::Gt, ConstraintValue::Integer(550));
        assert!(group_may_contain(&gt, 501, 100));

        let ge = rowid_constraint(ConstraintOp::GtEq, ConstraintValue::Integer(600));
        assert!(group_may_contain(&ge, 501, 100));
        let ge = rowid_constraint(ConstraintOp::GtEq, ConstraintValue::Integer(601));
        assert!(!group_may_contain(&ge, 501, 100));

        let lt = rowid_constraint(ConstraintOp::Lt, ConstraintValue::Integer(501));
        assert!(!group_may_contain(&lt, 501, 100));
        let lt = rowid_constraint(ConstraintOp::Lt, ConstraintValue::Integer(502));
        assert!(group_may_contain(&lt, 501, 100));

        let le = rowid_constraint(ConstraintOp::LtEq, ConstraintValue::Integer(501));
        assert!(group_may_contain(&le, 501, 100));
        let le = rowid_constraint(ConstraintOp::LtEq, ConstraintValue::Integer(500));
        assert!(!group_may_contain(&le, 501, 100));
    }

    #[test]
    fn rowid_is_never_null() {
        let c = rowid_constraint(ConstraintOp::IsNull, ConstraintValue::Integer(0));
        assert!(!group_may_contain(&c, 1, 100));
    }

    #[test]
    fn non_integer_payload_passes() {
        let c = rowid_constraint(
            ConstraintOp::Eq,
            ConstraintValue::Text("550".to_string()),
        );
        assert!(group_may_contain(&c, 1, 100));
    }
}
