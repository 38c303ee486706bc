use crate::constraint::ConstraintOp;

/// Can a value satisfying `<column> <op> <value>` exist inside `[min, max]`?
///
/// Works for every ordered family the filter handles: `i64`, `f64`, and
/// byte slices (whose `PartialOrd` is exactly the lexicographic order the
/// statistics use). Operators with no interval semantics pass through.
pub(super) fn interval_may_contain<T>(op: ConstraintOp, value: &T, min: &T, max: &T) -> bool
where
    T: PartialOrd + PartialEq + ?Sized,
{
    match op {
        ConstraintOp::Is | ConstraintOp::Eq => value >= min && value <= max,
        ConstraintOp::GtEq => max >= value,
        ConstraintOp::Gt => max > value,
        ConstraintOp::Lt => min < value,
        ConstraintOp::LtEq => min <= value,
        // only a constant group pinned to the value can be skipped
        ConstraintOp::NotEq => !(min == max && value == min),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_needs_overlap() {
        assert!(interval_may_contain(ConstraintOp::Eq, &5i64, &0, &10));
        assert!(!interval_may_contain(ConstraintOp::Eq, &11i64, &0, &10));
        assert!(!interval_may_contain(ConstraintOp::Eq, &-1i64, &0, &10));
        assert!(interval_may_contain(ConstraintOp::Is, &0i64, &0, &10));
    }

    #[test]
    fn ordering_ops_check_the_relevant_bound() {
        assert!(interval_may_contain(ConstraintOp::Gt, &9i64, &0, &10));
        assert!(!interval_may_contain(ConstraintOp::Gt, &10i64, &0, &10));
        assert!(interval_may_contain(ConstraintOp::GtEq, &10i64, &0, &10));
        assert!(!interval_may_contain(ConstraintOp::GtEq, &11i64, &0, &10));
        assert!(interval_may_contain(ConstraintOp::Lt, &1i64, &0, &10));
        assert!(!interval_may_contain(ConstraintOp::Lt, &0i64, &0, &10));
        assert!(interval_may_contain(ConstraintOp::LtEq, &0i64, &0, &10));
        assert!(!interval_may_contain(ConstraintOp::LtEq, &-1i64, &0, &10));
    }

    #[test]
    fn not_equal_only_skips_constant_groups() {
        assert!(!interval_may_contain(ConstraintOp::NotEq, &7i64, &7, &7));
        assert!(interval_may_contain(ConstraintOp::NotEq, &7i64, &7, &8));
        assert!(interval_may_contain(ConstraintOp::NotEq, &6i64, &7, &7));
    }

    #[test]
    fn byte_slices_compare_lexicographically() {
        let min: &[u8] = b"apple";
        let max: &[u8] = b"banana";
        assert!(interval_may_contain(
            ConstraintOp::Eq,
            b"avocado".as_slice(),
            min,
            max
        ));
        assert!(!interval_may_contain(
            ConstraintOp::Eq,
            b"cherry".as_slice(),
            min,
            max
        ));
        // a prefix of min sorts before it
        assert!(!interval_may_contain(
            ConstraintOp::Eq,
            b"app".as_slice(),
            min,
            max
        ));
    }

    #[test]
    fn doubles_compare_arithmetically() {
        assert!(interval_may_contain(ConstraintOp::Eq, &1.5f64, &1.0, &2.0));
        assert!(!interval_may_contain(ConstraintOp::Gt, &2.0f64, &1.0, &2.0));
    }
}
