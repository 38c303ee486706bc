/// The LIKE-prefix rule: a group may hold a string with the given prefix
/// iff the prefix falls inside `[min, max]` once both bounds are truncated
/// to the prefix's length. An empty prefix (pattern started with a
/// wildcard) can never exclude anything.
pub(super) fn group_may_contain(prefix: &[u8], min: &[u8], max: &[u8]) -> bool {
    if prefix.is_empty() {
        return true;
    }
    let truncated_min = &min[..min.len().min(prefix.len())];
    let truncated_max = &max[..max.len().min(prefix.len())];
    prefix >= truncated_min && prefix <= truncated_max
}

#[cfg(test)]
mod tests {
    use super::group_may_contain;

    #[test]
    fn prefix_inside_interval_passes() {
        assert!(group_may_contain(b"ch", b"cherry", b"date"));
    }

    #[test]
    fn prefix_outside_interval_is_excluded() {
        assert!(!group_may_contain(b"ch", b"apple", b"banana"));
        assert!(!group_may_contain(b"ab", b"cherry", b"date"));
    }

    #[test]
    fn truncation_keeps_covering_groups() {
        // min "abc" truncated to 1 byte is "a": any "a…" prefix stays in
        assert!(group_may_contain(b"a", b"abc", b"azz"));
        // a group spanning the prefix on both sides stays in
        assert!(group_may_contain(b"mm", b"alpha", b"zulu"));
    }

    #[test]
    fn empty_prefix_never_excludes() {
        assert!(group_may_contain(b"", b"cherry", b"date"));
    }

    #[test]
    fn bounds_shorter_than_prefix() {
        // max "c" truncated stays "c"; prefix "ch" > "c" excludes
        assert!(!group_may_contain(b"ch", b"a", b"c"));
        assert!(group_may_contain(b"ch", b"c", b"d"));
    }
}
