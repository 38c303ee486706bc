use crate::bitmap::RowGroupBitmap;

/// Comparison operators the host engine can hand down.
///
/// Operators the scan engine cannot evaluate (`Glob`, `Match`, `Regexp`,
/// `IsNot` on non-null values) still flow through: both filters treat them
/// as pass-through and leave the work to the host's own re-check.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConstraintOp {
    Eq,
    Gt,
    LtEq,
    Lt,
    GtEq,
    Match,
    Like,
    Glob,
    Regexp,
    NotEq,
    IsNot,
    IsNotNull,
    IsNull,
    Is,
}

impl ConstraintOp {
    pub(crate) fn symbol(self) -> &'static str {
        match self {
            ConstraintOp::Eq => "=",
            ConstraintOp::Gt => ">",
            ConstraintOp::LtEq => "<=",
            ConstraintOp::Lt => "<",
            ConstraintOp::GtEq => ">=",
            ConstraintOp::Match => "MATCH",
            ConstraintOp::Like => "LIKE",
            ConstraintOp::Glob => "GLOB",
            ConstraintOp::Regexp => "REGEXP",
            ConstraintOp::NotEq => "<>",
            ConstraintOp::IsNot => "IS NOT",
            ConstraintOp::IsNotNull => "IS NOT NULL",
            ConstraintOp::IsNull => "IS NULL",
            ConstraintOp::Is => "IS",
        }
    }
}

/// The constraint's right-hand side, tagged with the SQLite value type it
/// arrived as. SQLite is loose with types (the text `'30.0'` compares equal
/// to an integer column holding 30), so the row-group and row filters match
/// the payload kind against the column's family and pass when they differ.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintValue {
    Null,
    Integer(i64),
    Double(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl ConstraintValue {
    pub(crate) fn integer(&self) -> Option<i64> {
        match self {
            ConstraintValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub(crate) fn double(&self) -> Option<f64> {
        match self {
            ConstraintValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub(crate) fn text(&self) -> Option<&[u8]> {
        match self {
            ConstraintValue::Text(v) => Some(v.as_bytes()),
            _ => None,
        }
    }

    pub(crate) fn blob(&self) -> Option<&[u8]> {
        match self {
            ConstraintValue::Blob(v) => Some(v),
            _ => None,
        }
    }
}

/// One pushed-down predicate plus the per-scan learning state that rides
/// along with it.
#[derive(Clone, Debug)]
pub struct Constraint {
    /// Column the predicate applies to; `None` is the synthetic rowid.
    pub column: Option<usize>,
    /// Declared name, used for cache keying (`"rowid"` for the synthetic
    /// column).
    pub column_name: String,
    pub op: ConstraintOp,
    pub value: ConstraintValue,
    /// For `Text` + `Like`: the literal prefix up to the first `%` or `_`.
    /// Empty when the pattern starts with a wildcard.
    pub like_prefix: Option<String>,

    /// Learned membership for this constraint across the file's row groups.
    pub bitmap: RowGroupBitmap,
    /// Group currently being scanned on this constraint's behalf; `None`
    /// until a group passes the row-group filter.
    pub row_group_id: Option<usize>,
    /// Whether the current group produced at least one row this constraint
    /// accepted. Folded into `bitmap.actual` when the group is left behind.
    pub had_rows: bool,
}

impl Constraint {
    pub fn new(
        column: Option<usize>,
        column_name: impl Into<String>,
        op: ConstraintOp,
        value: ConstraintValue,
        bitmap: RowGroupBitmap,
    ) -> Self {
        let like_prefix = match (&value, op) {
            (ConstraintValue::Text(pattern), ConstraintOp::Like) => {
                Some(like_prefix_of(pattern))
            }
            _ => None,
        };
        Self {
            column,
            column_name: column_name.into(),
            op,
            value,
            like_prefix,
            bitmap,
            row_group_id: None,
            had_rows: false,
        }
    }

    /// Stable textual identity for this predicate, used verbatim as the
    /// cache key: `"<column> <op> <literal>"`, with an empty literal for
    /// Blob and Null payloads. Not required to be unique across
    /// semantically equivalent predicates, only stable within a session.
    pub fn fingerprint(&self) -> String {
        let mut key = String::new();
        key.push_str(&self.column_name);
        key.push(' ');
        key.push_str(self.op.symbol());
        key.push(' ');
        match &self.value {
            ConstraintValue::Integer(v) => key.push_str(&v.to_string()),
            ConstraintValue::Double(v) => key.push_str(&v.to_string()),
            ConstraintValue::Text(v) => key.push_str(v),
            ConstraintValue::Null | ConstraintValue::Blob(_) => {}
        }
        key
    }
}

/// The pattern's leading literal run. Truncating at `_` as well as `%`
/// over-approximates (`_` matches exactly one character, not any run), but
/// the row filter is a prefix match anyway and the host re-checks.
fn like_prefix_of(pattern: &str) -> String {
    match pattern.find(['%', '_']) {
        Some(idx) => pattern[..idx].to_string(),
        None => pattern.to_string(),
    }
}
