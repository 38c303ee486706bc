use parquet::file::statistics::Statistics;

use crate::scanner::int96_to_millis;

/// Pull a typed min/max pair out of chunk statistics, coerced into the
/// integer family: BOOLEAN as 0/1, INT96 converted to milliseconds since
/// epoch. `None` when the chunk carries no min/max or the column is not an
/// integer kind — the caller must then pass the group through.
pub(super) fn integer_min_max(statistics: &Statistics) -> Option<(i64, i64)> {
    match statistics {
        Statistics::Boolean(s) => {
            Some((i64::from(*s.min_opt()?), i64::from(*s.max_opt()?)))
        }
        Statistics::Int32(s) => Some((i64::from(*s.min_opt()?), i64::from(*s.max_opt()?))),
        Statistics::Int64(s) => Some((*s.min_opt()?, *s.max_opt()?)),
        Statistics::Int96(s) => Some((
            int96_to_millis(s.min_opt()?),
            int96_to_millis(s.max_opt()?),
        )),
        _ => None,
    }
}

/// Min/max in the double family; FLOAT widens losslessly.
pub(super) fn double_min_max(statistics: &Statistics) -> Option<(f64, f64)> {
    match statistics {
        Statistics::Float(s) => Some((f64::from(*s.min_opt()?), f64::from(*s.max_opt()?))),
        Statistics::Double(s) => Some((*s.min_opt()?, *s.max_opt()?)),
        _ => None,
    }
}

/// Raw byte min/max for BYTE_ARRAY chunks. FIXED_LEN_BYTE_ARRAY statistics
/// are deliberately not surfaced here (see the row-group filter).
pub(super) fn byte_min_max(statistics: &Statistics) -> Option<(&[u8], &[u8])> {
    match statistics {
        Statistics::ByteArray(s) => Some((s.min_opt()?.data(), s.max_opt()?.data())),
        _ => None,
    }
}
