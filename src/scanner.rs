use parquet::column::reader::{ColumnReader, ColumnReaderImpl};
use parquet::data_type::{
    BoolType, ByteArrayType, DataType, DoubleType, FixedLenByteArrayType, FloatType, Int32Type,
    Int64Type, Int96, Int96Type,
};
use parquet::file::reader::RowGroupReader;

use crate::error::{Result, StrataError};

/// A materialized cell: the value most recently decoded for one column,
/// tagged with the row it belongs to.
#[derive(Clone, Debug, Default)]
pub(crate) struct Cell {
    /// Row whose value currently occupies this cell. Reset to the row id
    /// preceding the group on every group transition.
    pub row_id: i64,
    pub null: bool,
    pub value: CellValue,
}

/// The value family a cell holds. The column's physical type decides which
/// variant is live: BOOLEAN and the INT types land in `Int` (INT96 already
/// converted to milliseconds since epoch), FLOAT widens into `Double`, and
/// both byte-array kinds land in `Bytes`.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) enum CellValue {
    #[default]
    None,
    Int(i64),
    Double(f64),
    Bytes(Vec<u8>),
}

impl CellValue {
    pub(crate) fn int(&self) -> i64 {
        match self {
            CellValue::Int(v) => *v,
            _ => 0,
        }
    }

    pub(crate) fn double(&self) -> f64 {
        match self {
            CellValue::Double(v) => *v,
            _ => 0.0,
        }
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        match self {
            CellValue::Bytes(v) => v,
            _ => &[],
        }
    }
}

/// Convert an INT96 timestamp (nanoseconds into the day in the low two
/// words, Julian day in the third) to milliseconds since the Unix epoch.
/// The intermediate arithmetic runs in `i128`: a plausible Julian day times
/// a day of nanoseconds overflows `i64`.
pub(crate) fn int96_to_millis(value: &Int96) -> i64 {
    const JULIAN_DAY_OF_EPOCH: i128 = 2_440_588;
    const NANOS_PER_DAY: i128 = 86_400 * 1_000_000_000;

    let data = value.data();
    let nanos_of_day = (data[0] as u64) | ((data[1] as u64) << 32);
    let julian_day = i128::from(data[2]);

    let nanos_since_epoch =
        (julian_day - JULIAN_DAY_OF_EPOCH) * NANOS_PER_DAY + nanos_of_day as i128;
    (nanos_since_epoch / 1_000_000) as i64
}

/// A forward-only reader over one column chunk, created lazily on the first
/// access to its column within a row group and discarded at the group
/// boundary. One variant per physical kind; the value coercion into
/// [`CellValue`] lives on the variant.
pub(crate) enum ColumnScanner {
    Bool(TypedScanner<BoolType>),
    Int32(TypedScanner<Int32Type>),
    Int64(TypedScanner<Int64Type>),
    Int96(TypedScanner<Int96Type>),
    Float(TypedScanner<FloatType>),
    Double(TypedScanner<DoubleType>),
    ByteArray(TypedScanner<ByteArrayType>),
    FixedLenByteArray(TypedScanner<FixedLenByteArrayType>),
}

impl ColumnScanner {
    pub(crate) fn create(row_group: &dyn RowGroupReader, column: usize) -> Result<Self> {
        Ok(match row_group.get_column_reader(column)? {
            ColumnReader::BoolColumnReader(r) => ColumnScanner::Bool(TypedScanner::new(r)),
            ColumnReader::Int32ColumnReader(r) => ColumnScanner::Int32(TypedScanner::new(r)),
            ColumnReader::Int64ColumnReader(r) => ColumnScanner::Int64(TypedScanner::new(r)),
            ColumnReader::Int96ColumnReader(r) => ColumnScanner::Int96(TypedScanner::new(r)),
            ColumnReader::FloatColumnReader(r) => ColumnScanner::Float(TypedScanner::new(r)),
            ColumnReader::DoubleColumnReader(r) => ColumnScanner::Double(TypedScanner::new(r)),
            ColumnReader::ByteArrayColumnReader(r) => {
                ColumnScanner::ByteArray(TypedScanner::new(r))
            }
            ColumnReader::FixedLenByteArrayColumnReader(r) => {
                ColumnScanner::FixedLenByteArray(TypedScanner::new(r))
            }
        })
    }

    /// Skip `n` records without decoding values. This is what keeps unread
    /// columns cheap: a column only consulted late in a group fast-forwards
    /// to the current row instead of materializing everything in between.
    pub(crate) fn skip(&mut self, n: usize, column: usize) -> Result<()> {
        match self {
            ColumnScanner::Bool(s) => s.skip(n, column),
            ColumnScanner::Int32(s) => s.skip(n, column),
            ColumnScanner::Int64(s) => s.skip(n, column),
            ColumnScanner::Int96(s) => s.skip(n, column),
            ColumnScanner::Float(s) => s.skip(n, column),
            ColumnScanner::Double(s) => s.skip(n, column),
            ColumnScanner::ByteArray(s) => s.skip(n, column),
            ColumnScanner::FixedLenByteArray(s) => s.skip(n, column),
        }
    }

    /// Decode the next record into a cell value. `None` means the record
    /// exists but is null. A missing record is fatal: row-group metadata
    /// promised more rows than the column chunk delivered.
    pub(crate) fn advance(&mut self, column: usize) -> Result<(bool, CellValue)> {
        match self {
            ColumnScanner::Bool(s) => {
                let value = s.read_one(column)?;
                Ok(cell(value.map(|v| CellValue::Int(i64::from(*v)))))
            }
            ColumnScanner::Int32(s) => {
                let value = s.read_one(column)?;
                Ok(cell(value.map(|v| CellValue::Int(i64::from(*v)))))
            }
            ColumnScanner::Int64(s) => {
                let value = s.read_one(column)?;
                Ok(cell(value.map(|v| CellValue::Int(*v))))
            }
            ColumnScanner::Int96(s) => {
                let value = s.read_one(column)?;
                Ok(cell(value.map(|v| CellValue::Int(int96_to_millis(v)))))
            }
            ColumnScanner::Float(s) => {
                let value = s.read_one(column)?;
                Ok(cell(value.map(|v| CellValue::Double(f64::from(*v)))))
            }
            ColumnScanner::Double(s) => {
                let value = s.read_one(column)?;
                Ok(cell(value.map(|v| CellValue::Double(*v))))
            }
            ColumnScanner::ByteArray(s) => {
                let value = s.read_one(column)?;
                Ok(cell(value.map(|v| CellValue::Bytes(v.data().to_vec()))))
            }
            ColumnScanner::FixedLenByteArray(s) => {
                let value = s.read_one(column)?;
                Ok(cell(value.map(|v| CellValue::Bytes(v.data().to_vec()))))
            }
        }
    }
}

fn cell(value: Option<CellValue>) -> (bool, CellValue) {
    match value {
        Some(value) => (false, value),
        None => (true, CellValue::None),
    }
}

pub(crate) struct TypedScanner<T: DataType> {
    reader: ColumnReaderImpl<T>,
    values: Vec<T::T>,
    def_levels: Vec<i16>,
}

impl<T: DataType> TypedScanner<T> {
    fn new(reader: ColumnReaderImpl<T>) -> Self {
        Self {
            reader,
            values: Vec::with_capacity(1),
            def_levels: Vec::with_capacity(1),
        }
    }

    fn read_one(&mut self, column: usize) -> Result<Option<&T::T>> {
        self.values.clear();
        self.def_levels.clear();
        let (records, values, _) =
            self.reader
                .read_records(1, Some(&mut self.def_levels), None, &mut self.values)?;
        if records == 0 {
            return Err(StrataError::CorruptFile {
                message: format!("column {column} unexpectedly lacking a next value"),
            });
        }
        // a record with no value is a null
        Ok(if values == 0 {
            None
        } else {
            Some(&self.values[0])
        })
    }

    fn skip(&mut self, n: usize, column: usize) -> Result<()> {
        let skipped = self.reader.skip_records(n)?;
        if skipped != n {
            return Err(StrataError::CorruptFile {
                message: format!("column {column}: wanted to skip {n} records, got {skipped}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int96(nanos_of_day: u64, julian_day: u32) -> Int96 {
        let low = nanos_of_day as u32;
        let high = (nanos_of_day >> 32) as u32;
        Int96::from(vec![low, high, julian_day])
    }

    #[test]
    fn int96_epoch_is_zero() {
        assert_eq!(int96_to_millis(&int96(0, 2_440_588)), 0);
    }

    #[test]
    fn int96_one_day_and_one_milli() {
        assert_eq!(int96_to_millis(&int96(1_000_000, 2_440_589)), 86_400_001);
    }

    #[test]
    fn int96_truncates_sub_millisecond_nanos() {
        assert_eq!(int96_to_millis(&int96(999_999, 2_440_588)), 0);
    }

    #[test]
    fn int96_before_epoch_is_negative() {
        assert_eq!(int96_to_millis(&int96(0, 2_440_587)), -86_400_000);
    }

    #[test]
    fn int96_wide_nanos_span_both_words() {
        // 2^33 ns is past the low word's range
        let nanos = 1u64 << 33;
        assert_eq!(
            int96_to_millis(&int96(nanos, 2_440_588)),
            (nanos / 1_000_000) as i64
        );
    }
}
