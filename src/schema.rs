use parquet::basic::{ConvertedType, Type as PhysicalType};
use parquet::schema::types::SchemaDescriptor;

use crate::error::{Result, StrataError};

/// Everything the scan engine needs to know about one declared column.
#[derive(Clone, Debug)]
pub struct ColumnSpec {
    pub name: String,
    pub physical: PhysicalType,
    pub converted: ConvertedType,
    /// Declared byte length for `FIXED_LEN_BYTE_ARRAY` columns, 0 otherwise.
    pub type_length: i32,
}

impl ColumnSpec {
    pub(crate) fn is_utf8(&self) -> bool {
        self.converted == ConvertedType::UTF8
    }
}

/// Walk the file schema and produce the declared column list.
///
/// Only flat scalar columns are mapped: anything nested (path depth > 1)
/// or repeated is rejected, as is any physical/converted combination the
/// type table below does not cover.
pub fn map_schema(descr: &SchemaDescriptor) -> Result<Vec<ColumnSpec>> {
    let mut columns = Vec::with_capacity(descr.num_columns());
    for i in 0..descr.num_columns() {
        let col = descr.column(i);
        let physical = col.physical_type();
        let converted = col.converted_type();

        if col.path().parts().len() != 1 || col.max_rep_level() > 0 {
            return Err(StrataError::UnsupportedColumn {
                column: i,
                physical: physical.to_string(),
                converted: converted.to_string(),
            });
        }
        if sql_type(physical, converted).is_none() {
            return Err(StrataError::UnsupportedColumn {
                column: i,
                physical: physical.to_string(),
                converted: converted.to_string(),
            });
        }

        columns.push(ColumnSpec {
            name: col.name().to_string(),
            physical,
            converted,
            type_length: col.type_length(),
        });
    }
    Ok(columns)
}

/// Render the `CREATE TABLE` declaration the host engine expects, columns
/// in Parquet order, names double-quoted with embedded quotes doubled.
pub fn create_table_sql(columns: &[ColumnSpec]) -> String {
    let mut sql = String::from("CREATE TABLE x(");
    for (i, col) in columns.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push('"');
        for ch in col.name.chars() {
            if ch == '"' {
                sql.push_str("\"\"");
            } else {
                sql.push(ch);
            }
        }
        sql.push('"');
        sql.push(' ');
        // map_schema vetted every column, so the lookup cannot miss
        sql.push_str(sql_type(col.physical, col.converted).unwrap_or("BLOB"));
    }
    sql.push_str(");");
    sql
}

/// The physical x converted -> SQL type table.
///
/// The converted-type allowlist is deliberate: unsigned ints would be
/// silently reinterpreted as signed if let through, so they are refused
/// rather than mismapped.
fn sql_type(physical: PhysicalType, converted: ConvertedType) -> Option<&'static str> {
    let supported = matches!(
        converted,
        ConvertedType::NONE
            | ConvertedType::UTF8
            | ConvertedType::DATE
            | ConvertedType::TIME_MILLIS
            | ConvertedType::TIMESTAMP_MILLIS
            | ConvertedType::TIME_MICROS
            | ConvertedType::TIMESTAMP_MICROS
            | ConvertedType::INT_8
            | ConvertedType::INT_16
            | ConvertedType::INT_32
            | ConvertedType::INT_64
    );
    if !supported {
        return None;
    }

    match physical {
        PhysicalType::BOOLEAN => Some("TINYINT"),
        PhysicalType::INT32 => match converted {
            ConvertedType::NONE | ConvertedType::INT_32 => Some("INT"),
            ConvertedType::INT_8 => Some("TINYINT"),
            ConvertedType::INT_16 => Some("SMALLINT"),
            _ => None,
        },
        // INT96 carries nanosecond timestamps; they surface truncated to
        // millisecond precision
        PhysicalType::INT64 | PhysicalType::INT96 => Some("BIGINT"),
        PhysicalType::FLOAT => Some("REAL"),
        PhysicalType::DOUBLE => Some("DOUBLE"),
        PhysicalType::BYTE_ARRAY => {
            if converted == ConvertedType::UTF8 {
                Some("TEXT")
            } else {
                Some("BLOB")
            }
        }
        PhysicalType::FIXED_LEN_BYTE_ARRAY => Some("BLOB"),
    }
}
