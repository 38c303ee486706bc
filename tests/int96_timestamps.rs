use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use parquet::data_type::{Int96, Int96Type};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::parser::parse_message_type;
use rusqlite::Connection;
use tempfile::TempDir;

const JULIAN_DAY_OF_EPOCH: u32 = 2_440_588;

fn int96(nanos_of_day: u64, julian_day: u32) -> Int96 {
    let low = nanos_of_day as u32;
    let high = (nanos_of_day >> 32) as u32;
    Int96::from(vec![low, high, julian_day])
}

fn write_int96_groups(path: &Path, groups: &[Vec<Int96>]) {
    let schema = Arc::new(parse_message_type("message schema { REQUIRED INT96 ts; }").unwrap());
    let props = Arc::new(
        WriterProperties::builder()
            .set_statistics_enabled(EnabledStatistics::Chunk)
            .build(),
    );
    let file = File::create(path).unwrap();
    let mut writer = SerializedFileWriter::new(file, schema, props).unwrap();
    for group in groups {
        let mut row_group = writer.next_row_group().unwrap();
        if let Some(mut column) = row_group.next_column().unwrap() {
            column
                .typed::<Int96Type>()
                .write_batch(group, None, None)
                .unwrap();
            column.close().unwrap();
        }
        row_group.close().unwrap();
    }
    writer.close().unwrap();
}

fn connect(path: &Path) -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    strata::register_parquet_module(&conn).unwrap();
    conn.execute_batch(&format!(
        "CREATE VIRTUAL TABLE t USING parquet('{}')",
        path.display()
    ))
    .unwrap();
    conn
}

#[test]
fn int96_declares_as_bigint() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ts.parquet");
    write_int96_groups(&path, &[vec![int96(0, JULIAN_DAY_OF_EPOCH)]]);

    let conn = connect(&path);
    let decl: String = conn
        .query_row("PRAGMA table_info(t)", [], |row| row.get(2))
        .unwrap();
    assert_eq!(decl, "BIGINT");
}

#[test]
fn epoch_materializes_as_zero() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ts.parquet");
    write_int96_groups(&path, &[vec![int96(0, JULIAN_DAY_OF_EPOCH)]]);

    let conn = connect(&path);
    let value: i64 = conn
        .query_row("SELECT ts FROM t", [], |row| row.get(0))
        .unwrap();
    assert_eq!(value, 0);
}

#[test]
fn one_day_and_one_millisecond() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ts.parquet");
    write_int96_groups(&path, &[vec![int96(1_000_000, JULIAN_DAY_OF_EPOCH + 1)]]);

    let conn = connect(&path);
    let value: i64 = conn
        .query_row("SELECT ts FROM t", [], |row| row.get(0))
        .unwrap();
    assert_eq!(value, 86_400_001);
}

#[test]
fn nanosecond_precision_truncates_to_milliseconds() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ts.parquet");
    write_int96_groups(&path, &[vec![int96(1_999_999, JULIAN_DAY_OF_EPOCH)]]);

    let conn = connect(&path);
    let value: i64 = conn
        .query_row("SELECT ts FROM t", [], |row| row.get(0))
        .unwrap();
    assert_eq!(value, 1);
}

#[test]
fn int96_constraints_compare_in_milliseconds() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ts.parquet");
    // one group per day
    write_int96_groups(
        &path,
        &[
            vec![int96(0, JULIAN_DAY_OF_EPOCH), int96(1_000, JULIAN_DAY_OF_EPOCH)],
            vec![int96(0, JULIAN_DAY_OF_EPOCH + 1)],
            vec![int96(0, JULIAN_DAY_OF_EPOCH + 2)],
        ],
    );

    let conn = connect(&path);
    let values: Vec<i64> = {
        let mut stmt = conn
            .prepare("SELECT ts FROM t WHERE ts >= 86400000")
            .unwrap();
        let rows = stmt.query_map([], |row| row.get(0)).unwrap();
        rows.collect::<Result<_, _>>().unwrap()
    };
    assert_eq!(values, vec![86_400_000, 172_800_000]);

    let count: i64 = conn
        .query_row(
            "SELECT count(*) FROM t WHERE ts = 172800000",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 1);
}
