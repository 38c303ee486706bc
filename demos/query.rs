/// Basic example demonstrating Parquet virtual tables with learned
/// row-group skipping.
///
/// This example shows how to:
/// 1. Register the module and declare a virtual table over a file
/// 2. Run constrained queries that skip non-matching row groups
/// 3. Inspect what the scan learned in the shadow cache table
use rusqlite::Connection;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Step 1: Write a Parquet file with 3 row groups
    //   Row group 0: id=[1..1000]
    //   Row group 1: id=[1000..2000]
    //   Row group 2: id=[2000..3000], but 42 tucked in at the end
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("demo.parquet");
    helpers::create_sample_parquet(&path)?;

    // Step 2: Declare the virtual table
    let conn = Connection::open_in_memory()?;
    strata::register_parquet_module(&conn)?;
    conn.execute_batch(&format!(
        "CREATE VIRTUAL TABLE demo USING parquet('{}')",
        path.display()
    ))?;

    // Step 3: Query it. `id = 1500` is settled by min/max statistics alone
    // (only row group 1 is opened); `id = 42` cannot be — the min/max of
    // groups 0 and 2 both span 42 — so the first scan walks both and
    // learns which one actually held it.
    let v: i64 = conn.query_row("SELECT id FROM demo WHERE id = 1500", [], |r| r.get(0))?;
    println!("id = 1500 -> {v}");

    let hits: Vec<i64> = conn
        .prepare("SELECT rowid FROM demo WHERE id = 42")?
        .query_map([], |r| r.get(0))?
        .collect::<Result<_, _>>()?;
    println!("id = 42 at rowids {hits:?}");

    // Step 4: What the scan learned, straight from the shadow table. On
    // the next `id = 42` query only the groups with a set bit in `actual`
    // are opened.
    let mut stmt = conn.prepare("SELECT clause, estimate, actual FROM _demo_rowgroups")?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let clause: String = row.get(0)?;
        let estimate: Vec<u8> = row.get(1)?;
        let actual: Vec<u8> = row.get(2)?;
        println!(
            "learned [{clause}]: estimate={} actual={}",
            bits(&estimate),
            bits(&actual)
        );
    }

    Ok(())
}

fn bits(blob: &[u8]) -> String {
    blob.iter().map(|b| format!("{b:08b}")).collect()
}

// ============================================================================
// Helper functions (Parquet setup)
// ============================================================================

mod helpers {
    use std::fs::File;
    use std::path::Path;
    use std::sync::Arc;

    use parquet::data_type::Int32Type;
    use parquet::file::properties::{EnabledStatistics, WriterProperties};
    use parquet::file::writer::SerializedFileWriter;
    use parquet::schema::parser::parse_message_type;

    pub fn create_sample_parquet(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let schema = Arc::new(parse_message_type("message schema { REQUIRED INT32 id; }")?);
        let props = Arc::new(
            WriterProperties::builder()
                .set_statistics_enabled(EnabledStatistics::Chunk)
                .build(),
        );
        let file = File::create(path)?;
        let mut writer = SerializedFileWriter::new(file, schema, props)?;

        let mut groups: Vec<Vec<i32>> = vec![
            (1..1000).collect(),
            (1000..2000).collect(),
            (2000..3000).collect(),
        ];
        // a single low outlier stretches group 2's min/max over 42 without
        // the group actually holding it
        groups[2].push(10);

        for group in &groups {
            let mut row_group = writer.next_row_group()?;
            if let Some(mut column) = row_group.next_column()? {
                column.typed::<Int32Type>().write_batch(group, None, None)?;
                column.close()?;
            }
            row_group.close()?;
        }
        writer.close()?;
        Ok(())
    }
}
