use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use parquet::file::metadata::ParquetMetaData;
use parquet::file::reader::{FileReader, SerializedFileReader};

use crate::error::Result;
use crate::schema::{self, ColumnSpec};

/// Table-level state: one per `CREATE VIRTUAL TABLE`, shared read-only by
/// every cursor. The footer is read exactly once, here; cursors get their
/// own reader over the same path but lean on this metadata for everything
/// the filter needs before a row group is opened.
pub(crate) struct ParquetTable {
    path: PathBuf,
    name: String,
    metadata: Arc<ParquetMetaData>,
    columns: Arc<Vec<ColumnSpec>>,
}

impl ParquetTable {
    /// Open the file, validate and map its schema, and keep the metadata.
    /// Fails (and the virtual table is not created) if any column has no
    /// SQL mapping.
    pub(crate) fn open(path: impl Into<PathBuf>, name: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let file = File::open(&path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = Arc::new(reader.metadata().clone());
        let columns = schema::map_schema(metadata.file_metadata().schema_descr())?;
        Ok(Self {
            path,
            name: name.into(),
            metadata,
            columns: Arc::new(columns),
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn columns(&self) -> &Arc<Vec<ColumnSpec>> {
        &self.columns
    }

    pub(crate) fn column_name(&self, i: usize) -> &str {
        &self.columns[i].name
    }

    pub(crate) fn metadata(&self) -> &Arc<ParquetMetaData> {
        &self.metadata
    }

    pub(crate) fn num_row_groups(&self) -> usize {
        self.metadata.num_row_groups()
    }

    pub(crate) fn declaration_sql(&self) -> String {
        schema::create_table_sql(&self.columns)
    }

    /// A fresh reader for a cursor. The reader is stateless, so one per
    /// cursor suffices for any number of `filter` resets.
    pub(crate) fn open_reader(&self) -> Result<SerializedFileReader<File>> {
        let file = File::open(&self.path)?;
        Ok(SerializedFileReader::new(file)?)
    }
}
