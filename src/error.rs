use thiserror::Error;

/// Errors raised by the scan engine.
///
/// Cache (shadow table) failures never appear here: they are advisory and
/// are swallowed at the call site.
#[derive(Debug, Error)]
pub enum StrataError {
    /// The `CREATE VIRTUAL TABLE` argument list was malformed
    #[error("{message}")]
    InvalidArgs {
        /// Human-readable usage message
        message: String,
    },

    /// A column's type has no SQL mapping
    #[error("column {column} has unsupported type: {physical}/{converted}")]
    UnsupportedColumn {
        /// Zero-based index of the offending column
        column: usize,
        /// Parquet physical type name
        physical: String,
        /// Parquet converted (logical) type name
        converted: String,
    },

    /// The file contradicts its own metadata (e.g. a scanner ran dry while
    /// rows were still owed, or a column's physical type drifted from the
    /// one declared at connect time)
    #[error("corrupt parquet file: {message}")]
    CorruptFile {
        /// What was expected and what was found
        message: String,
    },

    /// Decoder-level failure
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// The backing file could not be opened or read
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StrataError> for rusqlite::Error {
    fn from(err: StrataError) -> Self {
        rusqlite::Error::ModuleError(err.to_string())
    }
}

pub type Result<T, E = StrataError> = std::result::Result<T, E>;
