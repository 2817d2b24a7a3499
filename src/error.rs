use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool discovers, extracts, or renders a delivery note.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a template override file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::Error),

    /// Raised when the workbook contains no worksheet at all.
    #[error("workbook {0} contains no worksheets")]
    EmptyWorkbook(PathBuf),

    /// Raised when no production order file exists in the input folder.
    #[error("no production order file found in {0}")]
    ProductionFileNotFound(PathBuf),

    /// Raised when the header region carries no usable order number.
    #[error("could not find the order number marker '{marker}' in the first {rows} rows")]
    MissingOrderId { marker: String, rows: u32 },

    /// Raised when the item table header cell cannot be located.
    #[error("could not find the table header '{0}' in columns A-C")]
    MissingTableHeader(String),

    /// Raised when a required column is absent from the table header row.
    #[error("table header row {row} has no '{column}' column")]
    MissingColumn { column: String, row: u32 },

    /// Raised when numeric parsing fails while reading an item row.
    #[error("invalid integer '{value}' in column {column} at row {row}")]
    InvalidNumber {
        column: String,
        row: u32,
        value: String,
    },

    /// Raised when the user provides a path that does not exist.
    #[error("input folder not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
