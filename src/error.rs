//! Structured error types for cellgrid.
//!
//! Recoverable conditions (bad clipboard payloads, stale focus, missing cell
//! fields) are handled where they occur and never reach these types. What
//! remains is caller misuse and lookups that callers may want to inspect.

/// Kind of value a cell field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Time,
    Json,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Time => "time",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

/// Failure of a typed cell field access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CellAccessError {
    /// The variant has no such field, or it is unset.
    #[error("Property \"{field}\" is missing in cell of type \"{cell_type}\"")]
    Missing { field: String, cell_type: String },

    /// The field exists but holds a different kind of value.
    #[error("Property \"{field}\" expected to be of type {expected} but is {found}")]
    WrongKind {
        field: String,
        expected: FieldKind,
        found: FieldKind,
    },
}

/// All errors that can occur while building or driving a grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A row id that does not exist in the current matrix.
    #[error("Row with id \"{0}\" does not exist")]
    UnknownRow(String),

    /// A column id that does not exist in the current matrix.
    #[error("Column with id \"{0}\" does not exist")]
    UnknownColumn(String),

    /// Two rows share the same id.
    #[error("Duplicate row id: {0}")]
    DuplicateRowId(String),

    /// Two columns share the same id.
    #[error("Duplicate column id: {0}")]
    DuplicateColumnId(String),

    /// More sticky rows requested than there are rows.
    #[error("stickyTopRows ({sticky}) exceeds row count ({count})")]
    StickyRowsOutOfBounds { sticky: usize, count: usize },

    /// More sticky columns requested than there are columns.
    #[error("stickyLeftColumns ({sticky}) exceeds column count ({count})")]
    StickyColumnsOutOfBounds { sticky: usize, count: usize },

    /// Negative or non-finite row height / column width.
    #[error("Invalid size {size} for {item}")]
    InvalidSize { item: String, size: f32 },

    /// The row carries no cell for the column.
    #[error("No cell at row \"{row_id}\", column \"{column_id}\"")]
    MissingCell { row_id: String, column_id: String },

    /// No template registered for a cell type tag.
    #[error("No cell template registered for type \"{0}\"")]
    MissingTemplate(String),

    /// Typed cell field access failed.
    #[error(transparent)]
    CellAccess(#[from] CellAccessError),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl From<String> for GridError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
