use thiserror::Error;

#[derive(Error, Debug)]
pub enum CentavoError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("No data found in the CSV file")]
    EmptyImport,

    #[error("Cannot decode {field} {value:?}: {reason}")]
    Decode {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Missing column: {0}")]
    MissingField(String),

    #[error("Empty description")]
    EmptyDescription,

    #[error("Row on line {line}: {source}")]
    Row {
        line: u64,
        #[source]
        source: Box<CentavoError>,
    },

    #[error("Not a CSV file: {0}")]
    NotCsv(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown expense: {0}")]
    UnknownExpense(i64),

    #[error("Invalid month: {0} (expected YYYY-MM)")]
    InvalidMonth(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

impl CentavoError {
    pub(crate) fn decode(field: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::Decode {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CentavoError>;
