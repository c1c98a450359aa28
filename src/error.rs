use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Schema mismatch: declared column '{column}' is absent from {table}")]
    SchemaMismatch { table: String, column: String },

    #[error("Type coercion failed in {table}: column '{column}' row {row} has non-integer value '{value}'")]
    TypeCoercion {
        table: String,
        column: String,
        row: usize,
        value: String,
    },

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Column '{column}' is {found}, expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
        found: String,
    },

    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported encoding: {0}")]
    Encoding(String),

    #[error("Frame operation failed: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
