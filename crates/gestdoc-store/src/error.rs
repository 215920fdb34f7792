use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: i64 },

    #[cfg(feature = "duckdb")]
    #[error("duckdb error: {0}")]
    DuckDb(#[from] ::duckdb::Error),

    #[error("turn metadata encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid stored value in {column}: {value:?}")]
    InvalidValue { column: &'static str, value: String },

    #[error("{0}")]
    Other(String),
}
