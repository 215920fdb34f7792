use gestdoc_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("query text is empty")]
    EmptyInput,

    /// Missing, or owned by someone else. The two are not distinguished.
    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: i64 },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Rejected [`EngineSettings`](crate::EngineSettings).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("history window must be even and greater than zero, got {0}")]
    HistoryWindow(usize),
    #[error("{field} must be greater than zero")]
    ZeroLimit { field: &'static str },
}
