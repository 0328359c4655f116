use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A dataset lacks a column the corpus builder needs.
    #[error("dataset `{dataset}` is missing required field `{field}`")]
    InvalidInput { dataset: String, field: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Saved corpus, index and meta disagree with each other.
    #[error("inconsistent snapshot: {0}")]
    Snapshot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Bincode(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
