#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Draft storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Draft serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
