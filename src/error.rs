use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to read pricing sheet: {0}")]
    SheetLoad(#[from] std::io::Error),

    #[error("Malformed pricing sheet {tab}: {source}")]
    SheetParse {
        tab: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
