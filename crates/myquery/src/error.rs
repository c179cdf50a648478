// Error types for myquery client operations
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MyqueryError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned status {status} for {url}: {body}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
        body: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_yaml_ng::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MyqueryError>;
