use axum::http::StatusCode;

/// Failures of the persistent store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The stored blob exists but is not a valid serialization.
    #[error("corrupt data under key {key}: {reason}")]
    CorruptData { key: String, reason: String },

    /// The medium failed to read the blob.
    #[error("failed to read key {key}: {source}")]
    StorageRead {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The medium rejected the write.
    #[error("failed to write key {key}: {source}")]
    StorageWrite {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Invalid startup configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("hour {0} is out of range (0-23)")]
    HourOutOfRange(u32),

    #[error("window start {start} is after window end {end}")]
    InvertedWindow { start: u8, end: u8 },

    #[error("invalid value for {var}: {value:?}")]
    InvalidVar { var: &'static str, value: String },
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
