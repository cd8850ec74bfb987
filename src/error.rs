use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogViewError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // 后端以 ApiResponse 包装返回的业务错误
    #[error("API error [{code}]: {message}")]
    Api { code: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Time parse error: {0}")]
    TimeParse(String),

    #[error("Invalid JSON document: {0}")]
    StrictJson(#[from] crate::text::StrictJsonError),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LogViewError>;
