use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuadraError {
    #[error("Memo not found: {0}")]
    MemoNotFound(i64),

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid package: {0}")]
    InvalidPackage(String),

    #[error("Invalid quadrant: {0}")]
    InvalidQuadrant(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, QuadraError>;
