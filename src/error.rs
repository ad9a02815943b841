use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpoolError {
    #[error("Print content is empty")]
    EmptyContent,

    #[error("Job not found: {0}")]
    JobNotFound(u64),

    #[error("Persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("QR encoding error: {0}")]
    Encode(String),

    #[error("Printer service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<qrcode::types::QrError> for SpoolError {
    fn from(err: qrcode::types::QrError) -> Self {
        SpoolError::Encode(err.to_string())
    }
}

impl From<image::ImageError> for SpoolError {
    fn from(err: image::ImageError) -> Self {
        SpoolError::Encode(err.to_string())
    }
}

impl From<reqwest::Error> for SpoolError {
    fn from(err: reqwest::Error) -> Self {
        SpoolError::ServiceUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SpoolError>;
