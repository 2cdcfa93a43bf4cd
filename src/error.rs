//! Error handling and custom error types
//!
//! Every failure an upload can hit is a variant here, so the client can route
//! all of them through the single terminal callback.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No upload request attached to the client")]
    MissingRequest,

    #[error("Image encoding error: {0}")]
    ImageEncoding(#[from] image::ImageError),

    #[error("Multipart encoding error: {0}")]
    Multipart(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Response status code was unacceptable: {status}")]
    Status { status: u16, body: String },

    #[error("Response body was empty (status {status})")]
    EmptyResponse { status: u16 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Upload was cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
