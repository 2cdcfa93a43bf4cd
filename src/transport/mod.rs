//! Byte transport for multipart uploads
//!
//! The client decides what to send; a [`Transport`] puts it on the wire and
//! reports how far it got.

pub mod http;
pub mod mock;

pub use http::HttpTransport;
pub use mock::MockTransport;

use crate::request::Headers;
use crate::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Receives upload progress as a fraction in `[0.0, 1.0]`.
pub type ProgressSender = mpsc::UnboundedSender<f32>;

/// The single file part of an upload form.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePart {
    pub name: String,
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImagePart {
    /// `imagefile` part named `image.jpeg`.
    pub fn jpeg(data: Vec<u8>) -> Self {
        Self {
            name: "imagefile".to_string(),
            file_name: "image.jpeg".to_string(),
            mime_type: "image/jpeg".to_string(),
            data,
        }
    }
}

/// A fully resolved `POST` with a one-part multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartRequest {
    pub url: String,
    pub headers: Headers,
    pub part: ImagePart,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: MultipartRequest,
        progress: ProgressSender,
    ) -> Result<TransportResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jpeg_part_metadata() {
        let part = ImagePart::jpeg(vec![1, 2]);
        assert_eq!(part.name, "imagefile");
        assert_eq!(part.file_name, "image.jpeg");
        assert_eq!(part.mime_type, "image/jpeg");
        assert_eq!(part.data, vec![1, 2]);
    }

    #[test]
    fn test_success_range() {
        let response = |status| TransportResponse {
            status,
            body: Vec::new(),
        };
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(!response(199).is_success());
        assert!(!response(301).is_success());
        assert!(!response(500).is_success());
    }
}
