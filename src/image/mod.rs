//! Image payloads and JPEG encoding
//!
//! Whatever the caller hands in, a decoded image or the bytes of an image
//! file, is turned into JPEG at a fixed quality before it is uploaded.

pub mod encoder;
pub mod mock;

pub use encoder::JpegImageEncoder;
pub use mock::MockImageEncoder;

use crate::Result;
use async_trait::async_trait;
use image::DynamicImage;

/// JPEG quality used for every upload, half of the encoder's 1-100 scale.
pub const JPEG_QUALITY: u8 = 50;

/// An image as supplied by the caller.
#[derive(Debug, Clone)]
pub enum ImagePayload {
    Decoded(DynamicImage),
    /// Bytes of any format the `image` crate can decode.
    Encoded(Vec<u8>),
}

impl From<DynamicImage> for ImagePayload {
    fn from(image: DynamicImage) -> Self {
        ImagePayload::Decoded(image)
    }
}

impl From<Vec<u8>> for ImagePayload {
    fn from(bytes: Vec<u8>) -> Self {
        ImagePayload::Encoded(bytes)
    }
}

#[async_trait]
pub trait ImageEncoder: Send + Sync {
    async fn encode_jpeg(&self, image: ImagePayload) -> Result<Vec<u8>>;
}
