use super::{ImageEncoder, ImagePayload, JPEG_QUALITY};
use crate::{Error, Result};
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::error::{ParameterError, ParameterErrorKind};
use image::{DynamicImage, GenericImageView, ImageError};

pub struct JpegImageEncoder {
    quality: u8,
}

impl JpegImageEncoder {
    pub fn new() -> Self {
        Self {
            quality: JPEG_QUALITY,
        }
    }

    fn encode_sync(image: ImagePayload, quality: u8) -> Result<Vec<u8>> {
        let image = match image {
            ImagePayload::Decoded(image) => image,
            ImagePayload::Encoded(bytes) => image::load_from_memory(&bytes)?,
        };

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::ImageEncoding(ImageError::Parameter(
                ParameterError::from_kind(ParameterErrorKind::DimensionMismatch),
            )));
        }

        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
        jpeg_compatible(image).write_with_encoder(encoder)?;
        Ok(bytes)
    }
}

impl Default for JpegImageEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// JPEG has no alpha and only 8-bit samples; narrow everything else.
fn jpeg_compatible(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image,
        DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_) => DynamicImage::ImageLuma8(image.to_luma8()),
        _ => DynamicImage::ImageRgb8(image.to_rgb8()),
    }
}

#[async_trait]
impl ImageEncoder for JpegImageEncoder {
    async fn encode_jpeg(&self, image: ImagePayload) -> Result<Vec<u8>> {
        let quality = self.quality;
        let bytes = tokio::task::spawn_blocking(move || Self::encode_sync(image, quality))
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::other(format!(
                    "Image encoding task join error: {}",
                    e
                )))
            })??;

        tracing::debug!("Encoded image to {} JPEG bytes", bytes.len());
        Ok(bytes)
    }
}
