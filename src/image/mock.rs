use super::{ImageEncoder, ImagePayload};
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Start-of-image and end-of-image markers, enough to look like a JPEG.
const FAKE_JPEG: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xD9];

#[derive(Clone)]
pub struct MockImageEncoder {
    encode_count: Arc<Mutex<usize>>,
    output: Vec<u8>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockImageEncoder {
    pub fn new() -> Self {
        Self {
            encode_count: Arc::new(Mutex::new(0)),
            output: FAKE_JPEG.to_vec(),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_output(mut self, output: Vec<u8>) -> Self {
        self.output = output;
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_encode_count(&self) -> usize {
        *self.encode_count.lock().unwrap()
    }
}

impl Default for MockImageEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageEncoder for MockImageEncoder {
    async fn encode_jpeg(&self, _image: ImagePayload) -> Result<Vec<u8>> {
        *self.encode_count.lock().unwrap() += 1;

        if *self.should_fail.lock().unwrap() {
            return Err(crate::Error::ImageEncoding(image::ImageError::IoError(
                std::io::Error::other("Mock failure"),
            )));
        }

        Ok(self.output.clone())
    }
}
