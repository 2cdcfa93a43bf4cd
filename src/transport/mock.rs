use super::{MultipartRequest, ProgressSender, Transport, TransportResponse};
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
pub struct MockTransport {
    requests: Arc<Mutex<Vec<MultipartRequest>>>,
    status: u16,
    body: Vec<u8>,
    progress: Vec<f32>,
    delay: Option<Duration>,
    failure: Option<String>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            status: 200,
            body: b"{}".to_vec(),
            progress: vec![0.5, 1.0],
            delay: None,
            failure: None,
        }
    }

    pub fn with_response(mut self, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.status = status;
        self.body = body.into();
        self
    }

    pub fn with_json(self, status: u16, json: serde_json::Value) -> Self {
        self.with_response(status, json.to_string())
    }

    /// Progress fractions reported, in order, before the response.
    pub fn with_progress(mut self, progress: Vec<f32>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail at the transport level, as a refused connection would.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn get_send_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn get_requests(&self) -> Vec<MultipartRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        request: MultipartRequest,
        progress: ProgressSender,
    ) -> Result<TransportResponse> {
        self.requests.lock().unwrap().push(request);

        for fraction in &self.progress {
            let _ = progress.send(*fraction);
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.failure {
            return Err(crate::Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                message.clone(),
            )));
        }

        Ok(TransportResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}
