use super::{MultipartRequest, ProgressSender, Transport, TransportResponse};
use crate::request::Headers;
use crate::{Error, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use std::time::Duration;

const CHUNK_SIZE: usize = 16 * 1024;

/// Sends uploads with reqwest, streaming the file part so progress can be
/// reported as the body is consumed.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::new_with_client(Client::new())
    }

    pub fn new_with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::new_with_client(client))
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn header_map(headers: &Headers) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidHeader(format!("{}: {}", name, e)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| Error::InvalidHeader(format!("{}: {}", name, e)))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn progress_body(data: Vec<u8>, progress: ProgressSender) -> Body {
    let total = data.len();
    let chunks: Vec<Vec<u8>> = data.chunks(CHUNK_SIZE).map(<[u8]>::to_vec).collect();

    let mut sent = 0usize;
    let stream = futures::stream::iter(chunks).map(move |chunk| {
        sent += chunk.len();
        let fraction = if total == 0 {
            1.0
        } else {
            sent as f32 / total as f32
        };
        let _ = progress.send(fraction);
        Ok::<_, std::io::Error>(chunk)
    });

    Body::wrap_stream(stream)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: MultipartRequest,
        progress: ProgressSender,
    ) -> Result<TransportResponse> {
        let headers = header_map(&request.headers)?;

        let part = request.part;
        let length = part.data.len() as u64;
        let file_part = Part::stream_with_length(progress_body(part.data, progress), length)
            .file_name(part.file_name)
            .mime_str(&part.mime_type)
            .map_err(|e| Error::Multipart(e.to_string()))?;
        let form = Form::new().part(part.name, file_part);

        tracing::debug!("POST {} ({} byte image part)", request.url, length);

        let response = self
            .client
            .post(&request.url)
            .headers(headers)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send upload request: {}", e);
                e
            })?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(TransportResponse { status, body })
    }
}
