//! The upload client
//!
//! Turns an image and an attached [`UploadRequest`] into one multipart `POST`
//! and reports the outcome to an [`UploadListener`].
//!
//! Every callback runs on the task that awaits the upload call. Progress
//! produced while the transport streams the body is handed back to that task
//! over a channel, so a listener never has to be thread-aware beyond `Sync`.

use crate::events::{ImageSelection, NoopListener, UploadListener};
use crate::image::{ImageEncoder, ImagePayload, JpegImageEncoder};
use crate::query::build_url;
use crate::request::{UploadRequest, UploadResponse};
use crate::transport::{HttpTransport, ImagePart, MultipartRequest, Transport, TransportResponse};
use crate::{Error, Result};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Uploads images for one kind of request `R`.
///
/// The attached request is only read during an upload. Replacing it needs
/// `&mut self`, so it cannot change under an upload that is still running.
pub struct UploadClient<R: UploadRequest> {
    request: Option<R>,
    encoder: Box<dyn ImageEncoder>,
    transport: Box<dyn Transport>,
}

impl<R: UploadRequest> UploadClient<R> {
    /// Client with JPEG encoding and a default reqwest transport.
    pub fn new() -> Self {
        Self::with_services(
            Box::new(JpegImageEncoder::new()),
            Box::new(HttpTransport::new()),
        )
    }

    /// Build a client from concrete encoder and transport, e.g. mocks.
    pub fn with_services(encoder: Box<dyn ImageEncoder>, transport: Box<dyn Transport>) -> Self {
        Self {
            request: None,
            encoder,
            transport,
        }
    }

    pub fn with_request(mut self, request: R) -> Self {
        self.request = Some(request);
        self
    }

    pub fn set_request(&mut self, request: R) {
        self.request = Some(request);
    }

    pub fn request(&self) -> Option<&R> {
        self.request.as_ref()
    }

    /// Upload `image`, reporting every step to `listener`.
    ///
    /// `listener.on_complete` is called exactly once, whatever happens.
    pub async fn upload<L>(&self, image: ImagePayload, listener: &L)
    where
        L: UploadListener<R::Response> + ?Sized,
    {
        let result = self.run(image, listener).await;
        complete(result, listener);
    }

    /// Like [`upload`](Self::upload), but stops the transfer once `token` is
    /// cancelled and completes with [`Error::Cancelled`].
    pub async fn upload_cancellable<L>(
        &self,
        image: ImagePayload,
        listener: &L,
        token: CancellationToken,
    ) where
        L: UploadListener<R::Response> + ?Sized,
    {
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!("Upload cancelled by caller");
                Err(Error::Cancelled)
            }
            result = self.run(image, listener) => result,
        };
        complete(result, listener);
    }

    /// Upload `image` and return the decoded response directly.
    pub async fn send(&self, image: ImagePayload) -> Result<R::Response> {
        self.run(image, &NoopListener).await
    }

    /// Entry point for the image picker: upload a picked image, or only
    /// notify `on_cancel` when the user backed out.
    pub async fn handle_selection<L>(&self, selection: ImageSelection, listener: &L)
    where
        L: UploadListener<R::Response> + ?Sized,
    {
        match selection {
            ImageSelection::Picked(image) => self.upload(image, listener).await,
            ImageSelection::Cancelled => {
                info!("Image selection cancelled");
                listener.on_cancel();
            }
        }
    }

    async fn run<L>(&self, image: ImagePayload, listener: &L) -> Result<R::Response>
    where
        L: UploadListener<R::Response> + ?Sized,
    {
        let jpeg = self.encoder.encode_jpeg(image).await.map_err(|e| {
            warn!("Could not get a JPEG representation of the image: {}", e);
            e
        })?;

        let request = self.request.as_ref().ok_or_else(|| {
            warn!("Upload attempted before a request was attached");
            Error::MissingRequest
        })?;

        let query_params = request.query_params().unwrap_or_default();
        let headers = request.headers().unwrap_or_default();
        let url = build_url(request.endpoint(), &query_params);

        info!("Uploading {} byte image to {}", jpeg.len(), url);

        listener.on_pre_upload();

        let multipart = MultipartRequest {
            url,
            headers,
            part: ImagePart::jpeg(jpeg),
        };
        let response = self.transmit(multipart, listener).await?;

        decode_response(response)
    }

    async fn transmit<L>(
        &self,
        request: MultipartRequest,
        listener: &L,
    ) -> Result<TransportResponse>
    where
        L: UploadListener<R::Response> + ?Sized,
    {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut progress = ProgressTracker::default();

        let send = self.transport.send(request, tx);
        tokio::pin!(send);

        let result = loop {
            tokio::select! {
                biased;
                Some(fraction) = rx.recv() => {
                    if let Some(value) = progress.advance(fraction) {
                        listener.on_progress(value);
                    }
                }
                result = &mut send => break result,
            }
        };

        // Progress queued as the transport finished still precedes the result.
        while let Ok(fraction) = rx.try_recv() {
            if let Some(value) = progress.advance(fraction) {
                listener.on_progress(value);
            }
        }

        result
    }
}

impl<R: UploadRequest> Default for UploadClient<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn complete<T, L>(result: Result<T>, listener: &L)
where
    L: UploadListener<T> + ?Sized,
{
    match &result {
        Ok(_) => info!("Upload completed successfully"),
        Err(e) => error!("Error while uploading file: {}", e),
    }
    listener.on_complete(result);
}

/// Keeps reported progress inside `[0.0, 1.0]` and never moving backwards.
#[derive(Debug, Default)]
struct ProgressTracker {
    last: f32,
}

impl ProgressTracker {
    fn advance(&mut self, fraction: f32) -> Option<f32> {
        if fraction.is_nan() {
            return None;
        }
        self.last = fraction.clamp(0.0, 1.0).max(self.last);
        Some(self.last)
    }
}

fn decode_response<T: UploadResponse>(response: TransportResponse) -> Result<T> {
    if !response.is_success() {
        let body = String::from_utf8_lossy(&response.body).into_owned();
        error!("Upload rejected (status {}): {}", response.status, body);
        return Err(Error::Status {
            status: response.status,
            body,
        });
    }

    if response.body.iter().all(u8::is_ascii_whitespace) {
        return match response.status {
            204 | 205 => {
                debug!("Upload response had no body");
                Ok(T::from_json(None))
            }
            status => {
                error!("Upload response (status {}) had no body", status);
                Err(Error::EmptyResponse { status })
            }
        };
    }

    let json: Value = serde_json::from_slice(&response.body).map_err(|e| {
        error!(
            "Failed to parse upload response: {}\nBody: {}",
            e,
            String::from_utf8_lossy(&response.body)
        );
        e
    })?;

    Ok(T::from_json(Some(&json)))
}
