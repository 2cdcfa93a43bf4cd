//! Upload lifecycle events
//!
//! A listener sees `on_pre_upload`, then any number of `on_progress`, then
//! exactly one `on_complete`. `on_cancel` belongs to the image picker and is
//! only ever fired instead of an upload, never alongside one.

use crate::image::ImagePayload;
use crate::Result;
use std::fmt;

pub trait UploadListener<T>: Sync {
    /// Called before any bytes are sent.
    fn on_pre_upload(&self) {}

    /// Fraction sent so far, non-decreasing, in `[0.0, 1.0]`.
    fn on_progress(&self, _fraction: f32) {}

    /// The terminal event of an upload.
    fn on_complete(&self, _result: Result<T>) {}

    /// The user dismissed the picker without choosing an image.
    fn on_cancel(&self) {}
}

/// Listener that ignores every event.
pub struct NoopListener;

impl<T> UploadListener<T> for NoopListener {}

/// What the image picker produced for one user interaction.
#[derive(Debug, Clone)]
pub enum ImageSelection {
    Picked(ImagePayload),
    Cancelled,
}

type Hook = Box<dyn Fn() + Send + Sync>;

/// Closure slots for each event, each set at most once.
///
/// A failed upload hands the `failure` slot the error's display text.
pub struct Callbacks<T> {
    pre_upload: Option<Hook>,
    progress: Option<Box<dyn Fn(f32) + Send + Sync>>,
    success: Option<Box<dyn Fn(T) + Send + Sync>>,
    failure: Option<Box<dyn Fn(String) + Send + Sync>>,
    cancel: Option<Hook>,
}

impl<T> Callbacks<T> {
    pub fn new() -> Self {
        Self {
            pre_upload: None,
            progress: None,
            success: None,
            failure: None,
            cancel: None,
        }
    }

    pub fn pre_upload(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.pre_upload = Some(Box::new(f));
        self
    }

    pub fn progress(mut self, f: impl Fn(f32) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    pub fn success(mut self, f: impl Fn(T) + Send + Sync + 'static) -> Self {
        self.success = Some(Box::new(f));
        self
    }

    pub fn failure(mut self, f: impl Fn(String) + Send + Sync + 'static) -> Self {
        self.failure = Some(Box::new(f));
        self
    }

    pub fn cancel(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.cancel = Some(Box::new(f));
        self
    }
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Callbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("pre_upload", &self.pre_upload.is_some())
            .field("progress", &self.progress.is_some())
            .field("success", &self.success.is_some())
            .field("failure", &self.failure.is_some())
            .field("cancel", &self.cancel.is_some())
            .finish()
    }
}

impl<T> UploadListener<T> for Callbacks<T> {
    fn on_pre_upload(&self) {
        if let Some(f) = &self.pre_upload {
            f();
        }
    }

    fn on_progress(&self, fraction: f32) {
        if let Some(f) = &self.progress {
            f(fraction);
        }
    }

    fn on_complete(&self, result: Result<T>) {
        match result {
            Ok(response) => {
                if let Some(f) = &self.success {
                    f(response);
                }
            }
            Err(e) => {
                if let Some(f) = &self.failure {
                    f(e.to_string());
                }
            }
        }
    }

    fn on_cancel(&self) {
        if let Some(f) = &self.cancel {
            f();
        }
    }
}
