//! Image uploads to REST endpoints
//!
//! Encodes an image as JPEG, posts it as a single-part multipart form to a
//! configurable endpoint, and decodes the JSON reply into a typed response,
//! reporting progress and the outcome through listener callbacks.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod image;
pub mod query;
pub mod request;
pub mod transport;

pub use client::UploadClient;
pub use error::{Error, Result};
pub use events::{Callbacks, ImageSelection, UploadListener};
pub use image::ImagePayload;
pub use request::{PhotoUploadRequest, PhotoUploadResponse, UploadRequest, UploadResponse};
