//! Request descriptors and typed response decoding
//!
//! An [`UploadRequest`] says where an image goes and which [`UploadResponse`]
//! the server's JSON turns into. The pairing is fixed by the associated type,
//! so a client built for one request can only ever hand back its response.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// Query parameters, iterated in key order.
pub type QueryParams = BTreeMap<String, QueryValue>;

/// Extra request headers, name to value.
pub type Headers = BTreeMap<String, String>;

/// Scalar value of a query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Str(s) => f.write_str(s),
            QueryValue::Int(i) => write!(f, "{}", i),
            QueryValue::Float(x) => write!(f, "{:?}", x),
            QueryValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Str(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Str(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Int(value.into())
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Float(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

/// Typed view of the server's JSON reply.
///
/// Decoding never fails: fields that are missing or have the wrong shape come
/// out as their default. Callers that need a field must check it themselves.
pub trait UploadResponse: Send + 'static {
    fn from_json(json: Option<&Value>) -> Self;
}

/// Where and how to upload an image.
pub trait UploadRequest: Send + Sync {
    type Response: UploadResponse;

    fn endpoint(&self) -> &str;

    fn query_params(&self) -> Option<QueryParams> {
        None
    }

    fn headers(&self) -> Option<Headers> {
        None
    }
}

/// Reply of a photo upload endpoint: `{"photo": "<url>"}`.
///
/// The server may answer with an absolute URL or a path relative to the
/// upload endpoint, so the reference is kept as sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoUploadResponse {
    pub image_url: Option<String>,
}

impl PhotoUploadResponse {
    /// The image URL resolved against `endpoint`. Absolute references come
    /// back unchanged.
    pub fn resolved_image_url(&self, endpoint: &str) -> Option<Url> {
        let reference = self.image_url.as_deref()?;
        match Url::parse(reference) {
            Ok(url) => Some(url),
            Err(_) => Url::parse(endpoint).and_then(|base| base.join(reference)).ok(),
        }
    }
}

impl UploadResponse for PhotoUploadResponse {
    fn from_json(json: Option<&Value>) -> Self {
        let image_url = json
            .and_then(|v| v.get("photo"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Self { image_url }
    }
}

/// Photo upload to a configurable endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoUploadRequest {
    endpoint: String,
    query_params: Option<QueryParams>,
    headers: Option<Headers>,
}

impl PhotoUploadRequest {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            query_params: None,
            headers: None,
        }
    }

    pub fn with_query_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<QueryValue>,
    ) -> Self {
        self.query_params
            .get_or_insert_with(QueryParams::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }
}

impl UploadRequest for PhotoUploadRequest {
    type Response = PhotoUploadResponse;

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn query_params(&self) -> Option<QueryParams> {
        self.query_params.clone()
    }

    fn headers(&self) -> Option<Headers> {
        self.headers.clone()
    }
}
