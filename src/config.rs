//! Environment configuration
//!
//! Reads the upload endpoint and its extras from the environment (and a
//! `.env` file when present):
//!
//! - `UPLOADR_ENDPOINT`: required base URL
//! - `UPLOADR_QUERY`: `key=value` pairs separated by `,`
//! - `UPLOADR_HEADERS`: `Name: value` pairs separated by `;`
//! - `UPLOADR_TIMEOUT_SECS`: whole seconds, no timeout when unset

use crate::client::UploadClient;
use crate::image::JpegImageEncoder;
use crate::request::{Headers, PhotoUploadRequest, QueryParams, QueryValue};
use crate::transport::HttpTransport;
use crate::{Error, Result};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct UploaderConfig {
    pub endpoint: String,
    pub query_params: QueryParams,
    pub headers: Headers,
    pub timeout: Option<Duration>,
}

impl UploaderConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_endpoint(None)
    }

    /// Like [`from_env`](Self::from_env), with `endpoint` taking precedence
    /// over `UPLOADR_ENDPOINT`.
    pub fn from_env_with_endpoint(endpoint: Option<&str>) -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }

        Self::from_vars(|name| match (name, endpoint) {
            ("UPLOADR_ENDPOINT", Some(endpoint)) => Some(endpoint.to_string()),
            _ => std::env::var(name).ok(),
        })
    }

    /// Build a config from any variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = var("UPLOADR_ENDPOINT")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::Config("UPLOADR_ENDPOINT not set".to_string()))?;

        let query_params = match var("UPLOADR_QUERY") {
            Some(raw) => parse_query(&raw)?,
            None => QueryParams::new(),
        };

        let headers = match var("UPLOADR_HEADERS") {
            Some(raw) => parse_headers(&raw)?,
            None => Headers::new(),
        };

        let timeout = var("UPLOADR_TIMEOUT_SECS")
            .map(|raw| parse_timeout(&raw))
            .transpose()?;

        Ok(Self {
            endpoint: endpoint.trim().to_string(),
            query_params,
            headers,
            timeout,
        })
    }

    pub fn photo_request(&self) -> PhotoUploadRequest {
        let request = self
            .query_params
            .iter()
            .fold(PhotoUploadRequest::new(&self.endpoint), |request, (k, v)| {
                request.with_query_param(k.clone(), v.clone())
            });

        self.headers
            .iter()
            .fold(request, |request, (name, value)| {
                request.with_header(name.clone(), value.clone())
            })
    }

    pub fn transport(&self) -> Result<HttpTransport> {
        match self.timeout {
            Some(timeout) => HttpTransport::with_timeout(timeout),
            None => Ok(HttpTransport::new()),
        }
    }

    /// Client wired to the real encoder and transport, with the configured
    /// photo request attached.
    pub fn client(&self) -> Result<UploadClient<PhotoUploadRequest>> {
        Ok(UploadClient::with_services(
            Box::new(JpegImageEncoder::new()),
            Box::new(self.transport()?),
        )
        .with_request(self.photo_request()))
    }
}

fn parse_query(raw: &str) -> Result<QueryParams> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| -> Result<(String, QueryValue)> {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| Error::Config(format!("Invalid query pair '{}'", pair)))?;
            Ok((key.trim().to_string(), QueryValue::from(value.trim())))
        })
        .collect()
}

fn parse_headers(raw: &str) -> Result<Headers> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> Result<(String, String)> {
            let (name, value) = entry
                .split_once(':')
                .ok_or_else(|| Error::Config(format!("Invalid header '{}'", entry)))?;
            Ok((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(Error::Config(format!(
            "UPLOADR_TIMEOUT_SECS must be a positive integer, got '{}'",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::UploadRequest;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_endpoint_only() {
        let config =
            UploaderConfig::from_vars(lookup(&[("UPLOADR_ENDPOINT", "http://h/api/upload")]))
                .unwrap();

        assert_eq!(config.endpoint, "http://h/api/upload");
        assert!(config.query_params.is_empty());
        assert!(config.headers.is_empty());
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_missing_endpoint_is_error() {
        let err = UploaderConfig::from_vars(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("UPLOADR_ENDPOINT"));

        let err = UploaderConfig::from_vars(lookup(&[("UPLOADR_ENDPOINT", "  ")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_full_config() {
        let config = UploaderConfig::from_vars(lookup(&[
            ("UPLOADR_ENDPOINT", "http://h/api/upload"),
            ("UPLOADR_QUERY", "requester_id=abc, lang=en"),
            ("UPLOADR_HEADERS", "Authorization: Token t; X-Client: cli"),
            ("UPLOADR_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(
            config.query_params.get("requester_id"),
            Some(&QueryValue::from("abc"))
        );
        assert_eq!(config.query_params.get("lang"), Some(&QueryValue::from("en")));
        assert_eq!(config.headers.get("Authorization").unwrap(), "Token t");
        assert_eq!(config.headers.get("X-Client").unwrap(), "cli");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        for (name, value) in [
            ("UPLOADR_QUERY", "novalue"),
            ("UPLOADR_HEADERS", "NoColon"),
            ("UPLOADR_TIMEOUT_SECS", "0"),
            ("UPLOADR_TIMEOUT_SECS", "soon"),
        ] {
            let result = UploaderConfig::from_vars(lookup(&[
                ("UPLOADR_ENDPOINT", "http://h/api/upload"),
                (name, value),
            ]));
            assert!(matches!(result, Err(Error::Config(_))), "{}={}", name, value);
        }
    }

    #[test]
    fn test_photo_request_carries_config() {
        let config = UploaderConfig::from_vars(lookup(&[
            ("UPLOADR_ENDPOINT", "http://h/api/upload"),
            ("UPLOADR_QUERY", "requester_id=abc"),
            ("UPLOADR_HEADERS", "X-Client: cli"),
        ]))
        .unwrap();

        let request = config.photo_request();
        assert_eq!(request.endpoint(), "http://h/api/upload");
        assert_eq!(request.query_params(), Some(config.query_params.clone()));
        assert_eq!(request.headers(), Some(config.headers.clone()));
    }

    #[test]
    fn test_client_has_request_attached() {
        let config =
            UploaderConfig::from_vars(lookup(&[("UPLOADR_ENDPOINT", "http://h/api/upload")]))
                .unwrap();

        let client = config.client().unwrap();
        assert_eq!(client.request().unwrap().endpoint(), "http://h/api/upload");
    }
}
