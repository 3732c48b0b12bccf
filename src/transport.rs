//! # Transport seam
//!
//! Everything the controller sends to the inference service goes through the
//! [`Transport`] trait. The production implementation is
//! [`ExoclassEnv`](crate::env_state::ExoclassEnv), backed by `reqwest`; tests plug a recording
//! double instead.
//!
//! Requests are described with plain data ([`OutgoingRequest`], [`RequestBody`], [`FormPart`])
//! so payload construction stays testable without a network.
use std::path::Path;

use async_trait::async_trait;
use url::Url;

use crate::exoclass_errors::ExoclassError;

/// One field of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content: Vec<u8>,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        FormPart::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

impl RequestBody {
    /// Text value of a multipart field, if this is a multipart body carrying it.
    pub fn form_text(&self, field: &str) -> Option<&str> {
        match self {
            RequestBody::Multipart(parts) => parts.iter().find_map(|p| match p {
                FormPart::Text { name, value } if name == field => Some(value.as_str()),
                _ => None,
            }),
            RequestBody::Json(_) => None,
        }
    }
}

/// A `POST` to one of the service routes.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    /// Route relative to the configured base URL, e.g. `"/predict"`.
    pub path: &'static str,
    pub body: RequestBody,
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        RawResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and wait for the complete response.
    ///
    /// Any HTTP status is a successful exchange; only failures to send or receive
    /// are reported as [`ExoclassError::Transport`].
    async fn post(&self, request: OutgoingRequest) -> Result<RawResponse, ExoclassError>;

    /// Fetch `url` and write the body to `destination`.
    ///
    /// Return
    /// ----------
    /// * The number of bytes written.
    async fn download(&self, url: &Url, destination: &Path) -> Result<u64, ExoclassError>;
}

#[cfg(test)]
mod transport_test {
    use super::*;

    #[test]
    fn test_raw_response_status() {
        assert!(RawResponse::new(200, "{}").is_success());
        assert!(RawResponse::new(204, "").is_success());
        assert!(!RawResponse::new(422, "").is_success());
        assert_eq!(RawResponse::new(500, "boom").body_text(), "boom");
    }

    #[test]
    fn test_form_text() {
        let body = RequestBody::Multipart(vec![
            FormPart::text("mission", "kepler"),
            FormPart::File {
                name: "file".into(),
                file_name: "a.csv".into(),
                content: b"x".to_vec(),
            },
        ]);
        assert_eq!(body.form_text("mission"), Some("kepler"));
        assert_eq!(body.form_text("file"), None);
        assert_eq!(RequestBody::Json(serde_json::json!({})).form_text("mission"), None);
    }
}
