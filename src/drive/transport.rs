//! HTTP transport for the drive API
//!
//! The protocol code only needs "POST this body to that path and give me the
//! status and bytes back", so it talks to a [`Transport`]. The production
//! implementation is [`HttpTransport`]:
//! - HTTP/1.1 only
//! - TCP_NODELAY, 90s TCP keepalive, pooled idle connections
//! - native-tls (OpenSSL) for TLS
//! - no retries and no request timeout: each call is sent exactly once
//!
//! [`Form`] describes a `multipart/form-data` body; encoding it is left to
//! reqwest.

use crate::drive::error::{DriveError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Maximum number of body characters kept in error diagnostics
const DIAGNOSTIC_LIMIT: usize = 200;

/// One field of a multipart form
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: String,
        data: Bytes,
    },
}

impl FormField {
    pub fn name(&self) -> &str {
        match self {
            FormField::Text { name, .. } | FormField::File { name, .. } => name,
        }
    }
}

/// `multipart/form-data` body under construction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Form {
    fields: Vec<FormField>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push(FormField::Text {
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: Bytes) -> Self {
        self.fields.push(FormField::File {
            name: name.to_string(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            data,
        });
        self
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Value of a text field by name
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|f| match f {
            FormField::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// Bytes of a file field by name
    pub fn file_data(&self, name: &str) -> Option<&Bytes> {
        self.fields.iter().find_map(|f| match f {
            FormField::File { name: n, data, .. } if n == name => Some(data),
            _ => None,
        })
    }
}

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Form(Form),
}

/// Raw response: status code plus collected body
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Any 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            DriveError::ResponseParseFailed(format!("{} (body: {})", e, self.body_snippet()))
        })
    }

    /// Human-readable failure reason
    ///
    /// Uses the server's `error`/`message` field when the body is structured,
    /// otherwise a truncated copy of the raw body.
    pub fn error_message(&self) -> String {
        if let Ok(parsed) = serde_json::from_slice::<crate::drive::types::ErrorResponse>(&self.body)
        {
            if let Some(message) = parsed.error.or(parsed.message) {
                return format!("{} - {}", self.status, message);
            }
        }
        format!("{} - {}", self.status, self.body_snippet())
    }

    fn body_snippet(&self) -> String {
        let text = String::from_utf8_lossy(&self.body);
        text.chars().take(DIAGNOSTIC_LIMIT).collect()
    }
}

/// Sends drive API requests
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `path` (relative to the configured endpoint)
    async fn post(&self, path: &str, body: RequestBody) -> Result<HttpResponse>;
}

/// reqwest-based transport with a pooled HTTPS client
///
/// Clone is cheap - the underlying HTTP client uses Arc internally.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Create a transport for `endpoint` (scheme + host, optional base path)
    pub fn new(endpoint: &str, insecure_tls: bool) -> Result<Self> {
        if insecure_tls {
            tracing::warn!("INSECURE TLS MODE ENABLED: Certificate verification is disabled!");
        }

        let client = reqwest::Client::builder()
            .http1_only()
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(90))
            .pool_idle_timeout(Duration::from_secs(90))
            .danger_accept_invalid_certs(insecure_tls)
            .danger_accept_invalid_hostnames(insecure_tls)
            .build()
            .map_err(|e| DriveError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_url(&self, path: &str) -> String {
        let mut url = String::with_capacity(self.endpoint.len() + path.len() + 1);
        url.push_str(&self.endpoint);
        if !path.starts_with('/') {
            url.push('/');
        }
        url.push_str(path);
        url
    }
}

/// Convert a form description into a reqwest multipart form
fn to_multipart(form: Form) -> Result<multipart::Form> {
    let mut out = multipart::Form::new();
    for field in form.fields {
        out = match field {
            FormField::Text { name, value } => out.text(name, value),
            FormField::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                let length = data.len() as u64;
                let part = multipart::Part::stream_with_length(reqwest::Body::from(data), length)
                    .file_name(file_name)
                    .mime_str(&content_type)
                    .map_err(|e| {
                        DriveError::Transport(format!("Invalid content type {}: {}", content_type, e))
                    })?;
                out.part(name, part)
            }
        };
    }
    Ok(out)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, path: &str, body: RequestBody) -> Result<HttpResponse> {
        let url = self.build_url(path);
        let request = self.client.post(&url);

        let request = match body {
            RequestBody::Json(value) => {
                tracing::debug!(url = %url, kind = "json", "drive_request");
                request.json(&value)
            }
            RequestBody::Form(form) => {
                let bytes: usize = form
                    .fields()
                    .iter()
                    .map(|f| match f {
                        FormField::Text { value, .. } => value.len(),
                        FormField::File { data, .. } => data.len(),
                    })
                    .sum();
                tracing::debug!(url = %url, kind = "form", bytes = bytes, "drive_request");
                request.multipart(to_multipart(form)?)
            }
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        tracing::debug!(url = %url, status = status, "drive_response");

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_lookup() {
        let form = Form::new()
            .text("partNumber", "2")
            .file("file", "f", "application/octet-stream", Bytes::from_static(b"abc"));
        assert_eq!(form.text_value("partNumber"), Some("2"));
        assert_eq!(form.text_value("missing"), None);
        assert_eq!(form.file_data("file").unwrap().as_ref(), b"abc");
        assert_eq!(form.fields()[0].name(), "partNumber");
    }

    #[test]
    fn test_response_error_message() {
        let structured = HttpResponse::new(400, r#"{"error": "bad signature"}"#);
        assert_eq!(structured.error_message(), "400 - bad signature");

        let raw = HttpResponse::new(502, "x".repeat(500));
        let message = raw.error_message();
        assert_eq!(message, format!("502 - {}", "x".repeat(DIAGNOSTIC_LIMIT)));
    }

    #[test]
    fn test_response_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }

    #[test]
    fn test_to_multipart_accepts_form() {
        let form = Form::new()
            .text("bucket", "B")
            .file("file", "a\"b.txt", "text/plain", Bytes::from_static(b"hi"));
        let encoded = to_multipart(form).unwrap();
        assert!(!encoded.boundary().is_empty());
    }

    #[test]
    fn test_to_multipart_rejects_bad_content_type() {
        let form = Form::new().file("file", "x", "not a mime", Bytes::new());
        assert!(matches!(to_multipart(form), Err(DriveError::Transport(_))));
    }

    #[test]
    fn test_build_url() {
        let transport = HttpTransport::new("https://drive.example.com/", false).unwrap();
        assert_eq!(transport.endpoint(), "https://drive.example.com");
        assert_eq!(
            transport.build_url("/v1/object/upload"),
            "https://drive.example.com/v1/object/upload"
        );
    }
}
