//! The JSON envelope every endpoint answers with.
//!
//! Callers of this service key off the body, not the status line: every
//! handled request returns 200 with `{message, success?}` plus optional
//! endpoint-specific fields. The webhook acknowledgement variant carries
//! no `success` field at all, matching the integrations consuming it.

use crate::errors::{Result, RouterError};
use http::StatusCode;
use http::header::CONTENT_TYPE;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::Response;
use hyper::body::Bytes;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

#[derive(Debug, Serialize)]
pub struct ApiResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    #[serde(flatten)]
    extra: Map<String, JsonValue>,
}

impl ApiResponse {
    /// Acknowledgement with a bare message, no `success` marker.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            success: None,
            extra: Map::new(),
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            success: Some(true),
            extra: Map::new(),
        }
    }

    /// Success marker with no message, for payloads whose consumers only
    /// read the data fields.
    pub fn success_only() -> Self {
        Self {
            message: None,
            success: Some(true),
            extra: Map::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            success: Some(false),
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    #[cfg(test)]
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }

    #[cfg(test)]
    pub fn success(&self) -> Option<bool> {
        self.success
    }

    #[cfg(test)]
    pub fn field(&self, key: &str) -> Option<&JsonValue> {
        self.extra.get(key)
    }

    pub fn into_http(self) -> Result<Response<BoxBody<Bytes, RouterError>>> {
        let json = serde_json::to_vec(&self)?;
        let body = Full::new(Bytes::from(json)).map_err(|e| match e {}).boxed();
        Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .map_err(|e| RouterError::Internal(e.to_string()))
    }
}
