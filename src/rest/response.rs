use std::collections::HashMap;

use serde::Serialize;

/// HTTP status codes used by the management endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 408 Request Timeout
    RequestTimeout,
    /// 413 Payload Too Large
    PayloadTooLarge,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::RequestTimeout => 408,
            StatusCode::PayloadTooLarge => 413,
            StatusCode::InternalServerError => 500,
        }
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::RequestTimeout => "Request Timeout",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// A complete HTTP response ready to be serialized to a client.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

/// Builder for constructing responses in a fluent style.
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response, filling in Content-Length from the body if
    /// the caller did not set one.
    pub fn build(mut self) -> Response {
        self.headers
            .entry("Content-Length".to_string())
            .or_insert_with(|| self.body.len().to_string());

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// 200 OK carrying a JSON body.
    ///
    /// Serialization of the state types in [`crate::mesh`] cannot fail, so a
    /// serde_json error here is treated as a server bug and degraded to 500.
    pub fn ok_json(value: &impl Serialize) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => ResponseBuilder::new(StatusCode::Ok)
                .header("Content-Type", "application/json")
                .body(body)
                .build(),
            Err(e) => {
                tracing::error!(error = %e, "response body serialization failed");
                Self::internal_error()
            }
        }
    }

    /// Synthesized response for a malformed request.
    pub fn bad_request() -> Self {
        Self::error(StatusCode::BadRequest)
    }

    /// Synthesized response for an unknown resource path.
    pub fn not_found() -> Self {
        Self::error(StatusCode::NotFound)
    }

    /// Synthesized response for a known path asked with the wrong method.
    pub fn method_not_allowed() -> Self {
        Self::error(StatusCode::MethodNotAllowed)
    }

    /// Synthesized response substituted when a handler misses its deadline.
    pub fn request_timeout() -> Self {
        Self::error(StatusCode::RequestTimeout)
    }

    /// Synthesized response for a request that overran the inbound buffer cap.
    pub fn payload_too_large() -> Self {
        Self::error(StatusCode::PayloadTooLarge)
    }

    /// Synthesized response for a handler failure.
    pub fn internal_error() -> Self {
        Self::error(StatusCode::InternalServerError)
    }

    fn error(status: StatusCode) -> Self {
        let body = format!(
            "{{\"ErrorCode\":{},\"ErrorMessage\":\"{}\"}}",
            status.as_u16(),
            status.reason_phrase()
        );
        ResponseBuilder::new(status)
            .header("Content-Type", "application/json")
            .body(body.into_bytes())
            .build()
    }
}
