//! Outgoing HTTP response type, the JSON writer, and the error envelope.
//!
//! Success payloads go out bare (a record, a list, `{"id": N}`). Failures
//! always go out wrapped in [`ErrorResponse`]:
//!
//! ```json
//! {"status": "error", "error": "field name is required"}
//! ```

use std::fmt::Display;

use bytes::Bytes;
use http_body_util::Full;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::model::FieldError;
use crate::status::Status;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

pub const STATUS_ERROR: &str = "error";

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use students_api::{Response, Status};
///
/// Response::write_json(Status::Ok, &serde_json::json!({"id": 1}));
/// Response::text("hello");
/// Response::status(Status::NoContent);
///
/// Response::builder()
///     .status(Status::Created)
///     .header("location", "/api/students/42")
///     .json(br#"{"id":42}"#.to_vec());
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) body: Vec<u8>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: Status,
}

impl Response {
    /// Serializes `payload` as JSON under `status`.
    ///
    /// A payload that fails to serialize turns into a `500` envelope; the
    /// caller always gets exactly one response back.
    pub fn write_json<T: Serialize + ?Sized>(status: Status, payload: &T) -> Self {
        match serde_json::to_vec(payload) {
            Ok(body) => Self::builder().status(status).json(body),
            Err(err) => {
                error!("failed to serialize response payload: {err}");
                let fallback = format!(
                    r#"{{"status":"{STATUS_ERROR}","error":"failed to serialize response"}}"#
                );
                Self::builder()
                    .status(Status::InternalServerError)
                    .json(fallback.into_bytes())
            }
        }
    }

    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: Status) -> Self {
        Self { body: Vec::new(), headers: Vec::new(), status: code }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: Status::Ok }
    }

    pub fn status_code(&self) -> Status { self.status }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Converts into the hyper response written on the wire.
    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut builder = http::Response::builder().status(http::StatusCode::from(self.status));
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
            .body(Full::new(Bytes::from(self.body)))
            .unwrap_or_else(|err| {
                error!("invalid response head: {err}");
                let mut fallback = http::Response::new(Full::new(Bytes::new()));
                *fallback.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `Status::Ok` (200).
/// Terminated by a typed body method.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: Status,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: Vec<u8>) -> Response {
        self.finish(JSON, body)
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(TEXT, body.into().into_bytes())
    }

    /// Terminate with no body (e.g. `Status::NoContent`).
    pub fn no_body(self) -> Response {
        Response { body: Vec::new(), headers: self.headers, status: self.status }
    }

    fn finish(self, content_type: &str, body: Vec<u8>) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }
}

// ── ErrorResponse ─────────────────────────────────────────────────────────────

/// The `{status, error}` envelope written on every failure path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
}

impl ErrorResponse {
    /// Wraps any displayable error.
    pub fn general(err: impl Display) -> Self {
        Self { status: STATUS_ERROR.to_owned(), error: err.to_string() }
    }

    /// Joins every field failure into one message, comma separated.
    pub fn validation(errors: &[FieldError]) -> Self {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        Self { status: STATUS_ERROR.to_owned(), error: messages.join(",") }
    }

    /// Writes the envelope under `status`.
    pub fn with_status(&self, status: Status) -> Response {
        Response::write_json(status, self)
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a [`Status`] directly from a handler: `return Status::NoContent`
impl IntoResponse for Status {
    fn into_response(self) -> Response { Response::status(self) }
}

impl<T: IntoResponse, E: IntoResponse> IntoResponse for Result<T, E> {
    fn into_response(self) -> Response {
        match self {
            Ok(value) => value.into_response(),
            Err(err) => err.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorResponse, Response};
    use crate::model::FieldError;
    use crate::status::Status;
    use serde_json::{json, Value};

    #[test]
    fn write_json_sets_status_and_content_type() {
        let response = Response::write_json(Status::Created, &json!({"id": 7}));

        assert_eq!(response.status_code(), Status::Created);
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, json!({"id": 7}));
    }

    #[test]
    fn general_error_wraps_message() {
        let response = ErrorResponse::general("empty body").with_status(Status::BadRequest);

        assert_eq!(response.status_code(), Status::BadRequest);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, json!({"status": "error", "error": "empty body"}));
    }

    #[test]
    fn validation_error_joins_fields_with_commas() {
        let envelope = ErrorResponse::validation(&[
            FieldError::Required("name"),
            FieldError::Invalid("email"),
        ]);

        assert_eq!(envelope.status, "error");
        assert_eq!(envelope.error, "field name is required,field email is invalid");
    }

    #[test]
    fn into_inner_carries_headers() {
        let inner = Response::builder()
            .status(Status::Created)
            .header("location", "/api/students/1")
            .json(b"{}".to_vec())
            .into_inner();

        assert_eq!(inner.status(), http::StatusCode::CREATED);
        assert_eq!(inner.headers()["location"], "/api/students/1");
        assert_eq!(inner.headers()["content-type"], "application/json");
    }
}
