//! Errors raised while talking to Targetprocess

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ApiError {
    /// The service answered with a non-2xx status
    #[error("{status}: {message}")]
    #[diagnostic(code(tp::api::status))]
    Status { status: String, message: String },

    #[error("Failed to establish a connection to {host}: {message}")]
    #[diagnostic(
        code(tp::api::connection),
        help("check the [auth] subdomain and your network connection")
    )]
    Connection { host: String, message: String },

    #[error("Unexpected response from the service: {0}")]
    #[diagnostic(code(tp::api::decode))]
    Decode(String),

    #[error("No entity matches id {0}")]
    #[diagnostic(code(tp::api::not_found))]
    NotFound(u64),

    #[error("Cannot create HTTP client: {0}")]
    #[diagnostic(code(tp::api::client))]
    Client(String),
}

impl ApiError {
    /// Build an error from a failed response body
    ///
    /// The service reports failures as `{"Error": {"Status": .., "Message": ..}}`;
    /// anything else falls back to the HTTP status line.
    pub fn from_response(status: u16, reason: Option<&str>, body: &str) -> Self {
        let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
        let error = parsed.as_ref().and_then(|v| v.get("Error"));

        let field = |key: &str| {
            error
                .and_then(|e| e.get(key))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        };

        let fallback = reason.unwrap_or("Request failed").to_string();
        ApiError::Status {
            status: field("Status").unwrap_or_else(|| status.to_string()),
            message: field("Message").unwrap_or(fallback),
        }
    }
}
