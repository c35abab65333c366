//! Every way a relay request can fail, and how each one is rendered back to the caller.
use crate::cors::cors_headers;
use crate::models::ErrorBody;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// Why an inbound body couldn't be turned into a chat request.
#[derive(Debug, thiserror::Error)]
pub enum RequestBodyError {
    #[error("failed to read request body: {0}")]
    Read(#[from] axum::Error),
    #[error("request body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while talking to the completion endpoint, before we have a usable payload.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to encode upstream request: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to build upstream request: {0}")]
    Request(#[from] axum::http::Error),
    #[error("upstream request failed: {0}")]
    Send(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("failed to read upstream response: {0}")]
    Body(#[from] axum::Error),
    #[error("upstream response is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    #[error("Missing 'message' in body")]
    MissingMessage,
    #[error("{0} is not set")]
    MissingCredential(&'static str),
    /// The completion endpoint answered with a non-success status.
    #[error("OpenAI error")]
    Upstream { status: StatusCode, details: Value },
    #[error("Server error")]
    Server(#[from] TransportError),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::MissingMessage => StatusCode::BAD_REQUEST,
            RelayError::MissingCredential(_)
            | RelayError::Upstream { .. }
            | RelayError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = self.to_string();
        let details = match self {
            // Method errors are plain text, not JSON.
            RelayError::MethodNotAllowed => {
                return (status, cors_headers(), error).into_response();
            }
            RelayError::MissingMessage | RelayError::MissingCredential(_) => None,
            RelayError::Upstream { details, .. } => Some(details),
            RelayError::Server(source) => Some(Value::String(source.to_string())),
        };
        (status, cors_headers(), Json(ErrorBody { error, details })).into_response()
    }
}
