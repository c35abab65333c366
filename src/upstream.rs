/// The single outbound call to the chat completions endpoint.
use crate::client::HttpClient;
use crate::errors::{RelayError, TransportError};
use crate::models::{ChatCompletionRequest, ChatCompletionResponse, ReplyBody};
use crate::settings::RelaySettings;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tracing::{debug, error};

/// How the completion call ended.
#[derive(Debug)]
pub(crate) enum Completion {
    /// 2xx with a JSON payload.
    Reply(ChatCompletionResponse),
    /// Non-success status; `details` is the upstream's JSON body, passed through untouched.
    Rejected { status: StatusCode, details: Value },
    /// We never got a usable payload.
    Failed(TransportError),
}

impl Completion {
    pub(crate) fn into_reply(self) -> Result<ReplyBody, RelayError> {
        match self {
            Completion::Reply(response) => Ok(ReplyBody {
                reply: response.reply(),
            }),
            Completion::Rejected { status, details } => {
                error!("OpenAI error ({}): {}", status, details);
                Err(RelayError::Upstream { status, details })
            }
            Completion::Failed(e) => {
                error!("Function error: {}", e);
                Err(RelayError::Server(e))
            }
        }
    }
}

pub(crate) async fn request_completion<T: HttpClient>(
    client: &T,
    settings: &RelaySettings,
    api_key: &str,
    message: &str,
) -> Completion {
    match send(client, settings, api_key, message).await {
        Ok((status, payload)) if status.is_success() => {
            Completion::Reply(ChatCompletionResponse::from_payload(payload))
        }
        Ok((status, details)) => Completion::Rejected { status, details },
        Err(e) => Completion::Failed(e),
    }
}

async fn send<T: HttpClient>(
    client: &T,
    settings: &RelaySettings,
    api_key: &str,
    message: &str,
) -> Result<(StatusCode, Value), TransportError> {
    let url = settings.completions_url()?;
    let body = serde_json::to_vec(&ChatCompletionRequest::single_turn(
        settings.model(),
        message,
    ))
    .map_err(TransportError::Encode)?;

    let req = Request::builder()
        .method(Method::POST)
        .uri(url.as_str())
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {api_key}"))
        .body(Body::from(body))?;

    debug!("Sending completion request to {} for model {}", url, settings.model());
    let response = client.request(req).await.map_err(TransportError::Send)?;

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    debug!("Upstream answered {} with {} bytes", status, bytes.len());

    // A body that isn't JSON is a failure even on a 2xx.
    let payload = serde_json::from_slice(&bytes).map_err(TransportError::Decode)?;
    Ok((status, payload))
}
