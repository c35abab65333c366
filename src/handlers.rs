/// Axum handler for the chat relay endpoint
use crate::AppState;
use crate::client::HttpClient;
use crate::cors::cors_headers;
use crate::errors::RelayError;
use crate::models::{ChatRequest, ReplyBody};
use crate::settings::API_KEY_VAR;
use crate::upstream::request_completion;
use axum::{
    Json,
    body::Body,
    extract::{Request, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, instrument};

/// Validates the inbound message, makes the completion call and maps the outcome back.
///
/// Pre-flight requests are answered straight away. Every other path, successful or not, goes
/// through the same rendering step so the CORS headers are always present. The body is only
/// read once the method has been accepted.
#[instrument(skip(state, req), fields(method = %req.method()))]
pub async fn chat_handler<T: HttpClient>(
    State(state): State<AppState<T>>,
    req: Request,
) -> Response {
    if *req.method() == Method::OPTIONS {
        return (StatusCode::OK, cors_headers(), "ok").into_response();
    }

    match relay(&state, req).await {
        Ok(reply) => (StatusCode::OK, cors_headers(), Json(reply)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn relay<T: HttpClient>(
    state: &AppState<T>,
    req: Request,
) -> Result<ReplyBody, RelayError> {
    if *req.method() != Method::POST {
        return Err(RelayError::MethodNotAllowed);
    }

    let request = read_chat_request(req.into_body()).await;
    let message = request.message().ok_or(RelayError::MissingMessage)?;

    let api_key = state
        .settings
        .api_key()
        .ok_or(RelayError::MissingCredential(API_KEY_VAR))?;

    info!(
        "Relaying message of {} bytes to model {}",
        message.len(),
        state.settings.model()
    );
    request_completion(&state.http_client, &state.settings, api_key, message)
        .await
        .into_reply()
}

/// Bodies that can't be read or parsed count as the empty request.
async fn read_chat_request(body: Body) -> ChatRequest {
    ChatRequest::read(body).await.unwrap_or_else(|e| {
        debug!("Treating request body as empty: {}", e);
        ChatRequest::default()
    })
}
