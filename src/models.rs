/// Wire types for the relay: the inbound chat body, the outbound OpenAI chat completions request
/// and the parts of its response we read back.
use crate::errors::RequestBodyError;
use axum::body::Body;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) const SYSTEM_PROMPT: &str = "You are KaNcy, a helpful, friendly assistant.";
pub(crate) const TEMPERATURE: f64 = 0.7;
pub(crate) const MAX_TOKENS: u32 = 500;
pub(crate) const FALLBACK_REPLY: &str = "Sorry, I couldn't generate a reply.";

/// Largest inbound body the relay will buffer.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// The body posted by the chat widget. Anything other than `message` is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChatRequest {
    #[serde(default)]
    message: Option<Value>,
}

impl ChatRequest {
    /// Buffers the body, up to [`MAX_BODY_BYTES`], and parses it.
    pub(crate) async fn read(body: Body) -> Result<Self, RequestBodyError> {
        let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES).await?;
        Ok(Self::parse(&bytes)?)
    }

    /// Parses the raw body. An empty body is the empty request, not an error.
    pub(crate) fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }

    /// The user's message, if it is a non-empty string.
    pub(crate) fn message(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub(crate) role: &'a str,
    pub(crate) content: &'a str,
}

/// Body of `POST /v1/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    pub(crate) model: &'a str,
    pub(crate) messages: Vec<ChatMessage<'a>>,
    pub(crate) temperature: f64,
    pub(crate) max_tokens: u32,
}

impl<'a> ChatCompletionRequest<'a> {
    /// A single-turn conversation: the fixed system prompt, then the user's message.
    pub(crate) fn single_turn(model: &'a str, message: &'a str) -> Self {
        Self {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: message,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub(crate) choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Choice {
    #[serde(default)]
    pub(crate) message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChoiceMessage {
    #[serde(default)]
    pub(crate) content: Option<String>,
}

impl ChatCompletionResponse {
    /// Reads the first candidate's text out of an upstream payload. Payloads that don't have the
    /// expected shape have no candidates.
    pub(crate) fn from_payload(payload: Value) -> Self {
        serde_json::from_value(payload).unwrap_or_default()
    }

    pub(crate) fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .filter(|content| !content.is_empty())
    }

    /// The text handed back to the caller.
    pub(crate) fn reply(&self) -> String {
        self.first_content().unwrap_or(FALLBACK_REPLY).to_owned()
    }
}

/// Successful relay response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplyBody {
    pub reply: String,
}

/// Error body for 400 and 500 responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}
