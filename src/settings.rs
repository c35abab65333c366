/// Runtime settings for the relay. These are handed to the router through [`crate::AppState`]
/// rather than read from the environment inside the handler, so tests can inject them.
use bon::Builder;
use url::Url;

/// Used when no model override is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Where the completion requests go unless told otherwise.
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.openai.com";

/// Name of the credential, as reported back to callers when it is missing.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// What the relay needs to know to reach the completion endpoint.
///
/// Empty strings are treated the same as unset values for both the key and the model, which
/// matches how an empty environment variable behaves in most deployment setups.
#[derive(Debug, Clone, Builder)]
pub struct RelaySettings {
    /// Bearer credential for the upstream. Missing keys are reported per request, not at startup.
    #[builder(into)]
    api_key: Option<String>,
    /// Model identifier override.
    #[builder(into)]
    model: Option<String>,
    #[builder(default = default_upstream_url())]
    upstream_url: Url,
}

fn default_upstream_url() -> Url {
    Url::parse(DEFAULT_UPSTREAM_URL).expect("default upstream URL should be valid")
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RelaySettings {
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .filter(|model| !model.is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }

    pub fn upstream_url(&self) -> &Url {
        &self.upstream_url
    }

    /// The chat completions endpoint under the configured upstream.
    ///
    /// The upstream is either a host root or a path prefix (`https://host/openai`), which get
    /// `v1/chat/completions` appended, or an API root already ending in `/v1`
    /// (`https://openrouter.ai/api/v1`), which gets `chat/completions`. A trailing slash is
    /// optional in both cases.
    pub fn completions_url(&self) -> Result<Url, url::ParseError> {
        let mut base = self.upstream_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        if base.path().ends_with("/v1/") {
            base.join("chat/completions")
        } else {
            base.join("v1/chat/completions")
        }
    }
}
