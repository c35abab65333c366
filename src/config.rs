//! Configuration parsing and validation for the relay server
//!
//! This module handles command-line argument parsing and validation using clap. Every relay
//! setting can also come from the environment, which is how the credential is normally supplied.
use anyhow::anyhow;
use clap::Parser;
use kancy_relay::client::PoolSettings;
use kancy_relay::settings::{DEFAULT_UPSTREAM_URL, RelaySettings};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// The port on which the relay will listen.
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// The port on which the metrics server will listen.
    #[arg(long, default_value_t = 9090)]
    pub metrics_port: u16,

    /// Whether to enable the metrics endpoint.
    #[arg(short = 'm', long, default_value_t = true)]
    pub metrics: bool,

    /// The prefix to use for metrics.
    #[arg(long, default_value = "kancy_relay")]
    pub metrics_prefix: String,

    /// Maximum number of idle HTTP connections to keep alive to the upstream.
    #[arg(long, default_value_t = 100)]
    pub pool_max_idle_per_host: usize,

    /// How long (in seconds) to keep idle HTTP connections alive.
    #[arg(long, default_value_t = 90)]
    pub pool_idle_timeout_secs: u64,

    /// Bearer credential for the completion endpoint. Requests fail with a 500 while it is unset.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Model to ask for completions. Defaults to gpt-4o-mini.
    #[arg(long, env = "OPENAI_MODEL")]
    pub openai_model: Option<String>,

    /// Base URL of the OpenAI-compatible upstream. Either the host (optionally with a path
    /// prefix), to which `v1/chat/completions` is appended, or an API root ending in `/v1`, to
    /// which `chat/completions` is appended.
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: Url,
}

impl Config {
    pub fn validate(self) -> Result<Self, anyhow::Error> {
        if !matches!(self.upstream_url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "Upstream URL '{}' must use http or https",
                self.upstream_url
            ));
        }
        Ok(self)
    }

    pub fn relay_settings(&self) -> RelaySettings {
        RelaySettings::builder()
            .maybe_api_key(self.openai_api_key.clone())
            .maybe_model(self.openai_model.clone())
            .upstream_url(self.upstream_url.clone())
            .build()
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_idle_per_host: self.pool_max_idle_per_host,
            idle_timeout: Duration::from_secs(self.pool_idle_timeout_secs),
        }
    }
}
