//! Configuration types for quiz generation and the HTTP server.
//!
//! Generation behaviour is controlled through [`GenerationConfig`] and the
//! listener through [`ServerConfig`], each built via its builder. Both are
//! constructed once at startup and are read-only afterwards: nothing in a
//! request can change them.

use crate::error::McqError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

/// Default provider name passed to `ProviderFactory`.
pub const DEFAULT_PROVIDER: &str = "gemini";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemma-3-12b-it";

/// Configuration for the two-stage generation pipeline.
///
/// # Example
/// ```rust
/// use edgequake_mcq::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .provider_name("openai")
///     .model("gpt-4.1-mini")
///     .temperature(0.3)
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "gpt-4.1-mini");
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// LLM provider name (e.g. "gemini", "openai", "anthropic", "ollama"). Default: "gemini".
    pub provider_name: String,

    /// Model identifier. Default: "gemma-3-12b-it".
    pub model: String,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for both stages. Range 0.0–2.0. Default: 0.5.
    ///
    /// Question writing benefits from some variety; the review stage is
    /// constrained enough by its input that the same value works for both.
    pub temperature: f32,

    /// Maximum output tokens per call. Default: None (provider default).
    ///
    /// A cap that is too low truncates the JSON mid-object, which then fails
    /// to parse. Leave unset unless the provider's default is unreasonably large.
    pub max_tokens: Option<usize>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider_name: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            provider: None,
            temperature: 0.5,
            max_tokens: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    /// Provider for [`ProviderFactory`](edgequake_llm::ProviderFactory). Ignored when
    /// [`provider`](Self::provider) is set.
    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = name.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Use an already-built provider. Takes precedence over `provider_name`.
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    /// Clamped to 0.0–2.0.
    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, McqError> {
        let c = &self.config;
        if c.provider.is_none() && c.provider_name.trim().is_empty() {
            return Err(McqError::InvalidConfig(
                "Provider name must not be empty".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(McqError::InvalidConfig("Model must not be empty".into()));
        }
        if c.max_tokens == Some(0) {
            return Err(McqError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

// ── Server ───────────────────────────────────────────────────────────────

/// Listener configuration for the HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Socket address to bind. Default: `0.0.0.0:8000`.
    pub bind: SocketAddr,

    /// Largest accepted request body in bytes. Default: 25 MiB.
    ///
    /// axum's own default (2 MiB) is smaller than many textbook chapters.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Create a new builder for `ServerConfig`.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.config.bind = addr;
        self
    }

    /// Largest accepted request body. Must be at least 1 KiB.
    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServerConfig, McqError> {
        if self.config.max_upload_bytes < 1024 {
            return Err(McqError::InvalidConfig(format!(
                "max_upload_bytes must be ≥ 1024, got {}",
                self.config.max_upload_bytes
            )));
        }
        Ok(self.config)
    }
}
