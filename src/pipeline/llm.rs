//! Model interaction: send a filled prompt to the provider, return the raw text.
//!
//! The pipeline only sees the [`QuizModel`] trait. In production it is backed
//! by an `edgequake_llm` provider built once at startup ([`resolve_model`]);
//! tests inject a scripted stub. All prompt engineering lives in
//! [`crate::prompts`]; this module never looks at the text it sends.
//!
//! There is no retry and no timeout here: a failed call fails the request and
//! a hung call hangs it.

use crate::config::GenerationConfig;
use crate::error::{McqError, Stage};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Token counts reported by the provider for one call (0 when unreported).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

impl std::ops::Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, rhs: TokenUsage) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.prompt_tokens + rhs.prompt_tokens,
            completion_tokens: self.completion_tokens + rhs.completion_tokens,
        }
    }
}

/// Raw completion of one stage. Expected to be JSON, but not trusted to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOutput {
    pub content: String,
    pub usage: TokenUsage,
}

impl ModelOutput {
    /// Output with no usage information.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: TokenUsage::default(),
        }
    }
}

/// A text-completion service.
///
/// `stage` is passed for error attribution and logging only; implementations
/// must not change behaviour based on it.
pub trait QuizModel: Send + Sync {
    fn complete<'a>(
        &'a self,
        stage: Stage,
        prompt: &'a str,
    ) -> BoxFuture<'a, Result<ModelOutput, McqError>>;
}

/// [`QuizModel`] backed by an `edgequake_llm` provider.
pub struct ProviderModel {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_tokens: Option<usize>,
}

impl ProviderModel {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &GenerationConfig) -> Self {
        Self {
            provider,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    fn options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: self.max_tokens,
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for ProviderModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderModel")
            .field("provider", &"<dyn LLMProvider>")
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl QuizModel for ProviderModel {
    fn complete<'a>(
        &'a self,
        stage: Stage,
        prompt: &'a str,
    ) -> BoxFuture<'a, Result<ModelOutput, McqError>> {
        async move {
            let start = Instant::now();
            let messages = vec![ChatMessage::user(prompt)];
            let options = self.options();

            let response = self
                .provider
                .chat(&messages, Some(&options))
                .await
                .map_err(|e| McqError::ModelInvocation {
                    stage,
                    message: format!("{}", e),
                })?;

            debug!(
                "Stage {}: {} input tokens, {} output tokens, {:?}",
                stage,
                response.prompt_tokens,
                response.completion_tokens,
                start.elapsed()
            );

            Ok(ModelOutput {
                content: response.content,
                usage: TokenUsage {
                    prompt_tokens: response.prompt_tokens as u64,
                    completion_tokens: response.completion_tokens as u64,
                },
            })
        }
        .boxed()
    }
}

/// Stand-in used when no provider could be built at startup.
///
/// The server still starts; every invocation fails with
/// [`McqError::ProviderNotConfigured`] carrying the original hint.
#[derive(Debug, Clone)]
pub struct UnconfiguredModel {
    provider: String,
    hint: String,
}

impl UnconfiguredModel {
    pub fn new(provider: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            hint: hint.into(),
        }
    }
}

impl QuizModel for UnconfiguredModel {
    fn complete<'a>(
        &'a self,
        _stage: Stage,
        _prompt: &'a str,
    ) -> BoxFuture<'a, Result<ModelOutput, McqError>> {
        let err = McqError::ProviderNotConfigured {
            provider: self.provider.clone(),
            hint: self.hint.clone(),
        };
        futures::future::ready(Err(err)).boxed()
    }
}

/// Build the process-wide model from the configuration.
///
/// 1. **Pre-built provider** (`config.provider`) — used as-is.
/// 2. **Named provider + model** — [`ProviderFactory::create_llm_provider`],
///    which reads the provider's API key from its standard environment
///    variable (`GEMINI_API_KEY`, `OPENAI_API_KEY`, …).
///
/// A factory failure is logged and deferred: the returned model reports
/// [`McqError::ProviderNotConfigured`] on first use.
pub fn resolve_model(config: &GenerationConfig) -> Arc<dyn QuizModel> {
    if let Some(ref provider) = config.provider {
        return Arc::new(ProviderModel::new(Arc::clone(provider), config));
    }

    match ProviderFactory::create_llm_provider(&config.provider_name, &config.model) {
        Ok(provider) => Arc::new(ProviderModel::new(provider, config)),
        Err(e) => {
            warn!(
                "LLM provider '{}' could not be initialised; requests will fail until it is: {}",
                config.provider_name, e
            );
            Arc::new(UnconfiguredModel::new(
                config.provider_name.clone(),
                format!(
                    "Set the API key for '{}' (e.g. GEMINI_API_KEY) and restart.\nError: {}",
                    config.provider_name, e
                ),
            ))
        }
    }
}
