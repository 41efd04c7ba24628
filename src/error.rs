//! Error types for the edgequake-mcq library.
//!
//! A single fatal error type, [`McqError`], covers every way a quiz request
//! can fail. There is no partial success: the first failure in extraction,
//! templating, model invocation or parsing aborts the request, and the HTTP
//! layer turns it into an `{"error": "..."}` envelope.
//!
//! Only [`McqError::Validation`] is attributed to the client (HTTP 422); every
//! deeper failure is reported uniformly as HTTP 500. The full error is logged
//! server-side; the client receives the `Display` message only.

use thiserror::Error;

/// All errors returned by the edgequake-mcq library.
#[derive(Debug, Error)]
pub enum McqError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Request fields are missing or malformed (non-integer count, empty subject…).
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The uploaded document is not a readable PDF.
    #[error("Failed to extract text from PDF: {detail}")]
    Extraction { detail: String },

    // ── Prompt errors ─────────────────────────────────────────────────────
    /// A placeholder referenced by a template has no value in the context.
    #[error("Template '{template}' is missing a value for placeholder '{placeholder}'")]
    MissingPlaceholder {
        template: &'static str,
        placeholder: String,
    },

    /// The template text itself is malformed (unbalanced braces).
    #[error("Template '{template}' is malformed: {detail}")]
    MalformedTemplate {
        template: &'static str,
        detail: String,
    },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The provider could not be built at startup (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The provider call failed (network, quota, service error).
    #[error("LLM call failed during {stage} stage: {message}")]
    ModelInvocation { stage: Stage, message: String },

    /// Model output is not valid JSON, even after fence stripping.
    #[error("Model output of the {stage} stage is not valid JSON: {detail}")]
    Parse { stage: Stage, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl McqError {
    /// Whether the failure was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, McqError::Validation(_))
    }

    /// HTTP status code used for the error envelope.
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            422
        } else {
            500
        }
    }
}

/// A generation stage, used to attribute model and parse failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// First call: generate MCQs from the document text.
    Quiz,
    /// Second call: grammar review of the generated MCQs.
    Review,
}

impl Stage {
    /// Output key the stage's result is stored under.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Quiz => "quiz",
            Stage::Review => "review",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
