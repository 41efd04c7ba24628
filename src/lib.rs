//! # edgequake-mcq
//!
//! Generate multiple-choice quizzes from PDF documents with an LLM.
//!
//! Upload a PDF with a question count, a subject and a tone; the text is
//! extracted with pdfium, an LLM writes the questions, a second LLM pass
//! polishes their grammar, and both results come back as JSON.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF upload + {number, subject, tone}
//!  │
//!  ├─ 1. Extract  page text via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 2. MCQ      LLM call with the MCQ prompt          → raw `quiz`
//!  ├─ 3. Review   LLM call with the review prompt + quiz → raw `review`
//!  ├─ 4. Parse    strip ```json fences, parse both as JSON
//!  └─ 5. Respond  {"quiz": …, "review": …}  or  {"error": "…"}
//! ```
//!
//! Steps 2 and 3 are strictly sequential and all-or-nothing: a failure at any
//! step fails the whole request.
//!
//! ## Quick Start (library)
//!
//! ```rust,no_run
//! use edgequake_mcq::{extract_pdf_text, resolve_model, GenerationConfig, GenerationPipeline, QuizParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider key read from GEMINI_API_KEY
//!     let config = GenerationConfig::default();
//!     let pipeline = GenerationPipeline::new(resolve_model(&config));
//!
//!     let text = extract_pdf_text(std::fs::read("chapter.pdf")?).await?;
//!     let params = QuizParams::new(5, "Biology", "formal")?;
//!     let result = pipeline.run(&text, &params).await?;
//!     println!("{}", serde_json::to_string_pretty(&result)?);
//!     Ok(())
//! }
//! ```
//!
//! ## HTTP API
//!
//! `POST /generate_mcq/` with a multipart body: `file` (PDF), `number`,
//! `subject`, `tone`. Run the `mcq-server` binary (feature `cli`, on by
//! default) or mount [`server::create_router`] in your own axum app.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mcq-server` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod quiz;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GenerationConfig, GenerationConfigBuilder, ServerConfig, ServerConfigBuilder};
pub use error::{McqError, Stage};
pub use pipeline::chain::{GenerationPipeline, PipelineState};
pub use pipeline::extract::{extract_pdf_text, PdfiumExtractor, TextExtractor};
pub use pipeline::llm::{resolve_model, ModelOutput, QuizModel, TokenUsage};
pub use pipeline::sanitize::parse_model_output;
pub use quiz::{GenerationResult, QuizParams};
pub use server::{create_router, AppState};
