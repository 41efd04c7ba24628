//! Pipeline stages for quiz generation.
//!
//! Each submodule implements exactly one step.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ chain (MCQ call ──▶ review call) ──▶ sanitize
//! (pdfium)        (LLM, strictly sequential)       (fences, JSON)
//! ```
//!
//! 1. [`extract`]  — PDF bytes to page-ordered text; runs in `spawn_blocking`
//!    because pdfium is synchronous
//! 2. [`chain`]    — the two-stage state machine that fills the prompts and
//!    calls the model
//! 3. [`llm`]      — the model seam: the only stage with network I/O
//! 4. [`sanitize`] — strip markdown fences from model output and parse JSON

pub mod chain;
pub mod extract;
pub mod llm;
pub mod sanitize;
