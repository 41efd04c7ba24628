//! Application state.

use crate::config::GenerationConfig;
use crate::pipeline::chain::GenerationPipeline;
use crate::pipeline::extract::{PdfiumExtractor, TextExtractor};
use crate::pipeline::llm::{resolve_model, QuizModel};
use std::sync::Arc;

/// Read-only components shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<GenerationPipeline>,
    pub extractor: Arc<dyn TextExtractor>,
}

impl AppState {
    pub fn new(model: Arc<dyn QuizModel>, extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            pipeline: Arc::new(GenerationPipeline::new(model)),
            extractor,
        }
    }

    /// Production state: provider from `config`, pdfium extraction.
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(resolve_model(config), Arc::new(PdfiumExtractor))
    }
}
