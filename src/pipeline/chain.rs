//! The two-stage generation pipeline as an explicit state machine.
//!
//! ```text
//! Init ──▶ McqGenerated ──▶ Reviewed ──▶ Done
//!   │            │              │
//!   └────────────┴──────────────┴──▶ Failed
//! ```
//!
//! * `Init → McqGenerated` — fill the MCQ template, call the model, keep the
//!   raw output as `quiz`.
//! * `McqGenerated → Reviewed` — fill the review template with the subject
//!   and the raw `quiz`, call the model again, keep the raw output as `review`.
//! * `Reviewed → Done` — sanitise and parse both outputs.
//!
//! Any error moves to `Failed` and drops whatever was produced so far, so the
//! only way out of [`GenerationPipeline::run`] with a value is `Done`. The
//! review depends on the quiz, so the two calls are strictly sequential.

use crate::error::{McqError, Stage};
use crate::pipeline::llm::{ModelOutput, QuizModel};
use crate::pipeline::sanitize::parse_model_output;
use crate::prompts::{self, PromptContext, PromptTemplate, MCQ_TEMPLATE, REVIEW_TEMPLATE};
use crate::quiz::{GenerationResult, QuizParams, StageUsage};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Pipeline state. `Done` and `Failed` are terminal.
#[derive(Debug)]
pub enum PipelineState {
    Init,
    McqGenerated {
        quiz: ModelOutput,
    },
    Reviewed {
        quiz: ModelOutput,
        review: ModelOutput,
    },
    Done(GenerationResult),
    Failed(McqError),
}

impl PipelineState {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Init => "init",
            PipelineState::McqGenerated { .. } => "mcq_generated",
            PipelineState::Reviewed { .. } => "reviewed",
            PipelineState::Done(_) => "done",
            PipelineState::Failed(_) => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done(_) | PipelineState::Failed(_))
    }
}

/// Inputs shared by every transition of one run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineInput<'a> {
    /// Text extracted from the uploaded document.
    pub text: &'a str,
    pub params: &'a QuizParams,
}

/// Drives the MCQ and review stages against an injected model.
#[derive(Clone)]
pub struct GenerationPipeline {
    model: Arc<dyn QuizModel>,
    mcq_template: PromptTemplate,
    review_template: PromptTemplate,
    response_json: String,
}

impl std::fmt::Debug for GenerationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationPipeline")
            .field("model", &"<dyn QuizModel>")
            .field("mcq_template", &self.mcq_template.name)
            .field("review_template", &self.review_template.name)
            .finish()
    }
}

impl GenerationPipeline {
    /// Pipeline using the built-in templates.
    pub fn new(model: Arc<dyn QuizModel>) -> Self {
        Self {
            model,
            mcq_template: MCQ_TEMPLATE,
            review_template: REVIEW_TEMPLATE,
            response_json: prompts::response_json(),
        }
    }

    /// Replace the templates (both must reference the same placeholders as the defaults).
    pub fn with_templates(mut self, mcq: PromptTemplate, review: PromptTemplate) -> Self {
        self.mcq_template = mcq;
        self.review_template = review;
        self
    }

    /// Run both stages to completion.
    ///
    /// # Errors
    /// The first template, model or parse error; nothing partial is returned.
    pub async fn run(
        &self,
        text: &str,
        params: &QuizParams,
    ) -> Result<GenerationResult, McqError> {
        let start = Instant::now();
        let input = PipelineInput { text, params };
        let mut state = PipelineState::Init;

        while !state.is_terminal() {
            let from = state.name();
            state = self.step(state, input).await;
            debug!("Pipeline: {} → {}", from, state.name());
        }

        match state {
            PipelineState::Done(result) => {
                let total = result.usage.total();
                info!(
                    "Generated {} MCQs on '{}': {} tokens in / {} out, {}ms",
                    params.number,
                    params.subject,
                    total.prompt_tokens,
                    total.completion_tokens,
                    start.elapsed().as_millis()
                );
                Ok(result)
            }
            PipelineState::Failed(e) => Err(e),
            _ => Err(McqError::Internal(
                "pipeline stopped in a non-terminal state".into(),
            )),
        }
    }

    /// Perform one transition. Terminal states are returned unchanged.
    pub async fn step(&self, state: PipelineState, input: PipelineInput<'_>) -> PipelineState {
        match state {
            PipelineState::Init => {
                match self.invoke(Stage::Quiz, &self.mcq_template, &self.mcq_context(input)).await {
                    Ok(quiz) => PipelineState::McqGenerated { quiz },
                    Err(e) => PipelineState::Failed(e),
                }
            }
            PipelineState::McqGenerated { quiz } => {
                let ctx = review_context(&input.params.subject, &quiz.content);
                match self.invoke(Stage::Review, &self.review_template, &ctx).await {
                    Ok(review) => PipelineState::Reviewed { quiz, review },
                    Err(e) => PipelineState::Failed(e),
                }
            }
            PipelineState::Reviewed { quiz, review } => match finish(quiz, review) {
                Ok(result) => PipelineState::Done(result),
                Err(e) => PipelineState::Failed(e),
            },
            terminal => terminal,
        }
    }

    /// Context for the MCQ template.
    pub fn mcq_context(&self, input: PipelineInput<'_>) -> PromptContext {
        PromptContext::new()
            .with("number", input.params.number)
            .with("text", input.text)
            .with("subject", &input.params.subject)
            .with("tone", &input.params.tone)
            .with("response_json", &self.response_json)
    }

    async fn invoke(
        &self,
        stage: Stage,
        template: &PromptTemplate,
        ctx: &PromptContext,
    ) -> Result<ModelOutput, McqError> {
        let prompt = template.fill(ctx)?;
        debug!("Stage {}: prompt of {} chars", stage, prompt.len());
        self.model.complete(stage, &prompt).await
    }
}

/// Context for the review template.
pub fn review_context(subject: &str, raw_quiz: &str) -> PromptContext {
    PromptContext::new()
        .with("subject", subject)
        .with("quiz", raw_quiz)
}

fn finish(quiz: ModelOutput, review: ModelOutput) -> Result<GenerationResult, McqError> {
    Ok(GenerationResult {
        quiz: parse_model_output(Stage::Quiz, &quiz.content)?,
        review: parse_model_output(Stage::Review, &review.content)?,
        usage: StageUsage {
            quiz: quiz.usage,
            review: review.usage,
        },
    })
}
