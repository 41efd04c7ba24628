//! Request parameters and the generation result.

use crate::error::McqError;
use crate::pipeline::llm::TokenUsage;
use serde::Serialize;
use serde_json::Value;

/// Validated quiz parameters of one request.
///
/// The uploaded document travels separately: it is consumed by the extractor
/// and only its text reaches the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizParams {
    /// Number of questions to generate (≥ 1).
    pub number: u32,
    /// Audience the questions are written for, e.g. "Biology".
    pub subject: String,
    /// Writing tone, e.g. "formal".
    pub tone: String,
}

impl QuizParams {
    /// Validate and build parameters.
    ///
    /// # Errors
    /// [`McqError::Validation`] when `number` is 0 or `subject`/`tone` are blank.
    pub fn new(
        number: u32,
        subject: impl Into<String>,
        tone: impl Into<String>,
    ) -> Result<Self, McqError> {
        if number == 0 {
            return Err(McqError::Validation(
                "'number' must be a positive integer".into(),
            ));
        }
        let subject = required_text("subject", subject.into())?;
        let tone = required_text("tone", tone.into())?;
        Ok(Self {
            number,
            subject,
            tone,
        })
    }

    /// Build parameters from raw form values, as received over HTTP.
    pub fn from_form(
        number: Option<&str>,
        subject: Option<&str>,
        tone: Option<&str>,
    ) -> Result<Self, McqError> {
        let number = parse_question_count(number.ok_or_else(|| missing("number"))?)?;
        let subject = subject.ok_or_else(|| missing("subject"))?;
        let tone = tone.ok_or_else(|| missing("tone"))?;
        Self::new(number, subject, tone)
    }
}

/// Parse the `number` form field.
pub fn parse_question_count(raw: &str) -> Result<u32, McqError> {
    let trimmed = raw.trim();
    match trimmed.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(McqError::Validation(format!(
            "'number' must be a positive integer, got {:?}",
            raw
        ))),
    }
}

fn required_text(field: &str, value: String) -> Result<String, McqError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(McqError::Validation(format!("'{field}' must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn missing(field: &str) -> McqError {
    McqError::Validation(format!("missing required field '{field}'"))
}

/// Token usage of both stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageUsage {
    pub quiz: TokenUsage,
    pub review: TokenUsage,
}

impl StageUsage {
    pub fn total(&self) -> TokenUsage {
        self.quiz + self.review
    }
}

/// Output of a successful pipeline run.
///
/// Serialises to exactly `{"quiz": …, "review": …}`; usage is kept for
/// logging only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    /// Parsed output of the MCQ stage.
    pub quiz: Value,
    /// Parsed output of the review stage.
    pub review: Value,
    #[serde(skip)]
    pub usage: StageUsage,
}
