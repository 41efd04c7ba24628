//! Prompt templates for the two generation stages.
//!
//! Every prompt lives here so that changing what the model is asked to do
//! requires editing exactly one place, and so unit tests can inspect the
//! filled prompts without a live provider.
//!
//! ## Placeholder syntax
//!
//! `{name}` is replaced by the value stored under `name` in a
//! [`PromptContext`]; `{{` and `}}` render as literal braces. Substitution is
//! a single pass over the template text, so braces inside substituted values
//! (the document text, the JSON quiz) are never re-interpreted.

use crate::error::McqError;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Instruction for the first stage: generate MCQs from the document text.
pub const MCQ_TEMPLATE_TEXT: &str = r#"You are an expert MCQ generator.
Create {number} multiple-choice questions from the text below for {subject} students, written in a {tone} tone.

Text:
{text}

Rules:
- Output ONLY valid JSON.
- Do NOT add ``` or any other markdown formatting.
- Do NOT write the word 'json' before the object.
- Return a single JSON object and nothing else.
- The output must start with {{ and end with }}.

Follow this RESPONSE_JSON format strictly, one entry per question:
{response_json}"#;

/// Instruction for the second stage: grammar review of the generated quiz.
pub const REVIEW_TEMPLATE_TEXT: &str = r#"You are an expert English grammarian and writer reviewing a quiz for {subject} students.
Fix grammar and polish the wording of the MCQs below. Keep the JSON structure, keys and correct answers unchanged:
{quiz}

Rules:
- Output ONLY valid JSON.
- No markdown and no ```json fences.
- The output must be parseable by a strict JSON parser."#;

/// The MCQ-generation template.
pub const MCQ_TEMPLATE: PromptTemplate = PromptTemplate {
    name: "mcq",
    text: MCQ_TEMPLATE_TEXT,
};

/// The grammar-review template.
pub const REVIEW_TEMPLATE: PromptTemplate = PromptTemplate {
    name: "review",
    text: REVIEW_TEMPLATE_TEXT,
};

/// Example of the expected quiz shape, embedded in the MCQ prompt.
///
/// A shape hint only: model output is never validated against it.
pub fn response_schema() -> Value {
    json!({
        "1": {
            "mcq": "multiple choice question",
            "option": {
                "a": "choice here",
                "b": "choice here",
                "c": "choice here",
                "d": "choice here"
            },
            "correct": "correct answer"
        }
    })
}

/// [`response_schema`] encoded as compact JSON for the `response_json` placeholder.
pub fn response_json() -> String {
    response_schema().to_string()
}

/// Values for the placeholders of one template fill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptContext {
    values: BTreeMap<String, String>,
}

impl PromptContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, rendered with `Display`.
    pub fn with(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl fmt::Display) {
        self.values.insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// A named prompt with `{placeholder}` slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    /// Short name used in error messages and logs.
    pub name: &'static str,
    /// Template text.
    pub text: &'static str,
}

#[derive(Debug, PartialEq, Eq)]
enum Segment {
    Text(&'static str),
    Brace(char),
    Placeholder(&'static str),
}

impl PromptTemplate {
    /// Placeholders referenced by the template, in order of first appearance.
    pub fn placeholders(&self) -> Result<Vec<&'static str>, McqError> {
        let mut names = Vec::new();
        for segment in self.segments()? {
            if let Segment::Placeholder(name) = segment {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }

    /// Substitute every placeholder from `ctx`.
    ///
    /// # Errors
    /// [`McqError::MissingPlaceholder`] when `ctx` lacks a referenced key,
    /// [`McqError::MalformedTemplate`] when the braces are unbalanced.
    pub fn fill(&self, ctx: &PromptContext) -> Result<String, McqError> {
        let segments = self.segments()?;
        let mut out = String::with_capacity(self.text.len());
        for segment in segments {
            match segment {
                Segment::Text(s) => out.push_str(s),
                Segment::Brace(c) => out.push(c),
                Segment::Placeholder(name) => {
                    let value = ctx.get(name).ok_or_else(|| McqError::MissingPlaceholder {
                        template: self.name,
                        placeholder: name.to_string(),
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    fn segments(&self) -> Result<Vec<Segment>, McqError> {
        let text = self.text;
        let bytes = text.as_bytes();
        let mut segments = Vec::new();
        let mut start = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'{' | b'}' if bytes.get(i + 1) == Some(&bytes[i]) => {
                    if start < i {
                        segments.push(Segment::Text(&text[start..i]));
                    }
                    segments.push(Segment::Brace(bytes[i] as char));
                    i += 2;
                    start = i;
                }
                b'{' => {
                    if start < i {
                        segments.push(Segment::Text(&text[start..i]));
                    }
                    let rest = &text[i + 1..];
                    let end = rest.find('}').ok_or_else(|| self.malformed("unterminated '{'"))?;
                    let name = &rest[..end];
                    if name.is_empty()
                        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                    {
                        return Err(self.malformed(format!("invalid placeholder '{{{name}}}'")));
                    }
                    segments.push(Segment::Placeholder(name));
                    i += end + 2;
                    start = i;
                }
                b'}' => return Err(self.malformed("single '}' outside a placeholder")),
                _ => i += 1,
            }
        }
        if start < bytes.len() {
            segments.push(Segment::Text(&text[start..]));
        }
        Ok(segments)
    }

    fn malformed(&self, detail: impl Into<String>) -> McqError {
        McqError::MalformedTemplate {
            template: self.name,
            detail: detail.into(),
        }
    }
}
