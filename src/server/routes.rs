//! Route handlers.

use crate::error::McqError;
use crate::quiz::{GenerationResult, QuizParams};
use crate::server::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Body of every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for McqError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Form parts of a `/generate_mcq/` request, as received.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<Vec<u8>>,
    number: Option<String>,
    subject: Option<String>,
    tone: Option<String>,
}

/// `POST /generate_mcq/`: PDF + parameters in, `{quiz, review}` out.
pub async fn generate_mcq(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerationResult>, McqError> {
    match handle_generate(&state, multipart).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            if e.is_client_error() {
                warn!("Rejected quiz request: {}", e);
            } else {
                error!("Quiz generation failed: {:?}", e);
            }
            Err(e)
        }
    }
}

async fn handle_generate(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<GenerationResult, McqError> {
    let multipart = multipart.map_err(|e| McqError::Validation(e.body_text()))?;
    let form = read_form(multipart).await?;

    // Fields are validated before the document is touched.
    let params = QuizParams::from_form(
        form.number.as_deref(),
        form.subject.as_deref(),
        form.tone.as_deref(),
    )?;
    let file = form
        .file
        .ok_or_else(|| McqError::Validation("missing required file part 'file'".into()))?;

    info!(
        "Quiz request: {} questions, subject '{}', tone '{}', {} byte upload",
        params.number,
        params.subject,
        params.tone,
        file.len()
    );

    let text = state.extractor.extract(file).await?;
    debug!("Extracted {} chars of text", text.len());

    state.pipeline.run(&text, &params).await
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, McqError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => form.file = Some(field.bytes().await.map_err(malformed)?.to_vec()),
            "number" => form.number = Some(field.text().await.map_err(malformed)?),
            "subject" => form.subject = Some(field.text().await.map_err(malformed)?),
            "tone" => form.tone = Some(field.text().await.map_err(malformed)?),
            _ => debug!("Ignoring unknown form field '{}'", name),
        }
    }

    Ok(form)
}

fn malformed(e: axum::extract::multipart::MultipartError) -> McqError {
    McqError::Validation(format!("malformed multipart body: {}", e.body_text()))
}
