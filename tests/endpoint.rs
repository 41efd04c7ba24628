//! In-process tests for the `/generate_mcq/` endpoint.
//!
//! The router is driven with `tower::ServiceExt::oneshot`; the model and (where
//! a real PDF would otherwise be needed) the extractor are stubs, so these
//! tests need neither network access nor the pdfium library.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use edgequake_mcq::{
    create_router, AppState, McqError, ModelOutput, PdfiumExtractor, QuizModel, ServerConfig,
    Stage, TextExtractor,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

// ── Test doubles ─────────────────────────────────────────────────────────────

/// Replays canned completions and counts calls.
struct StubModel {
    replies: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl StubModel {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl QuizModel for StubModel {
    fn complete<'a>(
        &'a self,
        stage: Stage,
        _prompt: &'a str,
    ) -> BoxFuture<'a, Result<ModelOutput, McqError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.replies.lock().unwrap().pop_front();
        let result = reply.map(ModelOutput::text).ok_or(McqError::ModelInvocation {
            stage,
            message: "no scripted reply".into(),
        });
        futures::future::ready(result).boxed()
    }
}

/// Accepts anything with a PDF header and returns fixed text.
struct StubExtractor;

impl TextExtractor for StubExtractor {
    fn extract(&self, bytes: Vec<u8>) -> BoxFuture<'_, Result<String, McqError>> {
        let result = edgequake_mcq::pipeline::extract::check_pdf_magic(&bytes)
            .map(|()| "Photosynthesis converts light energy into chemical energy.\n".to_string());
        futures::future::ready(result).boxed()
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

const BOUNDARY: &str = "edgequake-mcq-test-boundary";
const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\n%%EOF\n";
const QUIZ: &str = r#"{"1": {"mcq": "What does photosynthesis produce?", "option": {"a": "Oxygen", "b": "Nitrogen", "c": "Helium", "d": "Argon"}, "correct": "a"}}"#;

enum Part<'a> {
    Field(&'a str, &'a str),
    File(&'a [u8]),
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Field(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(bytes) => {
                body.extend_from_slice(
                    b"Content-Disposition: form-data; name=\"file\"; filename=\"chapter.pdf\"\r\n\
                      Content-Type: application/pdf\r\n\r\n",
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/generate_mcq/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn valid_form(file: &[u8]) -> Vec<Part<'_>> {
    vec![
        Part::File(file),
        Part::Field("number", "3"),
        Part::Field("subject", "Biology"),
        Part::Field("tone", "formal"),
    ]
}

fn app(model: Arc<StubModel>, extractor: Arc<dyn TextExtractor>) -> Router {
    create_router(AppState::new(model, extractor), &ServerConfig::default())
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fenced_model_output_is_parsed() {
    let fenced = format!("```json\n{QUIZ}\n```");
    let model = StubModel::new(&[&fenced, QUIZ]);
    let app = app(model.clone(), Arc::new(StubExtractor));

    let (status, body) = send(app, upload(&valid_form(PDF_BYTES))).await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["quiz"]["1"]["correct"], json!("a"));
    assert_eq!(body["review"], serde_json::from_str::<Value>(QUIZ).unwrap());
    assert_eq!(body.as_object().unwrap().len(), 2);
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn non_pdf_upload_is_server_error() {
    let model = StubModel::new(&[]);
    let app = app(model.clone(), Arc::new(PdfiumExtractor));

    let (status, body) = send(app, upload(&valid_form(b"hello, not a pdf"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let msg = body["error"].as_str().expect("error envelope");
    assert!(msg.contains("not a PDF"), "got: {msg}");
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn non_integer_number_is_rejected_before_model() {
    let model = StubModel::new(&[QUIZ, QUIZ]);
    let app = app(model.clone(), Arc::new(StubExtractor));

    let form = vec![
        Part::File(PDF_BYTES),
        Part::Field("number", "abc"),
        Part::Field("subject", "Biology"),
        Part::Field("tone", "formal"),
    ];
    let (status, body) = send(app, upload(&form)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("number"));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    let model = StubModel::new(&[QUIZ, QUIZ]);

    let no_file = vec![
        Part::Field("number", "3"),
        Part::Field("subject", "Biology"),
        Part::Field("tone", "formal"),
    ];
    let (status, body) = send(app(model.clone(), Arc::new(StubExtractor)), upload(&no_file)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("file"));

    let no_tone = vec![
        Part::File(PDF_BYTES),
        Part::Field("number", "3"),
        Part::Field("subject", "Biology"),
    ];
    let (status, body) = send(app(model.clone(), Arc::new(StubExtractor)), upload(&no_tone)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("tone"));

    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn unparseable_review_returns_no_partial_result() {
    let model = StubModel::new(&[QUIZ, "I fixed the grammar for you!"]);
    let app = app(model.clone(), Arc::new(StubExtractor));

    let (status, body) = send(app, upload(&valid_form(PDF_BYTES))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.get("quiz").is_none());
    assert!(body.get("review").is_none());
    assert!(body["error"].as_str().unwrap().contains("review"));
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn model_failure_is_server_error() {
    let model = StubModel::new(&[]);
    let app = app(model.clone(), Arc::new(StubExtractor));

    let (status, body) = send(app, upload(&valid_form(PDF_BYTES))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("no scripted reply"));
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn non_multipart_body_is_rejected() {
    let model = StubModel::new(&[]);
    let app = app(model.clone(), Arc::new(StubExtractor));

    let req = Request::builder()
        .method("POST")
        .uri("/generate_mcq/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"number": 3}"#))
        .unwrap();
    let (status, body) = send(app, req).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn unknown_fields_are_ignored() {
    let model = StubModel::new(&[QUIZ, QUIZ]);
    let app = app(model.clone(), Arc::new(StubExtractor));

    let mut form = valid_form(PDF_BYTES);
    form.push(Part::Field("difficulty", "hard"));
    let (status, _) = send(app, upload(&form)).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn oversized_upload_is_client_error() {
    let model = StubModel::new(&[QUIZ, QUIZ]);
    let config = ServerConfig::builder().max_upload_bytes(1024).build().unwrap();
    let app = create_router(AppState::new(model.clone(), Arc::new(StubExtractor)), &config);

    let mut big = PDF_BYTES.to_vec();
    big.resize(8 * 1024, b' ');
    let resp = app.oneshot(upload(&valid_form(&big))).await.unwrap();

    assert!(resp.status().is_client_error(), "got {}", resp.status());
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let model = StubModel::new(&[]);
    let app = app(model, Arc::new(StubExtractor));

    let req = Request::builder()
        .method("OPTIONS")
        .uri("/generate_mcq/")
        .header(header::ORIGIN, "https://quiz.example.org")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();

    assert!(resp.status().is_success(), "got {}", resp.status());
    assert_eq!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}
