//! Text extraction: PDF bytes → page-concatenated plain text via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which parses synchronously
//! and keeps thread-local state. Running it on a `spawn_blocking` thread keeps
//! the Tokio workers free to serve other requests while a large upload is
//! being parsed.
//!
//! The shared library itself is located by `pdfium-auto`: `PDFIUM_LIB_PATH`
//! if set, otherwise a per-version cache directory, downloading the platform
//! build once on first use.

use crate::error::McqError;
use futures::future::BoxFuture;
use futures::FutureExt;
use pdfium_render::prelude::*;
use tracing::{debug, info, warn};

/// Converts an uploaded document into plain text.
///
/// The HTTP layer holds an `Arc<dyn TextExtractor>` so tests can substitute
/// the pdfium-backed implementation.
pub trait TextExtractor: Send + Sync {
    /// Extract the text of every page, in document order.
    fn extract(&self, bytes: Vec<u8>) -> BoxFuture<'_, Result<String, McqError>>;
}

/// The production extractor, backed by pdfium.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumExtractor;

impl TextExtractor for PdfiumExtractor {
    fn extract(&self, bytes: Vec<u8>) -> BoxFuture<'_, Result<String, McqError>> {
        extract_pdf_text(bytes).boxed()
    }
}

/// Extract the text of every page of a PDF held in memory.
///
/// Each page contributes its text (empty when the page has none) followed by
/// a newline, in page order.
///
/// # Errors
/// [`McqError::Extraction`] when the bytes are not a readable PDF,
/// [`McqError::Internal`] when the pdfium library cannot be loaded.
pub async fn extract_pdf_text(bytes: Vec<u8>) -> Result<String, McqError> {
    check_pdf_magic(&bytes)?;

    tokio::task::spawn_blocking(move || extract_text_blocking(bytes))
        .await
        .map_err(|e| McqError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Reject anything that does not start with the `%PDF` header.
///
/// Catching this up front gives the caller a meaningful message instead of
/// an opaque pdfium format error.
pub fn check_pdf_magic(bytes: &[u8]) -> Result<(), McqError> {
    if bytes.starts_with(b"%PDF") {
        return Ok(());
    }
    let head = &bytes[..bytes.len().min(4)];
    Err(McqError::Extraction {
        detail: format!("file is not a PDF (first bytes: {:?})", head),
    })
}

/// Blocking implementation of text extraction.
fn extract_text_blocking(bytes: Vec<u8>) -> Result<String, McqError> {
    let pdfium = pdfium_auto::bind_pdfium_silent()
        .map_err(|e| McqError::Internal(format!("Failed to bind to pdfium library: {}", e)))?;

    let size = bytes.len();
    let document = pdfium.load_pdf_from_byte_vec(bytes, None).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            McqError::Extraction {
                detail: "PDF is encrypted and requires a password".to_string(),
            }
        } else {
            McqError::Extraction {
                detail: format!("PDF is corrupt: {}", err_str),
            }
        }
    })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages, {} bytes", pages.len(), size);

    let page_texts = pages.iter().enumerate().map(|(idx, page)| match page.text() {
        Ok(page_text) => Some(page_text.all()),
        Err(e) => {
            warn!("Page {}: no extractable text ({:?})", idx + 1, e);
            None
        }
    });

    Ok(join_pages(page_texts))
}

/// Concatenate page texts in order, each followed by a newline.
///
/// `None` marks a page without extractable text; it still contributes its
/// newline.
fn join_pages(pages: impl IntoIterator<Item = Option<String>>) -> String {
    let mut text = String::new();
    for (idx, page) in pages.into_iter().enumerate() {
        let content = page.unwrap_or_default();
        debug!("Page {}: {} chars", idx + 1, content.len());
        text.push_str(&content);
        text.push('\n');
    }
    text
}
