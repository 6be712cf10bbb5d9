//! User-facing strings for hosts that display results as plain text.
//!
//! The assistant returns typed results; this module turns them into the
//! marker-prefixed messages a chat-style UI shows.

use crate::error::{AssistantError, ErrorKind, Result};

pub const FAILURE_MARKER: &str = "❌";
pub const SUCCESS_MARKER: &str = "✅";

pub const AWAITING_SETUP: &str = "⏳ Please configure your API key";
pub const SETUP_COMPLETE: &str = "✅ API key configured successfully! Models are ready.";
pub const NO_DOCUMENT: &str = "No PDF uploaded yet";
pub const DOCUMENT_LOADED: &str = "✅ PDF loaded and text extracted successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Setup,
    TextGeneration,
    Translation,
    ImageAnalysis,
    Chat,
    DocumentExtraction,
    DocumentQuestion,
}

impl Operation {
    fn remote_error_prefix(&self) -> &'static str {
        match self {
            Operation::Setup => "Error setting up API key",
            Operation::TextGeneration => "Error generating text",
            Operation::Translation => "Error translating text",
            Operation::ImageAnalysis => "Error analyzing image",
            Operation::Chat => "Error",
            Operation::DocumentExtraction => "Error extracting PDF",
            Operation::DocumentQuestion => "Error answering PDF question",
        }
    }
}

pub fn failure(operation: Operation, err: &AssistantError) -> String {
    match err.kind() {
        ErrorKind::Precondition => format!("{} {}", FAILURE_MARKER, err),
        ErrorKind::Remote => format!(
            "{} {}: {}",
            FAILURE_MARKER,
            operation.remote_error_prefix(),
            err
        ),
    }
}

/// Model text on success, a marker-prefixed message otherwise.
pub fn present(operation: Operation, result: Result<String>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => failure(operation, &e),
    }
}

pub fn setup_status(result: &Result<()>) -> String {
    match result {
        Ok(()) => SETUP_COMPLETE.to_string(),
        Err(e) => failure(Operation::Setup, e),
    }
}

pub fn extraction_status(result: &Result<()>) -> String {
    match result {
        Ok(()) => DOCUMENT_LOADED.to_string(),
        Err(e) => failure(Operation::DocumentExtraction, e),
    }
}

/// Wraps text in a `<div>`, turning newlines into `<br>`.
pub fn to_html(text: &str) -> String {
    format!("<div>{}</div>", text.replace('\n', "<br>"))
}
