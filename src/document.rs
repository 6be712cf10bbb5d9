//! PDF text extraction.
//!
//! Pages are read one at a time through [`PageTextSource`] so that an unreadable
//! page costs only its own text: it is skipped and logged, never reported.

use std::path::PathBuf;

use log::debug;
use lopdf::Document;
use tokio::fs;

use crate::error::{AssistantError, Precondition, Result};

const PDF_MIME: &str = "application/pdf";

/// A document supplied by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentHandle {
    Path(PathBuf),
    Bytes { name: String, data: Vec<u8> },
}

impl DocumentHandle {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        DocumentHandle::Path(path.into())
    }

    pub fn bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        DocumentHandle::Bytes {
            name: name.into(),
            data,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            DocumentHandle::Path(path) => path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("document")
                .to_string(),
            DocumentHandle::Bytes { name, .. } => name.clone(),
        }
    }

    /// Rejects handles whose name maps to a known, non-PDF MIME type.
    /// Unknown extensions are let through and left to the parser.
    pub fn ensure_pdf(&self) -> Result<()> {
        let guess = match self {
            DocumentHandle::Path(path) => mime_guess::from_path(path).first(),
            DocumentHandle::Bytes { name, .. } => mime_guess::from_path(name).first(),
        };

        match guess {
            Some(mime) if mime.essence_str() != PDF_MIME => {
                Err(Precondition::UnsupportedDocument(mime.to_string()).into())
            }
            _ => Ok(()),
        }
    }
}

/// Anything that can hand out text page by page.
pub trait PageTextSource {
    fn page_count(&self) -> usize;

    /// Text of the zero-based page `index`. May be empty.
    fn page_text(&self, index: usize) -> Result<String>;
}

/// A parsed PDF backed by `lopdf`.
pub struct PdfPages {
    document: Document,
    page_numbers: Vec<u32>,
}

impl PdfPages {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data)?;
        let page_numbers = document.get_pages().keys().copied().collect();
        Ok(Self {
            document,
            page_numbers,
        })
    }

    pub async fn open(handle: &DocumentHandle) -> Result<Self> {
        match handle {
            DocumentHandle::Path(path) => {
                let data = fs::read(path).await?;
                Self::from_bytes(&data)
            }
            DocumentHandle::Bytes { data, .. } => Self::from_bytes(data),
        }
    }
}

impl PageTextSource for PdfPages {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        let number = self.page_numbers.get(index).ok_or_else(|| {
            AssistantError::Pdf(format!(
                "Page index {} out of range ({} pages)",
                index,
                self.page_numbers.len()
            ))
        })?;
        Ok(self.document.extract_text(&[*number])?)
    }
}

/// Concatenates every page that yields non-empty text, one newline after each,
/// and trims the result.
pub fn collect_text(source: &dyn PageTextSource) -> String {
    let mut text = String::new();

    for index in 0..source.page_count() {
        match source.page_text(index) {
            Ok(page) if !page.is_empty() => {
                text.push_str(&page);
                text.push('\n');
            }
            Ok(_) => debug!("Page {} has no extractable text", index + 1),
            Err(e) => debug!("Skipping unreadable page {}: {}", index + 1, e),
        }
    }

    text.trim().to_string()
}
