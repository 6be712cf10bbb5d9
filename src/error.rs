use thiserror::Error;

/// Input problems detected before any remote call is attempted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Precondition {
    #[error("Please enter a valid API key")]
    BlankCredential,

    #[error("Please configure your API key first")]
    MissingCredential,

    #[error("Please enter a prompt")]
    BlankPrompt,

    #[error("Temperature must be between 0.0 and 1.0, got {0}")]
    TemperatureOutOfRange(f32),

    #[error("Please enter text to translate")]
    BlankTranslationText,

    #[error("Please choose a target language")]
    BlankTargetLanguage,

    #[error("Please upload an image")]
    MissingImage,

    #[error("Please enter a message")]
    BlankMessage,

    #[error("Please upload a PDF file")]
    MissingDocument,

    #[error("Unsupported document type {0}: only PDF files can be loaded")]
    UnsupportedDocument(String),

    #[error("Please upload a PDF first")]
    NoDocumentLoaded,

    #[error("Please enter a question")]
    BlankQuestion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Precondition,
    Remote,
}

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("{0}")]
    Precondition(#[from] Precondition),

    #[error("Gemini API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[cfg(feature = "gemini")]
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("Invalid image: {0}")]
    Image(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AssistantError {
    /// Everything that is not a precondition came from a collaborator
    /// (the remote API, the PDF reader or the image decoder).
    pub fn kind(&self) -> ErrorKind {
        match self {
            AssistantError::Precondition(_) => ErrorKind::Precondition,
            _ => ErrorKind::Remote,
        }
    }

    pub fn precondition(&self) -> Option<&Precondition> {
        match self {
            AssistantError::Precondition(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(feature = "gemini")]
impl From<reqwest::Error> for AssistantError {
    /// Drops the request URL so transport failures never carry endpoint details.
    fn from(err: reqwest::Error) -> Self {
        AssistantError::Http(err.without_url())
    }
}

impl From<lopdf::Error> for AssistantError {
    fn from(err: lopdf::Error) -> Self {
        AssistantError::Pdf(err.to_string())
    }
}

impl From<image::ImageError> for AssistantError {
    fn from(err: image::ImageError) -> Self {
        AssistantError::Image(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AssistantError>;
