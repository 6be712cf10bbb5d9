//! # Gemini Assistant
//!
//! A request-orchestration facade between a host UI and the Gemini
//! generative-language API. It turns simple user intents into single
//! model calls and keeps the little state those intents need.
//!
//! ## Core Concepts
//!
//! - **Credential**: one API key, checked with a verification call before it replaces the previous one
//! - **Model handles**: a "text" and a "vision" endpoint, by default the same Gemini model
//! - **Transcript**: ordered user/assistant turns, flattened into one prompt per chat exchange
//! - **Document text**: text extracted from the last loaded PDF, inlined whole into document questions
//! - **Typed results**: operations return [`Result`]; [`render`] turns them into UI strings
//!
//! ## Example
//!
//! ```rust,ignore
//! use gemini_assistant::*;
//!
//! let mut assistant = GeminiAssistant::from_env();
//! assistant.configure_credential("AIza...").await?;
//!
//! let poem = assistant.generate_text("Write a haiku about Rust", 0.7).await?;
//! let spanish = assistant.translate("Good morning", "Spanish").await?;
//!
//! assistant
//!     .extract_document_text(Some(&DocumentHandle::path("lecture.pdf")))
//!     .await?;
//! let answer = assistant.answer_document_question("What is the main topic?").await?;
//!
//! let status = assistant.converse("Summarise that in one line").await?;
//! println!("{}", assistant.history().last().unwrap().content);
//! ```

pub mod assistant;
pub mod config;
pub mod document;
pub mod error;
pub mod llm;
pub mod media;
pub mod render;
pub mod session;
pub mod transcript;

pub use assistant::*;
pub use config::AssistantConfig;
pub use document::{collect_text, DocumentHandle, PageTextSource, PdfPages};
pub use error::{AssistantError, ErrorKind, Precondition, Result};
pub use llm::prompts::{DEFAULT_TARGET_LANGUAGE, SUPPORTED_LANGUAGES};
pub use llm::{Connector, Credential, GenerationOptions, GenerationRequest, GenerativeBackend};
pub use media::{ImageHandle, InlineImage};
pub use render::Operation;
pub use session::{SessionPool, SharedAssistant};
pub use transcript::{ConversationTurn, Role, Transcript};
