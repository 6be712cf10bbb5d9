//! Prompt templates for the single-shot operations.

/// Target languages offered to hosts for translation pickers.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "Spanish",
    "French",
    "German",
    "Italian",
    "Portuguese",
    "Russian",
    "Chinese (Simplified)",
    "Chinese (Traditional)",
    "Japanese",
    "Korean",
];

pub const DEFAULT_TARGET_LANGUAGE: &str = "Spanish";

pub fn translation_prompt(text: &str, target_language: &str) -> String {
    format!(
        "Translate the following text to {}. Only provide the translation:\n\n{}",
        target_language, text
    )
}

/// Inlines the whole document; no chunking, so very long documents hit the
/// model's input limit and fail remotely.
pub fn document_question_prompt(document_text: &str, question: &str) -> String {
    format!(
        "Answer the question based on the following PDF content:\n{}\n\nQuestion: {}\nAnswer:",
        document_text, question
    )
}
