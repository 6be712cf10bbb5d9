use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_PROMPT: &str = "Describe this image in detail";

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const VISION_MODEL_VAR: &str = "GEMINI_VISION_MODEL";
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";

/// Tunables shared by every call the assistant makes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantConfig {
    pub text_model: String,
    pub vision_model: String,
    pub base_url: String,
    /// Output cap applied to free-form text generation.
    pub max_output_tokens: u32,
    /// Slider default offered to hosts; `generate_text` always takes an explicit value.
    pub default_temperature: f32,
    pub image_prompt: String,
    /// Sent once after a credential is supplied to check the remote accepts it.
    pub verification_prompt: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            text_model: DEFAULT_MODEL.to_string(),
            vision_model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_output_tokens: 2048,
            default_temperature: 0.7,
            image_prompt: DEFAULT_IMAGE_PROMPT.to_string(),
            verification_prompt: "Hello".to_string(),
        }
    }
}

impl AssistantConfig {
    /// Defaults overridden by `GEMINI_MODEL`, `GEMINI_VISION_MODEL` and `GEMINI_BASE_URL`.
    ///
    /// The vision model follows `GEMINI_MODEL` unless set separately.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(model) = non_blank(MODEL_VAR) {
            config.text_model = model.clone();
            config.vision_model = model;
        }
        if let Some(model) = non_blank(VISION_MODEL_VAR) {
            config.vision_model = model;
        }
        if let Some(url) = non_blank(BASE_URL_VAR) {
            config.base_url = url.trim_end_matches('/').to_string();
        }

        config
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}
