use std::sync::Arc;

use log::debug;
use reqwest::Client;

use crate::config::DEFAULT_BASE_URL;
use crate::error::{AssistantError, Result};
use crate::llm::backend::{
    Connector, Credential, GenerationOptions, GenerationRequest, GenerativeBackend,
};
use crate::llm::types::*;

/// The key travels in a header so it never appears in request URLs or transport errors.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// A handle on one Gemini model, authenticated with one API key.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub(crate) fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub async fn generate_content(
        &self,
        contents: Vec<Content>,
        options: Option<GenerationOptions>,
    ) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let payload = GenerateContentRequest {
            contents,
            generation_config: options.map(|o| GenerationConfig {
                temperature: o.temperature,
                max_output_tokens: o.max_output_tokens,
            }),
        };

        debug!("Sending generateContent request to model {}", self.model);

        let res = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .send()
            .await?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await?;
            let message = match serde_json::from_str::<ErrorEnvelope>(&err_text) {
                Ok(envelope) => envelope.error.message,
                Err(_) => err_text,
            };
            return Err(AssistantError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = res.json().await?;
        extract_text(body)
    }
}

/// Joins the text parts of the first candidate.
fn extract_text(body: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = body.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(AssistantError::EmptyResponse(format!(
            "Prompt was blocked: {}",
            reason
        )));
    }

    let candidate = body
        .candidates
        .and_then(|c| c.into_iter().next())
        .ok_or_else(|| AssistantError::EmptyResponse("No candidates returned".to_string()))?;

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    let texts: Vec<String> = parts
        .into_iter()
        .filter_map(|part| match part {
            Part::Text {
                thought: Some(true),
                ..
            } => None,
            Part::Text { text, .. } => Some(text),
            _ => None,
        })
        .collect();

    if texts.is_empty() {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "unknown".to_string());
        return Err(AssistantError::EmptyResponse(format!(
            "Model returned no text (finish reason: {})",
            reason
        )));
    }

    Ok(texts.concat())
}

#[async_trait::async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let content = match &request.image {
            Some(image) => Content::user_with_image(request.prompt, image),
            None => Content::user(request.prompt),
        };
        self.generate_content(vec![content], request.options).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Hands out [`GeminiClient`]s that share one HTTP connection pool.
#[derive(Clone)]
pub struct GeminiConnector {
    client: Client,
    base_url: String,
}

impl GeminiConnector {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for GeminiConnector {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl Connector for GeminiConnector {
    fn connect(&self, credential: &Credential, model: &str) -> Result<Arc<dyn GenerativeBackend>> {
        let client = GeminiClient::new(credential.expose(), model)
            .with_base_url(self.base_url.clone())
            .with_http_client(self.client.clone());
        Ok(Arc::new(client))
    }
}
