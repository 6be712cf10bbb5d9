//! The assistant facade: one credential, two model handles, a chat transcript
//! and the text of the last loaded document.
//!
//! Every content operation checks its inputs first and makes at most one
//! remote call. Inputs that fail a check never reach the model.

use std::sync::Arc;

use log::{debug, info};

use crate::config::AssistantConfig;
use crate::document::{collect_text, DocumentHandle, PageTextSource, PdfPages};
use crate::error::{AssistantError, Precondition, Result};
use crate::llm::backend::{
    Connector, Credential, GenerationOptions, GenerationRequest, GenerativeBackend,
};
use crate::llm::prompts::{document_question_prompt, translation_prompt};
use crate::media::ImageHandle;
use crate::render::{self, Operation};
use crate::transcript::Transcript;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantState {
    Unconfigured,
    Ready,
}

struct ModelHandles {
    credential: Credential,
    text: Arc<dyn GenerativeBackend>,
    vision: Arc<dyn GenerativeBackend>,
}

/// Outcome of a chat exchange that passed its input checks.
///
/// Either way, the transcript has gained the user turn and an assistant turn.
#[derive(Debug)]
pub enum ChatStatus {
    Replied,
    /// The assistant turn holds this error's message.
    Failed(AssistantError),
}

impl ChatStatus {
    /// What the host's input box should contain afterwards: always cleared.
    pub fn input_after(&self) -> &'static str {
        ""
    }

    pub fn is_replied(&self) -> bool {
        matches!(self, ChatStatus::Replied)
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub struct AssistantFacade<C: Connector> {
    connector: C,
    config: AssistantConfig,
    handles: Option<ModelHandles>,
    history: Transcript,
    document_text: String,
}

impl<C: Connector> AssistantFacade<C> {
    pub fn new(connector: C, config: AssistantConfig) -> Self {
        Self {
            connector,
            config,
            handles: None,
            history: Transcript::new(),
            document_text: String::new(),
        }
    }

    pub fn state(&self) -> AssistantState {
        if self.handles.is_some() {
            AssistantState::Ready
        } else {
            AssistantState::Unconfigured
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == AssistantState::Ready
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.handles.as_ref().map(|h| &h.credential)
    }

    pub fn history(&self) -> &Transcript {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Text cached by the last successful extraction. Empty until then.
    pub fn document_text(&self) -> &str {
        &self.document_text
    }

    fn connect_handles(&self, key: &str) -> Result<ModelHandles> {
        let credential = Credential::new(key);
        let text = self.connector.connect(&credential, &self.config.text_model)?;
        let vision = self
            .connector
            .connect(&credential, &self.config.vision_model)?;
        Ok(ModelHandles {
            credential,
            text,
            vision,
        })
    }

    /// Installs handles for `key` without the verification call. Used for keys found at start-up.
    pub(crate) fn adopt_credential(&mut self, key: &str) -> Result<()> {
        if is_blank(key) {
            return Err(Precondition::BlankCredential.into());
        }
        self.handles = Some(self.connect_handles(key.trim())?);
        Ok(())
    }

    /// Replaces the credential after a verification call succeeds with it.
    ///
    /// On any failure the previous credential and handles stay in place.
    pub async fn configure_credential(&mut self, key: &str) -> Result<()> {
        if is_blank(key) {
            return Err(Precondition::BlankCredential.into());
        }

        let handles = self.connect_handles(key.trim())?;
        handles
            .text
            .generate(GenerationRequest::text(self.config.verification_prompt.clone()))
            .await?;

        info!(
            "API key configured; text model {} and vision model {} ready",
            handles.text.model(),
            handles.vision.model()
        );
        self.handles = Some(handles);
        Ok(())
    }

    fn ready(&self) -> Result<&ModelHandles> {
        self.handles
            .as_ref()
            .ok_or_else(|| Precondition::MissingCredential.into())
    }

    pub async fn generate_text(&self, prompt: &str, temperature: f32) -> Result<String> {
        let handles = self.ready()?;
        if is_blank(prompt) {
            return Err(Precondition::BlankPrompt.into());
        }
        if !(0.0..=1.0).contains(&temperature) {
            return Err(Precondition::TemperatureOutOfRange(temperature).into());
        }

        debug!(
            "Generating text (temperature {}, {} prompt chars)",
            temperature,
            prompt.len()
        );
        let request = GenerationRequest::text(prompt).with_options(GenerationOptions {
            temperature: Some(temperature),
            max_output_tokens: Some(self.config.max_output_tokens),
        });
        handles.text.generate(request).await
    }

    /// The model is trusted to return only the translation; the output is not checked.
    pub async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let handles = self.ready()?;
        if is_blank(text) {
            return Err(Precondition::BlankTranslationText.into());
        }
        if is_blank(target_language) {
            return Err(Precondition::BlankTargetLanguage.into());
        }

        let prompt = translation_prompt(text, target_language.trim());
        handles.text.generate(GenerationRequest::text(prompt)).await
    }

    /// Asks the vision model about `image`. A missing or blank question uses
    /// the configured default prompt.
    pub async fn describe_image(
        &self,
        image: Option<&ImageHandle>,
        question: Option<&str>,
    ) -> Result<String> {
        let handles = self.ready()?;
        let image = image.ok_or(Precondition::MissingImage)?;

        let question = question
            .filter(|q| !is_blank(q))
            .unwrap_or(self.config.image_prompt.as_str());
        let inline = image.resolve().await?;

        debug!(
            "Describing {} image ({} bytes)",
            inline.mime_type,
            inline.data.len()
        );
        let request = GenerationRequest::text(question).with_image(inline);
        handles.vision.generate(request).await
    }

    /// One chat exchange against a caller-owned transcript.
    ///
    /// Input errors return `Err` and leave `transcript` alone. Otherwise the
    /// user turn is appended first, then either the reply or the error text.
    pub async fn chat(&self, message: &str, transcript: &mut Transcript) -> Result<ChatStatus> {
        let handles = self.ready()?;
        if is_blank(message) {
            return Err(Precondition::BlankMessage.into());
        }

        let prompt = Transcript::linearize(transcript.turns(), message);
        transcript.push_user(message);

        match handles.text.generate(GenerationRequest::text(prompt)).await {
            Ok(reply) => {
                transcript.push_assistant(reply);
                Ok(ChatStatus::Replied)
            }
            Err(e) => {
                transcript.push_assistant(render::failure(Operation::Chat, &e));
                Ok(ChatStatus::Failed(e))
            }
        }
    }

    /// [`chat`](Self::chat) against the assistant's own transcript.
    pub async fn converse(&mut self, message: &str) -> Result<ChatStatus> {
        let mut history = std::mem::take(&mut self.history);
        let status = self.chat(message, &mut history).await;
        self.history = history;
        status
    }

    /// Loads a PDF and caches its text, replacing any earlier document.
    ///
    /// Pages without extractable text are skipped without notice.
    pub async fn extract_document_text(&mut self, document: Option<&DocumentHandle>) -> Result<()> {
        let document = document.ok_or(Precondition::MissingDocument)?;
        document.ensure_pdf()?;

        let pages = PdfPages::open(document).await?;
        info!(
            "Loaded {} ({} pages)",
            document.display_name(),
            pages.page_count()
        );
        self.extract_from_pages(&pages)
    }

    /// Caches the text of any page source, replacing the previous document text.
    pub fn extract_from_pages(&mut self, pages: &dyn PageTextSource) -> Result<()> {
        self.document_text = collect_text(pages);
        info!(
            "Cached {} characters of document text",
            self.document_text.len()
        );
        Ok(())
    }

    pub async fn answer_document_question(&self, question: &str) -> Result<String> {
        if self.document_text.is_empty() {
            return Err(Precondition::NoDocumentLoaded.into());
        }
        if is_blank(question) {
            return Err(Precondition::BlankQuestion.into());
        }
        let handles = self.ready()?;

        let prompt = document_question_prompt(&self.document_text, question);
        handles.text.generate(GenerationRequest::text(prompt)).await
    }
}

#[cfg(feature = "gemini")]
pub type GeminiAssistant = AssistantFacade<crate::llm::client::GeminiConnector>;

#[cfg(feature = "gemini")]
impl AssistantFacade<crate::llm::client::GeminiConnector> {
    /// Builds an assistant from `GEMINI_*` environment variables.
    ///
    /// A `GEMINI_API_KEY` found here is adopted without a verification call; a bad
    /// key shows up on the first request instead.
    pub fn from_env() -> Self {
        let config = AssistantConfig::from_env();
        let connector = crate::llm::client::GeminiConnector::new(config.base_url.clone());
        let mut assistant = Self::new(connector, config);

        if let Ok(key) = std::env::var(crate::config::API_KEY_VAR) {
            match assistant.adopt_credential(&key) {
                Ok(()) => info!("API key loaded from environment and models ready"),
                Err(e) => log::warn!("Failed to configure API key from environment: {}", e),
            }
        }

        assistant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::test_support::sample_pdf;
    use crate::error::ErrorKind;
    use crate::llm::mock::MockConnector;
    use crate::transcript::Role;
    use std::io::Write;

    fn assistant() -> (AssistantFacade<MockConnector>, MockConnector) {
        let connector = MockConnector::new();
        let facade = AssistantFacade::new(connector.clone(), AssistantConfig::default());
        (facade, connector)
    }

    async fn ready_assistant() -> (AssistantFacade<MockConnector>, MockConnector) {
        let (mut facade, connector) = assistant();
        facade.configure_credential("valid-key").await.unwrap();
        (facade, connector)
    }

    struct Pages(Vec<&'static str>);

    impl PageTextSource for Pages {
        fn page_count(&self) -> usize {
            self.0.len()
        }

        fn page_text(&self, index: usize) -> Result<String> {
            Ok(self.0[index].to_string())
        }
    }

    fn precondition(err: AssistantError) -> Precondition {
        err.precondition().cloned().expect("expected a precondition error")
    }

    #[tokio::test]
    async fn test_configure_verifies_and_becomes_ready() {
        let (mut facade, connector) = assistant();
        assert_eq!(facade.state(), AssistantState::Unconfigured);

        facade.configure_credential("  valid-key ").await.unwrap();

        assert_eq!(facade.state(), AssistantState::Ready);
        assert_eq!(connector.call_count(), 1);
        assert_eq!(connector.last_request().unwrap().prompt, "Hello");
        assert_eq!(facade.credential().unwrap().expose(), "valid-key");

        let models: Vec<String> = connector.connections().into_iter().map(|(_, m)| m).collect();
        assert_eq!(models, vec!["gemini-2.5-flash", "gemini-2.5-flash"]);
    }

    #[tokio::test]
    async fn test_blank_key_leaves_state_untouched() {
        let (mut facade, connector) = assistant();
        let err = facade.configure_credential("   ").await.unwrap_err();
        assert_eq!(precondition(err), Precondition::BlankCredential);
        assert_eq!(facade.state(), AssistantState::Unconfigured);
        assert_eq!(connector.call_count(), 0);

        let (mut facade, _) = ready_assistant().await;
        facade.configure_credential("").await.unwrap_err();
        assert_eq!(facade.state(), AssistantState::Ready);
        assert_eq!(facade.credential().unwrap().expose(), "valid-key");
    }

    #[tokio::test]
    async fn test_failed_verification_keeps_previous_state() {
        let (mut facade, connector) = assistant();
        connector.fail("API key not valid");
        let err = facade.configure_credential("bad-key").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(facade.state(), AssistantState::Unconfigured);

        let (mut facade, connector) = ready_assistant().await;
        connector.fail("API key not valid");
        facade.configure_credential("other-key").await.unwrap_err();
        assert_eq!(facade.state(), AssistantState::Ready);
        assert_eq!(facade.credential().unwrap().expose(), "valid-key");
    }

    #[test]
    fn test_adopted_credential_skips_verification() {
        let (mut facade, connector) = assistant();
        assert!(facade.adopt_credential(" ").is_err());
        facade.adopt_credential("env-key").unwrap();

        assert!(facade.is_ready());
        assert_eq!(connector.call_count(), 0);
        assert_eq!(connector.connections().len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_connect_keeps_previous_state() {
        let (mut facade, connector) = ready_assistant().await;
        connector.reject_key("revoked");
        assert!(facade.configure_credential("revoked").await.is_err());
        assert!(facade.is_ready());
        assert_eq!(connector.call_count(), 1);
    }

    #[tokio::test]
    async fn test_content_operations_require_credential() {
        let (mut facade, connector) = assistant();
        let image = ImageHandle::decoded(vec![0; 4], 1, 1);

        let errors = vec![
            facade.generate_text("Say hi", 0.5).await.unwrap_err(),
            facade.translate("Hello", "French").await.unwrap_err(),
            facade.describe_image(Some(&image), None).await.unwrap_err(),
            facade.chat("Hi", &mut Transcript::new()).await.unwrap_err(),
        ];
        for err in errors {
            assert_eq!(precondition(err), Precondition::MissingCredential);
        }

        facade.extract_from_pages(&Pages(vec!["notes"])).unwrap();
        let err = facade.answer_document_question("What?").await.unwrap_err();
        assert_eq!(precondition(err), Precondition::MissingCredential);

        assert_eq!(connector.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_inputs_never_reach_the_model() {
        let (mut facade, connector) = ready_assistant().await;
        facade.extract_from_pages(&Pages(vec!["notes"])).unwrap();
        let setup_calls = connector.call_count();

        for blank in ["", "   ", "\n\t"] {
            assert_eq!(
                precondition(facade.generate_text(blank, 0.5).await.unwrap_err()),
                Precondition::BlankPrompt
            );
            assert_eq!(
                precondition(facade.translate(blank, "French").await.unwrap_err()),
                Precondition::BlankTranslationText
            );
            assert_eq!(
                precondition(facade.translate("Hello", blank).await.unwrap_err()),
                Precondition::BlankTargetLanguage
            );
            let mut transcript = Transcript::new();
            assert_eq!(
                precondition(facade.chat(blank, &mut transcript).await.unwrap_err()),
                Precondition::BlankMessage
            );
            assert!(transcript.is_empty());
            assert_eq!(
                precondition(facade.answer_document_question(blank).await.unwrap_err()),
                Precondition::BlankQuestion
            );
        }

        assert_eq!(
            precondition(facade.describe_image(None, Some("What?")).await.unwrap_err()),
            Precondition::MissingImage
        );
        assert_eq!(connector.call_count(), setup_calls);
    }

    #[tokio::test]
    async fn test_generate_text_returns_reply_verbatim() {
        let (facade, connector) = ready_assistant().await;
        connector.reply("hi there");

        let reply = facade.generate_text("Say hi", 0.5).await.unwrap();
        assert_eq!(reply, "hi there");

        let request = connector.last_request().unwrap();
        assert_eq!(request.prompt, "Say hi");
        let options = request.options.unwrap();
        assert_eq!(options.temperature, Some(0.5));
        assert_eq!(options.max_output_tokens, Some(2048));
    }

    #[tokio::test]
    async fn test_temperature_out_of_range() {
        let (facade, connector) = ready_assistant().await;
        for temperature in [-0.1, 1.5, f32::NAN] {
            let err = facade.generate_text("Say hi", temperature).await.unwrap_err();
            assert!(matches!(
                precondition(err),
                Precondition::TemperatureOutOfRange(_)
            ));
        }
        assert_eq!(connector.call_count(), 1);
    }

    #[tokio::test]
    async fn test_remote_failure_is_reported() {
        let (facade, connector) = ready_assistant().await;
        connector.fail("quota exceeded");

        let err = facade.translate("Hello", "German").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(
            render::failure(Operation::Translation, &err),
            "❌ Error translating text: Backend error: quota exceeded"
        );

        assert_eq!(
            connector.last_request().unwrap().prompt,
            "Translate the following text to German. Only provide the translation:\n\nHello"
        );
    }

    #[tokio::test]
    async fn test_describe_image_uses_vision_handle_and_default_prompt() {
        let (facade, connector) = ready_assistant().await;
        connector.reply("A red pixel");

        let image = ImageHandle::decoded(vec![255, 0, 0, 255], 1, 1);
        let reply = facade.describe_image(Some(&image), Some("  ")).await.unwrap();
        assert_eq!(reply, "A red pixel");

        let request = connector.last_request().unwrap();
        assert_eq!(request.prompt, "Describe this image in detail");
        assert_eq!(request.image.unwrap().mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_describe_image_with_unreadable_path() {
        let (facade, connector) = ready_assistant().await;
        let image = ImageHandle::path("/nonexistent/cat.jpg");
        let err = facade
            .describe_image(Some(&image), Some("What animal?"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(connector.call_count(), 1);
    }

    #[tokio::test]
    async fn test_chat_appends_both_turns_and_keeps_prefix() {
        let (facade, connector) = ready_assistant().await;
        connector.reply("Paris");

        let mut transcript = Transcript::new();
        transcript.push_user("Hi");
        transcript.push_assistant("Hello! How can I help?");
        let before = transcript.clone();

        let status = facade
            .chat("Capital of France?", &mut transcript)
            .await
            .unwrap();
        assert!(status.is_replied());
        assert_eq!(status.input_after(), "");

        assert_eq!(transcript.len(), before.len() + 2);
        assert_eq!(&transcript.turns()[..before.len()], before.turns());
        assert_eq!(transcript.turns()[2].role, Role::User);
        assert_eq!(transcript.turns()[2].content, "Capital of France?");
        assert_eq!(transcript.last().unwrap().content, "Paris");

        assert_eq!(
            connector.last_request().unwrap().prompt,
            "User: Hi\n\nAssistant: Hello! How can I help?\n\nUser: Capital of France?\nAssistant:"
        );
    }

    #[tokio::test]
    async fn test_chat_failure_still_appends_two_turns() {
        let (facade, connector) = ready_assistant().await;
        connector.fail("network unreachable");

        let mut transcript: Transcript = vec![crate::transcript::ConversationTurn::user("earlier")].into();
        let status = facade.chat("Hello?", &mut transcript).await.unwrap();

        assert!(matches!(status, ChatStatus::Failed(_)));
        assert_eq!(status.input_after(), "");
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.turns()[0].content, "earlier");
        assert_eq!(transcript.turns()[1].content, "Hello?");

        let last = transcript.last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "❌ Error: Backend error: network unreachable");
    }

    #[tokio::test]
    async fn test_chat_without_credential_leaves_transcript_untouched() {
        let (facade, connector) = assistant();
        let mut transcript: Transcript = vec![
            crate::transcript::ConversationTurn::user("earlier"),
            crate::transcript::ConversationTurn::assistant("Hi there"),
        ]
        .into();
        let before = transcript.clone();

        let err = facade.chat("Hello?", &mut transcript).await.unwrap_err();

        assert_eq!(precondition(err), Precondition::MissingCredential);
        assert_eq!(transcript, before);
        assert_eq!(connector.call_count(), 0);
    }

    #[tokio::test]
    async fn test_converse_uses_owned_history() {
        let (mut facade, connector) = ready_assistant().await;
        connector.reply("one").reply("two");

        facade.converse("first").await.unwrap();
        facade.converse("second").await.unwrap();
        assert_eq!(facade.history().len(), 4);
        assert_eq!(facade.history().last().unwrap().content, "two");

        facade.clear_history();
        assert!(facade.history().is_empty());
    }

    #[tokio::test]
    async fn test_extract_skips_empty_pages() {
        let (mut facade, _) = assistant();
        let result = facade.extract_from_pages(&Pages(vec!["page one", "", "page three"]));

        assert_eq!(render::extraction_status(&result), render::DOCUMENT_LOADED);
        assert_eq!(facade.document_text(), "page one\npage three");
    }

    #[tokio::test]
    async fn test_extract_replaces_previous_document() {
        let (mut facade, _) = assistant();
        facade.extract_from_pages(&Pages(vec!["old"])).unwrap();
        facade.extract_from_pages(&Pages(vec!["new"])).unwrap();
        assert_eq!(facade.document_text(), "new");
    }

    #[tokio::test]
    async fn test_extract_document_preconditions() {
        let (mut facade, _) = assistant();
        facade.extract_from_pages(&Pages(vec!["kept"])).unwrap();

        let err = facade.extract_document_text(None).await.unwrap_err();
        assert_eq!(precondition(err), Precondition::MissingDocument);

        let image = DocumentHandle::path("diagram.png");
        let err = facade.extract_document_text(Some(&image)).await.unwrap_err();
        assert!(matches!(
            precondition(err),
            Precondition::UnsupportedDocument(_)
        ));

        let garbage = DocumentHandle::bytes("broken.pdf", b"%PDF-garbage".to_vec());
        let err = facade.extract_document_text(Some(&garbage)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote);

        assert_eq!(facade.document_text(), "kept");
    }

    #[tokio::test]
    async fn test_extract_document_from_file() {
        let (mut facade, _) = assistant();
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(&sample_pdf(&["Photosynthesis"])).unwrap();

        facade
            .extract_document_text(Some(&DocumentHandle::path(file.path())))
            .await
            .unwrap();
        assert!(facade.document_text().contains("Photosynthesis"));
    }

    #[tokio::test]
    async fn test_question_requires_document_first() {
        let (facade, connector) = ready_assistant().await;
        for question in ["What is this about?", "", "   "] {
            let err = facade.answer_document_question(question).await.unwrap_err();
            assert_eq!(precondition(err), Precondition::NoDocumentLoaded);
        }
        assert_eq!(connector.call_count(), 1);
    }

    #[tokio::test]
    async fn test_question_inlines_whole_document() {
        let (mut facade, connector) = ready_assistant().await;
        facade
            .extract_from_pages(&Pages(vec!["Mitochondria make ATP.", "Ribosomes make proteins."]))
            .unwrap();
        connector.reply("ATP");

        let answer = facade
            .answer_document_question("What do mitochondria make?")
            .await
            .unwrap();
        assert_eq!(answer, "ATP");
        assert_eq!(
            connector.last_request().unwrap().prompt,
            "Answer the question based on the following PDF content:\n\
             Mitochondria make ATP.\nRibosomes make proteins.\n\n\
             Question: What do mitochondria make?\nAnswer:"
        );
    }
}
