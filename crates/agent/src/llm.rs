//! The two language-model capabilities a turn uses: plain text completion
//! on the text model, and text + image completion on the vision model.

use std::sync::Arc;

use lumen_core::error::ProviderError;
use lumen_core::provider::{ChatMessage, ImageAttachment, Provider, ProviderRequest};
use tracing::debug;

/// Text and vision completion over configured providers.
pub struct LlmClient {
    text: Arc<dyn Provider>,
    text_model: String,
    vision: Arc<dyn Provider>,
    vision_model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl LlmClient {
    /// Both capabilities served by the same provider.
    pub fn new(
        provider: Arc<dyn Provider>,
        text_model: impl Into<String>,
        vision_model: impl Into<String>,
    ) -> Self {
        Self {
            text: provider.clone(),
            text_model: text_model.into(),
            vision: provider,
            vision_model: vision_model.into(),
            temperature: 0.0,
            max_tokens: None,
        }
    }

    /// Serve vision completions from a different provider.
    pub fn with_vision_provider(mut self, vision: Arc<dyn Provider>) -> Self {
        self.vision = vision;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn text_model(&self) -> &str {
        &self.text_model
    }

    pub fn vision_model(&self) -> &str {
        &self.vision_model
    }

    /// Complete a single-message prompt on the text model.
    pub async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let mut request = ProviderRequest::prompt(&self.text_model, prompt);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;

        debug!(provider = self.text.name(), model = %self.text_model, "Text completion");
        let response = self.text.complete(request).await?;
        Ok(response.content)
    }

    /// Complete a prompt with one image attached, on the vision model.
    pub async fn complete_with_image(
        &self,
        prompt: &str,
        image: ImageAttachment,
    ) -> Result<String, ProviderError> {
        let request = ProviderRequest {
            model: self.vision_model.clone(),
            messages: vec![ChatMessage::user(prompt).with_image(image)],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stop: Vec::new(),
        };

        debug!(provider = self.vision.name(), model = %self.vision_model, "Vision completion");
        let response = self.vision.complete(request).await?;
        Ok(response.content)
    }
}
