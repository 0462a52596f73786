use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::message::{ImageMediaType, Message, UserContent};
use rig::completion::Prompt;
use rig::providers::openai;
use rig::OneOrMany;
use std::time::Duration;

use crate::domain::{ports::LlmService, DomainError, ImageFormat, ImageInput};
use crate::infrastructure::config::LlmConfig;

/// Chat models that accept image content.
const VISION_MODELS: [&str; 3] = ["gpt-4o", "gpt-4-turbo", "gpt-4-vision-preview"];

/// Keeps `model` for image prompts when it can see images, else `fallback`.
fn vision_model_for<'a>(model: &'a str, fallback: &'a str) -> &'a str {
    if VISION_MODELS.contains(&model) {
        model
    } else {
        fallback
    }
}

fn media_type(format: ImageFormat) -> ImageMediaType {
    match format {
        ImageFormat::Jpeg => ImageMediaType::JPEG,
        ImageFormat::Png => ImageMediaType::PNG,
    }
}

pub struct OpenAiLlm {
    client: openai::Client,
    model: String,
    vision_model: String,
    temperature: f64,
    max_tokens: u64,
    timeout: Duration,
}

impl OpenAiLlm {
    pub fn from_config(config: &LlmConfig) -> Result<Self, DomainError> {
        let key_set = std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty());
        if !key_set {
            return Err(DomainError::validation(
                "OPENAI_API_KEY environment variable not set",
            ));
        }

        Ok(Self {
            client: openai::Client::from_env(),
            model: config.model.clone(),
            vision_model: config.vision_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_seconds),
        })
    }

    async fn run<P>(
        &self,
        model: &str,
        system: Option<&str>,
        prompt: P,
    ) -> Result<String, DomainError>
    where
        P: Into<Message> + Send,
    {
        let mut builder = self
            .client
            .agent(model)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);
        if let Some(system) = system {
            builder = builder.preamble(system);
        }
        let agent = builder.build();

        tokio::time::timeout(self.timeout, agent.prompt(prompt))
            .await
            .map_err(|_| DomainError::external("LLM request timed out"))?
            .map_err(|e| DomainError::external(format!("LLM request failed: {e}")))
    }
}

#[async_trait]
impl LlmService for OpenAiLlm {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.run(&self.model, None, prompt).await
    }

    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        self.run(&self.model, Some(system), prompt).await
    }

    async fn complete_with_image(
        &self,
        system: &str,
        prompt: &str,
        image: &ImageInput,
    ) -> Result<String, DomainError> {
        let model = vision_model_for(&self.model, &self.vision_model);
        tracing::debug!(
            model,
            format = image.format.mime_type(),
            bytes = image.data.len(),
            "image prompt"
        );

        let mut content = OneOrMany::one(UserContent::text(prompt));
        content.push(UserContent::image_base64(
            image.to_base64(),
            Some(media_type(image.format)),
            None,
        ));

        self.run(model, Some(system), Message::User { content }).await
    }
}
