use std::sync::Arc;
use tracing::instrument;

use crate::application::services::retriever::Retriever;
use crate::domain::{ports::LlmService, DomainError, ImageInput};
use crate::infrastructure::config::AppConfig;

const ANSWER_RULES: &str = "If the answer is not there, say so clearly and say \"I don't know\". \
Answer in the same language as the user's question.";

pub fn excerpts_prompt(context: &str, question: &str) -> String {
    format!(
        "Here are the relevant excerpts of a document found by semantic search:\n\n\
         {context}\n\n\
         Question: {question}\n\n\
         Answer the question using only the document excerpts provided above. {ANSWER_RULES}"
    )
}

pub fn full_document_prompt(document: &str, question: &str) -> String {
    format!(
        "Here is the content of a document:\n\n\
         {document}\n\n\
         Question: {question}\n\n\
         Answer the question using only the content of the document provided. {ANSWER_RULES}"
    )
}

pub fn image_prompt(question: &str) -> String {
    format!(
        "Question: {question}\n\n\
         Analyze the image provided and answer the question using only what is visible in \
         the image. {ANSWER_RULES}"
    )
}

/// Answers questions about a document or an image through an
/// [`LlmService`], grounding document prompts in retrieved excerpts when a
/// retriever has any.
///
/// `top_k` is taken as given; [`AppConfig::validate`] is where zero is
/// rejected. A zero `top_k` retrieves nothing, so the whole document is sent.
pub struct QuestionAnswerer {
    llm: Arc<dyn LlmService>,
    system_prompt: String,
    top_k: usize,
    use_retrieval: bool,
}

impl QuestionAnswerer {
    pub fn new(llm: Arc<dyn LlmService>, config: &AppConfig) -> Self {
        Self {
            llm,
            system_prompt: config.prompts.system.clone(),
            top_k: config.retrieval.top_k,
            use_retrieval: config.retrieval.enabled,
        }
    }

    pub fn with_defaults(llm: Arc<dyn LlmService>) -> Self {
        Self::new(llm, &AppConfig::default())
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_retrieval(mut self, enabled: bool) -> Self {
        self.use_retrieval = enabled;
        self
    }

    /// An empty prompt sends the question without a system message.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Falls back to the whole document when retrieval is off, no retriever
    /// is given, or retrieval finds nothing.
    pub async fn build_prompt(
        &self,
        question: &str,
        document: &str,
        retriever: Option<&Retriever>,
    ) -> Result<String, DomainError> {
        if let Some(retriever) = retriever.filter(|_| self.use_retrieval) {
            let context = retriever.get_context(question, self.top_k).await?;
            if !context.is_empty() {
                return Ok(excerpts_prompt(&context, question));
            }
            tracing::debug!("retrieval returned no context, sending full document");
        }
        Ok(full_document_prompt(document, question))
    }

    #[instrument(skip(self, document, retriever), fields(question_len = question.len()))]
    pub async fn ask(
        &self,
        question: &str,
        document: &str,
        retriever: Option<&Retriever>,
    ) -> Result<String, DomainError> {
        let prompt = self.build_prompt(question, document, retriever).await?;
        if self.system_prompt.is_empty() {
            self.llm.complete(&prompt).await
        } else {
            self.llm
                .complete_with_system(&self.system_prompt, &prompt)
                .await
        }
    }

    /// Answers from what is visible in `image`; no retrieval is involved.
    #[instrument(
        skip(self, image),
        fields(question_len = question.len(), format = image.format.mime_type())
    )]
    pub async fn ask_about_image(
        &self,
        question: &str,
        image: &ImageInput,
    ) -> Result<String, DomainError> {
        if image.data.is_empty() {
            return Err(DomainError::validation("image is empty"));
        }
        self.llm
            .complete_with_image(&self.system_prompt, &image_prompt(question), image)
            .await
    }
}
