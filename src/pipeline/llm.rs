//! Model interaction: build the two kinds of requests and call the provider.
//!
//! This module is intentionally thin: prompt text lives in [`crate::prompts`],
//! and the provider itself sits behind [`ChatModel`] so the orchestrator can be
//! tested with a recording fake.
//!
//! ## Per-request clients
//!
//! The caller's upstream credential arrives with each request.
//! [`ModelFactory::connect`] builds a fresh client from it; there is no
//! process-wide client and no credential outlives its request.
//!
//! Calls are made exactly once. Provider errors are returned unchanged inside
//! [`AnalysisError::Model`].

use crate::config::AnalyzerConfig;
use crate::error::AnalysisError;
use crate::license::UpstreamCredential;
use crate::pipeline::document::PageImage;
use crate::prompts::{
    build_summary_prompt, SUMMARY_SYSTEM_PROMPT, TRANSCRIPTION_SYSTEM_PROMPT,
    TRANSCRIPTION_USER_PROMPT,
};
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, OpenAIProvider};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// One chat completion: a system message, a user message, and optionally one
/// inline image attached to the user message.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub system: String,
    pub user: String,
    pub image: Option<PageImage>,
    pub max_tokens: usize,
}

/// A chat-completion endpoint bound to one caller's credential.
pub trait ChatModel: Send + Sync {
    /// Send `request` and return the generated text verbatim.
    ///
    /// The error string is the provider's own message.
    fn complete<'a>(&'a self, request: &'a ModelRequest) -> BoxFuture<'a, Result<String, String>>;
}

/// Builds a [`ChatModel`] for one request from the caller's credential.
pub trait ModelFactory: Send + Sync {
    fn connect(&self, credential: &UpstreamCredential) -> Result<Arc<dyn ChatModel>, AnalysisError>;
}

// ── OpenAI-backed implementation ─────────────────────────────────────────

/// Creates OpenAI clients through `edgequake-llm`.
#[derive(Debug, Clone)]
pub struct OpenAiModelFactory {
    model: String,
    temperature: Option<f32>,
}

impl OpenAiModelFactory {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }
}

impl ModelFactory for OpenAiModelFactory {
    fn connect(&self, credential: &UpstreamCredential) -> Result<Arc<dyn ChatModel>, AnalysisError> {
        if credential.expose().trim().is_empty() {
            return Err(AnalysisError::ProviderNotConfigured(
                "empty OpenAI API key".into(),
            ));
        }
        let provider = OpenAIProvider::new(credential.expose()).with_model(&self.model);
        Ok(Arc::new(ProviderChatModel {
            provider: Arc::new(provider),
            temperature: self.temperature,
        }))
    }
}

/// Adapts any `edgequake-llm` provider to [`ChatModel`].
pub struct ProviderChatModel {
    provider: Arc<dyn LLMProvider>,
    temperature: Option<f32>,
}

impl ProviderChatModel {
    pub fn new(provider: Arc<dyn LLMProvider>, temperature: Option<f32>) -> Self {
        Self {
            provider,
            temperature,
        }
    }
}

impl ChatModel for ProviderChatModel {
    fn complete<'a>(&'a self, request: &'a ModelRequest) -> BoxFuture<'a, Result<String, String>> {
        Box::pin(async move {
            let messages = build_messages(request);
            let options = CompletionOptions {
                temperature: self.temperature,
                max_tokens: Some(request.max_tokens),
                ..Default::default()
            };
            let response = self
                .provider
                .chat(&messages, Some(&options))
                .await
                .map_err(|e| e.to_string())?;
            debug!(
                "{} input tokens, {} output tokens",
                response.prompt_tokens, response.completion_tokens
            );
            Ok(response.content)
        })
    }
}

/// Translate a [`ModelRequest`] into provider messages.
fn build_messages(request: &ModelRequest) -> Vec<ChatMessage> {
    let user = match &request.image {
        Some(image) => ChatMessage::user_with_images(
            request.user.as_str(),
            vec![ImageData::new(image.data.clone(), image.mime_type.as_str())],
        ),
        None => ChatMessage::user(request.user.as_str()),
    };
    vec![ChatMessage::system(request.system.as_str()), user]
}

// ── Pipeline calls ───────────────────────────────────────────────────────

/// The request sent for one scanned page.
pub fn transcription_request(image: PageImage, config: &AnalyzerConfig) -> ModelRequest {
    ModelRequest {
        system: TRANSCRIPTION_SYSTEM_PROMPT.to_string(),
        user: TRANSCRIPTION_USER_PROMPT.to_string(),
        image: Some(image),
        max_tokens: config.transcription_max_tokens,
    }
}

/// The request sent for the final table.
pub fn summary_request(full_text: &str, config: &AnalyzerConfig) -> ModelRequest {
    ModelRequest {
        system: SUMMARY_SYSTEM_PROMPT.to_string(),
        user: build_summary_prompt(full_text),
        image: None,
        max_tokens: config.summary_max_tokens,
    }
}

/// Transcribe one page image. Whatever the model returns becomes the page text.
pub async fn transcribe_page(
    model: &dyn ChatModel,
    image: PageImage,
    config: &AnalyzerConfig,
) -> Result<String, AnalysisError> {
    let page = image.page;
    let start = Instant::now();
    let request = transcription_request(image, config);

    match model.complete(&request).await {
        Ok(text) => {
            debug!(
                "Page {}: transcribed {} chars in {:?}",
                page,
                text.chars().count(),
                start.elapsed()
            );
            Ok(text)
        }
        Err(detail) => {
            warn!("Page {}: transcription failed — {}", page, detail);
            Err(AnalysisError::Model {
                stage: "transcription",
                page: Some(page),
                detail,
            })
        }
    }
}

/// Ask the model for the 20-row summary table. The reply is returned untouched.
pub async fn summarize(
    model: &dyn ChatModel,
    full_text: &str,
    config: &AnalyzerConfig,
) -> Result<String, AnalysisError> {
    let start = Instant::now();
    let request = summary_request(full_text, config);

    let table = model.complete(&request).await.map_err(|detail| {
        warn!("Summary failed — {}", detail);
        AnalysisError::Model {
            stage: "summary",
            page: None,
            detail,
        }
    })?;
    debug!("Summary: {} chars in {:?}", table.len(), start.elapsed());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Scripted {
        reply: Result<String, String>,
        seen: Mutex<Vec<ModelRequest>>,
    }

    impl ChatModel for Scripted {
        fn complete<'a>(&'a self, request: &'a ModelRequest) -> BoxFuture<'a, Result<String, String>> {
            self.seen.lock().unwrap().push(request.clone());
            let reply = self.reply.clone();
            Box::pin(async move { reply })
        }
    }

    fn scripted(reply: Result<&str, &str>) -> Scripted {
        Scripted {
            reply: reply.map(str::to_string).map_err(str::to_string),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn page(n: usize) -> PageImage {
        PageImage {
            page: n,
            data: "AAAA".into(),
            mime_type: "image/png".into(),
        }
    }

    #[test]
    fn transcription_request_carries_image_and_budget() {
        let req = transcription_request(page(2), &AnalyzerConfig::default());
        assert_eq!(req.system, TRANSCRIPTION_SYSTEM_PROMPT);
        assert_eq!(req.user, TRANSCRIPTION_USER_PROMPT);
        assert_eq!(req.image.as_ref().map(|i| i.page), Some(2));
        assert_eq!(req.max_tokens, 2048);
    }

    #[test]
    fn summary_request_has_no_image() {
        let req = summary_request("texto", &AnalyzerConfig::default());
        assert_eq!(req.system, SUMMARY_SYSTEM_PROMPT);
        assert!(req.image.is_none());
        assert_eq!(req.max_tokens, 4096);
        assert!(req.user.ends_with("texto"));
    }

    #[test]
    fn messages_are_system_then_user() {
        let req = summary_request("x", &AnalyzerConfig::default());
        assert_eq!(build_messages(&req).len(), 2);
        let req = transcription_request(page(1), &AnalyzerConfig::default());
        assert_eq!(build_messages(&req).len(), 2);
    }

    #[tokio::test]
    async fn transcribe_returns_reply_verbatim() {
        let model = scripted(Ok("  PARTES: ...\n"));
        let text = transcribe_page(&model, page(1), &AnalyzerConfig::default())
            .await
            .unwrap();
        assert_eq!(text, "  PARTES: ...\n");
        assert_eq!(model.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn transcribe_error_names_page() {
        let model = scripted(Err("rate limited"));
        let err = transcribe_page(&model, page(7), &AnalyzerConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Model { stage: "transcription", page: Some(7), .. }
        ));
    }

    #[tokio::test]
    async fn summarize_is_called_once_and_not_retried() {
        let model = scripted(Err("invalid api key"));
        let err = summarize(&model, "texto", &AnalyzerConfig::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid api key"));
        assert_eq!(model.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn factory_rejects_empty_key() {
        let factory = OpenAiModelFactory::new(&AnalyzerConfig::default());
        let err = factory.connect(&UpstreamCredential::new("")).err().unwrap();
        assert!(matches!(err, AnalysisError::ProviderNotConfigured(_)));
    }
}
