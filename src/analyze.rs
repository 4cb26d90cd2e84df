//! The contract-analysis pipeline.
//!
//! ```text
//! bytes ─▶ extract text ─▶ classify ─┬─ digital ─────────────────────────┬─▶ join ─▶ summarize
//!                                    └─ scanned ─▶ rasterize ─▶ transcribe┘
//! ```
//!
//! Every stage depends on the previous one's output, so they run strictly in
//! sequence. The first error ends the analysis; nothing partial is returned.

use crate::config::AnalyzerConfig;
use crate::error::AnalysisError;
use crate::license::UpstreamCredential;
use crate::pipeline::classify::{classify, join_pages, DocumentKind};
use crate::pipeline::document::{PageImage, PdfBackend};
use crate::pipeline::llm::{self, ChatModel, ModelFactory};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Result of one successful analysis.
#[derive(Debug, Clone)]
pub struct ContractAnalysis {
    /// The summary table exactly as the model returned it.
    pub table: String,
    /// How the text was obtained.
    pub kind: DocumentKind,
    /// Number of pages in the document.
    pub page_count: usize,
}

/// Runs the pipeline against a PDF engine and a model factory.
///
/// Holds no per-request state and is shared across requests behind an `Arc`.
#[derive(Clone)]
pub struct ContractAnalyzer {
    pdf: Arc<dyn PdfBackend>,
    models: Arc<dyn ModelFactory>,
    config: AnalyzerConfig,
}

impl ContractAnalyzer {
    pub fn new(pdf: Arc<dyn PdfBackend>, models: Arc<dyn ModelFactory>, config: AnalyzerConfig) -> Self {
        Self { pdf, models, config }
    }

    /// Analyse one uploaded PDF on behalf of the holder of `credential`.
    pub async fn analyze(
        &self,
        pdf_bytes: Vec<u8>,
        credential: &UpstreamCredential,
    ) -> Result<ContractAnalysis, AnalysisError> {
        let total_start = Instant::now();
        let bytes: Arc<[u8]> = pdf_bytes.into();
        info!("Analysing {} byte upload", bytes.len());

        // ── Step 1: Extract text and classify ────────────────────────────
        let page_texts = self.extract_text(Arc::clone(&bytes)).await?;
        let page_count = page_texts.len();
        let kind = classify(&page_texts, self.config.text_threshold);
        info!("Document has {} pages, classified as {:?}", page_count, kind);

        // ── Step 2: Per-request model client ─────────────────────────────
        let model = self.models.connect(credential)?;

        // ── Step 3: Obtain page texts ────────────────────────────────────
        let page_texts = match kind {
            DocumentKind::Digital => page_texts,
            DocumentKind::Scanned => {
                let images = self.rasterize(bytes).await?;
                info!("Rendered {} pages at {} DPI", images.len(), self.config.dpi);
                transcribe_all(model.as_ref(), images, &self.config).await?
            }
        };

        // ── Step 4: Join and summarise ───────────────────────────────────
        let full_text = join_pages(&page_texts);
        let table = llm::summarize(model.as_ref(), &full_text, &self.config).await?;

        info!(
            "Analysis complete: {} pages ({:?}), {}ms",
            page_count,
            kind,
            total_start.elapsed().as_millis()
        );

        Ok(ContractAnalysis {
            table,
            kind,
            page_count,
        })
    }

    async fn extract_text(&self, bytes: Arc<[u8]>) -> Result<Vec<String>, AnalysisError> {
        let pdf = Arc::clone(&self.pdf);
        tokio::task::spawn_blocking(move || pdf.extract_text(&bytes))
            .await
            .map_err(|e| AnalysisError::Internal(format!("Text extraction task panicked: {}", e)))?
    }

    async fn rasterize(&self, bytes: Arc<[u8]>) -> Result<Vec<PageImage>, AnalysisError> {
        let pdf = Arc::clone(&self.pdf);
        let dpi = self.config.dpi;
        tokio::task::spawn_blocking(move || pdf.rasterize(&bytes, dpi))
            .await
            .map_err(|e| AnalysisError::Internal(format!("Render task panicked: {}", e)))?
    }
}

/// Transcribe every page, at most `transcription_concurrency` at a time.
///
/// `buffered` yields results in input order, so the output lines up with the
/// page order no matter which call finishes first. The first failure aborts
/// the remaining pages.
async fn transcribe_all(
    model: &dyn ChatModel,
    images: Vec<PageImage>,
    config: &AnalyzerConfig,
) -> Result<Vec<String>, AnalysisError> {
    stream::iter(images)
        .map(|image| llm::transcribe_page(model, image, config))
        .buffered(config.transcription_concurrency.max(1))
        .try_collect()
        .await
}
