//! The PDF engine seam.
//!
//! The pipeline needs exactly two things from a PDF engine: the plain text of
//! every page, and every page as an encoded image. [`PdfBackend`] names those
//! two operations so the orchestrator can be exercised without pdfium.

use crate::error::AnalysisError;

/// A rendered page ready to be sent inline to a multimodal model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// 1-indexed page number.
    pub page: usize,
    /// Base64-encoded image bytes (no data-URI prefix).
    pub data: String,
    /// MIME type of the decoded bytes, e.g. `image/png`.
    pub mime_type: String,
}

/// Blocking access to a PDF engine.
///
/// Both methods take the whole document as bytes and are called from
/// `tokio::task::spawn_blocking`; implementations may block freely.
pub trait PdfBackend: Send + Sync + 'static {
    /// Plain text of every page, in page order.
    fn extract_text(&self, pdf: &[u8]) -> Result<Vec<String>, AnalysisError>;

    /// Every page rendered at `dpi`, PNG-encoded and base64-wrapped, in page order.
    fn rasterize(&self, pdf: &[u8], dpi: u32) -> Result<Vec<PageImage>, AnalysisError>;
}
