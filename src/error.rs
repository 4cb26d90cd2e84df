//! Error types for the contract-analyzer library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`AnalysisError`] — the pipeline could not produce a summary table
//!   (unreadable PDF, rendering failure, upstream model error). Every variant
//!   is terminal for the request; nothing is retried and nothing partial is
//!   returned.
//!
//! * [`AccessError`] — the request never reached the pipeline because the
//!   license key or the upstream credential was rejected.
//!
//! The HTTP layer maps the first to 500 and the second to 403/401, so the two
//! must stay separate types.

use thiserror::Error;

/// All fatal errors raised while analysing a contract.
#[derive(Debug, Error)]
pub enum AnalysisError {
    // ── PDF errors ────────────────────────────────────────────────────────
    /// The uploaded bytes could not be opened as a PDF document.
    #[error("PDF could not be parsed: {detail}")]
    DocumentParse { detail: String },

    /// pdfium failed to render a page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    Rasterisation { page: usize, detail: String },

    /// A rendered page could not be PNG-encoded.
    #[error("Image encoding failed for page {page}: {detail}")]
    Encoding { page: usize, detail: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The upstream model provider rejected or failed a call.
    ///
    /// `page` is set for transcription calls and `None` for the summary call.
    #[error("{}", model_error_message(stage, *page, detail))]
    Model {
        stage: &'static str,
        page: Option<usize>,
        detail: String,
    },

    /// The model client could not be constructed from the caller's credential.
    #[error("LLM provider is not configured: {0}")]
    ProviderNotConfigured(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBinding(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a blocking task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

fn model_error_message(stage: &str, page: Option<usize>, detail: &str) -> String {
    match page {
        Some(page) => format!("LLM {stage} call failed on page {page}: {detail}"),
        None => format!("LLM {stage} call failed: {detail}"),
    }
}

/// Rejections produced by the access gate, before any document processing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The license key header is missing or not in the registry.
    #[error("Licencia no válida")]
    LicenseInvalid,

    /// The caller did not forward an upstream model-provider credential.
    #[error("Debes enviar tu clave de OpenAI en el header 'openai-key'")]
    CredentialMissing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_error_display_with_page() {
        let e = AnalysisError::Model {
            stage: "transcription",
            page: Some(3),
            detail: "quota exceeded".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("page 3"), "got: {msg}");
        assert!(msg.contains("quota exceeded"), "got: {msg}");
    }

    #[test]
    fn model_error_display_without_page() {
        let e = AnalysisError::Model {
            stage: "summary",
            page: None,
            detail: "invalid api key".into(),
        };
        assert_eq!(e.to_string(), "LLM summary call failed: invalid api key");
    }

    #[test]
    fn access_error_messages_are_the_wire_details() {
        assert_eq!(AccessError::LicenseInvalid.to_string(), "Licencia no válida");
        assert_eq!(
            AccessError::CredentialMissing.to_string(),
            "Debes enviar tu clave de OpenAI en el header 'openai-key'"
        );
    }

    #[test]
    fn rasterisation_display() {
        let e = AnalysisError::Rasterisation {
            page: 2,
            detail: "bitmap allocation failed".into(),
        };
        assert!(e.to_string().contains("page 2"));
    }
}
