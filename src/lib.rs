//! # contract-analyzer
//!
//! Turn a PDF contract into a fixed 20-row Markdown summary table using a
//! hosted language model, behind a single HTTP endpoint.
//!
//! ## Pipeline Overview
//!
//! ```text
//! POST /analizar/  (x-api-key, openai-key, multipart "file")
//!  │
//!  ├─ 1. Gate       license key → customer; upstream credential present
//!  ├─ 2. Inspect    per-page text via pdfium (spawn_blocking)
//!  ├─ 3. Classify   digital iff every page has ≥ 30 trimmed chars
//!  ├─ 4. Transcribe scanned only: 300-DPI PNG per page → vision model
//!  ├─ 5. Summarize  pages joined with "\n\n" → 20-row table prompt
//!  └─ 6. Respond    {"usuario": …, "resultado": <table verbatim>}
//! ```
//!
//! ## Library use
//!
//! ```rust,no_run
//! use contract_analyzer::{
//!     AnalyzerConfig, ContractAnalyzer, OpenAiModelFactory, PdfiumBackend, UpstreamCredential,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AnalyzerConfig::default();
//!     let analyzer = ContractAnalyzer::new(
//!         Arc::new(PdfiumBackend::from_config(&config)),
//!         Arc::new(OpenAiModelFactory::new(&config)),
//!         config,
//!     );
//!     let bytes = std::fs::read("contrato.pdf")?;
//!     let analysis = analyzer
//!         .analyze(bytes, &UpstreamCredential::new(std::env::var("OPENAI_API_KEY")?))
//!         .await?;
//!     println!("{}", analysis.table);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `contract-analyzer` server binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod license;
pub mod pipeline;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{ContractAnalysis, ContractAnalyzer};
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder};
pub use error::{AccessError, AnalysisError};
pub use license::{authorize, Authorized, LicenseRegistry, StaticLicenseRegistry, UpstreamCredential};
pub use pipeline::classify::{classify, join_pages, DocumentKind};
pub use pipeline::document::{PageImage, PdfBackend};
pub use pipeline::llm::{ChatModel, ModelFactory, ModelRequest, OpenAiModelFactory, ProviderChatModel};
pub use pipeline::render::PdfiumBackend;
pub use server::{router, AnalysisResponse, ApiError, AppState};
