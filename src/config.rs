//! Configuration types for contract analysis.
//!
//! All pipeline behaviour is controlled through [`AnalyzerConfig`], built via
//! its [`AnalyzerConfigBuilder`]. The server builds one at start-up and shares
//! it read-only across requests.

use crate::error::AnalysisError;
use std::path::PathBuf;

/// Configuration for the contract-analysis pipeline.
///
/// # Example
/// ```rust
/// use contract_analyzer::AnalyzerConfig;
///
/// let config = AnalyzerConfig::builder()
///     .dpi(200)
///     .model("gpt-4o-mini")
///     .transcription_concurrency(4)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 200);
/// ```
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Rendering DPI for scanned pages. Range: 72–600. Default: 300.
    pub dpi: u32,

    /// Maximum rendered image dimension in pixels. Default: 5000.
    ///
    /// A 300-DPI letter page is 2550 × 3300 px and passes untouched; the cap
    /// only bites on oversized sheets (plans, posters) that would otherwise
    /// allocate hundreds of megabytes.
    pub max_rendered_pixels: u32,

    /// Minimum trimmed characters every page must yield for the document to
    /// count as digital. Default: 30.
    pub text_threshold: usize,

    /// Model identifier used for both transcription and summary. Default: "gpt-4o".
    pub model: String,

    /// Sampling temperature. `None` leaves the provider default.
    pub temperature: Option<f32>,

    /// Output-token cap for each page transcription. Default: 2048.
    pub transcription_max_tokens: usize,

    /// Output-token cap for the summary table. Default: 4096.
    pub summary_max_tokens: usize,

    /// How many page transcriptions may be in flight at once. Default: 1.
    ///
    /// Results are always joined in page order regardless of this value.
    pub transcription_concurrency: usize,

    /// Explicit path to the pdfium shared library. `None` tries the working
    /// directory and then the system library path.
    pub pdfium_lib_path: Option<PathBuf>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            max_rendered_pixels: 5000,
            text_threshold: 30,
            model: "gpt-4o".to_string(),
            temperature: None,
            transcription_max_tokens: 2048,
            summary_max_tokens: 4096,
            transcription_concurrency: 1,
            pdfium_lib_path: None,
        }
    }
}

impl AnalyzerConfig {
    /// Create a new builder for `AnalyzerConfig`.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalyzerConfig`].
#[derive(Debug)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn text_threshold(mut self, chars: usize) -> Self {
        self.config.text_threshold = chars;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn transcription_max_tokens(mut self, n: usize) -> Self {
        self.config.transcription_max_tokens = n;
        self
    }

    pub fn summary_max_tokens(mut self, n: usize) -> Self {
        self.config.summary_max_tokens = n;
        self
    }

    pub fn transcription_concurrency(mut self, n: usize) -> Self {
        self.config.transcription_concurrency = n.max(1);
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalyzerConfig, AnalysisError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "Model name must not be empty".into(),
            ));
        }
        if c.transcription_max_tokens == 0 || c.summary_max_tokens == 0 {
            return Err(AnalysisError::InvalidConfig(
                "Token budgets must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
