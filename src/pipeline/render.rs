//! pdfium implementation of [`PdfBackend`].
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and must not run on Tokio worker threads. Every method here blocks;
//! the orchestrator calls them through `tokio::task::spawn_blocking`.
//!
//! Pages are rendered and encoded one at a time so only a single bitmap is
//! alive at once. A 300-DPI letter page is roughly 33 MB of RGBA.

use crate::config::AnalyzerConfig;
use crate::error::AnalysisError;
use crate::pipeline::document::{PageImage, PdfBackend};
use crate::pipeline::encode;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Points per inch in PDF user space.
const PDF_POINTS_PER_INCH: f32 = 72.0;

/// pdfium accepts a `%PDF` header anywhere in the first 1024 bytes.
const PDF_HEADER_WINDOW: usize = 1024;

/// PDF engine backed by pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumBackend {
    lib_path: Option<PathBuf>,
    max_rendered_pixels: Option<u32>,
}

impl PdfiumBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend using the library path and pixel cap from `config`.
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            lib_path: config.pdfium_lib_path.clone(),
            max_rendered_pixels: Some(config.max_rendered_pixels),
        }
    }

    /// Load pdfium from an explicit shared-library path.
    pub fn with_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.lib_path = Some(path.into());
        self
    }

    /// Cap the longest rendered edge in pixels.
    pub fn with_max_rendered_pixels(mut self, px: u32) -> Self {
        self.max_rendered_pixels = Some(px);
        self
    }

    /// Check that pdfium can be loaded at all; used at server start-up.
    pub fn probe(&self) -> Result<(), AnalysisError> {
        bind_pdfium(self.lib_path.as_deref()).map(|_| ())
    }

    fn render_config(&self, dpi: u32) -> PdfRenderConfig {
        let config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / PDF_POINTS_PER_INCH);
        match self.max_rendered_pixels {
            Some(px) => config
                .set_maximum_width(px as i32)
                .set_maximum_height(px as i32),
            None => config,
        }
    }
}

impl PdfBackend for PdfiumBackend {
    fn extract_text(&self, pdf: &[u8]) -> Result<Vec<String>, AnalysisError> {
        check_pdf_magic(pdf)?;
        let pdfium = bind_pdfium(self.lib_path.as_deref())?;
        let document = load_document(&pdfium, pdf)?;
        let pages = document.pages();
        info!("PDF loaded: {} pages", pages.len());

        let mut texts = Vec::with_capacity(pages.len() as usize);
        for (idx, page) in pages.iter().enumerate() {
            let text = page
                .text()
                .map_err(|e| AnalysisError::DocumentParse {
                    detail: format!("text extraction failed on page {}: {:?}", idx + 1, e),
                })?
                .all();
            debug!("Page {}: {} chars of text", idx + 1, text.chars().count());
            texts.push(text);
        }
        Ok(texts)
    }

    fn rasterize(&self, pdf: &[u8], dpi: u32) -> Result<Vec<PageImage>, AnalysisError> {
        check_pdf_magic(pdf)?;
        let pdfium = bind_pdfium(self.lib_path.as_deref())?;
        let document = load_document(&pdfium, pdf)?;
        let render_config = self.render_config(dpi);

        let pages = document.pages();
        let mut images = Vec::with_capacity(pages.len() as usize);
        for (idx, page) in pages.iter().enumerate() {
            let page_num = idx + 1;
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                AnalysisError::Rasterisation {
                    page: page_num,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                page_num,
                image.width(),
                image.height()
            );

            let encoded = encode::encode_page(page_num, &image).map_err(|e| {
                AnalysisError::Encoding {
                    page: page_num,
                    detail: e.to_string(),
                }
            })?;
            images.push(encoded);
        }
        Ok(images)
    }
}

/// Bind to pdfium: explicit path first, then the working directory, then the
/// system library path.
fn bind_pdfium(lib_path: Option<&Path>) -> Result<Pdfium, AnalysisError> {
    let bindings = match lib_path {
        Some(path) => Pdfium::bind_to_library(path),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| AnalysisError::PdfiumBinding(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Reject non-PDF uploads before pdfium sees them.
pub(crate) fn check_pdf_magic(pdf: &[u8]) -> Result<(), AnalysisError> {
    let window = &pdf[..pdf.len().min(PDF_HEADER_WINDOW)];
    if window.windows(4).any(|w| w == b"%PDF") {
        return Ok(());
    }
    let head = &pdf[..pdf.len().min(4)];
    Err(AnalysisError::DocumentParse {
        detail: format!("not a PDF file (first bytes: {:?})", head),
    })
}

fn load_document<'a>(pdfium: &'a Pdfium, pdf: &'a [u8]) -> Result<PdfDocument<'a>, AnalysisError> {
    pdfium
        .load_pdf_from_byte_slice(pdf, None)
        .map_err(|e| AnalysisError::DocumentParse {
            detail: format!("{:?}", e),
        })
}
