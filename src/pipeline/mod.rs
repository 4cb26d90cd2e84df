//! Pipeline stages for contract analysis.
//!
//! Each submodule implements exactly one step, so each can be tested without
//! the others and the PDF engine or model provider can be swapped behind its
//! trait.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌── digital ──────────────────────────────┐
//! document ──┤                                         ├──▶ llm::summarize
//! (text)     └── scanned ──▶ render ──▶ encode ──▶ llm ┘
//!  classify                  (pdfium)  (base64)  (transcribe)
//! ```
//!
//! 1. [`document`] — the [`document::PdfBackend`] seam: page text and page images
//! 2. [`classify`] — all-or-nothing digital/scanned decision
//! 3. [`render`]   — pdfium implementation of the backend; blocking, so the
//!    orchestrator runs it in `spawn_blocking`
//! 4. [`encode`]   — PNG-encode and base64-wrap each rendered page
//! 5. [`llm`]      — the two model calls; the only stage with network I/O

pub mod classify;
pub mod document;
pub mod encode;
pub mod llm;
pub mod render;
