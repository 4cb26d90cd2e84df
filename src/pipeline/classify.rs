//! Digital vs. scanned classification.
//!
//! The decision is all-or-nothing: one page below the threshold sends the
//! whole document through image transcription, even if every other page has
//! a perfect text layer.

/// How the document's text will be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Every page carries an extractable text layer.
    Digital,
    /// At least one page needs image transcription.
    Scanned,
}

/// Classify a document from its per-page extracted text.
///
/// A page passes when its trimmed text has at least `threshold` characters.
/// An empty page list is digital.
pub fn classify<S: AsRef<str>>(page_texts: &[S], threshold: usize) -> DocumentKind {
    let all_pass = page_texts
        .iter()
        .all(|text| text.as_ref().trim().chars().count() >= threshold);
    if all_pass {
        DocumentKind::Digital
    } else {
        DocumentKind::Scanned
    }
}

/// Join page texts in page order with a blank line between pages.
pub fn join_pages<S: AsRef<str>>(page_texts: &[S]) -> String {
    page_texts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n\n")
}
