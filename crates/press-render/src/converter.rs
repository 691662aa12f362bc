//! Markdown to HTML conversion.
//!
//! Runs the stages in order:
//!
//! 1. normalize line endings to `\n`
//! 2. lift fenced code out into placeholders ([`vault::extract`])
//! 3. inline substitutions ([`inline::rewrite`])
//! 4. paragraphs and lists ([`block::assemble`])
//! 5. put the code back, escaped ([`vault::restore`])
//!
//! Conversion is a pure function of its input and never fails.

use std::borrow::Cow;

use crate::{block, inline, vault};

/// Result of converting one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConvertResult {
    /// Rendered HTML.
    pub html: String,
    /// Number of fenced code blocks found.
    pub code_blocks: usize,
    /// Problems found in the source that did not stop conversion.
    pub warnings: Vec<String>,
}

/// Convert markdown to HTML.
///
/// # Example
///
/// ```
/// let html = press_render::convert("# Hi\n\nSome **bold** text.");
/// assert_eq!(html, "<h1>Hi</h1>\n\n<p>Some <strong>bold</strong> text.</p>");
/// ```
#[must_use]
pub fn convert(markdown: &str) -> String {
    convert_document(markdown).html
}

/// Convert markdown to HTML, keeping conversion diagnostics.
#[must_use]
pub fn convert_document(markdown: &str) -> ConvertResult {
    let text = normalize_line_endings(markdown);
    let extracted = vault::extract(&text);

    let mut warnings = Vec::new();
    if let Some(line) = extracted.unterminated_line {
        tracing::warn!(line, "Unterminated code fence, rendering as text");
        warnings.push(format!(
            "line {line}: code fence is never closed and was rendered as text"
        ));
    }

    let rewritten = inline::rewrite(&extracted.text);
    let assembled = block::assemble(&rewritten);
    let html = vault::restore(&assembled, &extracted.spans);

    tracing::debug!(
        markdown_len = markdown.len(),
        html_len = html.len(),
        code_blocks = extracted.spans.len(),
        "Converted markdown"
    );

    ConvertResult {
        html,
        code_blocks: extracted.spans.len(),
        warnings,
    }
}

/// Rewrite `\r\n` and lone `\r` line terminators to `\n`.
fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}
