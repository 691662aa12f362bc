//! Publish preparation: markdown draft in, CMS-ready HTML out.
//!
//! [`Publisher`] ties conversion and post-processing together the way a CMS
//! client needs them: derive the hero alt text, reject conversions that came
//! out suspiciously short, then inject the hero image and the internal link.
//! Drafts are independent, so [`Publisher::prepare_all`] fans them out over a
//! rayon thread pool.

use rayon::prelude::*;

use crate::converter::convert_document;
use crate::post::{DEFAULT_FALLBACK_LABEL, post_process};

/// Longest alt text sent to the CMS, in characters.
pub const MAX_ALT_TEXT_CHARS: usize = 125;

/// Default minimum length of converted HTML, in characters.
pub const DEFAULT_MIN_HTML_LENGTH: usize = 100;

/// Site-wide publishing settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishSettings {
    /// Site base URL for the internal link. `None` disables the link pass.
    pub site_base: Option<String>,
    /// Link label used when a draft has no keyphrase.
    pub fallback_label: String,
    /// Converted HTML shorter than this is rejected.
    pub min_html_length: usize,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            site_base: None,
            fallback_label: DEFAULT_FALLBACK_LABEL.to_owned(),
            min_html_length: DEFAULT_MIN_HTML_LENGTH,
        }
    }
}

/// A post as produced by the content generator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostDraft {
    /// Post title.
    pub title: String,
    /// Markdown body.
    pub markdown: String,
    /// SEO focus keyphrase.
    pub keyphrase: Option<String>,
    /// Hero image URL, if one was found.
    pub hero_image: Option<String>,
}

/// A post ready to hand to a CMS client.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PreparedPost {
    /// Final HTML body.
    pub html: String,
    /// Alt text used for the hero image.
    pub alt_text: String,
    /// Length of the markdown source in characters.
    pub markdown_length: usize,
    /// Length of the converted HTML before post-processing, in characters.
    pub html_length: usize,
    /// Number of fenced code blocks in the source.
    pub code_blocks: usize,
    /// Conversion warnings.
    pub warnings: Vec<String>,
}

/// Publish preparation error.
#[derive(Debug, thiserror::Error)]
pub enum PrepareError {
    /// Converted HTML is below the configured minimum.
    #[error("Converted HTML is too short: {length} chars (minimum {minimum})")]
    ContentTooShort {
        /// Trimmed HTML length in characters.
        length: usize,
        /// Configured minimum.
        minimum: usize,
    },
}

/// Prepares drafts for publishing with fixed site settings.
#[derive(Clone, Debug, Default)]
pub struct Publisher {
    settings: PublishSettings,
}

impl Publisher {
    /// Create a publisher with the given settings.
    #[must_use]
    pub fn new(settings: PublishSettings) -> Self {
        Self { settings }
    }

    /// Settings in use.
    #[must_use]
    pub fn settings(&self) -> &PublishSettings {
        &self.settings
    }

    /// Convert and post-process a single draft.
    ///
    /// # Errors
    ///
    /// Returns [`PrepareError::ContentTooShort`] when the converted HTML,
    /// trimmed, is shorter than `min_html_length`.
    pub fn prepare(&self, draft: &PostDraft) -> Result<PreparedPost, PrepareError> {
        let converted = convert_document(&draft.markdown);

        let html_length = converted.html.trim().chars().count();
        if html_length < self.settings.min_html_length {
            tracing::warn!(
                title = %draft.title,
                length = html_length,
                minimum = self.settings.min_html_length,
                "Converted HTML too short"
            );
            return Err(PrepareError::ContentTooShort {
                length: html_length,
                minimum: self.settings.min_html_length,
            });
        }

        let keyphrase = draft.keyphrase.as_deref().unwrap_or("");
        let alt_text = hero_alt_text(keyphrase, &draft.title);
        let label = match keyphrase.trim() {
            "" => self.settings.fallback_label.as_str(),
            keyphrase => keyphrase,
        };

        let html = post_process(
            &converted.html,
            draft.hero_image.as_deref().unwrap_or(""),
            &alt_text,
            self.settings.site_base.as_deref().unwrap_or(""),
            label,
        );

        tracing::info!(
            title = %draft.title,
            markdown_len = draft.markdown.chars().count(),
            html_len = html_length,
            "Prepared post"
        );

        Ok(PreparedPost {
            html,
            alt_text,
            markdown_length: draft.markdown.chars().count(),
            html_length,
            code_blocks: converted.code_blocks,
            warnings: converted.warnings,
        })
    }

    /// Prepare many drafts in parallel, keeping input order.
    pub fn prepare_all(&self, drafts: &[PostDraft]) -> Vec<Result<PreparedPost, PrepareError>> {
        drafts.par_iter().map(|draft| self.prepare(draft)).collect()
    }
}

/// Build hero image alt text from the keyphrase and title.
///
/// Produces `"{keyphrase} - {title}"` with surrounding spaces and dashes
/// removed, truncated to [`MAX_ALT_TEXT_CHARS`].
#[must_use]
pub fn hero_alt_text(keyphrase: &str, title: &str) -> String {
    let joined = format!("{} - {}", keyphrase.trim(), title.trim());
    joined
        .trim_matches(|c: char| c == ' ' || c == '-')
        .chars()
        .take(MAX_ALT_TEXT_CHARS)
        .collect()
}
