//! Markdown-to-HTML content transformer for CMS publishing.
//!
//! Converts the constrained markdown produced by the content generator into
//! HTML and applies the publish-time fixes every post needs.
//!
//! # Architecture
//!
//! Conversion runs as a fixed pipeline over in-memory strings:
//! - [`vault`]: lifts fenced code into placeholders and restores it, escaped
//! - [`inline`]: ordered substitution passes (images, headings, emphasis,
//!   links, inline code)
//! - [`block`]: line state machine for paragraphs and lists
//! - [`converter`]: wires the stages together
//!
//! Rendered HTML then goes through [`post`] (hero image, internal link), or
//! through [`Publisher`], which also validates length and derives alt text.
//!
//! Everything here is synchronous and side-effect free; compiled patterns are
//! shared read-only, so conversions can run on any number of threads.
//!
//! # Example
//!
//! ```
//! use press_render::{convert, post_process};
//!
//! let html = convert("Intro paragraph.\n\n## Details\n\n- one\n- two");
//! let html = post_process(
//!     &html,
//!     "https://cdn.example/hero.jpg",
//!     "Hero",
//!     "https://shop.example",
//!     "Shop",
//! );
//! assert!(html.contains("<figure><img"));
//! assert!(html.contains(r#"<a href="https://shop.example/""#));
//! ```

pub mod block;
pub mod converter;
mod escape;
pub mod inline;
pub mod post;
mod publish;
pub mod vault;

pub use block::{BlockAssembler, ListContext};
pub use converter::{ConvertResult, convert, convert_document};
pub use escape::{escape_attr, escape_html};
pub use post::{
    DEFAULT_FALLBACK_LABEL, ensure_internal_link, inject_hero_image, normalize_site_base,
    post_process,
};
pub use publish::{
    DEFAULT_MIN_HTML_LENGTH, MAX_ALT_TEXT_CHARS, PostDraft, PrepareError, PreparedPost,
    PublishSettings, Publisher, hero_alt_text,
};
pub use vault::{CodeSpan, Extracted};
