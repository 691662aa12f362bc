//! Fenced code block extraction and restoration.
//!
//! Fenced code is lifted out of the document before any other rule runs and
//! replaced by a placeholder token of the form `[[[CODE_BLOCK_<n>]]]`. After
//! block assembly the tokens are swapped for escaped `<pre><code>` elements,
//! so no inline or block rule ever sees the code text.
//!
//! An opening fence without a closing fence is left in the document as plain
//! text.
//!
//! Tokens that already appear in the source outside any fence are parked as
//! inert markers during extraction and written back literally by [`restore`],
//! so each fenced span is restored exactly once.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::escape::{escape_attr, escape_html};

/// Fence marker opening and closing a code block.
pub const FENCE: &str = "```";

/// Non-greedy fenced span, allowed to cross line breaks.
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)```(.*?)```").unwrap());

/// Placeholder token left in the text in place of a fenced span.
pub(crate) static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[\[CODE_BLOCK_(\d+)\]\]\]").unwrap());

/// Source text that happened to look like a placeholder, parked between two
/// private-use characters while the document is processed.
static INERT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x{E000}(\d+)\x{E001}").unwrap());

/// Info string accepted as a language tag on the opening fence line.
static LANGUAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_+#.-]+$").unwrap());

/// One fenced code block lifted out of the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeSpan {
    /// Zero-based position of this block in the document.
    pub index: usize,
    /// Language tag from the opening fence line (e.g. `rust`).
    pub language: Option<String>,
    /// Raw code between the fences, without the language line.
    pub source: String,
}

impl CodeSpan {
    /// Build a span from the text between a pair of fences.
    fn from_inner(index: usize, inner: &str) -> Self {
        let (language, source) = match inner.split_once('\n') {
            Some((info, rest)) => match parse_fence_info(info) {
                Some(language) => (Some(language), rest),
                None => (None, inner),
            },
            None => (None, inner),
        };
        Self {
            index,
            language,
            source: source.to_owned(),
        }
    }

    /// Placeholder token standing in for this span.
    #[must_use]
    pub fn placeholder(&self) -> String {
        placeholder(self.index)
    }

    /// Render the span as a `<pre><code>` element.
    #[must_use]
    pub fn to_html(&self) -> String {
        let code = escape_html(trim_blank_lines(&self.source));
        match &self.language {
            Some(language) => format!(
                r#"<pre><code class="language-{}">{code}</code></pre>"#,
                escape_attr(language)
            ),
            None => format!("<pre><code>{code}</code></pre>"),
        }
    }
}

/// Output of [`extract`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Extracted {
    /// Document text with every fenced span replaced by its placeholder.
    pub text: String,
    /// Fenced spans in document order.
    pub spans: Vec<CodeSpan>,
    /// 1-indexed line of a fence marker that was never closed.
    pub unterminated_line: Option<usize>,
}

/// Format the placeholder token for the span at `index`.
#[must_use]
pub fn placeholder(index: usize) -> String {
    format!("[[[CODE_BLOCK_{index}]]]")
}

/// Check whether `s` is exactly one placeholder token.
#[must_use]
pub fn is_placeholder(s: &str) -> bool {
    PLACEHOLDER_RE
        .find(s)
        .is_some_and(|m| m.start() == 0 && m.end() == s.len())
}

/// Replace fenced code spans with placeholder tokens.
#[must_use]
pub fn extract(text: &str) -> Extracted {
    let mut spans = Vec::new();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in FENCE_RE.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let span = CodeSpan::from_inner(spans.len(), inner.as_str());
        out.push_str(&make_inert(&text[last..whole.start()]));
        out.push_str(&span.placeholder());
        spans.push(span);
        last = whole.end();
    }
    out.push_str(&make_inert(&text[last..]));

    let unterminated_line = text[last..]
        .find(FENCE)
        .map(|offset| line_number(text, last + offset));

    Extracted {
        text: out,
        spans,
        unterminated_line,
    }
}

/// Replace placeholder tokens with rendered code blocks.
///
/// Tokens whose index has no matching span are left untouched. Tokens parked
/// by [`extract`] come back as the literal text they were in the source.
#[must_use]
pub fn restore(html: &str, spans: &[CodeSpan]) -> String {
    let restored = if spans.is_empty() {
        Cow::Borrowed(html)
    } else {
        PLACEHOLDER_RE.replace_all(html, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| spans.get(index))
                .map_or_else(|| caps[0].to_owned(), CodeSpan::to_html)
        })
    };

    INERT_RE
        .replace_all(&restored, |caps: &Captures| {
            format!("[[[CODE_BLOCK_{}]]]", &caps[1])
        })
        .into_owned()
}

/// Park placeholder-shaped source text so no later stage treats it as a token.
fn make_inert(segment: &str) -> Cow<'_, str> {
    PLACEHOLDER_RE.replace_all(segment, "\u{E000}${1}\u{E001}")
}

/// Parse a fence info line into a language tag.
///
/// Only a single word qualifies; anything else is treated as the first line
/// of code.
fn parse_fence_info(info: &str) -> Option<String> {
    let info = info.trim();
    LANGUAGE_RE.is_match(info).then(|| info.to_owned())
}

/// Drop blank lines at the start and end of a code block.
fn trim_blank_lines(code: &str) -> &str {
    let mut start = 0;
    for line in code.split_inclusive('\n') {
        if !line.trim().is_empty() {
            break;
        }
        start += line.len();
    }

    let rest = &code[start..];
    let mut end = rest.len();
    while let Some(pos) = rest[..end].rfind('\n') {
        if !rest[pos + 1..end].trim().is_empty() {
            break;
        }
        end = pos;
    }
    if rest[..end].trim().is_empty() {
        return "";
    }
    &rest[..end]
}

fn line_number(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}
