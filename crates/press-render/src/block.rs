//! Line-oriented block assembly.
//!
//! Walks the rewritten text one line at a time and wraps loose text in
//! paragraphs and list items. The only state is [`ListContext`]: which list
//! wrapper, if any, is currently open. Every transition goes through
//! [`BlockAssembler::enter`], which closes the open wrapper before opening a
//! different one, so lists never nest.

use std::sync::LazyLock;

use regex::Regex;

use crate::vault::is_placeholder;

/// Lines that already start with block-level HTML.
static BLOCK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<(?:h[1-6]|ul|ol|li|pre|img|blockquote|figure|p|table|hr)\b").unwrap()
});

static UNORDERED_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[*-]\s+(.+)").unwrap());

static ORDERED_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s+(.+)").unwrap());

/// Which list wrapper is open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListContext {
    /// No list is open.
    #[default]
    None,
    /// A `<ul>` is open.
    Unordered,
    /// An `<ol>` is open.
    Ordered,
}

impl ListContext {
    fn open_tag(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Unordered => Some("<ul>"),
            Self::Ordered => Some("<ol>"),
        }
    }

    fn close_tag(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Unordered => Some("</ul>"),
            Self::Ordered => Some("</ol>"),
        }
    }
}

/// Classification of one trimmed input line.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Placeholder,
    BlockHtml,
    UnorderedItem(&'a str),
    OrderedItem(&'a str),
    Text,
}

impl<'a> Line<'a> {
    fn classify(trimmed: &'a str) -> Self {
        if trimmed.is_empty() {
            return Self::Blank;
        }
        if is_placeholder(trimmed) {
            return Self::Placeholder;
        }
        if BLOCK_TAG_RE.is_match(trimmed) {
            return Self::BlockHtml;
        }
        if let Some(item) = UNORDERED_ITEM_RE.captures(trimmed).and_then(|c| c.get(1)) {
            return Self::UnorderedItem(item.as_str());
        }
        if let Some(item) = ORDERED_ITEM_RE.captures(trimmed).and_then(|c| c.get(1)) {
            return Self::OrderedItem(item.as_str());
        }
        Self::Text
    }
}

/// Single-pass paragraph and list builder.
#[derive(Debug, Default)]
pub struct BlockAssembler {
    context: ListContext,
    out: Vec<String>,
}

impl BlockAssembler {
    /// Create an assembler with no open list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently open list wrapper.
    #[must_use]
    pub fn context(&self) -> ListContext {
        self.context
    }

    /// Feed one input line.
    pub fn push_line(&mut self, line: &str) {
        let trimmed = line.trim();
        match Line::classify(trimmed) {
            Line::Blank => {
                self.enter(ListContext::None);
                self.out.push(String::new());
            }
            Line::Placeholder | Line::BlockHtml => {
                self.enter(ListContext::None);
                self.out.push(trimmed.to_owned());
            }
            Line::UnorderedItem(item) => {
                self.enter(ListContext::Unordered);
                self.out.push(format!("<li>{item}</li>"));
            }
            Line::OrderedItem(item) => {
                self.enter(ListContext::Ordered);
                self.out.push(format!("<li>{item}</li>"));
            }
            Line::Text => {
                self.enter(ListContext::None);
                self.out.push(format!("<p>{trimmed}</p>"));
            }
        }
    }

    /// Close any open list and join the emitted lines.
    #[must_use]
    pub fn finish(mut self) -> String {
        self.enter(ListContext::None);
        self.out.join("\n")
    }

    /// Move to `next`, closing the open wrapper first when it differs.
    fn enter(&mut self, next: ListContext) {
        if self.context == next {
            return;
        }
        if let Some(close) = self.context.close_tag() {
            self.out.push(close.to_owned());
        }
        if let Some(open) = next.open_tag() {
            self.out.push(open.to_owned());
        }
        self.context = next;
    }
}

/// Assemble paragraphs and lists from rewritten text.
#[must_use]
pub fn assemble(text: &str) -> String {
    let mut assembler = BlockAssembler::new();
    for line in text.split('\n') {
        assembler.push_line(line);
    }
    assembler.finish()
}
