//! Ordered inline substitution passes.
//!
//! Each [`InlinePass`] is a single pattern substitution over the whole
//! document. The passes run in a fixed order and a later pass never sees the
//! markdown an earlier pass consumed:
//!
//! 1. images, so `![alt](url)` is never read as a link
//! 2. headings, `###` before `##` before `#`
//! 3. emphasis, `***` before `**` before `*`, then `__` before `_`
//! 4. links
//! 5. inline code
//!
//! A match is skipped when one of its boundaries, or one of its capture
//! group boundaries, falls inside a guarded span: a code block placeholder,
//! an HTML tag, an inline code span, or (for emphasis) a link destination.
//! Matches that fully enclose a guarded span are fine. This keeps
//! `[[[CODE_BLOCK_0]]]` and `https://host/a_b_c.png` intact under the
//! underscore rules and keeps emphasis out of inline code.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::escape::escape_html;
use crate::vault::PLACEHOLDER_RE;

static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").unwrap());

static H3_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*###[ \t]+(.+)$").unwrap());
static H2_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*##[ \t]+(.+)$").unwrap());
static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#[ \t]+(.+)$").unwrap());

// Openers must hug their content, so `* item` and `2 * 3 * 4` stay literal.
static STRONG_EM_STAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*\*(\S.*?)\*\*\*").unwrap());
static STRONG_STAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(\S.*?)\*\*").unwrap());
static EM_STAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(\S.*?)\*").unwrap());
static STRONG_UNDERSCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__(\S.*?)__").unwrap());
static EM_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_(\S.*?)_").unwrap());

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.+?)\]\((.+?)\)").unwrap());

static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\n]+)`").unwrap());

/// A real tag: a name, then only `name="value"` attributes, then `>` or `/>`.
/// Comparison text such as `a<b and b>a` never qualifies.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"</?[A-Za-z][A-Za-z0-9]*(?:\s+[A-Za-z_:][-A-Za-z0-9_:.]*\s*=\s*(?:"[^"\n]*"|'[^'\n]*'))*\s*/?>"#,
    )
    .unwrap()
});

static CODE_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`[^`\n]+`").unwrap());

static DESTINATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\]\([^()\s]*\)").unwrap());

/// Kind of span a pass must not cut through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Guard {
    Placeholder,
    Tag,
    CodeSpan,
    Destination,
}

impl Guard {
    fn regex(self) -> &'static Regex {
        match self {
            Self::Placeholder => &PLACEHOLDER_RE,
            Self::Tag => &TAG_RE,
            Self::CodeSpan => &CODE_SPAN_RE,
            Self::Destination => &DESTINATION_RE,
        }
    }
}

const STRUCTURAL: &[Guard] = &[Guard::Placeholder, Guard::Tag, Guard::CodeSpan];
const EMPHASIS: &[Guard] = &[
    Guard::Placeholder,
    Guard::Tag,
    Guard::CodeSpan,
    Guard::Destination,
];
const CODE: &[Guard] = &[Guard::Placeholder, Guard::Tag];

/// A single ordered substitution rule.
///
/// Precondition: the text holds no markdown for any pass that runs before
/// this one. Postcondition: every match of `pattern` that leaves the pass's
/// guarded spans whole has been replaced by `render`.
pub struct InlinePass {
    name: &'static str,
    pattern: &'static LazyLock<Regex>,
    guards: &'static [Guard],
    render: fn(&Captures<'_>) -> String,
}

impl InlinePass {
    /// Short identifier, e.g. `emphasis.strong`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Apply this pass to `text`.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        let guarded = guarded_spans(text, self.guards);
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut pos = 0;

        while pos <= text.len() {
            let Some(caps) = self.pattern.captures_at(text, pos) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            if whole.is_empty() || cuts_through(&guarded, &caps) {
                pos = next_char(text, whole.start());
                continue;
            }
            out.push_str(&text[last..whole.start()]);
            out.push_str(&(self.render)(&caps));
            last = whole.end();
            pos = whole.end();
        }

        out.push_str(&text[last..]);
        out
    }
}

static PASSES: [InlinePass; 11] = [
    InlinePass {
        name: "image",
        pattern: &IMAGE_RE,
        guards: STRUCTURAL,
        render: render_image,
    },
    InlinePass {
        name: "heading.h3",
        pattern: &H3_RE,
        guards: STRUCTURAL,
        render: render_h3,
    },
    InlinePass {
        name: "heading.h2",
        pattern: &H2_RE,
        guards: STRUCTURAL,
        render: render_h2,
    },
    InlinePass {
        name: "heading.h1",
        pattern: &H1_RE,
        guards: STRUCTURAL,
        render: render_h1,
    },
    InlinePass {
        name: "emphasis.strong_em",
        pattern: &STRONG_EM_STAR_RE,
        guards: EMPHASIS,
        render: render_strong_em,
    },
    InlinePass {
        name: "emphasis.strong",
        pattern: &STRONG_STAR_RE,
        guards: EMPHASIS,
        render: render_strong,
    },
    InlinePass {
        name: "emphasis.em",
        pattern: &EM_STAR_RE,
        guards: EMPHASIS,
        render: render_em,
    },
    InlinePass {
        name: "emphasis.strong_underscore",
        pattern: &STRONG_UNDERSCORE_RE,
        guards: EMPHASIS,
        render: render_strong,
    },
    InlinePass {
        name: "emphasis.em_underscore",
        pattern: &EM_UNDERSCORE_RE,
        guards: EMPHASIS,
        render: render_em,
    },
    InlinePass {
        name: "link",
        pattern: &LINK_RE,
        guards: STRUCTURAL,
        render: render_link,
    },
    InlinePass {
        name: "code",
        pattern: &CODE_RE,
        guards: CODE,
        render: render_code,
    },
];

/// All inline passes in application order.
#[must_use]
pub fn passes() -> &'static [InlinePass] {
    &PASSES
}

/// Run every inline pass over placeholder-protected text.
#[must_use]
pub fn rewrite(text: &str) -> String {
    PASSES
        .iter()
        .fold(text.to_owned(), |acc, pass| pass.apply(&acc))
}

fn render_image(caps: &Captures<'_>) -> String {
    format!(r#"<img src="{}" alt="{}" />"#, &caps[2], &caps[1])
}

fn render_heading(level: u8, caps: &Captures<'_>) -> String {
    format!("<h{level}>{}</h{level}>", caps[1].trim_end())
}

fn render_h1(caps: &Captures<'_>) -> String {
    render_heading(1, caps)
}

fn render_h2(caps: &Captures<'_>) -> String {
    render_heading(2, caps)
}

fn render_h3(caps: &Captures<'_>) -> String {
    render_heading(3, caps)
}

fn render_strong_em(caps: &Captures<'_>) -> String {
    format!("<strong><em>{}</em></strong>", &caps[1])
}

fn render_strong(caps: &Captures<'_>) -> String {
    format!("<strong>{}</strong>", &caps[1])
}

fn render_em(caps: &Captures<'_>) -> String {
    format!("<em>{}</em>", &caps[1])
}

fn render_link(caps: &Captures<'_>) -> String {
    format!(r#"<a href="{}">{}</a>"#, &caps[2], &caps[1])
}

fn render_code(caps: &Captures<'_>) -> String {
    format!("<code>{}</code>", escape_html(&caps[1]))
}

/// Collect guarded spans, sorted, with overlapping spans merged.
fn guarded_spans(text: &str, guards: &[Guard]) -> Vec<Range<usize>> {
    let mut spans: Vec<Range<usize>> = guards
        .iter()
        .flat_map(|guard| guard.regex().find_iter(text).map(|m| m.range()))
        .collect();
    spans.sort_by_key(|span| span.start);

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start < last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

/// Whether any group boundary of the match falls strictly inside a guarded span.
fn cuts_through(guarded: &[Range<usize>], caps: &Captures<'_>) -> bool {
    caps.iter()
        .flatten()
        .any(|m| strictly_inside(guarded, m.start()) || strictly_inside(guarded, m.end()))
}

fn strictly_inside(guarded: &[Range<usize>], offset: usize) -> bool {
    let idx = guarded.partition_point(|span| span.end <= offset);
    guarded
        .get(idx)
        .is_some_and(|span| span.start < offset && offset < span.end)
}

fn next_char(text: &str, offset: usize) -> usize {
    offset + text[offset..].chars().next().map_or(1, char::len_utf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass(name: &str) -> &'static InlinePass {
        passes()
            .iter()
            .find(|p| p.name() == name)
            .unwrap_or_else(|| panic!("no pass named {name}"))
    }

    #[test]
    fn test_pass_order() {
        let names: Vec<_> = passes().iter().map(InlinePass::name).collect();
        assert_eq!(
            names,
            [
                "image",
                "heading.h3",
                "heading.h2",
                "heading.h1",
                "emphasis.strong_em",
                "emphasis.strong",
                "emphasis.em",
                "emphasis.strong_underscore",
                "emphasis.em_underscore",
                "link",
                "code",
            ]
        );
    }

    #[test]
    fn test_image() {
        assert_eq!(
            rewrite("![A cat](https://img.example/cat.png)"),
            r#"<img src="https://img.example/cat.png" alt="A cat" />"#
        );
    }

    #[test]
    fn test_image_is_not_a_link() {
        let out = rewrite("![a](u)");
        assert_eq!(out, r#"<img src="u" alt="a" />"#);
        assert!(!out.contains("<a "));
    }

    #[test]
    fn test_image_with_empty_alt() {
        assert_eq!(rewrite("![](pic.png)"), r#"<img src="pic.png" alt="" />"#);
    }

    #[test]
    fn test_headings_by_level() {
        assert_eq!(rewrite("# One"), "<h1>One</h1>");
        assert_eq!(rewrite("## Two"), "<h2>Two</h2>");
        assert_eq!(rewrite("### Three"), "<h3>Three</h3>");
    }

    #[test]
    fn test_heading_specificity() {
        let out = rewrite("### Three");
        assert_eq!(out, "<h3>Three</h3>");
        assert!(!out.contains("<h1>"));
    }

    #[test]
    fn test_heading_leading_whitespace() {
        assert_eq!(rewrite("   ## Indented"), "<h2>Indented</h2>");
    }

    #[test]
    fn test_heading_requires_space() {
        assert_eq!(rewrite("#hashtag"), "#hashtag");
    }

    #[test]
    fn test_four_hashes_not_a_heading() {
        assert_eq!(rewrite("#### Four"), "#### Four");
    }

    #[test]
    fn test_headings_per_line() {
        assert_eq!(
            rewrite("# A\ntext\n## B"),
            "<h1>A</h1>\ntext\n<h2>B</h2>"
        );
    }

    #[test]
    fn test_emphasis_specificity() {
        assert_eq!(
            rewrite("***both*** **bold** *italic*"),
            "<strong><em>both</em></strong> <strong>bold</strong> <em>italic</em>"
        );
    }

    #[test]
    fn test_emphasis_underscores() {
        assert_eq!(
            rewrite("__bold__ and _italic_"),
            "<strong>bold</strong> and <em>italic</em>"
        );
    }

    #[test]
    fn test_emphasis_non_greedy() {
        assert_eq!(
            rewrite("**a** and **b**"),
            "<strong>a</strong> and <strong>b</strong>"
        );
    }

    #[test]
    fn test_emphasis_does_not_cross_lines() {
        assert_eq!(rewrite("*open\nclose*"), "*open\nclose*");
    }

    #[test]
    fn test_unmatched_emphasis_is_literal() {
        assert_eq!(rewrite("a single * star"), "a single * star");
        assert_eq!(rewrite("2 * 3 * 4"), "2 * 3 * 4");
    }

    #[test]
    fn test_bullet_marker_not_emphasis() {
        assert_eq!(rewrite("* item with *em*"), "* item with <em>em</em>");
    }

    #[test]
    fn test_link() {
        assert_eq!(
            rewrite("see [docs](https://example.com/docs)"),
            r#"see <a href="https://example.com/docs">docs</a>"#
        );
    }

    #[test]
    fn test_link_with_emphasis_text() {
        assert_eq!(
            rewrite("[**shop**](https://shop.example)"),
            r#"<a href="https://shop.example"><strong>shop</strong></a>"#
        );
    }

    #[test]
    fn test_underscores_in_urls_survive() {
        assert_eq!(
            rewrite("[a](https://x.example/a_b_c)"),
            r#"<a href="https://x.example/a_b_c">a</a>"#
        );
        assert_eq!(
            rewrite("![pic](https://x.example/my_big_pic.png)"),
            r#"<img src="https://x.example/my_big_pic.png" alt="pic" />"#
        );
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(rewrite("run `cargo test`"), "run <code>cargo test</code>");
    }

    #[test]
    fn test_inline_code_protected_from_emphasis() {
        assert_eq!(
            rewrite("call `snake_case_fn` or `**kw**`"),
            "call <code>snake_case_fn</code> or <code>**kw**</code>"
        );
    }

    #[test]
    fn test_inline_code_escapes_markup() {
        assert_eq!(rewrite("use `<div>`"), "use <code>&lt;div&gt;</code>");
    }

    #[test]
    fn test_placeholder_survives_underscore_rules() {
        assert_eq!(
            rewrite("[[[CODE_BLOCK_0]]]\n_note_ [[[CODE_BLOCK_1]]]"),
            "[[[CODE_BLOCK_0]]]\n<em>note</em> [[[CODE_BLOCK_1]]]"
        );
    }

    #[test]
    fn test_skipped_match_does_not_hide_later_match() {
        assert_eq!(
            rewrite("_x [[[CODE_BLOCK_0]]] and _y_"),
            "_x [[[CODE_BLOCK_0]]] and <em>y</em>"
        );
    }

    #[test]
    fn test_existing_html_attributes_untouched() {
        assert_eq!(
            rewrite(r#"<img src="/a_b_c.png" alt="x" />"#),
            r#"<img src="/a_b_c.png" alt="x" />"#
        );
    }

    #[test]
    fn test_emphasis_may_enclose_tags() {
        assert_eq!(
            rewrite("**see ![i](p.png) here**"),
            r#"<strong>see <img src="p.png" alt="i" /> here</strong>"#
        );
    }

    #[test]
    fn test_less_than_inside_inline_code() {
        assert_eq!(
            rewrite("Use `a<b` for less-than, `->` for returns."),
            "Use <code>a&lt;b</code> for less-than, <code>-&gt;</code> for returns."
        );
    }

    #[test]
    fn test_comparison_prose_keeps_emphasis() {
        assert_eq!(
            rewrite("If x<y then **stop** and y>x."),
            "If x<y then <strong>stop</strong> and y>x."
        );
        assert_eq!(
            rewrite("if a<b and c>d then _stop_"),
            "if a<b and c>d then <em>stop</em>"
        );
    }

    #[test]
    fn test_comparison_prose_keeps_links() {
        assert_eq!(
            rewrite("When a<b see [docs](https://x.example) when b>a."),
            r#"When a<b see <a href="https://x.example">docs</a> when b>a."#
        );
    }

    #[test]
    fn test_tag_guard_matches_real_tags_only() {
        let tags: Vec<_> = TAG_RE
            .find_iter(r#"<p> <br/> <img src="a_b.png" alt='x' /> </strong> a<b c>d x <y"#)
            .map(|m| m.as_str())
            .collect();
        assert_eq!(
            tags,
            ["<p>", "<br/>", r#"<img src="a_b.png" alt='x' />"#, "</strong>"]
        );
    }

    #[test]
    fn test_single_pass_in_isolation() {
        assert_eq!(pass("link").apply("[a](b) *c*"), r#"<a href="b">a</a> *c*"#);
        assert_eq!(pass("emphasis.em").apply("*c* and c"), "<em>c</em> and c");
    }

    #[test]
    fn test_unicode_text() {
        assert_eq!(
            rewrite("**café** - _naïve_"),
            "<strong>café</strong> - <em>naïve</em>"
        );
    }

    #[test]
    fn test_strictly_inside() {
        let guarded = vec![5..10];
        assert!(strictly_inside(&guarded, 7));
        assert!(!strictly_inside(&guarded, 5));
        assert!(!strictly_inside(&guarded, 10));
        assert!(!strictly_inside(&guarded, 0));
        assert!(!strictly_inside(&guarded, 12));
    }

    #[test]
    fn test_guarded_spans_merge_overlaps() {
        let spans = guarded_spans("x `<b>` <i>", STRUCTURAL);
        assert_eq!(spans, vec![2..7, 8..11]);
    }

    #[test]
    fn test_link_does_not_swallow_placeholder_bracket() {
        assert_eq!(
            rewrite("[[[CODE_BLOCK_0]]] [y](b)"),
            r#"[[[CODE_BLOCK_0]]] <a href="b">y</a>"#
        );
    }
}
