//! Whole-pipeline behavior: conversion followed by post-processing.

use std::thread;

use pretty_assertions::assert_eq;
use press_render::{
    PostDraft, PublishSettings, Publisher, convert, convert_document, post_process, vault,
};

const ARTICLE: &str = "\
# Choosing a Charger

Not every **USB-C** charger is equal. See [our guide](https://shop.example/guide_to_power) first.

## What to look for

- wattage of at least *65W*
- GaN design
1. check the cable
2. check the brick

```python
if watts < 65:
    print(\"too slow & hot\")
```

### Verdict

Buy the one with `PD 3.0`.";

#[test]
fn test_article_renders_expected_html() {
    let html = convert(ARTICLE);
    assert_eq!(
        html,
        "<h1>Choosing a Charger</h1>\n\
         \n\
         <p>Not every <strong>USB-C</strong> charger is equal. See <a href=\"https://shop.example/guide_to_power\">our guide</a> first.</p>\n\
         \n\
         <h2>What to look for</h2>\n\
         \n\
         <ul>\n\
         <li>wattage of at least <em>65W</em></li>\n\
         <li>GaN design</li>\n\
         </ul>\n\
         <ol>\n\
         <li>check the cable</li>\n\
         <li>check the brick</li>\n\
         </ol>\n\
         \n\
         <pre><code class=\"language-python\">if watts &lt; 65:\n    print(\"too slow &amp; hot\")</code></pre>\n\
         \n\
         <h3>Verdict</h3>\n\
         \n\
         <p>Buy the one with <code>PD 3.0</code>.</p>"
    );
}

#[test]
fn test_no_placeholder_survives() {
    let result = convert_document(ARTICLE);
    assert_eq!(result.code_blocks, 1);
    assert!(!result.html.contains("[[[CODE_BLOCK_"));
}

#[test]
fn test_code_round_trip_preserves_content() {
    let code = "let a = 1 < 2 && 3 > 2;\n**still code** _x_ [a](b)";
    let html = convert(&format!("```\n{code}\n```"));
    let inner = html
        .strip_prefix("<pre><code>")
        .and_then(|rest| rest.strip_suffix("</code></pre>"))
        .unwrap();
    let unescaped = inner
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    assert_eq!(unescaped, code);
}

#[test]
fn test_placeholders_written_by_hand_are_left_alone() {
    let extracted = vault::extract("```\na\n```");
    assert_eq!(extracted.spans.len(), 1);
    assert_eq!(extracted.text, vault::placeholder(0));
    assert_eq!(
        vault::restore("[[[CODE_BLOCK_7]]]", &extracted.spans),
        "[[[CODE_BLOCK_7]]]"
    );
}

#[test]
fn test_list_switching_never_nests() {
    let html = convert("- a\n- b\n1. c\n- d");
    assert_eq!(
        html.replace('\n', ""),
        "<ul><li>a</li><li>b</li></ul><ol><li>c</li></ol><ul><li>d</li></ul>"
    );
}

#[test]
fn test_full_publish_flow_is_idempotent() {
    let html = convert(ARTICLE);
    let args = (
        "https://cdn.example/charger.jpg",
        "usb-c charger - Choosing a Charger",
        "https://other.example",
        "usb-c charger",
    );
    let once = post_process(&html, args.0, args.1, args.2, args.3);
    let twice = post_process(&once, args.0, args.1, args.2, args.3);
    assert_eq!(once, twice);
    assert_eq!(once.matches("<figure>").count(), 1);
    assert_eq!(once.matches("Explore more on").count(), 1);
}

#[test]
fn test_existing_site_link_suppresses_fallback() {
    let html = post_process(&convert(ARTICLE), "", "", "https://shop.example", "x");
    assert!(!html.contains("Explore more on"));
    assert!(!html.contains("<figure>"));
}

#[test]
fn test_concurrent_conversions_match_sequential() {
    let inputs: Vec<String> = (0..16)
        .map(|i| format!("{ARTICLE}\n\n- item {i}\n\n```\nblock {i}\n```"))
        .collect();
    let expected: Vec<String> = inputs.iter().map(|input| convert(input)).collect();

    let actual: Vec<String> = thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|input| scope.spawn(move || convert(input)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(actual, expected);
}

#[test]
fn test_publisher_prepare_all_matches_prepare() {
    let publisher = Publisher::new(PublishSettings {
        site_base: Some("https://other.example".to_owned()),
        ..PublishSettings::default()
    });
    let drafts: Vec<PostDraft> = (0..8)
        .map(|i| PostDraft {
            title: format!("Post {i}"),
            markdown: format!("{ARTICLE}\n\nExtra line {i}."),
            keyphrase: Some("usb-c charger".to_owned()),
            hero_image: Some("https://cdn.example/charger.jpg".to_owned()),
        })
        .collect();

    let parallel = publisher.prepare_all(&drafts);
    for (draft, result) in drafts.iter().zip(parallel) {
        assert_eq!(result.unwrap(), publisher.prepare(draft).unwrap());
    }
}

#[test]
fn test_inline_markup_next_to_comparisons() {
    assert_eq!(
        convert("Use `a<b` for less-than, `->` for returns."),
        "<p>Use <code>a&lt;b</code> for less-than, <code>-&gt;</code> for returns.</p>"
    );
    assert_eq!(
        convert("If x<y then **stop** and y>x."),
        "<p>If x<y then <strong>stop</strong> and y>x.</p>"
    );
    assert_eq!(
        convert("When a<b see [docs](https://x.example) when b>a."),
        "<p>When a<b see <a href=\"https://x.example\">docs</a> when b>a.</p>"
    );
}

#[test]
fn test_token_written_in_prose_is_not_expanded() {
    let result = convert_document("Text [[[CODE_BLOCK_0]]] here\n\n```\nx\n```");
    assert_eq!(result.code_blocks, 1);
    assert_eq!(result.html.matches("<pre><code>").count(), 1);
    assert_eq!(
        result.html,
        "<p>Text [[[CODE_BLOCK_0]]] here</p>\n\n<pre><code>x</code></pre>"
    );
}
