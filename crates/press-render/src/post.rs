//! Publish-time post-processing of rendered HTML.
//!
//! Two passes run in a fixed order after conversion:
//!
//! - [`inject_hero_image`] adds a `<figure>` after the first paragraph when the
//!   post has no image at all.
//! - [`ensure_internal_link`] appends a link to the site root when nothing in
//!   the post links to the site yet.
//!
//! Both passes are idempotent.

use std::sync::LazyLock;

use regex::Regex;

use crate::escape::{escape_attr, escape_html};

/// Link label used when the caller supplies none.
pub const DEFAULT_FALLBACK_LABEL: &str = "Learn more";

static IMG_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img\b").unwrap());

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bhref\s*=\s*["']([^"']*)["']"#).unwrap());

/// CMS API suffix callers sometimes pass instead of the site root.
static API_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/wp-json.*$").unwrap());

/// Insert a hero image after the first paragraph.
///
/// Falls back to the top of the document when there is no `</p>`. Does
/// nothing when the HTML already contains an `<img>` or `image_url` is empty.
#[must_use]
pub fn inject_hero_image(html: &str, image_url: &str, alt_text: &str) -> String {
    let image_url = image_url.trim();
    if image_url.is_empty() {
        tracing::debug!("No hero image URL, skipping injection");
        return html.to_owned();
    }
    if IMG_TAG_RE.is_match(html) {
        tracing::debug!("Post already has an image, skipping hero injection");
        return html.to_owned();
    }

    let figure = format!(
        r#"<figure><img src="{}" alt="{}" /><figcaption>{}</figcaption></figure>"#,
        escape_attr(image_url),
        escape_attr(alt_text),
        escape_html(alt_text)
    );

    if html.contains("</p>") {
        tracing::debug!("Injecting hero image after first paragraph");
        html.replacen("</p>", &format!("</p>\n{figure}"), 1)
    } else {
        tracing::debug!("Injecting hero image at top of post");
        format!("{figure}\n{html}")
    }
}

/// Normalize a site base URL.
///
/// Strips trailing slashes and any `/wp-json...` API path so callers can pass
/// either the site root or the CMS API root.
#[must_use]
pub fn normalize_site_base(site_base: &str) -> String {
    let base = site_base.trim().trim_end_matches('/');
    let base = API_SUFFIX_RE.replace(base, "");
    base.trim_end_matches('/').to_owned()
}

/// Ensure the post links to the site at least once.
///
/// When no anchor points at `site_base` (or below it), appends
/// `<p>Explore more on <a href="BASE/" title="LABEL">BASE</a>.</p>`.
/// An empty `site_base` disables the pass.
#[must_use]
pub fn ensure_internal_link(html: &str, site_base: &str, fallback_label: &str) -> String {
    let base = normalize_site_base(site_base);
    if base.is_empty() {
        tracing::debug!("No site base URL, skipping internal link");
        return html.to_owned();
    }
    if links_to_site(html, &base) {
        tracing::debug!(base = %base, "Post already links to site");
        return html.to_owned();
    }

    let label = match fallback_label.trim() {
        "" => DEFAULT_FALLBACK_LABEL,
        label => label,
    };
    tracing::debug!(base = %base, "Appending internal link");
    format!(
        r#"{html}
<p>Explore more on <a href="{}/" title="{}">{}</a>.</p>"#,
        escape_attr(&base),
        escape_attr(label),
        escape_html(&base)
    )
}

/// Run both post-processing passes in order.
#[must_use]
pub fn post_process(
    html: &str,
    hero_image: &str,
    alt_text: &str,
    site_base: &str,
    fallback_label: &str,
) -> String {
    let html = inject_hero_image(html, hero_image, alt_text);
    ensure_internal_link(&html, site_base, fallback_label)
}

/// Whether any `href` in `html` points at `base` or a path below it.
fn links_to_site(html: &str, base: &str) -> bool {
    let escaped = escape_attr(base);
    HREF_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .any(|href| points_at(href.as_str(), base) || points_at(href.as_str(), &escaped))
}

fn points_at(href: &str, base: &str) -> bool {
    href.strip_prefix(base)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
}
