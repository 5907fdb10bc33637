// ABOUTME: SEO/OpenGraph metadata for published transcript pages.
// ABOUTME: Computes og:title/url/description from the document and upserts head tags.

use dom_query::Document;
use tracing::debug;

use crate::dom;
use crate::inject::DEFAULT_TITLE;

/// Upper bound on the og:description excerpt, in characters.
pub const DESCRIPTION_LIMIT: usize = 100;

/// Marker appended when the description excerpt was truncated.
const ELLIPSIS: &str = "...";

/// Keyword set advertised on every published page.
pub const DEFAULT_KEYWORDS: &str = "AI, chatbot, 豆包, 对话记录, chat transcript, conversation";

/// Metadata computed for a page before the upsert pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub og_title: String,
    pub og_url: String,
    pub og_description: String,
}

impl PageMeta {
    /// Derives metadata from the document text plus the page's published
    /// location.
    pub fn compute(doc: &Document, base_url: &str, relative_path: &str) -> Self {
        let og_title = dom::title_text(doc).unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let og_url = join_url(base_url, relative_path);
        let og_description = describe(&dom::visible_text(doc), &og_title);
        Self {
            og_title,
            og_url,
            og_description,
        }
    }
}

/// Upserts the OpenGraph, canonical, description, and keywords tags. Running
/// this twice yields the same head as running it once.
pub fn apply_page_meta(doc: &Document, meta: &PageMeta) {
    debug!(url = %meta.og_url, "applying page metadata");

    upsert_meta_property(doc, "og:title", &meta.og_title);
    upsert_meta_property(doc, "og:type", "website");
    upsert_meta_property(doc, "og:url", &meta.og_url);
    upsert_meta_property(doc, "og:description", &meta.og_description);
    upsert_canonical(doc, &meta.og_url);
    upsert_meta_name(doc, "description", &meta.og_description);
    upsert_meta_name(doc, "keywords", DEFAULT_KEYWORDS);
}

/// Joins a base URL and a relative path with exactly one separating slash,
/// regardless of slashes already present on either side.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub(crate) fn upsert_meta_property(doc: &Document, property: &str, content: &str) {
    let selector = format!(r#"meta[property="{property}"]"#);
    upsert_head_tag(
        doc,
        &selector,
        "meta",
        &[("property", property), ("content", content)],
    );
}

fn upsert_meta_name(doc: &Document, name: &str, content: &str) {
    let selector = format!(r#"meta[name="{name}"]"#);
    upsert_head_tag(doc, &selector, "meta", &[("name", name), ("content", content)]);
}

fn upsert_canonical(doc: &Document, href: &str) {
    upsert_head_tag(
        doc,
        r#"link[rel="canonical"]"#,
        "link",
        &[("rel", "canonical"), ("href", href)],
    );
}

/// Updates the first matching head tag in place, or creates the tag
/// immediately before `<title>` (at the end of `<head>` if there is no
/// title) when absent.
fn upsert_head_tag(doc: &Document, selector: &str, tag: &str, attrs: &[(&str, &str)]) {
    let selection = doc.select(selector);
    if let Some(existing) = selection.nodes().first() {
        for (name, value) in attrs {
            existing.set_attr(name, value);
        }
        return;
    }

    let created = doc.tree.new_element(tag);
    for (name, value) in attrs {
        created.set_attr(name, value);
    }

    let titles = doc.select("title");
    if let Some(title) = titles.nodes().first() {
        title.insert_before(&created);
        return;
    }
    let heads = doc.select("head");
    if let Some(head) = heads.nodes().first() {
        head.append_child(&created);
    }
}

/// First [`DESCRIPTION_LIMIT`] characters of the page text with the title
/// removed (first occurrence only) and surrounding whitespace trimmed; a
/// trailing marker signals truncation.
fn describe(text: &str, title: &str) -> String {
    let body = text.replacen(title, "", 1);
    let body = body.trim();

    let mut out: String = body.chars().take(DESCRIPTION_LIMIT).collect();
    if body.chars().count() > DESCRIPTION_LIMIT {
        out.push_str(ELLIPSIS);
    }
    out
}
