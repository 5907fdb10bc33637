// ABOUTME: Fragment injection for published pages: shared banner/footer markup
// ABOUTME: around the message list and default script/style links after <title>.

use dom_query::{Document, NodeRef};
use tracing::warn;

use crate::dom;
use crate::meta::join_url;

/// Token replaced with the page title inside banner text nodes.
pub const TITLE_TOKEN: &str = "__TITLE__";

/// Title used when the document has no usable `<title>` element.
pub const DEFAULT_TITLE: &str = "默认标题";

/// The scroll view inside the transcript message list; the insertion anchor
/// is its parent's parent.
const ANCHOR_SELECTOR: &str = r#"div[class*="message-list-"] > div[data-testid="scroll_view"]"#;

const CHATBOT_SCRIPT: &str = "doubao_chatbot.js";
const CHAT_STYLES: &str = "css/chat_styles.css";
const ICON_FONT_URL: &str = "https://cdn.bootcdn.net/ajax/libs/font-awesome/6.2.1/css/all.min.css";

/// Injects the banner fragment before the message-list anchor and the footer
/// fragment after it. `__TITLE__` in banner text nodes becomes the page
/// title. A missing anchor skips the step and leaves the tree unmodified.
pub fn inject_banner_and_footer(doc: &Document, banner: &str, footer: &str) {
    let title = dom::title_text(doc).unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let Some(anchor) = find_anchor(doc) else {
        warn!("message-list anchor not found; banner and footer skipped");
        return;
    };

    let banner_nodes = dom::import_fragment(doc, banner, |text| text.replace(TITLE_TOKEN, &title));
    for node in &banner_nodes {
        anchor.insert_before(node);
    }

    let footer_nodes = dom::import_fragment(doc, footer, |text| text.to_string());
    let mut cursor = anchor.clone();
    for node in &footer_nodes {
        cursor.insert_after(node);
        cursor = node.clone();
    }
}

/// Injects the chatbot script, the chat stylesheet, and the icon-font
/// stylesheet immediately after `<title>`, in that order. With a base URL the
/// local assets are joined onto it; without one the exported `../` layout is
/// assumed. No-op when the document has no `<title>`.
pub fn inject_default_resources(doc: &Document, base_url: Option<&str>) {
    let selection = doc.select("title");
    let Some(title) = selection.nodes().first() else {
        warn!("no <title> element; default resources skipped");
        return;
    };

    let script = doc.tree.new_element("script");
    script.set_attr("src", &asset_url(base_url, CHATBOT_SCRIPT));

    let styles = doc.tree.new_element("link");
    styles.set_attr("rel", "stylesheet");
    styles.set_attr("href", &asset_url(base_url, CHAT_STYLES));

    let icons = doc.tree.new_element("link");
    icons.set_attr("rel", "stylesheet");
    icons.set_attr("href", ICON_FONT_URL);

    title.insert_after(&script);
    script.insert_after(&styles);
    styles.insert_after(&icons);
}

fn find_anchor<'a>(doc: &'a Document) -> Option<NodeRef<'a>> {
    let selection = doc.select(ANCHOR_SELECTOR);
    let scroll_view = selection.nodes().first()?;
    let parent = scroll_view.parent()?;
    parent.parent()
}

fn asset_url(base_url: Option<&str>, asset: &str) -> String {
    match base_url {
        Some(base) => join_url(base, asset),
        None => format!("../{asset}"),
    }
}
