// ABOUTME: Removal operations for exported transcript chrome.
// ABOUTME: Drops fixed UI selectors and the content-security-policy meta tag.

use dom_query::Document;
use tracing::debug;

/// UI chrome carried over from the export that must not reach the published
/// page. Matched elements are removed together with their subtrees.
pub const CHROME_SELECTORS: &[&str] = &[
    r#"div[class*="header-"] > div[class="relative"]"#,
    r#"div[class*="to-bottom-button-"]"#,
    r#"div[data-message-action-bar="1"]"#,
    r#"div[data-testid="suggest_message_list"]"#,
    r#"div[data-testid="chat_footer_skill_bar"]"#,
    r#"div[data-testid="chat_input"]"#,
];

const CSP_META_SELECTOR: &str = r#"meta[http-equiv="content-security-policy"]"#;

/// Removes every element matching the given selectors. Selectors are applied
/// in order against the current tree state; reapplying on an already cleaned
/// tree is a no-op.
pub fn remove_nodes(doc: &Document, selectors: &[&str]) {
    for selector in selectors {
        let selection = doc.select(selector);
        let matches = selection.length();
        if matches > 0 {
            debug!(selector = %selector, matches, "removing nodes");
        }
        selection.remove();
    }
}

/// Removes the head's content-security-policy meta directive, if present.
pub fn remove_csp_meta(doc: &Document) {
    doc.select(CSP_META_SELECTOR).remove();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"<html><head>
        <meta http-equiv="content-security-policy" content="default-src 'self'">
        <title>t</title>
        </head><body>
        <div class="header-a1b2"><div class="relative">chrome</div><div class="relative extra">kept</div></div>
        <div class="to-bottom-button-x9">scroll</div>
        <div data-message-action-bar="1">actions</div>
        <div data-testid="suggest_message_list">suggestions</div>
        <div data-testid="chat_footer_skill_bar">skills</div>
        <div data-testid="chat_input">input</div>
        <div class="message-list-z3"><div data-testid="scroll_view"><p>hello</p></div></div>
        </body></html>"#;

    #[test]
    fn test_remove_nodes_drops_all_chrome() {
        let doc = Document::from(PAGE);
        remove_nodes(&doc, CHROME_SELECTORS);

        for selector in CHROME_SELECTORS {
            assert_eq!(doc.select(selector).length(), 0, "{selector} survived");
        }
        // transcript content is untouched
        assert_eq!(doc.select(r#"div[class*="message-list-"] p"#).length(), 1);
    }

    #[test]
    fn test_remove_nodes_exact_class_match_spares_compound_classes() {
        let doc = Document::from(PAGE);
        remove_nodes(&doc, CHROME_SELECTORS);

        // class="relative extra" is not an exact class="relative" match
        assert_eq!(doc.select(r#"div[class="relative extra"]"#).length(), 1);
    }

    #[test]
    fn test_remove_nodes_is_idempotent() {
        let doc = Document::from(PAGE);
        remove_nodes(&doc, CHROME_SELECTORS);
        let once = doc.html().to_string();
        remove_nodes(&doc, CHROME_SELECTORS);
        assert_eq!(doc.html().to_string(), once);
    }

    #[test]
    fn test_remove_csp_meta() {
        let doc = Document::from(PAGE);
        remove_csp_meta(&doc);
        assert_eq!(doc.select(r#"meta[http-equiv]"#).length(), 0);
        // idempotent
        remove_csp_meta(&doc);
        assert_eq!(doc.select(r#"meta[http-equiv]"#).length(), 0);
    }
}
