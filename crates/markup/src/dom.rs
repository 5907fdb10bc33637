// ABOUTME: Thin helpers over dom_query for the tree surgery the pipeline needs.
// ABOUTME: Cross-document fragment import and visible-text flattening.

use dom_query::{Document, NodeRef};

/// Element names whose text never counts as page content.
const SKIPPED_TEXT_CONTAINERS: &[&str] = &["script", "style", "noscript", "template"];

/// Parses `html` as a fragment and deep-copies its body children into `doc`'s
/// tree, returning the copied top-level nodes in source order. The copies are
/// created detached; the caller decides where to attach them. `substitute` is
/// applied to every text node on the way in.
pub fn import_fragment<'a, F>(doc: &'a Document, html: &str, substitute: F) -> Vec<NodeRef<'a>>
where
    F: Fn(&str) -> String,
{
    let parsed = Document::from(html);
    let mut imported = Vec::new();

    let body = parsed.select("body");
    let Some(root) = body.nodes().first() else {
        return imported;
    };
    for child in root.children().iter() {
        if let Some(copy) = copy_node(doc, child, &substitute) {
            imported.push(copy);
        }
    }
    imported
}

/// Recursive node copy; comments and other non-element, non-text nodes are
/// not carried over.
fn copy_node<'a, F>(doc: &'a Document, source: &NodeRef, substitute: &F) -> Option<NodeRef<'a>>
where
    F: Fn(&str) -> String,
{
    if source.is_text() {
        let text = substitute(&source.text());
        return Some(doc.tree.new_text(text.as_str()));
    }
    if !source.is_element() {
        return None;
    }

    let name = source.node_name()?;
    let copy = doc.tree.new_element(&name);
    for attr in source.attrs().iter() {
        copy.set_attr(&attr.name.local, &attr.value);
    }
    for child in source.children().iter() {
        if let Some(child_copy) = copy_node(doc, child, substitute) {
            copy.append_child(&child_copy);
        }
    }
    Some(copy)
}

/// Flattened text of the document in reading order, skipping script-like
/// containers. Whitespace is kept as-is.
pub fn visible_text(doc: &Document) -> String {
    let mut out = String::new();
    collect_text(&doc.root(), &mut out);
    out
}

fn collect_text(node: &NodeRef, out: &mut String) {
    if node.is_text() {
        out.push_str(&node.text());
        return;
    }
    if let Some(name) = node.node_name() {
        if SKIPPED_TEXT_CONTAINERS.contains(&name.to_lowercase().as_str()) {
            return;
        }
    }
    for child in node.children().iter() {
        collect_text(child, out);
    }
}

/// Trimmed text of the document's `<title>`, if there is one and it is
/// non-empty.
pub fn title_text(doc: &Document) -> Option<String> {
    let selection = doc.select("title");
    let node = selection.nodes().first()?;
    let text = node.text().trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
