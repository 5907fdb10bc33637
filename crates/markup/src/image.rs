// ABOUTME: Preview-image extraction: decodes the first embedded base64 image
// ABOUTME: to disk and keeps the og:image tag in sync with the result.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use dom_query::Document;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::error::MarkupError;
use crate::meta::{join_url, upsert_meta_property};
use crate::Result;

/// Images are searched only inside the transcript message list.
const PICTURE_IMG_SELECTOR: &str = r#"div[class*="message-list-"] picture img"#;

const OG_IMAGE_SELECTOR: &str = r#"meta[property="og:image"]"#;

/// Directory under the output root that receives extracted images.
pub const IMAGE_DIR: &str = "imgs";

static DATA_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^data:image/(?P<format>[a-zA-Z0-9+.-]+);base64,(?P<payload>.+)$")
        .expect("data URI pattern is valid")
});

/// Decodes the first base64-embedded message image to
/// `<output_dir>/imgs/<relative_path with the extension swapped>` and points
/// og:image at its published URL. Documents without such an image lose any
/// stale og:image tag instead. Returns the path written, if any.
pub fn extract_first_image(
    doc: &Document,
    output_dir: &Path,
    relative_path: &str,
    base_url: &str,
) -> Result<Option<PathBuf>> {
    let Some((format, payload)) = first_embedded_image(doc) else {
        doc.select(OG_IMAGE_SELECTOR).remove();
        debug!("no embedded preview image; og:image cleared");
        return Ok(None);
    };

    let bytes = STANDARD.decode(payload.as_bytes())?;

    let image_rel = swap_extension(relative_path, &format);
    let target = output_dir.join(IMAGE_DIR).join(&image_rel);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|source| MarkupError::write(parent, source))?;
    }
    fs::write(&target, &bytes).map_err(|source| MarkupError::write(&target, source))?;

    let published = join_url(base_url, &format!("{IMAGE_DIR}/{image_rel}"));
    upsert_meta_property(doc, "og:image", &published);
    info!(path = %target.display(), "extracted preview image");

    Ok(Some(target))
}

/// Format and base64 payload of the first embedded message image, in
/// document order.
fn first_embedded_image(doc: &Document) -> Option<(String, String)> {
    let selection = doc.select(PICTURE_IMG_SELECTOR);
    for img in selection.nodes() {
        let Some(src) = img.attr("src") else {
            continue;
        };
        if let Some(captures) = DATA_URI.captures(&src) {
            return Some((captures["format"].to_string(), captures["payload"].to_string()));
        }
    }
    None
}

/// `dialogs/chat-1.html` + `png` becomes `dialogs/chat-1.png`; a name without
/// an extension just gains one. Forward slashes are preserved so the result
/// doubles as a URL path.
fn swap_extension(relative_path: &str, format: &str) -> String {
    let (dir, name) = match relative_path.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, relative_path),
    };
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    match dir {
        Some(dir) => format!("{dir}/{stem}.{format}"),
        None => format!("{stem}.{format}"),
    }
}
