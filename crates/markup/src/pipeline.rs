// ABOUTME: The fixed per-document publish pipeline: clean, inject, rewrite
// ABOUTME: metadata, extract the preview image, write the result out.

use std::fs;
use std::path::{Path, PathBuf};

use dom_query::Document;
use tracing::{info, warn};

use crate::clean::{remove_csp_meta, remove_nodes, CHROME_SELECTORS};
use crate::error::MarkupError;
use crate::image::extract_first_image;
use crate::inject::{inject_banner_and_footer, inject_default_resources};
use crate::meta::{apply_page_meta, PageMeta};
use crate::Result;

/// Where the pipeline reads from and publishes to, plus the optional
/// published base URL.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Source-relative path of the page being published; mirrored under the
    /// output directory.
    pub relative_path: String,
    /// Banner fragment file; a relative name resolves inside `source_dir`.
    pub banner: PathBuf,
    /// Footer fragment file; a relative name resolves inside `source_dir`.
    pub footer: PathBuf,
    /// Published base URL. When set, asset links are absolute and the
    /// metadata and preview-image steps run; when unset the exported
    /// relative layout is kept and those steps are skipped.
    pub base_url: Option<String>,
}

/// What a pipeline run produced.
#[derive(Debug)]
pub struct PublishReport {
    pub output_path: PathBuf,
    pub image_path: Option<PathBuf>,
}

/// Runs the full pipeline for one page and writes the transformed document
/// to the mirrored path under the output directory.
pub fn publish_file(opts: &PublishOptions) -> Result<PublishReport> {
    let source_path = opts.source_dir.join(&opts.relative_path);
    let html = fs::read_to_string(&source_path)
        .map_err(|source| MarkupError::read(&source_path, source))?;

    let doc = Document::from(html.as_str());

    remove_nodes(&doc, CHROME_SELECTORS);
    remove_csp_meta(&doc);

    let banner = read_fragment(&opts.source_dir, &opts.banner);
    let footer = read_fragment(&opts.source_dir, &opts.footer);
    match (banner, footer) {
        (Some(banner), Some(footer)) => inject_banner_and_footer(&doc, &banner, &footer),
        _ => warn!("banner or footer fragment missing; injection skipped"),
    }

    inject_default_resources(&doc, opts.base_url.as_deref());

    let mut image_path = None;
    if let Some(base_url) = opts.base_url.as_deref() {
        let meta = PageMeta::compute(&doc, base_url, &opts.relative_path);
        apply_page_meta(&doc, &meta);
        image_path = extract_first_image(&doc, &opts.output_dir, &opts.relative_path, base_url)?;
    }

    let output_path = opts.output_dir.join(&opts.relative_path);
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|source| MarkupError::write(parent, source))?;
    }
    fs::write(&output_path, doc.html().as_bytes())
        .map_err(|source| MarkupError::write(&output_path, source))?;

    info!(path = %output_path.display(), "published page");

    Ok(PublishReport {
        output_path,
        image_path,
    })
}

/// Fragment files named with relative paths live next to the source tree.
/// An unreadable fragment is logged, not fatal.
fn read_fragment(source_dir: &Path, path: &Path) -> Option<String> {
    let resolved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        source_dir.join(path)
    };
    match fs::read_to_string(&resolved) {
        Ok(text) => Some(text),
        Err(error) => {
            warn!(path = %resolved.display(), %error, "cannot read fragment file");
            None
        }
    }
}
