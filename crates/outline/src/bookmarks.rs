// ABOUTME: Applies the classified heading outline to a PDF file.
// ABOUTME: Loads, classifies, writes the bookmark tree, and saves in place.

use std::path::{Path, PathBuf};

use lopdf::{Bookmark, Document, Object, ObjectId};
use serde::Serialize;
use tracing::{info, warn};

use crate::classify::{classify_headings, OutlineEntry, Thresholds};
use crate::error::OutlineError;
use crate::spans::extract_pages;
use crate::Result;

/// Outcome for one file: the outline that was (or would be) written.
#[derive(Debug, Serialize)]
pub struct OutlineSummary {
    pub path: PathBuf,
    pub entries: Vec<OutlineEntry>,
}

/// Infers the outline and rewrites `path` in place. With `dry_run` the file
/// is left untouched; an empty outline also leaves the file untouched.
pub fn add_bookmarks(path: &Path, thresholds: &Thresholds, dry_run: bool) -> Result<OutlineSummary> {
    let mut doc = Document::load(path).map_err(|source| OutlineError::Load {
        path: path.to_path_buf(),
        source,
    })?;

    if doc.is_encrypted() {
        return Err(OutlineError::Encrypted {
            path: path.to_path_buf(),
        });
    }

    let pages = extract_pages(&doc);
    let entries = classify_headings(&pages, thresholds);

    if entries.is_empty() {
        warn!(path = %path.display(), "no headings found; outline left untouched");
        return Ok(OutlineSummary {
            path: path.to_path_buf(),
            entries,
        });
    }

    if !dry_run {
        write_outline(&mut doc, &entries)?;
        doc.save(path).map_err(|source| OutlineError::Save {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), bookmarks = entries.len(), "outline written");
    }

    Ok(OutlineSummary {
        path: path.to_path_buf(),
        entries,
    })
}

/// Level-1 entries sit at the outline root; a level-2 entry nests under the
/// most recent level-1 entry, or at the root when none has been seen yet.
fn write_outline(doc: &mut Document, entries: &[OutlineEntry]) -> Result<()> {
    let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
    let mut last_top: Option<u32> = None;

    for entry in entries {
        let Some(page_id) = page_ids.get(entry.page as usize - 1).copied() else {
            continue;
        };
        let bookmark = Bookmark::new(entry.title.clone(), [0.0, 0.0, 0.0], 0, page_id);
        match entry.level {
            1 => last_top = Some(doc.add_bookmark(bookmark, None)),
            _ => {
                doc.add_bookmark(bookmark, last_top);
            }
        }
    }

    doc.adjust_zero_pages();

    if let Some(outline_id) = doc.build_outline() {
        let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
        if let Ok(Object::Dictionary(catalog)) = doc.get_object_mut(catalog_id) {
            catalog.set("Outlines", Object::Reference(outline_id));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Stream};
    use pretty_assertions::assert_eq;

    /// Builds a document with one page per (size, text) list.
    fn doc_with_pages(pages: &[&[(i64, &str)]]) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut kids = Vec::new();
        for lines in pages {
            let mut operations = vec![Operation::new("BT", vec![])];
            for (size, text) in *lines {
                operations.push(Operation::new("Tf", vec!["F1".into(), (*size).into()]));
                operations.push(Operation::new("Td", vec![72.into(), 700.into()]));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
            }
            operations.push(Operation::new("ET", vec![]));

            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().unwrap(),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn save_to(dir: &tempfile::TempDir, name: &str, doc: &mut Document) -> PathBuf {
        let path = dir.path().join(name);
        doc.save(&path).unwrap();
        path
    }

    fn outline_root(doc: &Document) -> Option<ObjectId> {
        let catalog_id = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
        let catalog = doc.get_object(catalog_id).unwrap().as_dict().unwrap();
        catalog.get(b"Outlines").ok()?.as_reference().ok()
    }

    #[test]
    fn test_outline_written_and_reloadable() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = doc_with_pages(&[
            &[(48, "Chapter One"), (12, "body")],
            &[(34, "Details"), (12, "more body")],
        ]);
        let path = save_to(&dir, "doc.pdf", &mut doc);

        let summary = add_bookmarks(&path, &Thresholds::default(), false).unwrap();
        assert_eq!(summary.entries.len(), 2);
        assert_eq!(summary.entries[0].title, "Chapter One");
        assert_eq!(summary.entries[0].level, 1);
        assert_eq!(summary.entries[1].title, "Details");
        assert_eq!(summary.entries[1].level, 2);
        assert_eq!(summary.entries[1].page, 2);

        let reloaded = Document::load(&path).unwrap();
        let outline_id = outline_root(&reloaded).expect("catalog has an outline");
        let outline = reloaded.get_object(outline_id).unwrap().as_dict().unwrap();
        assert!(outline.get(b"First").is_ok());
    }

    #[test]
    fn test_no_headings_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = doc_with_pages(&[&[(12, "just body text")]]);
        let path = save_to(&dir, "plain.pdf", &mut doc);
        let before = std::fs::read(&path).unwrap();

        let summary = add_bookmarks(&path, &Thresholds::default(), false).unwrap();
        assert!(summary.entries.is_empty());
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_dry_run_reports_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = doc_with_pages(&[&[(48, "Heading")]]);
        let path = save_to(&dir, "dry.pdf", &mut doc);
        let before = std::fs::read(&path).unwrap();

        let summary = add_bookmarks(&path, &Thresholds::default(), true).unwrap();
        assert_eq!(summary.entries.len(), 1);
        assert_eq!(std::fs::read(&path).unwrap(), before);

        let reloaded = Document::load(&path).unwrap();
        assert!(outline_root(&reloaded).is_none());
    }

    #[test]
    fn test_not_a_pdf_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.pdf");
        std::fs::write(&path, b"plain text, not a pdf").unwrap();

        let result = add_bookmarks(&path, &Thresholds::default(), false);
        assert!(matches!(result, Err(OutlineError::Load { .. })));
    }
}
