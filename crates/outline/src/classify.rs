// ABOUTME: Font-size based heading classification over extracted text lines.
// ABOUTME: Pure functions from page/line/span structures to a flat two-level outline.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Zero-width characters stripped before a line is considered.
static ZERO_WIDTH: Lazy<Regex> =
    Lazy::new(|| Regex::new("[\u{200b}\u{200c}\u{200d}]+").expect("zero-width pattern is valid"));

/// Font-size cutoffs separating heading levels from body text.
///
/// A mean line size strictly above `level1` marks a level-1 heading; a size
/// strictly between `level2` and `level1` marks a level-2 heading. A size
/// exactly at `level1` matches neither level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub level1: f32,
    pub level2: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            level1: 40.0,
            level2: 30.0,
        }
    }
}

/// A run of characters sharing one effective font size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub size: f32,
}

/// Spans sharing a visual row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub spans: Vec<TextSpan>,
}

/// One page's lines in reading order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageText {
    pub lines: Vec<Line>,
}

/// An outline entry: heading level (1 or 2), title text, 1-based page number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlineEntry {
    pub level: u8,
    pub title: String,
    pub page: u32,
}

/// Buckets every line into heading levels by mean font size and emits at
/// most one entry per level per page, with qualifying lines joined by single
/// spaces. Pages contribute entries in page order, level 1 before level 2.
pub fn classify_headings(pages: &[PageText], thresholds: &Thresholds) -> Vec<OutlineEntry> {
    let mut outline = Vec::new();

    for (index, page) in pages.iter().enumerate() {
        let page_number = index as u32 + 1;
        let mut level1 = Vec::new();
        let mut level2 = Vec::new();

        for line in &page.lines {
            let Some((text, size)) = line_signature(line) else {
                continue;
            };

            if size > thresholds.level1 {
                level1.push(text);
            } else if size > thresholds.level2 && size < thresholds.level1 {
                level2.push(text);
            }
        }

        if !level1.is_empty() {
            outline.push(OutlineEntry {
                level: 1,
                title: level1.join(" "),
                page: page_number,
            });
        }
        if !level2.is_empty() {
            outline.push(OutlineEntry {
                level: 2,
                title: level2.join(" "),
                page: page_number,
            });
        }
    }

    outline
}

/// Concatenated text (zero-width characters removed, spans trimmed) and mean
/// span size of a line; `None` when nothing printable remains.
fn line_signature(line: &Line) -> Option<(String, f32)> {
    let mut text = String::new();
    let mut sizes = Vec::new();

    for span in &line.spans {
        let cleaned = ZERO_WIDTH.replace_all(&span.text, "");
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            continue;
        }
        text.push_str(cleaned);
        sizes.push(span.size);
    }

    if sizes.is_empty() {
        return None;
    }

    let mean = sizes.iter().sum::<f32>() / sizes.len() as f32;
    Some((text, mean))
}
