// ABOUTME: Main library entry point for the chatpress PDF outline pipeline.
// ABOUTME: Re-exports the heading classifier and the bookmark writer.

//! chatpress-outline infers a two-level bookmark outline from a PDF's visual
//! layout: text spans are extracted from each page's content stream, lines
//! are bucketed into heading levels by mean font size, and the result is
//! written back into the file as a bookmark tree.

pub mod bookmarks;
pub mod classify;
pub mod cmap;
pub mod error;
pub mod spans;

pub use crate::bookmarks::{add_bookmarks, OutlineSummary};
pub use crate::classify::{classify_headings, Line, OutlineEntry, PageText, TextSpan, Thresholds};
pub use crate::error::OutlineError;

pub type Result<T, E = OutlineError> = std::result::Result<T, E>;
