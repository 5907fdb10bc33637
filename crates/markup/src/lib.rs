// ABOUTME: Main library entry point for the chatpress markup pipeline.
// ABOUTME: Re-exports the publish pipeline and the per-step tree operations.

//! chatpress-markup turns exported chat-transcript HTML pages into
//! publishable pages: UI chrome removal, banner/footer injection, default
//! resource links, SEO/OpenGraph metadata, and preview-image extraction.
//!
//! All tree operations work on a [`dom_query::Document`] in place; the
//! [`pipeline`] module wires them together in a fixed order and adds the
//! surrounding file I/O.

pub mod clean;
pub mod dom;
pub mod error;
pub mod image;
pub mod inject;
pub mod meta;
pub mod pipeline;

pub use crate::error::MarkupError;
pub use crate::pipeline::{publish_file, PublishOptions, PublishReport};

pub type Result<T, E = MarkupError> = std::result::Result<T, E>;
