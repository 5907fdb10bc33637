// ABOUTME: Error types for PDF outline operations.
// ABOUTME: Provides the OutlineError enum covering load/save/encryption failures.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while adding bookmarks to a PDF.
#[derive(Debug, Error)]
pub enum OutlineError {
    /// The file could not be loaded as a PDF.
    #[error("failed to load {path}")]
    Load {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// Encrypted documents cannot be rewritten.
    #[error("{path} is encrypted; bookmarks were not added")]
    Encrypted { path: PathBuf },

    /// The rewritten file could not be saved.
    #[error("failed to save {path}")]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document structure was malformed in a way that prevents writing
    /// the outline.
    #[error("malformed document structure")]
    Structure(#[from] lopdf::Error),
}
