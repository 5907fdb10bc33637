// ABOUTME: Error types for markup pipeline operations.
// ABOUTME: Provides the MarkupError enum covering file I/O and image decoding.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while publishing a page.
#[derive(Debug, Error)]
pub enum MarkupError {
    /// Failed to read a source file.
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write an output file or create its directory.
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The embedded preview image carried an invalid base64 payload.
    #[error("failed to decode embedded image")]
    ImageDecode(#[from] base64::DecodeError),
}

impl MarkupError {
    pub(crate) fn read(path: &Path, source: io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn write(path: &Path, source: io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}
