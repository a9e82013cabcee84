//! Error taxonomy for the bootstrap pipeline.
//!
//! Every variant is fatal. Components return `anyhow::Result` carrying one of
//! these, so callers (and tests) can `downcast_ref::<BootstrapError>()` to tell
//! the failure classes apart while still getting `anyhow` context chains.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// No release or asset in the feed matched the selection rule.
    #[error("{what} not found: {detail}")]
    NotFound { what: &'static str, detail: String },

    /// The server answered with something other than HTTP 200.
    #[error("HTTP {status} while fetching {url}")]
    Transfer { status: u16, url: String },

    /// Malformed compression stream, tar header or zip directory.
    #[error("corrupt archive: {0}")]
    Archive(String),

    /// Creating or writing an output file failed.
    #[error("failed to write {}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The build tool is not on the search path.
    #[error("executable `{name}` not found in PATH")]
    ExecutableNotFound {
        name: String,
        #[source]
        source: which::Error,
    },
}

impl BootstrapError {
    pub fn not_found(what: &'static str, detail: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            detail: detail.into(),
        }
    }

    pub fn archive(err: impl std::fmt::Display) -> Self {
        Self::Archive(err.to_string())
    }
}
