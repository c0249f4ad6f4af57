//! Error types surfaced by resolution and manifest handling.

use std::path::PathBuf;

/// Result alias for fallible core operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that abort a resolution pass or a manifest load.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A reference string matched no known remote pattern and names no
    /// existing local directory.
    #[error("unable to parse package reference: {reference}")]
    SpecParse { reference: String },

    /// A local directory is missing, or a remote ref could not be resolved.
    #[error("source not found: {what}")]
    SourceNotFound { what: String },

    /// An explicitly expected sum disagrees with the installed content.
    #[error("checksum mismatch for {name}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// The same canonical name was requested at two different versions
    /// under the strict collision policy.
    #[error("multiple colliding versions specified for {name}: {existing} and {requested}")]
    NameCollision {
        name: String,
        existing: String,
        requested: String,
    },

    /// A nested manifest refers back to a dependency on the active path.
    #[error("dependency cycle detected: {}", path.join(" -> "))]
    CycleDetected { path: Vec<String> },

    /// The manifest was written by a newer version of the tool.
    #[error("jsonnetfile schema version {found} is newer than supported version {supported}, update jb")]
    UnsupportedSchema { found: u32, supported: u32 },

    /// Reading, parsing or writing a manifest file failed.
    #[error("failed to process manifest {}: {source:#}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// A source backend failed for a reason other than a missing source.
    #[error("failed to install {name}: {source:#}")]
    Install {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    pub(crate) fn source_not_found(what: impl Into<String>) -> Self {
        Self::SourceNotFound { what: what.into() }
    }

    pub(crate) fn install(name: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Install {
            name: name.into(),
            source,
        }
    }

    pub(crate) fn manifest(path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        Self::Manifest {
            path: path.into(),
            source,
        }
    }
}
