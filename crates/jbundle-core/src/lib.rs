//! jbundle core library
//!
//! Provides dependency resolution for jsonnet projects: parsing package
//! references, installing git and local sources into a vendor directory,
//! verifying installed content against locked checksums, and reading and
//! writing `jsonnetfile.json` / `jsonnetfile.lock.json`.

pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod fs;
pub mod git;
pub mod install;
pub mod integrity;
pub mod manifest;
pub mod resolve;
pub mod spec;

pub use error::{Error, Result};

/// Re-exports of commonly used types
pub mod prelude {
    // Commands
    pub use crate::commands::{InstallCommand, InstallReport, UpdateCommand};

    // Configuration
    pub use crate::config::{CollisionPolicy, ResolveOptions, Settings};
    pub use crate::context::ProjectContext;

    // Dependencies
    pub use crate::spec::{Dependency, GitSource, LocalSource, Source};

    // Manifests
    pub use crate::manifest::{LOCK_FILE, MANIFEST_FILE, Manifest, ManifestStore};

    // Resolution
    pub use crate::install::{Backends, DefaultBackends, Installer};
    pub use crate::resolve::Resolver;

    pub use crate::error::{Error, Result};
}
