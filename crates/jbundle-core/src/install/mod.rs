//! Source backends.
//!
//! A backend materializes one dependency at its install location and reports
//! the exact revision it installed. All backends stage their content in a
//! private temp directory and only touch the destination in the final swap,
//! so a failure leaves whatever was installed before intact.

pub mod legacy;
pub mod local;

use std::path::Path;

use anyhow::Context;
use tempfile::TempDir;

use crate::config::ResolveOptions;
use crate::error::{Error, Result};
use crate::git::GitInstaller;
use crate::spec::{Dependency, Source};

pub use legacy::link_legacy_names;
pub use local::LocalInstaller;

/// Installs one source.
pub trait Installer {
    /// Install `version` at `dest`, staging under `tmp_root`.
    ///
    /// Returns the resolved version: a commit id for git sources, empty for
    /// local ones.
    fn install(&self, tmp_root: &Path, dest: &Path, version: &str) -> Result<String>;
}

/// Chooses the installer for a dependency.
pub trait Backends {
    /// `base_dir` is the directory of the manifest that declared
    /// `dependency`; relative local sources resolve against it.
    fn backend_for(&self, dependency: &Dependency, base_dir: &Path) -> Box<dyn Installer + '_>;
}

impl<B: Backends + ?Sized> Backends for &B {
    fn backend_for(&self, dependency: &Dependency, base_dir: &Path) -> Box<dyn Installer + '_> {
        (**self).backend_for(dependency, base_dir)
    }
}

/// Real git and filesystem backends.
#[derive(Debug, Clone)]
pub struct DefaultBackends {
    git: String,
    github_archives: bool,
}

impl DefaultBackends {
    pub fn new(options: &ResolveOptions) -> Self {
        Self {
            git: options.git.clone(),
            github_archives: options.github_archives,
        }
    }
}

impl Backends for DefaultBackends {
    fn backend_for(&self, dependency: &Dependency, base_dir: &Path) -> Box<dyn Installer + '_> {
        match &dependency.source {
            Source::Git(git) => Box::new(
                GitInstaller::new(git.clone())
                    .with_git(self.git.clone())
                    .with_github_archives(self.github_archives),
            ),
            Source::Local(local) => Box::new(LocalInstaller::new(
                dependency.name(),
                local.resolve_against(base_dir),
            )),
        }
    }
}

/// Private staging directory under `tmp_root`, removed on drop.
pub(crate) fn staging_dir(tmp_root: &Path) -> anyhow::Result<TempDir> {
    std::fs::create_dir_all(tmp_root)
        .with_context(|| format!("Failed to create temp root: {}", tmp_root.display()))?;
    tempfile::Builder::new()
        .prefix("jb-")
        .tempdir_in(tmp_root)
        .with_context(|| format!("Failed to create temp directory in {}", tmp_root.display()))
}

/// Typed error for a backend failure. Typed errors raised inside the
/// backend pass through unchanged.
pub(crate) fn install_error(name: &str, err: anyhow::Error) -> Error {
    match err.downcast::<Error>() {
        Ok(err) => err,
        Err(err) => Error::install(name, err),
    }
}
