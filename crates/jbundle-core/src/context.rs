//! Project context shared by the commands.

use std::path::{Path, PathBuf};

use crate::config::{ResolveOptions, Settings};
use crate::manifest::{LOCK_FILE, MANIFEST_FILE, ManifestStore};

/// Paths and settings for one project.
///
/// Frontends create this once and pass it to commands.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    project_root: PathBuf,
    install_dir: PathBuf,
    settings: Settings,
}

impl ProjectContext {
    /// Create a context for `project_root` with the given settings.
    pub fn new(project_root: impl Into<PathBuf>, settings: Settings) -> Self {
        let project_root = project_root.into();
        let install_dir = project_root.join(settings.install_dir());
        Self {
            project_root,
            install_dir,
            settings,
        }
    }

    /// Override the install directory. Relative paths are taken from the
    /// project root.
    pub fn with_install_dir(mut self, install_dir: impl AsRef<Path>) -> Self {
        self.install_dir = self.project_root.join(install_dir);
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.project_root.join(MANIFEST_FILE)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.project_root.join(LOCK_FILE)
    }

    pub fn manifest_store(&self) -> ManifestStore {
        ManifestStore::new(self.manifest_path())
    }

    pub fn lock_store(&self) -> ManifestStore {
        ManifestStore::new(self.lock_path())
    }

    /// Resolver options for this project.
    pub fn resolve_options(&self) -> ResolveOptions {
        let mut options = self.settings.resolve_options(&self.project_root, None);
        options.install_root = self.install_dir.clone();
        options
    }
}
