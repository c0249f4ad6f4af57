//! Local directory backend.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::error::{Error, Result};
use crate::fs::{create_dir_symlink, replace_path};

use super::{Installer, install_error, staging_dir};

/// Installs a local directory as a symlink to its absolute path.
#[derive(Debug, Clone)]
pub struct LocalInstaller {
    name: String,
    source: PathBuf,
}

impl LocalInstaller {
    /// `source` is the directory as resolved against the declaring manifest.
    pub fn new(name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    fn link(&self, tmp_root: &Path, dest: &Path) -> anyhow::Result<()> {
        let target = std::fs::canonicalize(&self.source)
            .with_context(|| format!("Failed to resolve {}", self.source.display()))?;

        let staging = staging_dir(tmp_root)?;
        let link = staging.path().join("link");
        create_dir_symlink(&target, &link).with_context(|| {
            format!(
                "Failed to link {} -> {}",
                link.display(),
                target.display()
            )
        })?;
        replace_path(&link, dest)?;

        debug!(target = %target.display(), dest = %dest.display(), "linked local dependency");
        Ok(())
    }
}

impl Installer for LocalInstaller {
    fn install(&self, tmp_root: &Path, dest: &Path, _version: &str) -> Result<String> {
        let is_dir = std::fs::metadata(&self.source)
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(Error::source_not_found(format!(
                "local directory {}",
                self.source.display()
            )));
        }

        self.link(tmp_root, dest)
            .map_err(|err| install_error(&self.name, err))?;
        Ok(String::new())
    }
}
