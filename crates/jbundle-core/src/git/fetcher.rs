//! Git installer for fetching a single revision and exporting a subdirectory.

use std::path::Path;
use std::process::Command;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::fs::replace_path;
use crate::install::{Installer, install_error, staging_dir};
use crate::spec::GitSource;

use super::archive;

/// Installs one revision of a git source.
#[derive(Debug, Clone)]
pub struct GitInstaller {
    source: GitSource,
    git: String,
    github_archives: bool,
    remote: Option<String>,
}

impl GitInstaller {
    pub fn new(source: GitSource) -> Self {
        Self {
            source,
            git: "git".to_string(),
            github_archives: true,
            remote: None,
        }
    }

    /// Use a different git executable.
    pub fn with_git(mut self, git: impl Into<String>) -> Self {
        self.git = git.into();
        self
    }

    pub fn with_github_archives(mut self, enabled: bool) -> Self {
        self.github_archives = enabled;
        self
    }

    /// Fetch from `remote` instead of the source's own remote URL.
    ///
    /// Archive downloads are skipped for overridden remotes.
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = Some(remote.into());
        self
    }

    fn remote(&self) -> String {
        self.remote.clone().unwrap_or_else(|| self.source.remote())
    }

    fn try_install(&self, tmp_root: &Path, dest: &Path, version: &str) -> anyhow::Result<String> {
        if self.github_archives && self.remote.is_none() && self.source.is_github() {
            match archive::install_archive(&self.source, tmp_root, dest, version) {
                Ok(commit) => return Ok(commit),
                Err(err) => warn!(
                    remote = %self.source.remote(),
                    version,
                    error = %format!("{err:#}"),
                    "archive download failed, falling back to git"
                ),
            }
        }

        let remote = self.remote();
        info!(remote = %remote, version, "fetching");

        let staging = staging_dir(tmp_root)?;
        let repo_dir = staging.path().join("repo");
        let repo = repo_dir.as_path();
        std::fs::create_dir(repo).with_context(|| format!("Failed to create {}", repo.display()))?;
        self.run_git(repo, &["init", "--quiet"])?;
        self.run_git(repo, &["remote", "add", "origin", &remote])?;

        let subdir = self.source.subdir_relative();
        if !subdir.is_empty() {
            self.run_git(repo, &["config", "core.sparsecheckout", "true"])?;
            let info_dir = repo.join(".git").join("info");
            std::fs::create_dir_all(&info_dir)
                .with_context(|| format!("Failed to create {}", info_dir.display()))?;
            std::fs::write(info_dir.join("sparse-checkout"), format!("/{}/*\n", subdir))
                .context("Failed to write sparse-checkout patterns")?;
        }

        let checkout_ref = match self.run_git(repo, &["fetch", "--depth", "1", "origin", version]) {
            Ok(()) => "FETCH_HEAD",
            Err(err) => {
                debug!(error = %format!("{err:#}"), "shallow fetch failed, fetching full history");
                if let Err(err) = self.run_git(repo, &["fetch", "--tags", "origin"]) {
                    debug!(error = %format!("{err:#}"), "full fetch failed");
                    return Err(Error::source_not_found(format!("{}@{}", remote, version)).into());
                }
                version
            }
        };

        if let Err(err) = self.run_git(
            repo,
            &["-c", "advice.detachedHead=false", "checkout", "--quiet", checkout_ref],
        ) {
            debug!(error = %format!("{err:#}"), "checkout failed");
            return Err(Error::source_not_found(format!("{}@{}", remote, version)).into());
        }

        let commit = self.git_rev_parse(repo, "HEAD")?;

        let git_dir = repo.join(".git");
        std::fs::remove_dir_all(&git_dir)
            .with_context(|| format!("Failed to remove {}", git_dir.display()))?;

        let content = if subdir.is_empty() {
            repo.to_path_buf()
        } else {
            repo.join(subdir)
        };
        if !content.is_dir() {
            return Err(Error::source_not_found(format!(
                "subdirectory {} in {}@{}",
                subdir, remote, version
            ))
            .into());
        }

        replace_path(&content, dest)?;
        Ok(commit)
    }

    /// Run a git command.
    fn run_git(&self, cwd: &Path, args: &[&str]) -> anyhow::Result<()> {
        self.git_output(cwd, args).map(|_| ())
    }

    /// Run git rev-parse and return the result.
    fn git_rev_parse(&self, cwd: &Path, rev: &str) -> anyhow::Result<String> {
        let stdout = self.git_output(cwd, &["rev-parse", rev])?;
        Ok(stdout.trim().to_string())
    }

    fn git_output(&self, cwd: &Path, args: &[&str]) -> anyhow::Result<String> {
        let output = Command::new(&self.git)
            .args(args)
            .current_dir(cwd)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .with_context(|| format!("Failed to run {} {:?}", self.git, args))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Git command failed {:?}: {}", args, stderr.trim());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Installer for GitInstaller {
    fn install(&self, tmp_root: &Path, dest: &Path, version: &str) -> Result<String> {
        self.try_install(tmp_root, dest, version)
            .map_err(|err| install_error(&self.source.name(), err))
    }
}
