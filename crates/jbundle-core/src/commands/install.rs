//! Install command implementation.
//!
//! Adds the given references to the manifest, resolves the whole graph and
//! writes the manifest and lock.

use std::path::PathBuf;

use tracing::info;

use crate::context::ProjectContext;
use crate::error::{Error, Result};
use crate::install::{Backends, DefaultBackends, link_legacy_names};
use crate::manifest::Manifest;
use crate::resolve::Resolver;
use crate::spec::parse_required;

/// Outcome of an install or update.
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// Canonical names given on the command line.
    pub requested: Vec<String>,
    /// The lock manifest after resolution.
    pub lock: Manifest,
    /// Whether `jsonnetfile.json` was rewritten.
    pub manifest_written: bool,
    /// Whether `jsonnetfile.lock.json` was rewritten.
    pub lock_written: bool,
    /// Legacy import links created.
    pub links: Vec<PathBuf>,
}

/// Install command orchestrator.
#[derive(Debug)]
pub struct InstallCommand<'a> {
    ctx: &'a ProjectContext,
}

impl<'a> InstallCommand<'a> {
    pub fn new(ctx: &'a ProjectContext) -> Self {
        Self { ctx }
    }

    /// Install `references` (possibly none) with the real backends.
    pub fn execute(&self, references: &[String]) -> Result<InstallReport> {
        let backends = DefaultBackends::new(&self.ctx.resolve_options());
        self.execute_with(references, &backends)
    }

    pub fn execute_with<B: Backends>(
        &self,
        references: &[String],
        backends: B,
    ) -> Result<InstallReport> {
        let mut manifest = self.ctx.manifest_store().load()?;
        let mut prior = self.ctx.lock_store().load()?;

        let mut requested = Vec::new();
        for reference in references {
            let mut dependency = parse_required(self.ctx.project_root(), reference)?;
            let name = dependency.name();

            if let Some(existing) = manifest.get(&name) {
                if dependency.legacy_name.is_none() {
                    dependency.legacy_name = existing.legacy_name.clone();
                }
                if existing != &dependency {
                    prior.remove(&name);
                }
            }

            info!(dependency = %name, version = %dependency.version, "adding");
            manifest.insert(dependency);
            requested.push(name);
        }

        let mut report = apply(self.ctx, &manifest, &prior, backends)?;
        report.manifest_written = self.ctx.manifest_store().save_if_changed(&manifest)?;
        report.requested = requested;
        Ok(report)
    }
}

/// Resolve `manifest`, then write the lock and legacy links.
pub(crate) fn apply<B: Backends>(
    ctx: &ProjectContext,
    manifest: &Manifest,
    prior: &Manifest,
    backends: B,
) -> Result<InstallReport> {
    let resolver = Resolver::new(ctx.resolve_options(), backends);
    let lock = resolver.resolve(manifest, prior)?;

    let lock_written = ctx.lock_store().save_if_changed(&lock)?;

    let links = if manifest.legacy_imports {
        link_legacy_names(ctx.install_dir(), &lock)
            .map_err(|err| Error::install("legacy import links", err))?
    } else {
        Vec::new()
    };

    Ok(InstallReport {
        requested: Vec::new(),
        lock,
        manifest_written: false,
        lock_written,
        links,
    })
}
