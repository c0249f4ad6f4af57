//! Update command implementation.
//!
//! Re-resolves dependencies while ignoring their locked revisions: all of
//! them when no references are given, otherwise only the named ones.

use tracing::info;

use crate::context::ProjectContext;
use crate::error::Result;
use crate::install::{Backends, DefaultBackends};
use crate::manifest::Manifest;
use crate::spec::parse_required;

use super::install::{InstallReport, apply};

/// Update command orchestrator.
#[derive(Debug)]
pub struct UpdateCommand<'a> {
    ctx: &'a ProjectContext,
}

impl<'a> UpdateCommand<'a> {
    pub fn new(ctx: &'a ProjectContext) -> Self {
        Self { ctx }
    }

    pub fn execute(&self, references: &[String]) -> Result<InstallReport> {
        let backends = DefaultBackends::new(&self.ctx.resolve_options());
        self.execute_with(references, &backends)
    }

    pub fn execute_with<B: Backends>(
        &self,
        references: &[String],
        backends: B,
    ) -> Result<InstallReport> {
        let manifest = self.ctx.manifest_store().load()?;

        let mut requested = Vec::new();
        let prior = if references.is_empty() {
            info!("updating all dependencies");
            Manifest::new()
        } else {
            let mut prior = self.ctx.lock_store().load()?;
            for reference in references {
                let name = parse_required(self.ctx.project_root(), reference)?.name();
                info!(dependency = %name, "updating");
                prior.remove(&name);
                requested.push(name);
            }
            prior
        };

        let mut report = apply(self.ctx, &manifest, &prior, backends)?;
        report.requested = requested;
        Ok(report)
    }
}
