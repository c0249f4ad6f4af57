//! Resolution of a manifest into a lock manifest.
//!
//! Declared dependencies are installed (or reused from a prior lock when the
//! installed content still matches its sum), then the manifest inside each
//! installed dependency is resolved the same way, depth-first. The walk uses
//! an explicit stack of frames, one per manifest being expanded.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

use tracing::{debug, info};

use crate::config::{CollisionPolicy, ResolveOptions};
use crate::error::{Error, Result};
use crate::fs::replace_path;
use crate::install::{Backends, DefaultBackends, install_error, staging_dir};
use crate::integrity;
use crate::manifest::{MANIFEST_FILE, Manifest, ManifestStore};
use crate::spec::Dependency;

/// A manifest whose resolved entries are waiting to be expanded.
#[derive(Debug)]
struct Frame {
    /// Dependency the manifest belongs to; `None` for the top-level manifest.
    owner: Option<String>,
    pending: VecDeque<String>,
}

/// State of one resolution pass.
#[derive(Debug)]
struct Pass<'p> {
    prior: &'p Manifest,
    lock: Manifest,
    /// Version each resolved name was first requested at.
    requested: HashMap<String, String>,
    expanded: HashSet<String>,
}

/// Builds lock manifests.
#[derive(Debug)]
pub struct Resolver<B = DefaultBackends> {
    options: ResolveOptions,
    backends: B,
}

impl Resolver<DefaultBackends> {
    /// Resolver using the real git and filesystem backends.
    pub fn with_default_backends(options: ResolveOptions) -> Self {
        let backends = DefaultBackends::new(&options);
        Self::new(options, backends)
    }
}

impl<B: Backends> Resolver<B> {
    pub fn new(options: ResolveOptions, backends: B) -> Self {
        Self { options, backends }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve `manifest` against `prior_lock`, installing whatever is
    /// missing or no longer matches its sum.
    ///
    /// Returns the lock manifest for the whole graph. Nothing is written
    /// besides the installed dependencies themselves.
    pub fn resolve(&self, manifest: &Manifest, prior_lock: &Manifest) -> Result<Manifest> {
        debug!(
            install_root = %self.options.install_root.display(),
            policy = self.options.collision_policy.as_str(),
            "resolving"
        );
        let mut pass = Pass {
            prior: prior_lock,
            lock: Manifest::new().with_legacy_imports(manifest.legacy_imports),
            requested: HashMap::new(),
            expanded: HashSet::new(),
        };

        let result = self.walk(manifest, &mut pass);
        // Only succeeds once every staging directory is gone.
        let _ = std::fs::remove_dir(self.options.tmp_root());
        result?;

        info!(dependencies = pass.lock.len(), "resolved");
        Ok(pass.lock)
    }

    fn walk(&self, manifest: &Manifest, pass: &mut Pass<'_>) -> Result<()> {
        let names = self.resolve_level(manifest.iter(), &self.options.base_dir, &[], pass)?;
        let mut stack = vec![Frame {
            owner: None,
            pending: names.into(),
        }];

        loop {
            let Some(frame) = stack.last_mut() else {
                break;
            };
            let Some(name) = frame.pending.pop_front() else {
                stack.pop();
                continue;
            };
            if !pass.expanded.insert(name.clone()) {
                continue;
            }

            let dir = self.options.install_path(&name);
            let nested_path = dir.join(MANIFEST_FILE);
            if !nested_path.is_file() {
                continue;
            }
            debug!(dependency = %name, "expanding nested manifest");
            let nested = ManifestStore::new(&nested_path).load()?;

            let mut path: Vec<String> = stack.iter().filter_map(|f| f.owner.clone()).collect();
            path.push(name.clone());

            let names = self.resolve_level(nested.iter(), &dir, &path, pass)?;
            stack.push(Frame {
                owner: Some(name),
                pending: names.into(),
            });
        }

        Ok(())
    }

    /// Resolve the entries of one manifest, returning the names newly added
    /// to the lock in declaration order.
    fn resolve_level<'d>(
        &self,
        entries: impl Iterator<Item = &'d Dependency>,
        base_dir: &Path,
        path: &[String],
        pass: &mut Pass<'_>,
    ) -> Result<Vec<String>> {
        let mut added = Vec::new();

        for dependency in entries {
            let name = dependency.name();

            if path.contains(&name) {
                let mut cycle = path.to_vec();
                cycle.push(name);
                return Err(Error::CycleDetected { path: cycle });
            }

            if pass.lock.contains(&name) {
                let existing = pass.requested.get(&name).cloned().unwrap_or_default();
                if existing != dependency.version {
                    match self.options.collision_policy {
                        CollisionPolicy::Strict => {
                            return Err(Error::NameCollision {
                                name,
                                existing,
                                requested: dependency.version.clone(),
                            });
                        }
                        CollisionPolicy::FirstWins => debug!(
                            dependency = %name,
                            kept = %existing,
                            ignored = %dependency.version,
                            "keeping first requested version"
                        ),
                    }
                }
                continue;
            }

            let resolved = self.ensure(dependency, base_dir, pass.prior)?;
            pass.lock.insert(resolved);
            pass.requested.insert(name.clone(), dependency.version.clone());
            added.push(name);
        }

        Ok(added)
    }

    /// Reuse a valid prior lock entry or install the dependency.
    ///
    /// Fresh content is staged and checked against any declared sum before
    /// it replaces what is installed.
    fn ensure(&self, dependency: &Dependency, base_dir: &Path, prior: &Manifest) -> Result<Dependency> {
        let name = dependency.name();
        let dest = self.options.contained_install_path(&name).ok_or_else(|| {
            Error::install(
                &name,
                anyhow::anyhow!(
                    "install location escapes {}",
                    self.options.install_root.display()
                ),
            )
        })?;

        if let Some(locked) = prior.get(&name)
            && locked.source == dependency.source
            && (dependency.sum.is_empty() || dependency.sum == locked.sum)
            && integrity::is_valid(locked, &dest)
        {
            debug!(dependency = %name, version = %locked.version, "up to date");
            return Ok(locked.clone());
        }

        info!(dependency = %name, version = %dependency.version, "installing");
        let tmp_root = self.options.tmp_root();
        let staging = staging_dir(&tmp_root).map_err(|err| install_error(&name, err))?;
        let staged = staging.path().join("content");

        let installer = self.backends.backend_for(dependency, base_dir);
        let version = installer.install(&tmp_root, &staged, &dependency.version)?;
        let sum = integrity::digest(&staged).map_err(|err| install_error(&name, err))?;

        if !dependency.sum.is_empty() && dependency.sum != sum {
            return Err(Error::ChecksumMismatch {
                name,
                expected: dependency.sum.clone(),
                actual: sum,
            });
        }

        replace_path(&staged, &dest).map_err(|err| install_error(&name, err))?;

        let mut resolved = Dependency::new(dependency.source.clone(), version).with_sum(sum);
        resolved.legacy_name = dependency.legacy_name.clone();
        Ok(resolved)
    }
}
