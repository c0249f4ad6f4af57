//! In-memory manifest model.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::spec::Dependency;

/// File name of a dependency manifest.
pub const MANIFEST_FILE: &str = "jsonnetfile.json";

/// File name of a lock manifest.
pub const LOCK_FILE: &str = "jsonnetfile.lock.json";

/// Current schema discriminant written to disk.
pub const SCHEMA_VERSION: u32 = 1;

/// An ordered set of dependencies keyed by canonical name.
///
/// Used both for declared manifests and for lock manifests. Iteration follows
/// insertion order, which for a loaded file is the file's order and for a
/// resolved lock is resolution order. Serialization sorts by name regardless.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Whether consumers import dependencies by their short legacy names
    /// rather than canonical absolute paths.
    pub legacy_imports: bool,
    dependencies: Vec<Dependency>,
}

impl Manifest {
    /// Create an empty manifest using legacy imports.
    pub fn new() -> Self {
        Self {
            legacy_imports: true,
            dependencies: Vec::new(),
        }
    }

    /// Set the import style flag.
    pub fn with_legacy_imports(mut self, legacy_imports: bool) -> Self {
        self.legacy_imports = legacy_imports;
        self
    }

    /// Build a manifest from dependencies in order.
    pub fn from_dependencies(dependencies: impl IntoIterator<Item = Dependency>) -> Self {
        let mut manifest = Self::new();
        for dependency in dependencies {
            manifest.insert(dependency);
        }
        manifest
    }

    /// Add or replace a dependency.
    ///
    /// A dependency whose canonical name is already present replaces the
    /// existing entry in place and the old entry is returned.
    pub fn insert(&mut self, dependency: Dependency) -> Option<Dependency> {
        let name = dependency.name();
        match self.position(&name) {
            Some(index) => Some(std::mem::replace(&mut self.dependencies[index], dependency)),
            None => {
                self.dependencies.push(dependency);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Dependency> {
        self.position(name).map(|index| &self.dependencies[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Dependency> {
        self.position(name)
            .map(|index| self.dependencies.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = String> + '_ {
        self.dependencies.iter().map(Dependency::name)
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Canonical name to install location under `install_root`.
    ///
    /// This is all an import rewriter needs from a lock manifest.
    pub fn installed_paths(&self, install_root: &Path) -> BTreeMap<String, PathBuf> {
        self.names()
            .map(|name| {
                let path = install_root.join(&name);
                (name, path)
            })
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.dependencies.iter().position(|dep| dep.name() == name)
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoIterator for Manifest {
    type Item = Dependency;
    type IntoIter = std::vec::IntoIter<Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.dependencies.into_iter()
    }
}

/// Manifests compare as sets: the same names with the same entries.
impl PartialEq for Manifest {
    fn eq(&self, other: &Self) -> bool {
        self.legacy_imports == other.legacy_imports
            && self.len() == other.len()
            && self
                .iter()
                .all(|dep| other.get(&dep.name()) == Some(dep))
    }
}

impl Eq for Manifest {}
