//! Dependency and source types.

use std::path::{Component, Path, PathBuf};

/// Version requested when a reference does not name one.
pub const DEFAULT_VERSION: &str = "master";

/// Scheme prefix for remotes cloned over SSH.
pub const GIT_SCHEME_SSH: &str = "ssh://git@";

/// Scheme prefix for remotes cloned over HTTPS.
pub const GIT_SCHEME_HTTPS: &str = "https://";

/// A dependency as declared in a manifest or pinned in a lock manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub source: Source,
    /// Ref, branch or tag for remote sources; an exact revision once
    /// locked. Empty for local sources.
    pub version: String,
    /// Integrity digest of the installed tree. Empty until resolved.
    pub sum: String,
    /// Short name older manifests used to address this dependency.
    pub legacy_name: Option<String>,
}

impl Dependency {
    pub fn new(source: Source, version: impl Into<String>) -> Self {
        Self {
            source,
            version: version.into(),
            sum: String::new(),
            legacy_name: None,
        }
    }

    /// Set the integrity digest.
    pub fn with_sum(mut self, sum: impl Into<String>) -> Self {
        self.sum = sum.into();
        self
    }

    /// Set the legacy alias.
    pub fn with_legacy_name(mut self, name: impl Into<String>) -> Self {
        self.legacy_name = Some(name.into());
        self
    }

    /// Canonical name, recomputed from the source on every call.
    pub fn name(&self) -> String {
        self.source.name()
    }

    /// Name used for the legacy relative-import alias.
    pub fn legacy_name(&self) -> String {
        match &self.legacy_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.source.legacy_name(),
        }
    }
}

/// Where a dependency's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Git(GitSource),
    Local(LocalSource),
}

impl Source {
    pub fn name(&self) -> String {
        match self {
            Self::Git(git) => git.name(),
            Self::Local(local) => local.name(),
        }
    }

    pub fn legacy_name(&self) -> String {
        match self {
            Self::Git(git) => git.legacy_name(),
            Self::Local(local) => local.name(),
        }
    }

    pub fn as_git(&self) -> Option<&GitSource> {
        match self {
            Self::Git(git) => Some(git),
            Self::Local(_) => None,
        }
    }

    pub fn as_local(&self) -> Option<&LocalSource> {
        match self {
            Self::Local(local) => Some(local),
            Self::Git(_) => None,
        }
    }
}

/// A remote git repository, optionally narrowed to a subdirectory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSource {
    /// Either [`GIT_SCHEME_HTTPS`] or [`GIT_SCHEME_SSH`].
    pub scheme: String,
    pub host: String,
    /// Owner path; may contain `/` for nested groups.
    pub user: String,
    pub repo: String,
    /// Empty, or a path starting with `/`.
    pub subdir: String,
}

impl GitSource {
    pub fn new(
        scheme: impl Into<String>,
        host: impl Into<String>,
        user: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            user: user.into(),
            repo: repo.into(),
            subdir: String::new(),
        }
    }

    /// Set the subdirectory, normalising it to a single leading `/`.
    pub fn with_subdir(mut self, subdir: &str) -> Self {
        self.subdir = normalize_subdir(subdir);
        self
    }

    /// `host/user/repo[/subdir]`
    pub fn name(&self) -> String {
        format!("{}/{}/{}{}", self.host, self.user, self.repo, self.subdir)
    }

    /// Last element of `repo + subdir`, e.g. `ksonnet.beta.4` for
    /// `github.com/ksonnet/ksonnet-lib/ksonnet.beta.4`.
    pub fn legacy_name(&self) -> String {
        let joined = format!("{}{}", self.repo, self.subdir);
        joined
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    }

    /// Remote URL that can be handed to `git`.
    pub fn remote(&self) -> String {
        format!("{}{}/{}/{}.git", self.scheme, self.host, self.user, self.repo)
    }

    /// Subdirectory without its leading separator.
    pub fn subdir_relative(&self) -> &str {
        self.subdir.trim_start_matches('/')
    }

    pub fn is_github(&self) -> bool {
        self.scheme == GIT_SCHEME_HTTPS && self.host == "github.com"
    }
}

/// A directory on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSource {
    /// Path as written in the manifest, relative to the manifest's directory
    /// unless absolute.
    pub directory: String,
}

impl LocalSource {
    pub fn new(directory: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Base name of the lexically cleaned directory path.
    ///
    /// A path that cleans to no final name (`.`, `..`, `a/..`) yields the
    /// cleaned path itself, which the resolver refuses to install.
    pub fn name(&self) -> String {
        let clean = clean_path(Path::new(&self.directory));
        match clean.components().next_back() {
            Some(Component::Normal(name)) => name.to_string_lossy().into_owned(),
            _ => clean.to_string_lossy().into_owned(),
        }
    }

    /// Absolute location of the source, resolved against `base_dir`.
    pub fn resolve_against(&self, base_dir: &Path) -> PathBuf {
        let path = Path::new(&self.directory);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }
}

/// Lexically normalise a path: drop `.` components and trailing separators,
/// and fold `..` into a preceding name. Leading `..` of a relative path are
/// kept; `..` directly under the root is dropped.
pub(crate) fn clean_path(path: &Path) -> PathBuf {
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = clean.components().next_back();
                if matches!(last, Some(Component::Normal(_))) {
                    clean.pop();
                } else if !matches!(last, Some(Component::RootDir | Component::Prefix(_))) {
                    clean.push("..");
                }
            }
            other => clean.push(other.as_os_str()),
        }
    }
    clean
}

pub(crate) fn normalize_subdir(subdir: &str) -> String {
    let trimmed = subdir.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
