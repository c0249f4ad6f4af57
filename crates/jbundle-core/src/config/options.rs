//! Resolver options.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Directory dependencies are installed into, relative to the project root.
pub const DEFAULT_INSTALL_DIR: &str = "vendor";

const TMP_DIR: &str = ".tmp";

/// How to treat a canonical name requested again with a different version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// The first resolved entry wins; later requests reuse it.
    #[default]
    FirstWins,
    /// A later request for a different version is an error.
    Strict,
}

impl CollisionPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            CollisionPolicy::FirstWins => "first-wins",
            CollisionPolicy::Strict => "strict",
        }
    }
}

/// Everything the resolver needs besides the manifests themselves.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Root that canonical names are installed under.
    pub install_root: PathBuf,
    /// Directory that relative local sources in the top-level manifest are
    /// resolved against.
    pub base_dir: PathBuf,
    pub collision_policy: CollisionPolicy,
    /// Download GitHub archives instead of cloning when possible.
    pub github_archives: bool,
    /// Git executable.
    pub git: String,
}

impl ResolveOptions {
    pub fn new(install_root: impl Into<PathBuf>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_root: install_root.into(),
            base_dir: base_dir.into(),
            collision_policy: CollisionPolicy::default(),
            github_archives: true,
            git: "git".to_string(),
        }
    }

    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    pub fn with_github_archives(mut self, enabled: bool) -> Self {
        self.github_archives = enabled;
        self
    }

    pub fn with_git(mut self, git: impl Into<String>) -> Self {
        self.git = git.into();
        self
    }

    /// Install location of a canonical name.
    pub fn install_path(&self, name: &str) -> PathBuf {
        self.install_root.join(name)
    }

    /// Install location of a canonical name, or `None` unless the name is a
    /// plain relative path strictly below the install root and outside the
    /// temp directory.
    pub fn contained_install_path(&self, name: &str) -> Option<PathBuf> {
        let path = Path::new(name);
        let mut components = path.components().peekable();
        let contained = components
            .peek()
            .is_some_and(|first| first.as_os_str() != TMP_DIR)
            && components.all(|component| matches!(component, Component::Normal(_)));
        contained.then(|| self.install_root.join(path))
    }

    /// Parent of the private per-install temp directories.
    pub fn tmp_root(&self) -> PathBuf {
        self.install_root.join(TMP_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contained_install_path_accepts_plain_names() {
        let options = ResolveOptions::new("/p/vendor", "/p");
        assert_eq!(
            options.contained_install_path("github.com/org/repo/lib"),
            Some(PathBuf::from("/p/vendor/github.com/org/repo/lib"))
        );
        assert_eq!(
            options.contained_install_path("mylib"),
            Some(PathBuf::from("/p/vendor/mylib"))
        );
    }

    #[test]
    fn contained_install_path_refuses_escapes() {
        let options = ResolveOptions::new("/p/vendor", "/p");
        for name in ["", ".", "..", "a/..", "../x", "github.com/u/r/../../..", "/etc", ".tmp", ".tmp/x"] {
            assert_eq!(options.contained_install_path(name), None, "{name}");
        }
    }
}
