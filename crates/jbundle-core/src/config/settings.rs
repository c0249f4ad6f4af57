//! User settings file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::options::{CollisionPolicy, DEFAULT_INSTALL_DIR, ResolveOptions};

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    pub github_archives: Option<bool>,
    pub collision_policy: Option<CollisionPolicy>,
    pub git: Option<String>,
    pub install_dir: Option<String>,
}

impl Settings {
    /// Load settings from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        parse_settings_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Load settings from the default location, if there is one.
    pub fn load_default() -> anyhow::Result<Self> {
        match default_settings_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Install directory, relative to the project root.
    pub fn install_dir(&self) -> &str {
        self.install_dir.as_deref().unwrap_or(DEFAULT_INSTALL_DIR)
    }

    /// Resolver options for a project rooted at `project_root`.
    ///
    /// `install_dir` overrides the configured install directory.
    pub fn resolve_options(&self, project_root: &Path, install_dir: Option<&str>) -> ResolveOptions {
        let install_dir = install_dir.unwrap_or_else(|| self.install_dir());
        let mut options = ResolveOptions::new(project_root.join(install_dir), project_root);
        if let Some(enabled) = self.github_archives {
            options = options.with_github_archives(enabled);
        }
        if let Some(policy) = self.collision_policy {
            options = options.with_collision_policy(policy);
        }
        if let Some(git) = &self.git {
            options = options.with_git(git.clone());
        }
        options
    }
}

/// Parse settings from TOML text.
pub fn parse_settings_str(content: &str) -> anyhow::Result<Settings> {
    let settings: Settings = toml::from_str(content).context("Invalid settings TOML")?;
    if let Some(dir) = &settings.install_dir
        && dir.trim().is_empty()
    {
        anyhow::bail!("install-dir must not be empty");
    }
    Ok(settings)
}

/// `<config_dir>/jbundle/config.toml`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("jbundle").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_settings_use_defaults() {
        let settings = parse_settings_str("").unwrap();
        assert_eq!(settings, Settings::default());

        let options = settings.resolve_options(Path::new("/project"), None);
        assert_eq!(options.install_root, PathBuf::from("/project/vendor"));
        assert_eq!(options.base_dir, PathBuf::from("/project"));
        assert_eq!(options.collision_policy, CollisionPolicy::FirstWins);
        assert!(options.github_archives);
        assert_eq!(options.git, "git");
    }

    #[test]
    fn settings_override_options() {
        let settings = parse_settings_str(
            r#"
github-archives = false
collision-policy = "strict"
git = "/usr/local/bin/git"
install-dir = "jsonnet_modules"
"#,
        )
        .unwrap();

        let options = settings.resolve_options(Path::new("/project"), None);
        assert_eq!(options.install_root, PathBuf::from("/project/jsonnet_modules"));
        assert_eq!(options.collision_policy, CollisionPolicy::Strict);
        assert!(!options.github_archives);
        assert_eq!(options.git, "/usr/local/bin/git");

        let options = settings.resolve_options(Path::new("/project"), Some("lib"));
        assert_eq!(options.install_root, PathBuf::from("/project/lib"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_settings_str("registry = \"x\"").is_err());
        assert!(parse_settings_str("collision-policy = \"last-wins\"").is_err());
        assert!(parse_settings_str("install-dir = \" \"").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn load_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "collision-policy = \"first-wins\"\n").unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.collision_policy, Some(CollisionPolicy::FirstWins));
    }
}
