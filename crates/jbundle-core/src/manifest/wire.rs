//! JSON representation of manifests and lock manifests.
//!
//! On disk, dependencies are a list sorted by canonical name; in memory they
//! are an ordered map. [`to_wire_list`] and [`from_wire_list`] convert
//! between the two.

use serde::{Deserialize, Serialize};

use crate::spec::{Dependency, GitSource, LocalSource, MATCHERS, Source, normalize_subdir};

use super::types::{Manifest, SCHEMA_VERSION};

/// Top-level document shared by `jsonnetfile.json` and
/// `jsonnetfile.lock.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFile {
    #[serde(default)]
    pub version: u32,

    #[serde(default)]
    pub dependencies: Vec<WireDependency>,

    #[serde(rename = "legacyImports", default = "default_legacy_imports")]
    pub legacy_imports: bool,
}

fn default_legacy_imports() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDependency {
    /// Legacy alias. Never the canonical name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    pub source: WireSource,

    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sum: String,
}

/// Exactly one of `git` or `local` is expected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<WireGit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<WireLocal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireGit {
    pub remote: String,
    /// Stored without a leading separator.
    #[serde(default)]
    pub subdir: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireLocal {
    pub directory: String,
}

/// Sorted wire list for a manifest.
pub fn to_wire_list(manifest: &Manifest) -> Vec<WireDependency> {
    let mut entries: Vec<(String, WireDependency)> = manifest
        .iter()
        .map(|dep| (dep.name(), to_wire_dependency(dep)))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries.into_iter().map(|(_, wire)| wire).collect()
}

/// Dependencies from a wire list, keyed by recomputed canonical name.
///
/// A later entry with the same canonical name replaces an earlier one.
pub fn from_wire_list(list: Vec<WireDependency>) -> anyhow::Result<Vec<Dependency>> {
    let mut manifest = Manifest::new();
    for wire in list {
        let source = source_from_wire(&wire.source)?;
        let mut dependency = Dependency::new(source, wire.version).with_sum(wire.sum);
        if !wire.name.is_empty() {
            dependency = dependency.with_legacy_name(wire.name);
        }
        manifest.insert(dependency);
    }
    Ok(manifest.into_iter().collect())
}

/// Wire document for a manifest at the current schema version.
pub fn to_wire_file(manifest: &Manifest) -> WireFile {
    WireFile {
        version: SCHEMA_VERSION,
        dependencies: to_wire_list(manifest),
        legacy_imports: manifest.legacy_imports,
    }
}

/// Manifest from a current-schema wire document.
pub fn from_wire_file(file: WireFile) -> anyhow::Result<Manifest> {
    let dependencies = from_wire_list(file.dependencies)?;
    Ok(Manifest::from_dependencies(dependencies).with_legacy_imports(file.legacy_imports))
}

fn to_wire_dependency(dep: &Dependency) -> WireDependency {
    let source = match &dep.source {
        Source::Git(git) => WireSource {
            git: Some(WireGit {
                remote: git.remote(),
                subdir: git.subdir_relative().to_string(),
            }),
            local: None,
        },
        Source::Local(local) => WireSource {
            git: None,
            local: Some(WireLocal {
                directory: local.directory.clone(),
            }),
        },
    };

    WireDependency {
        name: dep.legacy_name.clone().unwrap_or_default(),
        source,
        version: dep.version.clone(),
        sum: dep.sum.clone(),
    }
}

pub(crate) fn source_from_wire(source: &WireSource) -> anyhow::Result<Source> {
    match (&source.git, &source.local) {
        (Some(git), None) => {
            let mut parsed = git_source_from_remote(&git.remote)?;
            parsed.subdir = normalize_subdir(&git.subdir);
            Ok(Source::Git(parsed))
        }
        (None, Some(local)) => Ok(Source::Local(LocalSource::new(local.directory.clone()))),
        (Some(_), Some(_)) => anyhow::bail!("Dependency source has both git and local entries"),
        (None, None) => anyhow::bail!("Dependency source requires either git or local"),
    }
}

/// Re-derive host, user and repo from a remote URL.
pub(crate) fn git_source_from_remote(remote: &str) -> anyhow::Result<GitSource> {
    MATCHERS
        .iter()
        .find_map(|matcher| matcher.parse(remote))
        .and_then(|dep| match dep.source {
            Source::Git(git) => Some(git),
            Source::Local(_) => None,
        })
        .ok_or_else(|| anyhow::anyhow!("Unrecognised git remote: {}", remote))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{GIT_SCHEME_HTTPS, GIT_SCHEME_SSH};

    fn git_dep(user: &str, repo: &str, subdir: &str) -> Dependency {
        Dependency::new(
            Source::Git(
                GitSource::new(GIT_SCHEME_HTTPS, "github.com", user, repo).with_subdir(subdir),
            ),
            "master",
        )
    }

    #[test]
    fn to_wire_list_sorts_by_canonical_name() {
        let manifest = Manifest::from_dependencies([
            git_dep("zeta", "lib", ""),
            git_dep("alpha", "lib", "sub"),
            Dependency::new(Source::Local(LocalSource::new("vendor-local/mid")), ""),
        ]);

        let list = to_wire_list(&manifest);
        let remotes: Vec<_> = list
            .iter()
            .map(|wire| {
                wire.source
                    .git
                    .as_ref()
                    .map(|git| git.remote.clone())
                    .unwrap_or_else(|| wire.source.local.as_ref().unwrap().directory.clone())
            })
            .collect();
        assert_eq!(
            remotes,
            vec![
                "https://github.com/alpha/lib.git",
                "https://github.com/zeta/lib.git",
                "vendor-local/mid",
            ]
        );
        assert_eq!(list[0].source.git.as_ref().unwrap().subdir, "sub");
    }

    #[test]
    fn from_wire_list_recomputes_names() {
        let list = vec![WireDependency {
            name: "prometheus".to_string(),
            source: WireSource {
                git: Some(WireGit {
                    remote: "https://github.com/prometheus/prometheus".to_string(),
                    subdir: "documentation/prometheus-mixin".to_string(),
                }),
                local: None,
            },
            version: "7c039a6b3b4b2a9d7c613ac8bd3fc16e8ca79684".to_string(),
            sum: "bVGOsq3hLOw2irNPAS91a5dZJqQlBUNWy3pVwM4+kIY=".to_string(),
        }];

        let deps = from_wire_list(list).unwrap();
        assert_eq!(deps.len(), 1);
        let dep = &deps[0];
        assert_eq!(
            dep.name(),
            "github.com/prometheus/prometheus/documentation/prometheus-mixin"
        );
        assert_eq!(dep.legacy_name.as_deref(), Some("prometheus"));
        assert_eq!(dep.source.as_git().unwrap().subdir, "/documentation/prometheus-mixin");
    }

    #[test]
    fn from_wire_list_keeps_ssh_scheme() {
        let list = vec![WireDependency {
            name: String::new(),
            source: WireSource {
                git: Some(WireGit {
                    remote: "ssh://git@example.com/user/repo.git".to_string(),
                    subdir: String::new(),
                }),
                local: None,
            },
            version: "v1".to_string(),
            sum: String::new(),
        }];

        let deps = from_wire_list(list).unwrap();
        let git = deps[0].source.as_git().unwrap();
        assert_eq!(git.scheme, GIT_SCHEME_SSH);
        assert_eq!(git.remote(), "ssh://git@example.com/user/repo.git");
    }

    #[test]
    fn from_wire_list_rejects_ambiguous_source() {
        let list = vec![WireDependency {
            name: String::new(),
            source: WireSource::default(),
            version: String::new(),
            sum: String::new(),
        }];
        assert!(from_wire_list(list).is_err());
    }

    #[test]
    fn wire_file_round_trip() {
        for manifest in [
            Manifest::new(),
            Manifest::from_dependencies([git_dep("grafana", "jsonnet-libs", "grafana-builder")]),
            Manifest::from_dependencies([
                git_dep("grafana", "jsonnet-libs", "grafana-builder"),
                git_dep("grafana", "jsonnet-libs", ""),
                Dependency::new(Source::Local(LocalSource::new("libs/local")), "")
                    .with_sum("47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="),
            ])
            .with_legacy_imports(false),
        ] {
            let restored = from_wire_file(to_wire_file(&manifest)).unwrap();
            assert_eq!(restored, manifest);
        }
    }
}
