//! Upgrade of schema version 0 documents.
//!
//! Version 0 keyed dependencies by a user-chosen `name` and stored full
//! remote URLs. The upgrade re-derives the canonical identity from the
//! remote, keeps the old name as the legacy alias, and turns legacy imports
//! on. It never touches the network or the filesystem.

use serde::Deserialize;

use crate::spec::{Dependency, LocalSource, Source, normalize_subdir};

use super::types::Manifest;
use super::wire::{WireSource, git_source_from_remote};

#[derive(Debug, Clone, Deserialize)]
pub struct V0File {
    #[serde(default)]
    pub dependencies: Vec<V0Dependency>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V0Dependency {
    pub name: String,
    pub source: WireSource,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub sum: String,
}

/// Convert a version 0 document into the current model.
pub fn upgrade_v0(file: V0File) -> anyhow::Result<Manifest> {
    let mut manifest = Manifest::new().with_legacy_imports(true);

    for old in file.dependencies {
        let source = match (&old.source.git, &old.source.local) {
            (Some(git), _) => {
                let mut parsed = git_source_from_remote(&git.remote)?;
                parsed.subdir = normalize_subdir(&git.subdir);
                Source::Git(parsed)
            }
            (None, Some(local)) => Source::Local(LocalSource::new(local.directory.clone())),
            (None, None) => {
                anyhow::bail!("Dependency {} requires either a git or local source", old.name)
            }
        };

        let mut dependency = Dependency::new(source, old.version).with_sum(old.sum);
        if !old.name.is_empty() {
            dependency = dependency.with_legacy_name(old.name);
        }
        manifest.insert(dependency);
    }

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    const V0_JSON: &str = r#"{
  "dependencies": [
    {
      "name": "grafana-builder",
      "source": {
        "git": {
          "remote": "https://github.com/grafana/jsonnet-libs",
          "subdir": "grafana-builder"
        }
      },
      "version": "54865853ebc1f901964e25a2e7a0e4d2cb6b9648",
      "sum": "ELsYwK+kGdzX1mee2Yy+/b2mdO4Y503BOCDkFzwmGbE="
    },
    {
      "name": "ksonnet",
      "source": {
        "git": {
          "remote": "https://github.com/ksonnet/ksonnet-lib",
          "subdir": ""
        }
      },
      "version": "master"
    },
    {
      "name": "mylib",
      "source": {
        "local": {
          "directory": "libs/mylib"
        }
      },
      "version": ""
    }
  ]
}"#;

    #[test]
    fn upgrade_rederives_canonical_names() {
        let file: V0File = serde_json::from_str(V0_JSON).unwrap();
        let manifest = upgrade_v0(file).unwrap();

        assert!(manifest.legacy_imports);
        let names: Vec<_> = manifest.names().collect();
        assert_eq!(
            names,
            vec![
                "github.com/grafana/jsonnet-libs/grafana-builder",
                "github.com/ksonnet/ksonnet-lib",
                "mylib",
            ]
        );

        let builder = manifest
            .get("github.com/grafana/jsonnet-libs/grafana-builder")
            .unwrap();
        assert_eq!(builder.version, "54865853ebc1f901964e25a2e7a0e4d2cb6b9648");
        assert_eq!(builder.sum, "ELsYwK+kGdzX1mee2Yy+/b2mdO4Y503BOCDkFzwmGbE=");
        assert_eq!(builder.legacy_name.as_deref(), Some("grafana-builder"));

        let ksonnet = manifest.get("github.com/ksonnet/ksonnet-lib").unwrap();
        assert_eq!(ksonnet.source.as_git().unwrap().subdir, "");
        assert_eq!(ksonnet.legacy_name(), "ksonnet");
    }

    #[test]
    fn upgrade_rejects_unknown_remote() {
        let file: V0File = serde_json::from_str(
            r#"{"dependencies":[{"name":"x","source":{"git":{"remote":"not a url","subdir":""}},"version":"master"}]}"#,
        )
        .unwrap();
        assert!(upgrade_v0(file).is_err());
    }
}
