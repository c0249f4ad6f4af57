//! Integrity checks that decide whether an installed dependency can be reused.

use std::path::Path;

use tracing::debug;

use crate::fs::hash_tree;
use crate::spec::Dependency;

/// Integrity sum of an installed directory.
pub fn digest(dir: &Path) -> anyhow::Result<String> {
    hash_tree(dir)
}

/// True when `dependency` carries a sum and it matches the content at `dir`.
///
/// A missing or unreadable directory is reported as invalid rather than as an
/// error; the caller reinstalls in that case.
pub fn is_valid(dependency: &Dependency, dir: &Path) -> bool {
    if dependency.sum.is_empty() {
        return false;
    }

    match digest(dir) {
        Ok(sum) if sum == dependency.sum => true,
        Ok(sum) => {
            debug!(
                dir = %dir.display(),
                expected = %dependency.sum,
                actual = %sum,
                "installed content does not match locked sum"
            );
            false
        }
        Err(err) => {
            debug!(dir = %dir.display(), error = %err, "installed content unreadable");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Dependency, LocalSource, Source};
    use std::fs;
    use tempfile::TempDir;

    fn dep_with_sum(sum: &str) -> Dependency {
        Dependency::new(Source::Local(LocalSource::new("lib")), "").with_sum(sum)
    }

    #[test]
    fn empty_sum_is_never_valid() {
        let tmp = TempDir::new().unwrap();
        assert!(!is_valid(&dep_with_sum(""), tmp.path()));
    }

    #[test]
    fn matching_sum_is_valid() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("main.libsonnet"), "{}").unwrap();
        let sum = digest(tmp.path()).unwrap();
        assert!(is_valid(&dep_with_sum(&sum), tmp.path()));
    }

    #[test]
    fn modified_content_is_invalid() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("main.libsonnet"), "{}").unwrap();
        let sum = digest(tmp.path()).unwrap();

        fs::write(tmp.path().join("main.libsonnet"), "{ tampered: true }").unwrap();
        assert!(!is_valid(&dep_with_sum(&sum), tmp.path()));
    }

    #[test]
    fn missing_directory_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let dep = dep_with_sum("47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=");
        assert!(!is_valid(&dep, &tmp.path().join("missing")));
    }
}
