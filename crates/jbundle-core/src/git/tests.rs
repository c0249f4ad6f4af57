//! Tests for the git module.
//!
//! Fixture repositories are built with git2 and fetched through their local
//! path, so these tests need a `git` executable but no network.

use std::fs;
use std::path::Path;

use git2::{IndexAddOption, Oid, Repository, Signature};
use tempfile::TempDir;

use super::*;
use crate::error::Error;
use crate::install::Installer;
use crate::spec::{GIT_SCHEME_HTTPS, GitSource};

fn commit_all(repo: &Repository, message: &str) -> Oid {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let sig = Signature::now("jbundle", "jbundle@example.com").unwrap();
    match repo.head() {
        Ok(head) => {
            let parent = repo.find_commit(head.target().unwrap()).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])
                .unwrap()
        }
        Err(_) => repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[])
            .unwrap(),
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Repository with a library subdirectory, a `release` branch and a `v1` tag
/// on the first commit.
struct Fixture {
    dir: TempDir,
    first: Oid,
    second: Oid,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        write(dir.path(), "README.md", "fixture");
        write(dir.path(), "lib/main.libsonnet", "{ version: 1 }");
        let first = commit_all(&repo, "first");
        let commit = repo.find_commit(first).unwrap();
        repo.tag_lightweight("v1", commit.as_object(), false).unwrap();

        write(dir.path(), "lib/main.libsonnet", "{ version: 2 }");
        write(dir.path(), "lib/nested/util.libsonnet", "{}");
        let second = commit_all(&repo, "second");
        let commit = repo.find_commit(second).unwrap();
        repo.branch("release", &commit, true).unwrap();

        Self { dir, first, second }
    }

    fn remote(&self) -> String {
        self.dir.path().to_string_lossy().into_owned()
    }

    fn installer(&self, subdir: &str) -> GitInstaller {
        let source =
            GitSource::new(GIT_SCHEME_HTTPS, "example.com", "org", "fixture").with_subdir(subdir);
        GitInstaller::new(source)
            .with_github_archives(false)
            .with_remote(self.remote())
    }
}

mod git_installer_tests {
    use super::*;

    #[test]
    fn installs_branch_head() {
        let fixture = Fixture::new();
        let out = TempDir::new().unwrap();
        let dest = out.path().join("vendor/example.com/org/fixture");

        let commit = fixture
            .installer("")
            .install(&out.path().join("vendor/.tmp"), &dest, "release")
            .unwrap();

        assert_eq!(commit, fixture.second.to_string());
        assert!(dest.join("README.md").is_file());
        assert_eq!(
            fs::read_to_string(dest.join("lib/main.libsonnet")).unwrap(),
            "{ version: 2 }"
        );
        assert!(!dest.join(".git").exists());
    }

    #[test]
    fn installs_only_subdir() {
        let fixture = Fixture::new();
        let out = TempDir::new().unwrap();
        let dest = out.path().join("vendor/example.com/org/fixture/lib");

        fixture
            .installer("lib")
            .install(&out.path().join("vendor/.tmp"), &dest, "release")
            .unwrap();

        assert!(dest.join("main.libsonnet").is_file());
        assert!(dest.join("nested/util.libsonnet").is_file());
        assert!(!dest.join("README.md").exists());
        assert!(!dest.join("lib").exists());
    }

    #[test]
    fn resolves_tag_to_commit() {
        let fixture = Fixture::new();
        let out = TempDir::new().unwrap();
        let dest = out.path().join("dest");

        let commit = fixture
            .installer("lib")
            .install(&out.path().join(".tmp"), &dest, "v1")
            .unwrap();

        assert_eq!(commit, fixture.first.to_string());
        assert_eq!(
            fs::read_to_string(dest.join("main.libsonnet")).unwrap(),
            "{ version: 1 }"
        );
        assert!(!dest.join("nested").exists());
    }

    #[test]
    fn installs_exact_commit() {
        let fixture = Fixture::new();
        let out = TempDir::new().unwrap();
        let dest = out.path().join("dest");
        let sha = fixture.first.to_string();

        let commit = fixture
            .installer("")
            .install(&out.path().join(".tmp"), &dest, &sha)
            .unwrap();
        assert_eq!(commit, sha);
    }

    #[test]
    fn abbreviated_commit_falls_back_to_full_fetch() {
        let fixture = Fixture::new();
        let out = TempDir::new().unwrap();
        let dest = out.path().join("dest");
        let full = fixture.first.to_string();

        let commit = fixture
            .installer("lib")
            .install(&out.path().join(".tmp"), &dest, &full[..10])
            .unwrap();

        assert_eq!(commit, full);
        assert_eq!(commit.len(), 40);
        assert_eq!(
            fs::read_to_string(dest.join("main.libsonnet")).unwrap(),
            "{ version: 1 }"
        );
        assert!(!dest.join("nested").exists());
        assert!(!dest.join("README.md").exists());
    }

    #[test]
    fn unreachable_remote_is_source_not_found() {
        let out = TempDir::new().unwrap();
        let dest = out.path().join("dest");
        let source = GitSource::new(GIT_SCHEME_HTTPS, "example.com", "org", "missing");
        let installer = GitInstaller::new(source)
            .with_github_archives(false)
            .with_remote(out.path().join("no-such-repo").to_string_lossy().into_owned());

        let err = installer
            .install(&out.path().join(".tmp"), &dest, "master")
            .unwrap_err();

        assert!(matches!(err, Error::SourceNotFound { .. }), "{err}");
        assert!(!dest.exists());
    }

    #[test]
    fn replaces_previous_install() {
        let fixture = Fixture::new();
        let out = TempDir::new().unwrap();
        let dest = out.path().join("dest");
        write(&dest, "stale.libsonnet", "{}");

        fixture
            .installer("lib")
            .install(&out.path().join(".tmp"), &dest, "release")
            .unwrap();

        assert!(!dest.join("stale.libsonnet").exists());
        assert!(dest.join("main.libsonnet").is_file());
    }

    #[test]
    fn unknown_ref_is_source_not_found() {
        let fixture = Fixture::new();
        let out = TempDir::new().unwrap();
        let dest = out.path().join("dest");
        write(&dest, "kept.libsonnet", "{}");

        let err = fixture
            .installer("")
            .install(&out.path().join(".tmp"), &dest, "no-such-ref")
            .unwrap_err();

        assert!(matches!(err, Error::SourceNotFound { .. }), "{err}");
        assert!(dest.join("kept.libsonnet").is_file());
    }

    #[test]
    fn missing_subdir_is_source_not_found() {
        let fixture = Fixture::new();
        let out = TempDir::new().unwrap();
        let dest = out.path().join("dest");

        let err = fixture
            .installer("does/not/exist")
            .install(&out.path().join(".tmp"), &dest, "release")
            .unwrap_err();

        assert!(matches!(err, Error::SourceNotFound { .. }), "{err}");
        assert!(!dest.exists());
    }

    #[test]
    fn staging_is_cleaned_up() {
        let fixture = Fixture::new();
        let out = TempDir::new().unwrap();
        let tmp_root = out.path().join(".tmp");

        fixture
            .installer("lib")
            .install(&tmp_root, &out.path().join("dest"), "release")
            .unwrap();

        assert_eq!(fs::read_dir(&tmp_root).unwrap().count(), 0);
    }
}
