//! Deterministic tree hashing for installed dependencies
//!
//! Computes the integrity sum recorded in the lock manifest.

use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Compute the integrity sum of a directory tree
///
/// # Algorithm
/// - Collect every regular file below `path`, keyed by its relative path
/// - Order by relative path, compared component by component
/// - Stream file contents (not names) through SHA-256
/// - Output: standard padded base64 (44 characters)
///
/// # Notes
/// - A symlinked root is followed, so linked local dependencies hash their target
/// - Symlinks to files inside the tree contribute their target's content
/// - Symlinks to directories inside the tree are not descended into
/// - Empty directories do not affect the sum
///
/// # Example
/// ```no_run
/// use jbundle_core::fs::tree_hash::hash_tree;
/// use std::path::Path;
///
/// let sum = hash_tree(Path::new("vendor/github.com/grafana/jsonnet-libs"))?;
/// assert_eq!(sum.len(), 44);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn hash_tree(path: &Path) -> anyhow::Result<String> {
    let meta = fs::metadata(path)
        .with_context(|| format!("Failed to stat directory: {}", path.display()))?;
    if !meta.is_dir() {
        anyhow::bail!("Not a directory: {}", path.display());
    }

    let mut files = Vec::new();
    collect_files(path, Path::new(""), &mut files)?;
    // Path ordering compares components, so `a/x` sorts before `a-b`.
    files.sort();

    let mut hasher = Sha256::new();
    for rel in files {
        let full = path.join(&rel);
        let mut file = fs::File::open(&full)
            .with_context(|| format!("Failed to open file: {}", full.display()))?;
        io::copy(&mut file, &mut hasher)
            .with_context(|| format!("Failed to read file: {}", full.display()))?;
    }

    Ok(STANDARD.encode(hasher.finalize()))
}

fn collect_files(root: &Path, rel: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let dir = root.join(rel);
    let entries =
        fs::read_dir(&dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("Failed to read directory entry: {}", dir.display()))?;
        let rel_path = rel.join(entry.file_name());
        let ty = entry
            .file_type()
            .with_context(|| format!("Failed to stat file: {}", entry.path().display()))?;

        if ty.is_dir() {
            collect_files(root, &rel_path, files)?;
        } else if ty.is_file() {
            files.push(rel_path);
        } else if ty.is_symlink() && entry.path().is_file() {
            files.push(rel_path);
        }
    }

    Ok(())
}
