//! In-place replacement of installed directories.

use anyhow::Context;
use std::fs;
use std::path::Path;

/// Move `staged` to `dst`, removing whatever was at `dst` first.
///
/// Everything up to the removal leaves `dst` untouched, so callers stage the
/// complete new content before calling this.
pub fn replace_path(staged: &Path, dst: &Path) -> anyhow::Result<()> {
    let parent = dst
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Destination path has no parent: {}", dst.display()))?;
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create destination parent: {}", parent.display()))?;

    if fs::symlink_metadata(dst).is_ok() {
        remove_path(dst).with_context(|| {
            format!("Failed to remove existing destination: {}", dst.display())
        })?;
    }

    fs::rename(staged, dst).with_context(|| {
        format!(
            "Failed to move {} into destination {}",
            staged.display(),
            dst.display()
        )
    })?;
    Ok(())
}

/// Remove a file, symlink or directory tree. Symlinks are never followed.
pub fn remove_path(path: &Path) -> std::io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(unix)]
pub fn create_dir_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
pub fn create_dir_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(not(any(unix, windows)))]
pub fn create_dir_symlink(_target: &Path, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "Symlinks are not supported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn replace_creates_missing_parents() {
        let tmp = TempDir::new().unwrap();
        let staged = tmp.path().join("staged");
        fs::create_dir_all(&staged).unwrap();
        fs::write(staged.join("main.jsonnet"), "{}").unwrap();

        let dst = tmp.path().join("vendor").join("github.com").join("u").join("r");
        replace_path(&staged, &dst).unwrap();

        assert!(dst.join("main.jsonnet").is_file());
        assert!(!staged.exists());
    }

    #[test]
    fn replace_discards_previous_content() {
        let tmp = TempDir::new().unwrap();
        let dst = tmp.path().join("dst");
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("stale.jsonnet"), "old").unwrap();

        let staged = tmp.path().join("staged");
        fs::create_dir_all(&staged).unwrap();
        fs::write(staged.join("fresh.jsonnet"), "new").unwrap();

        replace_path(&staged, &dst).unwrap();

        assert!(dst.join("fresh.jsonnet").is_file());
        assert!(!dst.join("stale.jsonnet").exists());
    }

    #[cfg(unix)]
    #[test]
    fn remove_path_does_not_follow_symlinks() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("target");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("keep.txt"), "keep").unwrap();

        let link = tmp.path().join("link");
        create_dir_symlink(&target, &link).unwrap();
        remove_path(&link).unwrap();

        assert!(fs::symlink_metadata(&link).is_err());
        assert!(target.join("keep.txt").is_file());
    }
}
