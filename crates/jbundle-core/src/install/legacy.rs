//! Short-name links for manifests that use legacy imports.

use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};

use crate::fs::{create_dir_symlink, remove_path};
use crate::manifest::Manifest;

/// Create `<install_root>/<legacy_name>` links to each locked dependency.
///
/// Links are relative so the install root can be moved. An existing symlink
/// is replaced; anything else at the link path is left alone. Returns the
/// links that were written.
pub fn link_legacy_names(install_root: &Path, lock: &Manifest) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for dependency in lock.iter() {
        let name = dependency.name();
        let legacy = dependency.legacy_name();
        if legacy.is_empty() || legacy == name {
            continue;
        }

        let link = install_root.join(&legacy);
        if let Ok(meta) = std::fs::symlink_metadata(&link) {
            if !meta.file_type().is_symlink() {
                warn!(
                    link = %link.display(),
                    dependency = %name,
                    "not creating legacy link, path exists"
                );
                continue;
            }
            remove_path(&link)
                .with_context(|| format!("Failed to remove old link: {}", link.display()))?;
        }

        if let Some(parent) = link.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let target = relative_target(&legacy, &name);
        create_dir_symlink(&target, &link).with_context(|| {
            format!(
                "Failed to create legacy link {} -> {}",
                link.display(),
                target.display()
            )
        })?;
        debug!(link = %link.display(), target = %target.display(), "created legacy link");
        written.push(link);
    }

    Ok(written)
}

/// Path to `name` as seen from the directory holding the link `legacy`.
fn relative_target(legacy: &str, name: &str) -> PathBuf {
    let depth = Path::new(legacy)
        .components()
        .filter(|component| matches!(component, Component::Normal(_)))
        .count()
        .saturating_sub(1);

    let mut target = PathBuf::new();
    for _ in 0..depth {
        target.push("..");
    }
    target.push(name);
    target
}
