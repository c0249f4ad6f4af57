//! GitHub archive downloads.
//!
//! Downloads `<remote>/archive/<version>.zip` and extracts the requested
//! subtree. GitHub reports the commit the archive was built from as a quoted
//! 40-hex `ETag`, which becomes the resolved version.

use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;
use tracing::info;

use crate::fs::replace_path;
use crate::install::staging_dir;
use crate::spec::GitSource;

static ETAG_COMMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^"([0-9a-f]{40})"$"#).expect("static ETag pattern is valid")
});

struct Download {
    etag: Option<String>,
    bytes: Vec<u8>,
}

/// Archive URL for `version` of a GitHub source.
pub fn archive_url(source: &GitSource, version: &str) -> String {
    format!(
        "https://{}/{}/{}/archive/{}.zip",
        source.host, source.user, source.repo, version
    )
}

/// Commit id carried by an archive response's `ETag`, if any.
pub fn commit_from_etag(etag: &str) -> Option<String> {
    ETAG_COMMIT
        .captures(etag)
        .map(|captures| captures[1].to_string())
}

/// Download and install `version` of `source` at `dest`.
pub(crate) fn install_archive(
    source: &GitSource,
    tmp_root: &Path,
    dest: &Path,
    version: &str,
) -> anyhow::Result<String> {
    let url = archive_url(source, version);
    info!(url = %url, "downloading archive");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;
    let download = runtime.block_on(download(&url))?;

    let commit = download
        .etag
        .as_deref()
        .and_then(commit_from_etag)
        .ok_or_else(|| anyhow::anyhow!("Archive response from {} carries no commit ETag", url))?;

    let staging = staging_dir(tmp_root)?;
    let content = staging.path().join("content");
    extract_subtree(&download.bytes, source.subdir_relative(), &content)?;
    if !content.is_dir() {
        anyhow::bail!(
            "Archive from {} has no subdirectory {}",
            url,
            source.subdir_relative()
        );
    }

    replace_path(&content, dest)?;
    Ok(commit)
}

async fn download(url: &str) -> anyhow::Result<Download> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to download archive from {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!(
            "Failed to download archive: HTTP {} from {}",
            response.status(),
            url
        );
    }

    let etag = response
        .headers()
        .get(reqwest::header::ETAG)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("Failed to read response body from {}", url))?;

    Ok(Download {
        etag,
        bytes: bytes.to_vec(),
    })
}

/// Extract the entries below `<wrapper>/<subdir>` into `dest`.
///
/// The archive's single top-level directory is stripped. `dest` is only
/// created if the subtree exists.
fn extract_subtree(data: &[u8], subdir: &str, dest: &Path) -> anyhow::Result<()> {
    let cursor = std::io::Cursor::new(data);
    let mut archive = zip::ZipArchive::new(cursor).context("Failed to read archive as zip")?;
    let prefix: PathBuf = Path::new(subdir)
        .components()
        .filter(|component| matches!(component, Component::Normal(_)))
        .collect();

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .with_context(|| format!("Failed to read zip entry {}", i))?;

        let Some(enclosed) = file.enclosed_name() else {
            continue;
        };
        let inner: PathBuf = enclosed.components().skip(1).collect();
        let Ok(relative) = inner.strip_prefix(&prefix) else {
            continue;
        };
        let outpath = dest.join(relative);

        if file.is_dir() {
            std::fs::create_dir_all(&outpath)
                .with_context(|| format!("Failed to create directory: {}", outpath.display()))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create parent directory: {}", parent.display())
            })?;
        }

        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)
            .with_context(|| format!("Failed to read zip entry: {}", file.name()))?;
        let mut outfile = std::fs::File::create(&outpath)
            .with_context(|| format!("Failed to create file: {}", outpath.display()))?;
        outfile
            .write_all(&buffer)
            .with_context(|| format!("Failed to write file: {}", outpath.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = file.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode & 0o777))
                    .ok();
            }
        }
    }

    Ok(())
}
