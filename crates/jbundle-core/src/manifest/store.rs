//! Loading and saving manifest files.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

use super::legacy::{V0File, upgrade_v0};
use super::types::{Manifest, SCHEMA_VERSION};
use super::wire::{WireFile, from_wire_file, to_wire_file};

#[derive(Debug, Deserialize)]
struct SchemaProbe {
    #[serde(default)]
    version: u32,
}

/// Parse a manifest document, upgrading older schemas in memory.
///
/// Empty input yields an empty manifest.
pub fn decode(bytes: &[u8]) -> Result<Manifest> {
    decode_inner(bytes).map_err(|err| match err.downcast::<Error>() {
        Ok(err) => err,
        Err(err) => Error::manifest(PathBuf::new(), err),
    })
}

fn decode_inner(bytes: &[u8]) -> anyhow::Result<Manifest> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Manifest::new());
    }

    let probe: SchemaProbe =
        serde_json::from_slice(bytes).context("Failed to parse jsonnetfile JSON")?;

    match probe.version {
        version if version > SCHEMA_VERSION => Err(Error::UnsupportedSchema {
            found: version,
            supported: SCHEMA_VERSION,
        }
        .into()),
        SCHEMA_VERSION => {
            let file: WireFile =
                serde_json::from_slice(bytes).context("Failed to parse jsonnetfile")?;
            from_wire_file(file)
        }
        version => {
            debug!(version, "upgrading legacy jsonnetfile schema");
            let file: V0File =
                serde_json::from_slice(bytes).context("Failed to parse legacy jsonnetfile")?;
            upgrade_v0(file)
        }
    }
}

/// Serialize a manifest: sorted entries, two-space indent, trailing newline.
pub fn encode(manifest: &Manifest) -> anyhow::Result<String> {
    let mut content = serde_json::to_string_pretty(&to_wire_file(manifest))
        .context("Failed to serialize jsonnetfile")?;
    content.push('\n');
    Ok(content)
}

/// A manifest or lock manifest file on disk.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the file, or an empty manifest if it does not exist.
    pub fn load(&self) -> Result<Manifest> {
        if !self.path.exists() {
            return Ok(Manifest::new());
        }

        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))
            .map_err(|err| Error::manifest(&self.path, err))?;

        decode(&bytes).map_err(|err| match err {
            Error::Manifest { source, .. } => Error::manifest(&self.path, source),
            other => other,
        })
    }

    /// Write the file through a sibling temp file so readers never see a
    /// partial document.
    pub fn save(&self, manifest: &Manifest) -> Result<()> {
        self.write(manifest)
            .map_err(|err| Error::manifest(&self.path, err))
    }

    /// Save only when the encoded document differs from the file on disk.
    ///
    /// Returns whether the file was written.
    pub fn save_if_changed(&self, manifest: &Manifest) -> Result<bool> {
        let content = encode(manifest).map_err(|err| Error::manifest(&self.path, err))?;
        if let Ok(existing) = std::fs::read(&self.path)
            && existing == content.as_bytes()
        {
            debug!(path = %self.path.display(), "unchanged");
            return Ok(false);
        }
        self.save(manifest)?;
        Ok(true)
    }

    fn write(&self, manifest: &Manifest) -> anyhow::Result<()> {
        let content = encode(manifest)?;
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
        tmp.write_all(content.as_bytes())
            .context("Failed to write jsonnetfile contents")?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}
