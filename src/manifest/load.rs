use std::path::Path;

use anyhow::Context;

use super::types::Manifest;
use crate::router::Router;

/// On-disk manifest encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Json,
    Toml,
}

impl ManifestFormat {
    /// Pick by extension: `.yaml`/`.yml`, `.toml`, anything else is JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => ManifestFormat::Yaml,
            Some("toml") => ManifestFormat::Toml,
            _ => ManifestFormat::Json,
        }
    }
}

/// Parse manifest text.
///
/// # Errors
///
/// Syntax errors and unknown fields.
pub fn parse_manifest_str(content: &str, format: ManifestFormat) -> anyhow::Result<Manifest> {
    let manifest = match format {
        ManifestFormat::Yaml => serde_yaml::from_str(content).context("invalid YAML manifest")?,
        ManifestFormat::Json => serde_json::from_str(content).context("invalid JSON manifest")?,
        ManifestFormat::Toml => toml::from_str(content).context("invalid TOML manifest")?,
    };
    Ok(manifest)
}

/// Read and parse a manifest file, choosing the format by extension.
///
/// # Errors
///
/// I/O failures and parse errors, with the path attached.
pub fn load_manifest<P: AsRef<Path>>(path: P) -> anyhow::Result<Manifest> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    parse_manifest_str(&content, ManifestFormat::from_path(path))
        .with_context(|| format!("failed to parse manifest {}", path.display()))
}

/// [`load_manifest`] then [`Manifest::build`].
///
/// # Errors
///
/// As for both steps.
pub fn load_router<P: AsRef<Path>>(path: P) -> anyhow::Result<Router> {
    let path = path.as_ref();
    load_manifest(path)?
        .build()
        .with_context(|| format!("failed to build router from {}", path.display()))
}
