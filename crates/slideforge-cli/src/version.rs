//! Project version bumping
//!
//! The workspace version lives in the root `Cargo.toml`; extra JSON
//! manifests (plugin descriptors and the like) carry a top-level
//! `"version"` key.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde_json::Value;
use tracing::debug;

fn version_format() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid regex"))
}

fn workspace_table() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*\[workspace\]").expect("valid regex"))
}

fn cargo_version_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?m)^version\s*=\s*"[^"]*""#).expect("valid regex"))
}

pub fn is_valid_version(version: &str) -> bool {
    version_format().is_match(version)
}

fn is_workspace_manifest(dir: &Path) -> bool {
    fs::read_to_string(dir.join("Cargo.toml"))
        .map(|text| workspace_table().is_match(&text))
        .unwrap_or(false)
}

/// Walk up from `start` to the directory whose `Cargo.toml` has a
/// `[workspace]` table; without one, the nearest `Cargo.toml` wins
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| is_workspace_manifest(dir))
        .or_else(|| {
            start
                .ancestors()
                .find(|dir| dir.join("Cargo.toml").is_file())
        })
        .map(Path::to_path_buf)
}

/// Set `version` in `root/Cargo.toml` and in each JSON manifest; returns the
/// files written
pub fn bump_version(root: &Path, version: &str, manifests: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if !is_valid_version(version) {
        anyhow::bail!("invalid version format '{}' (expected X.Y.Z)", version);
    }

    let mut updated = Vec::new();
    let cargo = root.join("Cargo.toml");
    let text = fs::read_to_string(&cargo)
        .with_context(|| format!("Failed to read {}", cargo.display()))?;
    if !cargo_version_line().is_match(&text) {
        anyhow::bail!("no version line in {}", cargo.display());
    }
    // first match only: dependency tables below may carry their own versions
    let replaced = cargo_version_line().replace(&text, format!(r#"version = "{}""#, version));
    fs::write(&cargo, replaced.as_bytes())
        .with_context(|| format!("Failed to write {}", cargo.display()))?;
    updated.push(cargo);

    for path in manifests {
        set_json_version(path, version)?;
        updated.push(path.clone());
    }
    debug!(version, files = updated.len(), "bumped version");
    Ok(updated)
}

fn set_json_version(path: &Path, version: &str) -> Result<()> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut data: Value =
        serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))?;
    let Some(object) = data.as_object_mut() else {
        anyhow::bail!("{} is not a JSON object", path.display());
    };
    object.insert("version".to_string(), Value::String(version.to_string()));

    let mut out = serde_json::to_string_pretty(&data)?;
    out.push('\n');
    fs::write(path, out).with_context(|| format!("Failed to write {}", path.display()))
}
