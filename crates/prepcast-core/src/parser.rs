//! Profile and telemetry file parser.
//!
//! TOML documents keep their data under a `[profile]` or `[telemetry]` table
//! so both can live in one file; JSON documents are the bare object. The
//! format is picked from the file extension.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Profile, ProfileRecord, TelemetrySnapshot};

/// Supported input encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Toml,
    Json,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(InputFormat::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(InputFormat::Json),
            _ => anyhow::bail!(
                "unsupported input file '{}': expected a .toml or .json extension",
                path.display()
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TomlProfileFile {
    profile: ProfileRecord,
}

#[derive(Debug, Deserialize)]
struct TomlTelemetryFile {
    telemetry: TelemetrySnapshot,
}

/// Parse a profile document without validating it.
pub fn parse_profile_record_str(content: &str, format: InputFormat) -> Result<ProfileRecord> {
    let record = match format {
        InputFormat::Toml => {
            toml::from_str::<TomlProfileFile>(content)
                .context("failed to parse TOML profile (expected a [profile] table)")?
                .profile
        }
        InputFormat::Json => {
            serde_json::from_str(content).context("failed to parse JSON profile")?
        }
    };
    Ok(record)
}

/// Parse and validate a profile document.
pub fn parse_profile_str(content: &str, format: InputFormat) -> Result<Profile> {
    let record = parse_profile_record_str(content, format)?;
    Ok(Profile::try_from(record)?)
}

/// Read, parse and validate a profile file.
pub fn parse_profile(path: &Path) -> Result<Profile> {
    let format = InputFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile file: {}", path.display()))?;
    parse_profile_str(&content, format)
        .with_context(|| format!("invalid profile: {}", path.display()))
}

/// Parse a telemetry document. Values are not sanitized here.
pub fn parse_telemetry_str(content: &str, format: InputFormat) -> Result<TelemetrySnapshot> {
    let snapshot = match format {
        InputFormat::Toml => {
            toml::from_str::<TomlTelemetryFile>(content)
                .context("failed to parse TOML telemetry (expected a [telemetry] table)")?
                .telemetry
        }
        InputFormat::Json => {
            serde_json::from_str(content).context("failed to parse JSON telemetry")?
        }
    };
    Ok(snapshot)
}

pub fn parse_telemetry(path: &Path) -> Result<TelemetrySnapshot> {
    let format = InputFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read telemetry file: {}", path.display()))?;
    parse_telemetry_str(&content, format)
        .with_context(|| format!("invalid telemetry: {}", path.display()))
}

/// Recursively load every valid profile under a directory.
///
/// Files that fail to parse or validate are skipped with a warning.
pub fn load_profile_directory(dir: &Path) -> Result<Vec<(PathBuf, Profile)>> {
    let mut profiles = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            profiles.extend(load_profile_directory(&path)?);
        } else if InputFormat::from_path(&path).is_ok() {
            match parse_profile(&path) {
                Ok(profile) => profiles.push((path, profile)),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(profiles)
}
