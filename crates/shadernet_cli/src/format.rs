// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reading and writing serialized networks.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Serialization format, picked by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Rusty Object Notation, the default
    Ron,
    /// JSON, for `.json` files
    Json,
}

impl Format {
    /// Format for a path; anything that isn't `.json` is RON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Ron,
        }
    }

    /// Parse `text` in this format
    pub fn parse<T: DeserializeOwned>(self, text: &str) -> Result<T> {
        Ok(match self {
            Self::Ron => ron::from_str(text)?,
            Self::Json => serde_json::from_str(text)?,
        })
    }

    /// Serialize `value` in this format
    pub fn to_string<T: Serialize>(self, value: &T) -> Result<String> {
        Ok(match self {
            Self::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())?,
            Self::Json => serde_json::to_string_pretty(value)?,
        })
    }
}

/// Read a value from a file, in the format its extension implies
pub fn read<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Format::from_path(path)
        .parse(&text)
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Write a value to a file, or as RON to stdout when no path is given
pub fn write<T: Serialize>(value: &T, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let text = Format::from_path(path).to_string(value)?;
            std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            let text = Format::Ron.to_string(value)?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}").context("failed to write to stdout")
        }
    }
}
