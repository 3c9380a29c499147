// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pass settings.
//!
//! Describes which passes run over a network before it is handed to a
//! writer. Stored as RON so pipelines can keep per-renderer presets.

use crate::algo::{self, ComponentConversion};
use crate::network::{ConnectionError, ShaderNetwork};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Error loading or saving settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Reading or writing the file failed
    #[error("Settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The file isn't valid settings RON
    #[error("Invalid settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings couldn't be serialized
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),

    /// The file was written by a newer version
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest version we read
        supported: u32,
    },
}

/// Which passes to run over a network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassSettings {
    /// Format version
    pub version: u32,
    /// Collapse flat spline triples into spline parameters
    pub collapse_splines: bool,
    /// Convert component connections for a target language
    pub component_connections: Option<ComponentConversion>,
    /// Expand spline parameters into flat triples
    pub expand_splines: bool,
    /// Retype an `ai:shader` output as `ai:surface`
    pub surface_output_convention: bool,
    /// Remove shaders the output doesn't depend on
    pub prune: bool,
}

impl Default for PassSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            collapse_splines: false,
            component_connections: None,
            expand_splines: false,
            surface_output_convention: false,
            prune: true,
        }
    }
}

/// What [`PassSettings::apply`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Shaders whose spline triples were collapsed
    pub splines_collapsed: usize,
    /// Shaders whose splines were expanded
    pub splines_expanded: usize,
    /// Whether the output shader was retyped
    pub output_retyped: bool,
    /// Shaders removed by pruning
    pub pruned: usize,
}

impl PassSettings {
    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Parse settings from RON text
    pub fn from_ron(content: &str) -> Result<Self, SettingsError> {
        let settings: PassSettings = ron::from_str(content)?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        Ok(settings)
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        let content = ron::ser::to_string_pretty(self, config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Run the enabled passes over `network`, in the order: spline collapse,
    /// component conversion, spline expansion, output convention, pruning.
    pub fn apply(&self, network: &mut ShaderNetwork) -> Result<PassSummary, ConnectionError> {
        let mut summary = PassSummary::default();

        if self.collapse_splines {
            summary.splines_collapsed = algo::collapse_network_splines(network);
        }
        if let Some(options) = &self.component_connections {
            algo::convert_component_connections(network, options)?;
        }
        if self.expand_splines {
            summary.splines_expanded = algo::expand_network_splines(network);
        }
        if self.surface_output_convention {
            summary.output_retyped = algo::apply_surface_output_convention(network);
        }
        if self.prune {
            summary.pruned = algo::remove_unused_shaders(network);
        }

        tracing::info!(?summary, shaders = network.len(), "Applied shader network passes");
        Ok(summary)
    }
}
