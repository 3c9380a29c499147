// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader node definitions.

use crate::value::{ParameterValue, Parameters};
use serde::{Deserialize, Serialize};

/// Shader id prefix used outside the pipeline for Arnold shaders
pub const ARNOLD_EXTERNAL_PREFIX: &str = "arnold";

/// Type prefix used inside the pipeline for Arnold shaders
pub const ARNOLD_TYPE_PREFIX: &str = "ai";

/// A shader node.
///
/// The type is free-form but conventionally `<prefix>:<category>`,
/// e.g. `osl:shader` or `ai:surface`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Shader {
    /// Shader name, e.g. `standard_surface`
    pub name: String,
    /// Shader type, e.g. `osl:shader`
    #[serde(rename = "type")]
    pub shader_type: String,
    /// Parameter values
    #[serde(default)]
    pub parameters: Parameters,
}

impl Shader {
    /// Create a shader without parameters
    pub fn new(name: impl Into<String>, shader_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shader_type: shader_type.into(),
            parameters: Parameters::new(),
        }
    }

    /// Set a parameter value
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Get a parameter value
    pub fn parameter(&self, name: &str) -> Option<&ParameterValue> {
        self.parameters.get(name)
    }

    /// The language prefix of the type, the part before the first `:`.
    /// `None` for types without a prefix.
    pub fn type_prefix(&self) -> Option<&str> {
        self.shader_type.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Whether the type belongs to `language`, i.e. starts with `<language>:`
    pub fn is_language(&self, language: &str) -> bool {
        self.type_prefix() == Some(language)
    }

    /// Build a shader from an external shader id such as `arnold:standard_surface`.
    ///
    /// The prefix becomes the type prefix (with `arnold` renamed to `ai`) and
    /// the type category is always `shader`. Ids without a prefix leave the
    /// type empty.
    pub fn from_shader_id(id: &str) -> Self {
        match id.split_once(':') {
            Some((prefix, name)) => Self::new(name, format!("{}:shader", internal_prefix(prefix))),
            None => Self::new(id, ""),
        }
    }

    /// External shader id, the inverse of [`Shader::from_shader_id`]
    pub fn shader_id(&self) -> String {
        match self.type_prefix() {
            Some(prefix) => format!("{}:{}", external_prefix(prefix), self.name),
            None => self.name.clone(),
        }
    }
}

/// Map an external shader id prefix to the type prefix used in networks
pub fn internal_prefix(prefix: &str) -> &str {
    if prefix == ARNOLD_EXTERNAL_PREFIX {
        ARNOLD_TYPE_PREFIX
    } else {
        prefix
    }
}

/// Map a network type prefix to the prefix used in external shader ids
pub fn external_prefix(prefix: &str) -> &str {
    if prefix == ARNOLD_TYPE_PREFIX {
        ARNOLD_EXTERNAL_PREFIX
    } else {
        prefix
    }
}
