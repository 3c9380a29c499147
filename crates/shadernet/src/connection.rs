// SPDX-License-Identifier: MIT OR Apache-2.0
//! Handles, parameter references and connections between shaders.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifies a shader within one network.
///
/// Handles are only meaningful inside the network that issued them. The
/// empty handle means "no shader".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    /// Create a handle
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The handle text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the empty handle
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Handle {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Handle {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for Handle {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a parameter of a shader.
///
/// An empty `shader` refers to an input from outside the network, an empty
/// `name` refers to the shader's default output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Parameter {
    /// Shader handle
    pub shader: Handle,
    /// Parameter name
    #[serde(default)]
    pub name: String,
}

impl Parameter {
    /// Reference a named parameter
    pub fn new(shader: impl Into<Handle>, name: impl Into<String>) -> Self {
        Self {
            shader: shader.into(),
            name: name.into(),
        }
    }

    /// Reference the default output of a shader
    pub fn default_output(shader: impl Into<Handle>) -> Self {
        Self {
            shader: shader.into(),
            name: String::new(),
        }
    }

    /// Whether this references no shader at all
    pub fn is_empty(&self) -> bool {
        self.shader.is_empty()
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.shader)
        } else {
            write!(f, "{}.{}", self.shader, self.name)
        }
    }
}

/// A connection from a source parameter to a destination parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// Output being read
    pub source: Parameter,
    /// Input being driven
    pub destination: Parameter,
}

impl Connection {
    /// Create a new connection
    pub fn new(source: Parameter, destination: Parameter) -> Self {
        Self {
            source,
            destination,
        }
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let c = Connection::new(
            Parameter::default_output("noise"),
            Parameter::new("surface", "Kd"),
        );
        assert_eq!(c.to_string(), "noise -> surface.Kd");
    }

    #[test]
    fn test_empty_parameter() {
        assert!(Parameter::default().is_empty());
        assert!(Parameter::new("", "Kd").is_empty());
        assert!(!Parameter::default_output("noise").is_empty());
    }
}
