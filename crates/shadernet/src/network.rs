// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader network: shaders, the connections between them and an output.

use crate::connection::{Connection, Handle, Parameter};
use crate::shader::Shader;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A network of shaders.
///
/// Connections are keyed by their destination, so every input has at most
/// one driver. Networks are expected to be acyclic when walked from the
/// output; that is up to whoever builds them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "NetworkData", try_from = "NetworkData")]
pub struct ShaderNetwork {
    /// Shaders by handle
    shaders: IndexMap<Handle, Shader>,
    /// Source of each connected destination
    connections: IndexMap<Parameter, Parameter>,
    /// Final output of the network
    output: Parameter,
}

impl ShaderNetwork {
    /// Create a new empty network
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shader, replacing any shader already stored under `handle`.
    ///
    /// Connections referencing the handle are kept. Returns the handle the
    /// shader was stored under.
    pub fn add_shader(&mut self, handle: impl Into<Handle>, shader: Shader) -> Handle {
        let handle = handle.into();
        self.shaders.insert(handle.clone(), shader);
        handle
    }

    /// Remove a shader and all connections to and from it
    pub fn remove_shader(&mut self, handle: &Handle) -> Option<Shader> {
        let shader = self.shaders.shift_remove(handle)?;
        self.connections
            .retain(|destination, source| destination.shader != *handle && source.shader != *handle);
        Some(shader)
    }

    /// Get a shader by handle
    pub fn shader(&self, handle: &str) -> Option<&Shader> {
        self.shaders.get(handle)
    }

    /// Get a mutable shader by handle
    pub fn shader_mut(&mut self, handle: &str) -> Option<&mut Shader> {
        self.shaders.get_mut(handle)
    }

    /// Whether a shader is stored under `handle`
    pub fn contains(&self, handle: &str) -> bool {
        self.shaders.contains_key(handle)
    }

    /// All shaders, in insertion order
    pub fn shaders(&self) -> impl Iterator<Item = (&Handle, &Shader)> {
        self.shaders.iter()
    }

    /// All mutable shaders, in insertion order
    pub fn shaders_mut(&mut self) -> impl Iterator<Item = (&Handle, &mut Shader)> {
        self.shaders.iter_mut()
    }

    /// All handles, in insertion order
    pub fn handles(&self) -> impl Iterator<Item = &Handle> {
        self.shaders.keys()
    }

    /// Get the number of shaders
    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    /// Whether the network has no shaders
    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    /// A handle derived from `base` that no shader uses yet:
    /// `base`, then `base1`, `base2`, ...
    pub fn unique_handle(&self, base: &str) -> Handle {
        if !self.contains(base) {
            return Handle::from(base);
        }
        let mut i = 1usize;
        loop {
            let candidate = format!("{base}{i}");
            if !self.contains(&candidate) {
                return Handle::from(candidate);
            }
            i += 1;
        }
    }

    /// Add a connection.
    ///
    /// Fails if the destination is already driven, or if either end names a
    /// shader that isn't in the network.
    pub fn add_connection(&mut self, connection: Connection) -> Result<(), ConnectionError> {
        for end in [&connection.source, &connection.destination] {
            if !end.shader.is_empty() && !self.shaders.contains_key(&end.shader) {
                return Err(ConnectionError::ShaderNotFound(end.clone()));
            }
        }

        if let Some(existing) = self.connections.get(&connection.destination) {
            return Err(ConnectionError::AlreadyConnected {
                destination: connection.destination,
                existing: existing.clone(),
            });
        }

        self.connections
            .insert(connection.destination, connection.source);
        Ok(())
    }

    /// Remove a connection. Returns `false` if it wasn't present.
    pub fn remove_connection(&mut self, connection: &Connection) -> bool {
        if self.connections.get(&connection.destination) != Some(&connection.source) {
            return false;
        }
        self.connections.shift_remove(&connection.destination);
        true
    }

    /// Remove whatever connection drives `destination`, returning its source
    pub fn disconnect(&mut self, destination: &Parameter) -> Option<Parameter> {
        self.connections.shift_remove(destination)
    }

    /// The source driving `destination`, or an empty parameter if undriven
    pub fn input(&self, destination: &Parameter) -> Parameter {
        self.connections
            .get(destination)
            .cloned()
            .unwrap_or_default()
    }

    /// Connections into the shader `handle`, in the order they were added
    pub fn input_connections(&self, handle: &Handle) -> Vec<Connection> {
        self.connections
            .iter()
            .filter(|(destination, _)| destination.shader == *handle)
            .map(|(destination, source)| Connection::new(source.clone(), destination.clone()))
            .collect()
    }

    /// All connections, in the order they were added
    pub fn connections(&self) -> impl Iterator<Item = Connection> + '_ {
        self.connections
            .iter()
            .map(|(destination, source)| Connection::new(source.clone(), destination.clone()))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// The network output
    pub fn output(&self) -> &Parameter {
        &self.output
    }

    /// Set the network output
    pub fn set_output(&mut self, output: Parameter) {
        self.output = output;
    }
}

/// Serialized form of a network. Connections are replayed through
/// [`ShaderNetwork::add_connection`] on load so the invariants hold.
#[derive(Serialize, Deserialize)]
struct NetworkData {
    shaders: IndexMap<Handle, Shader>,
    #[serde(default)]
    connections: Vec<Connection>,
    #[serde(default)]
    output: Parameter,
}

impl From<ShaderNetwork> for NetworkData {
    fn from(network: ShaderNetwork) -> Self {
        let connections = network.connections().collect();
        Self {
            shaders: network.shaders,
            connections,
            output: network.output,
        }
    }
}

impl TryFrom<NetworkData> for ShaderNetwork {
    type Error = ConnectionError;

    fn try_from(data: NetworkData) -> Result<Self, Self::Error> {
        let mut network = ShaderNetwork {
            shaders: data.shaders,
            connections: IndexMap::new(),
            output: data.output,
        };
        for connection in data.connections {
            network.add_connection(connection)?;
        }
        Ok(network)
    }
}

/// Error when creating a connection
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConnectionError {
    /// An end of the connection names a shader that isn't in the network
    #[error("Shader not found for parameter: {0}")]
    ShaderNotFound(Parameter),

    /// The destination already has a driver
    #[error("Parameter {destination} already connected to {existing}")]
    AlreadyConnected {
        /// Destination of the rejected connection
        destination: Parameter,
        /// Source already driving the destination
        existing: Parameter,
    },
}
