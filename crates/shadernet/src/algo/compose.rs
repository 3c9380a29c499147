// SPDX-License-Identifier: MIT OR Apache-2.0
//! Merging one network into another.

use crate::connection::{Connection, Handle, Parameter};
use crate::network::{ConnectionError, ShaderNetwork};
use std::collections::HashMap;

/// Copy every shader of `source` into `network`, optionally with its connections.
///
/// Shaders keep their handles, so a shader already stored under the same
/// handle in `network` is overwritten. Returns the output of `source`
/// expressed in `network`'s handles.
///
/// When copying connections, a destination that is already driven in
/// `network` fails with [`ConnectionError::AlreadyConnected`]. Shaders and
/// connections copied before the failure stay in `network`.
pub fn add_shaders(
    network: &mut ShaderNetwork,
    source: &ShaderNetwork,
    connections: bool,
) -> Result<Parameter, ConnectionError> {
    let mut handle_map: HashMap<&Handle, Handle> = HashMap::with_capacity(source.len());
    for (handle, shader) in source.shaders() {
        let added = network.add_shader(handle.clone(), shader.clone());
        handle_map.insert(handle, added);
    }

    let remap = |parameter: &Parameter| Parameter {
        shader: handle_map
            .get(&parameter.shader)
            .cloned()
            .unwrap_or_else(|| parameter.shader.clone()),
        name: parameter.name.clone(),
    };

    if connections {
        for connection in source.connections() {
            network.add_connection(Connection::new(
                remap(&connection.source),
                remap(&connection.destination),
            ))?;
        }
    }

    let output = remap(source.output());
    tracing::debug!(
        shaders = source.len(),
        connections,
        output = %output,
        "Merged shader network"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::prune::remove_unused_shaders;
    use crate::shader::Shader;

    fn chain(prefix: &str, shader_type: &str) -> ShaderNetwork {
        let mut network = ShaderNetwork::new();
        let texture = format!("{prefix}Texture");
        let surface = format!("{prefix}Surface");
        network.add_shader(texture.as_str(), Shader::new("image", shader_type));
        network.add_shader(surface.as_str(), Shader::new("standard_surface", shader_type));
        network
            .add_connection(Connection::new(
                Parameter::new(texture.as_str(), "out"),
                Parameter::new(surface.as_str(), "Kd"),
            ))
            .unwrap();
        network.set_output(Parameter::default_output(surface.as_str()));
        network
    }

    #[test]
    fn test_add_shaders_with_connections() {
        let mut network = chain("a", "osl:shader");
        let source = chain("b", "osl:shader");

        let output = add_shaders(&mut network, &source, true).unwrap();
        assert_eq!(output, Parameter::default_output("bSurface"));
        assert_eq!(network.len(), 4);
        assert_eq!(network.connection_count(), 2);
        assert_eq!(
            network.input(&Parameter::new("bSurface", "Kd")),
            Parameter::new("bTexture", "out")
        );
        // The destination keeps its own output
        assert_eq!(network.output(), &Parameter::default_output("aSurface"));
    }

    #[test]
    fn test_add_shaders_without_connections() {
        let mut network = chain("a", "osl:shader");
        let source = chain("b", "osl:shader");

        add_shaders(&mut network, &source, false).unwrap();
        assert_eq!(network.len(), 4);
        assert_eq!(network.connection_count(), 1);
    }

    #[test]
    fn test_add_shaders_overwrites_on_collision() {
        let mut network = chain("a", "osl:shader");
        let source = chain("a", "ai:shader");

        add_shaders(&mut network, &source, false).unwrap();
        assert_eq!(network.len(), 2);
        assert_eq!(network.shader("aTexture").unwrap().shader_type, "ai:shader");
        assert_eq!(network.connection_count(), 1);
    }

    #[test]
    fn test_add_shaders_collision_with_connections() {
        let mut network = chain("a", "osl:shader");
        let source = chain("a", "ai:shader");

        let err = add_shaders(&mut network, &source, true).unwrap_err();
        assert_eq!(
            err,
            ConnectionError::AlreadyConnected {
                destination: Parameter::new("aSurface", "Kd"),
                existing: Parameter::new("aTexture", "out"),
            }
        );
        // Shaders were copied before the connections
        assert_eq!(network.len(), 2);
        assert_eq!(network.shader("aSurface").unwrap().shader_type, "ai:shader");
        assert_eq!(network.connection_count(), 1);
    }

    #[test]
    fn test_add_shaders_then_prune_restores_destination() {
        let original = chain("a", "osl:shader");
        let mut network = original.clone();
        let source = chain("b", "osl:shader");

        add_shaders(&mut network, &source, true).unwrap();
        remove_unused_shaders(&mut network);
        assert_eq!(network, original);
    }
}
