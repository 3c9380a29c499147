// SPDX-License-Identifier: MIT OR Apache-2.0
//! Legacy flat encoding of shader networks.
//!
//! Older pipelines describe a network as an ordered list of shaders. Each
//! shader names itself with a `__handle` string parameter, and refers to
//! other shaders with string parameters of the form `link:<handle>` or
//! `link:<handle>.<output>`. The last shader in the list is the output.

use crate::connection::{Connection, Handle, Parameter};
use crate::network::{ConnectionError, ShaderNetwork};
use crate::shader::Shader;
use crate::value::ParameterValue;
use std::collections::HashSet;

/// Parameter holding the handle of a shader
pub const HANDLE_PARAMETER: &str = "__handle";

/// Handle used for shaders that don't specify one
pub const DEFAULT_HANDLE: &str = "shader";

/// Prefix of string parameters that are connections
pub const LINK_PREFIX: &str = "link:";

/// Parse a `link:` string into the parameter it refers to
fn linked_parameter(value: &str) -> Option<Parameter> {
    let link = value.strip_prefix(LINK_PREFIX)?;
    Some(match link.split_once('.') {
        Some((handle, name)) => Parameter::new(handle, name),
        None => Parameter::default_output(link),
    })
}

fn link_string(source: &Parameter) -> String {
    format!("{LINK_PREFIX}{source}")
}

/// Build a network from the flat encoding.
///
/// String parameters that aren't links are kept as values. Links must
/// refer to shaders earlier in the list. If several entries could be the
/// output, the last one wins.
pub fn from_object_vector(shaders: &[Shader]) -> Result<ShaderNetwork, ConnectionError> {
    let mut network = ShaderNetwork::new();

    for (index, member) in shaders.iter().enumerate() {
        let mut shader = member.clone();
        let mut handle = Handle::from(DEFAULT_HANDLE);
        let mut links: Vec<(Parameter, String)> = Vec::new();

        shader.parameters.retain(|name, value| {
            let ParameterValue::String(s) = value else {
                return true;
            };
            if name == HANDLE_PARAMETER {
                handle = Handle::from(s.as_str());
                false
            } else if let Some(source) = linked_parameter(s) {
                links.push((source, name.clone()));
                false
            } else {
                true
            }
        });

        network.add_shader(handle.clone(), shader);
        for (source, name) in links {
            network.add_connection(Connection::new(source, Parameter::new(handle.clone(), name)))?;
        }

        if index + 1 == shaders.len() {
            network.set_output(Parameter::default_output(handle));
        }
    }

    tracing::debug!(
        shaders = network.len(),
        connections = network.connection_count(),
        "Converted flat shader list"
    );
    Ok(network)
}

/// Encode a network in the flat form.
///
/// Shaders are ordered so that every shader follows the shaders it reads
/// from, with the output last. Shaders the output doesn't depend on can't be
/// expressed and are left out, as is the name of the output parameter.
pub fn to_object_vector(network: &ShaderNetwork) -> Vec<Shader> {
    let output = &network.output().shader;
    if !network.contains(output.as_str()) {
        tracing::warn!(output = %network.output(), "No output shader in network");
        return Vec::new();
    }

    // Post-order walk from the output, so sources come first
    let mut order: Vec<Handle> = Vec::new();
    let mut visited: HashSet<Handle> = HashSet::new();
    let mut stack: Vec<(Handle, bool)> = vec![(output.clone(), false)];
    while let Some((handle, expanded)) = stack.pop() {
        if expanded {
            order.push(handle);
            continue;
        }
        if !visited.insert(handle.clone()) {
            continue;
        }
        let inputs = network.input_connections(&handle);
        stack.push((handle, true));
        for connection in inputs.into_iter().rev() {
            let source = connection.source.shader;
            if !source.is_empty() && !visited.contains(&source) {
                stack.push((source, false));
            }
        }
    }

    order
        .iter()
        .filter_map(|handle| {
            let mut shader = network.shader(handle.as_str())?.clone();
            shader.parameters.insert(
                HANDLE_PARAMETER.to_string(),
                ParameterValue::String(handle.to_string()),
            );
            for connection in network.input_connections(handle) {
                shader.parameters.insert(
                    connection.destination.name,
                    ParameterValue::String(link_string(&connection.source)),
                );
            }
            Some(shader)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_network() -> Vec<Shader> {
        vec![
            Shader::new("noise", "osl:shader")
                .with_parameter(HANDLE_PARAMETER, "noiseHandle")
                .with_parameter("scale", 2.0_f32),
            Shader::new("image", "osl:shader")
                .with_parameter(HANDLE_PARAMETER, "imageHandle")
                .with_parameter("filename", "wood.tx"),
            Shader::new("standard_surface", "osl:surface")
                .with_parameter("Kd", "link:noiseHandle")
                .with_parameter("Cs", "link:imageHandle.rgb")
                .with_parameter("label", "linked"),
        ]
    }

    #[test]
    fn test_from_object_vector() {
        let network = from_object_vector(&flat_network()).unwrap();

        assert_eq!(network.len(), 3);
        assert_eq!(network.output(), &Parameter::default_output(DEFAULT_HANDLE));

        let noise = network.shader("noiseHandle").unwrap();
        assert!(noise.parameter(HANDLE_PARAMETER).is_none());
        assert_eq!(noise.parameter("scale"), Some(&ParameterValue::Float(2.0)));

        let surface = network.shader(DEFAULT_HANDLE).unwrap();
        assert_eq!(surface.parameters.len(), 1);
        assert_eq!(surface.parameter("label"), Some(&ParameterValue::from("linked")));

        assert_eq!(
            network.input(&Parameter::new(DEFAULT_HANDLE, "Kd")),
            Parameter::default_output("noiseHandle")
        );
        assert_eq!(
            network.input(&Parameter::new(DEFAULT_HANDLE, "Cs")),
            Parameter::new("imageHandle", "rgb")
        );
    }

    #[test]
    fn test_from_object_vector_last_wins() {
        let mut shaders = flat_network();
        shaders.swap(0, 1);
        shaders.pop();

        let network = from_object_vector(&shaders).unwrap();
        assert_eq!(network.output(), &Parameter::default_output("noiseHandle"));
    }

    #[test]
    fn test_from_object_vector_unknown_link() {
        let shaders = vec![Shader::new("surface", "osl:surface").with_parameter("Kd", "link:missing")];
        assert_eq!(
            from_object_vector(&shaders).unwrap_err(),
            ConnectionError::ShaderNotFound(Parameter::default_output("missing"))
        );
    }

    #[test]
    fn test_from_object_vector_empty() {
        let network = from_object_vector(&[]).unwrap();
        assert!(network.is_empty());
        assert!(network.output().is_empty());
    }

    #[test]
    fn test_to_object_vector() {
        let network = from_object_vector(&flat_network()).unwrap();
        let shaders = to_object_vector(&network);

        assert_eq!(shaders.len(), 3);
        let last = shaders.last().unwrap();
        assert_eq!(last.name, "standard_surface");
        assert_eq!(last.parameter(HANDLE_PARAMETER), Some(&ParameterValue::from(DEFAULT_HANDLE)));
        assert_eq!(last.parameter("Kd"), Some(&ParameterValue::from("link:noiseHandle")));
        assert_eq!(last.parameter("Cs"), Some(&ParameterValue::from("link:imageHandle.rgb")));

        // Converting back reproduces the network
        assert_eq!(from_object_vector(&shaders).unwrap(), network);
    }

    #[test]
    fn test_to_object_vector_orders_sources_first() {
        let mut network = ShaderNetwork::new();
        network.add_shader("surface", Shader::new("surface", "osl:surface"));
        network.add_shader("mix", Shader::new("mix", "osl:shader"));
        network.add_shader("a", Shader::new("noise", "osl:shader"));
        network.add_shader("b", Shader::new("noise", "osl:shader"));
        network.add_shader("unused", Shader::new("noise", "osl:shader"));
        for (source, destination, input) in [
            ("mix", "surface", "Cs"),
            ("a", "mix", "x"),
            ("b", "mix", "y"),
            ("a", "b", "in"),
        ] {
            network
                .add_connection(Connection::new(
                    Parameter::new(source, "out"),
                    Parameter::new(destination, input),
                ))
                .unwrap();
        }
        network.set_output(Parameter::default_output("surface"));

        let handles: Vec<String> = to_object_vector(&network)
            .iter()
            .filter_map(|s| s.parameter(HANDLE_PARAMETER)?.as_str().map(str::to_string))
            .collect();
        assert_eq!(handles, vec!["a", "b", "mix", "surface"]);
    }

    #[test]
    fn test_to_object_vector_without_output() {
        let mut network = ShaderNetwork::new();
        network.add_shader("a", Shader::new("noise", "osl:shader"));
        assert!(to_object_vector(&network).is_empty());
    }
}
