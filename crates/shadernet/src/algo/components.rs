// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversion of component connections.
//!
//! Networks authored elsewhere address single channels of vector and color
//! parameters with a suffix, e.g. `diffuse.r` or `position.x`. Shading
//! languages express that in one of two ways:
//!
//! - Natively, with an index subscript: `diffuse[0]`. OSL supports this from
//!   1.10 onwards.
//! - Not at all, in which case the channel is extracted with a swizzle
//!   shader on the output side, or assembled with a pack shader on the input
//!   side.
//!
//! [`convert_component_connections`] rewrites a network into whichever form
//! the target version supports. Only shaders whose type starts with the
//! configured language prefix are touched.

use crate::connection::{Connection, Handle, Parameter};
use crate::network::{ConnectionError, ShaderNetwork};
use crate::shader::Shader;
use crate::value::ParameterValue;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// OSL 1.9, the version assumed when none is given
pub const OSL_1_9: u32 = 10900;

/// OSL 1.10, the first version with native component connections
pub const OSL_1_10: u32 = 11000;

const SWIZZLE_HANDLE: &str = "swizzle";
const SWIZZLE_SHADER: &str = "MaterialX/mx_swizzle_color_float";
const PACK_HANDLE: &str = "pack";
const PACK_SHADER: &str = "MaterialX/mx_pack_color";
const IN_PARAMETER: &str = "in";
const OUT_PARAMETER: &str = "out";
const CHANNELS_PARAMETER: &str = "channels";
const PACK_IN_PARAMETERS: [&str; 3] = ["in1", "in2", "in3"];
const VECTOR_COMPONENTS: [&str; 3] = ["x", "y", "z"];
const COLOR_COMPONENTS: [&str; 3] = ["r", "g", "b"];

/// Options for [`convert_component_connections`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentConversion {
    /// Type prefix of the shaders to convert, e.g. `osl`
    pub language: String,
    /// Version of the target language
    pub version: u32,
    /// First version supporting indexed component connections
    pub native_threshold: u32,
}

impl ComponentConversion {
    /// OSL conversion for a given OSL version
    pub fn osl(version: u32) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Whether the target supports `[i]` component connections directly
    pub fn native_components(&self) -> bool {
        self.version >= self.native_threshold
    }

    fn adapter_type(&self) -> String {
        format!("{}:shader", self.language)
    }
}

impl Default for ComponentConversion {
    fn default() -> Self {
        Self {
            language: "osl".to_string(),
            version: OSL_1_9,
            native_threshold: OSL_1_10,
        }
    }
}

/// A parameter name split into its base and a single channel suffix
struct Component<'a> {
    base: &'a str,
    suffix: &'a str,
    index: usize,
}

impl<'a> Component<'a> {
    /// Split `name` of the form `<base>.<c>` with `c` one of `xyzrgb`
    fn parse(name: &'a str) -> Option<Self> {
        let (base, suffix) = name.rsplit_once('.')?;
        let index = VECTOR_COMPONENTS
            .iter()
            .position(|c| *c == suffix)
            .or_else(|| COLOR_COMPONENTS.iter().position(|c| *c == suffix))?;
        Some(Self {
            base,
            suffix,
            index,
        })
    }

    /// The name using index subscript syntax, e.g. `diffuse[0]`
    fn indexed_name(&self) -> String {
        format!("{}[{}]", self.base, self.index)
    }

    /// Whether the suffix is one of `rgb`
    fn is_color(&self) -> bool {
        COLOR_COMPONENTS.contains(&self.suffix)
    }

    /// The same channel in vector spelling, e.g. `diffuse.x` for `diffuse.r`
    fn vector_name(&self) -> String {
        format!("{}.{}", self.base, VECTOR_COMPONENTS[self.index])
    }
}

/// Rewrite component connections on the shaders of `options.language`.
///
/// Running it twice with the same options changes nothing the second time.
pub fn convert_component_connections(
    network: &mut ShaderNetwork,
    options: &ComponentConversion,
) -> Result<(), ConnectionError> {
    convert_outputs(network, options)?;
    convert_inputs(network, options)
}

/// Convert OSL component connections assuming OSL 1.9
pub fn convert_osl_component_connections(network: &mut ShaderNetwork) -> Result<(), ConnectionError> {
    convert_component_connections(network, &ComponentConversion::default())
}

/// Convert OSL component connections for a specific OSL version, e.g. `11000`
pub fn convert_osl_component_connections_for_version(
    network: &mut ShaderNetwork,
    osl_version: u32,
) -> Result<(), ConnectionError> {
    convert_component_connections(network, &ComponentConversion::osl(osl_version))
}

fn convert_outputs(network: &mut ShaderNetwork, options: &ComponentConversion) -> Result<(), ConnectionError> {
    // Swizzle output for each source parameter we already inserted one for
    let mut swizzles: HashMap<Parameter, Parameter> = HashMap::new();

    let handles: Vec<Handle> = network.handles().cloned().collect();
    for handle in &handles {
        for connection in network.input_connections(handle) {
            let governed = network
                .shader(connection.source.shader.as_str())
                .is_some_and(|s| s.is_language(&options.language));
            if !governed {
                continue;
            }
            let Some(component) = Component::parse(&connection.source.name) else {
                continue;
            };

            let source = if options.native_components() {
                Parameter::new(connection.source.shader.clone(), component.indexed_name())
            } else {
                let base = Parameter::new(connection.source.shader.clone(), component.base);
                if let Some(swizzle_out) = swizzles.get(&base) {
                    swizzle_out.clone()
                } else {
                    let swizzle = Shader::new(SWIZZLE_SHADER, options.adapter_type())
                        .with_parameter(CHANNELS_PARAMETER, component.suffix);
                    let swizzle_handle = network.unique_handle(SWIZZLE_HANDLE);
                    let swizzle_handle = network.add_shader(swizzle_handle, swizzle);
                    network.add_connection(Connection::new(
                        base.clone(),
                        Parameter::new(swizzle_handle.clone(), IN_PARAMETER),
                    ))?;
                    tracing::debug!(source = %base, swizzle = %swizzle_handle, "Inserted swizzle shader");

                    let swizzle_out = Parameter::new(swizzle_handle, OUT_PARAMETER);
                    swizzles.insert(base, swizzle_out.clone());
                    swizzle_out
                }
            };

            tracing::trace!(%connection, %source, "Rewriting component output");
            network.remove_connection(&connection);
            network.add_connection(Connection::new(source, connection.destination))?;
        }
    }

    Ok(())
}

fn convert_inputs(network: &mut ShaderNetwork, options: &ComponentConversion) -> Result<(), ConnectionError> {
    let mut converted: HashSet<String> = HashSet::new();

    let handles: Vec<Handle> = network.handles().cloned().collect();
    for handle in &handles {
        let governed = network
            .shader(handle.as_str())
            .is_some_and(|s| s.is_language(&options.language));
        if !governed {
            continue;
        }

        converted.clear();
        let inputs = network.input_connections(handle);
        for connection in &inputs {
            let Some(component) = Component::parse(&connection.destination.name) else {
                continue;
            };

            if options.native_components() {
                if component.is_color() {
                    let vector_name = component.vector_name();
                    if inputs.iter().any(|c| c.destination.name == vector_name) {
                        // The vector spelling of the channel wins
                        tracing::trace!(%connection, "Dropping component input shadowed by {vector_name}");
                        network.remove_connection(connection);
                        continue;
                    }
                }

                let destination = Parameter::new(handle.clone(), component.indexed_name());
                let existing = network.input(&destination);
                if !existing.is_empty() {
                    return Err(ConnectionError::AlreadyConnected {
                        destination,
                        existing,
                    });
                }
                tracing::trace!(%connection, %destination, "Rewriting component input");
                network.remove_connection(connection);
                network.add_connection(Connection::new(connection.source.clone(), destination))?;
                continue;
            }

            if !converted.insert(component.base.to_string()) {
                // Handled when we visited another component of the same parameter
                network.remove_connection(connection);
                continue;
            }

            insert_pack(network, handle, component.base, options)?;
        }
    }

    Ok(())
}

/// Drive `handle.parameter` from a new pack shader, moving every component
/// connection of the parameter onto the pack's inputs.
fn insert_pack(
    network: &mut ShaderNetwork,
    handle: &Handle,
    parameter: &str,
    options: &ComponentConversion,
) -> Result<(), ConnectionError> {
    // Unconnected components fall back to the current value
    let current = network
        .shader(handle.as_str())
        .and_then(|s| s.parameter(parameter));
    let value = match current.and_then(ParameterValue::as_triple) {
        Some(value) => value,
        None => {
            if let Some(current) = current {
                tracing::trace!(
                    shader = %handle,
                    parameter,
                    value_type = current.type_name(),
                    "Pack defaults to zero for non vector value"
                );
            }
            [0.0; 3]
        }
    };

    let mut pack = Shader::new(PACK_SHADER, options.adapter_type());
    for (name, v) in PACK_IN_PARAMETERS.iter().zip(value) {
        pack.parameters.insert((*name).to_string(), ParameterValue::Float(v));
    }
    let pack_handle = network.unique_handle(PACK_HANDLE);
    let pack_handle = network.add_shader(pack_handle, pack);

    let destination = Parameter::new(handle.clone(), parameter);
    if let Some(superseded) = network.disconnect(&destination) {
        tracing::debug!(%destination, %superseded, "Replacing connection with pack shader");
    }
    network.add_connection(Connection::new(
        Parameter::new(pack_handle.clone(), OUT_PARAMETER),
        destination,
    ))?;

    for (i, pack_input) in PACK_IN_PARAMETERS.iter().enumerate() {
        let vector = network.disconnect(&Parameter::new(
            handle.clone(),
            format!("{parameter}.{}", VECTOR_COMPONENTS[i]),
        ));
        let color = network.disconnect(&Parameter::new(
            handle.clone(),
            format!("{parameter}.{}", COLOR_COMPONENTS[i]),
        ));
        if let Some(source) = vector.or(color) {
            network.add_connection(Connection::new(
                source,
                Parameter::new(pack_handle.clone(), *pack_input),
            ))?;
        }
    }

    tracing::debug!(shader = %handle, parameter, pack = %pack_handle, "Inserted pack shader");
    Ok(())
}
