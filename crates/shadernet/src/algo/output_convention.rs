// SPDX-License-Identifier: MIT OR Apache-2.0
//! Optional fix-up of the output shader type for Arnold networks.
//!
//! Networks read from shader ids only know the `ai:shader` type. Downstream
//! tools expect the output of an Arnold network to be typed `ai:surface`,
//! even though nothing says the output really is a surface: it could just
//! as well be a texture, a displacement or a volume. Other prefixes are
//! never touched.

use crate::network::ShaderNetwork;

const GENERIC_TYPE: &str = "ai:shader";
const SURFACE_TYPE: &str = "ai:surface";

/// Retype the output shader from `ai:shader` to `ai:surface`.
/// Returns whether anything changed.
pub fn apply_surface_output_convention(network: &mut ShaderNetwork) -> bool {
    let handle = network.output().shader.clone();
    let Some(shader) = network.shader_mut(handle.as_str()) else {
        return false;
    };
    if shader.shader_type != GENERIC_TYPE {
        return false;
    }

    shader.shader_type = SURFACE_TYPE.to_string();
    tracing::debug!(shader = %handle, "Retyped output shader as {SURFACE_TYPE}");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Parameter;
    use crate::shader::Shader;

    fn network(output_type: &str) -> ShaderNetwork {
        let mut network = ShaderNetwork::new();
        network.add_shader("noise", Shader::new("noise", "ai:shader"));
        network.add_shader("out", Shader::new("standard_surface", output_type));
        network.set_output(Parameter::default_output("out"));
        network
    }

    #[test]
    fn test_retypes_arnold_output() {
        let mut network = network("ai:shader");
        assert!(apply_surface_output_convention(&mut network));
        assert_eq!(network.shader("out").unwrap().shader_type, "ai:surface");
        // Only the output is touched
        assert_eq!(network.shader("noise").unwrap().shader_type, "ai:shader");
        assert!(!apply_surface_output_convention(&mut network));
    }

    #[test]
    fn test_other_types_untouched() {
        for shader_type in ["osl:shader", "ai:displacement", "ai:surface"] {
            let mut network = network(shader_type);
            assert!(!apply_surface_output_convention(&mut network));
            assert_eq!(network.shader("out").unwrap().shader_type, shader_type);
        }
    }

    #[test]
    fn test_missing_output() {
        let mut network = network("ai:shader");
        network.set_output(Parameter::default());
        assert!(!apply_surface_output_convention(&mut network));
    }
}
