// SPDX-License-Identifier: MIT OR Apache-2.0
//! Removal of shaders that don't contribute to the network output.

use crate::connection::Handle;
use crate::network::ShaderNetwork;
use std::collections::HashSet;

/// Handles of every shader reachable from the output by following inputs
/// back to their sources.
fn visit_inputs(network: &ShaderNetwork) -> HashSet<Handle> {
    let mut visited = HashSet::new();
    let mut stack = vec![network.output().shader.clone()];

    while let Some(handle) = stack.pop() {
        if !visited.insert(handle.clone()) {
            continue;
        }
        for connection in network.input_connections(&handle) {
            if !visited.contains(&connection.source.shader) {
                stack.push(connection.source.shader);
            }
        }
    }

    visited
}

/// Remove every shader the output doesn't depend on, along with its
/// connections. Returns the number of shaders removed.
///
/// An output naming a shader that doesn't exist reaches nothing, so every
/// shader is removed.
pub fn remove_unused_shaders(network: &mut ShaderNetwork) -> usize {
    let visited = visit_inputs(network);

    let unused: Vec<Handle> = network
        .handles()
        .filter(|handle| !visited.contains(*handle))
        .cloned()
        .collect();

    for handle in &unused {
        network.remove_shader(handle);
    }

    tracing::debug!(
        removed = unused.len(),
        remaining = network.len(),
        "Removed unused shaders"
    );
    unused.len()
}
