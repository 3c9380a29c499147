// SPDX-License-Identifier: MIT OR Apache-2.0
//! Passes that rewrite shader networks and their parameters.

pub mod compose;
pub mod prune;
pub mod components;
pub mod spline;
pub mod object_vector;
pub mod output_convention;

pub use compose::add_shaders;
pub use prune::remove_unused_shaders;
pub use components::{
    convert_component_connections, convert_osl_component_connections,
    convert_osl_component_connections_for_version, ComponentConversion,
};
pub use spline::{
    collapse_network_splines, collapse_spline_parameters, expand_network_splines,
    expand_spline_parameters,
};
pub use object_vector::{from_object_vector, to_object_vector};
pub use output_convention::apply_surface_output_convention;
