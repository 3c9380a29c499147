// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader networks for VFX pipelines.
//!
//! This crate holds the in-memory model of a shading network, the graph of
//! shaders and parameter connections that makes up a material, along with
//! the passes used when moving networks between representations:
//! - Merging networks and pruning shaders the output doesn't use
//! - Converting `.r`/`.x` component connections for a target language
//! - Expanding splines into flat parameter triples and back
//! - Reading and writing the legacy flat shader list encoding
//!
//! ## Architecture
//!
//! Shaders are stored by [`Handle`] in a [`ShaderNetwork`]. Connections are
//! keyed by destination, so every input has at most one driver. Passes in
//! [`algo`] take the network by mutable reference and run synchronously;
//! the spline codec works on bare [`Parameters`] and borrows when there is
//! nothing to change.

pub mod value;
pub mod shader;
pub mod connection;
pub mod network;
pub mod algo;
pub mod settings;

pub use value::{ParameterValue, Parameters, Spline, SplineBasis};
pub use shader::Shader;
pub use connection::{Connection, Handle, Parameter};
pub use network::{ConnectionError, ShaderNetwork};
pub use settings::{PassSettings, PassSummary, SettingsError};
