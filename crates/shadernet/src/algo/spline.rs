// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversion between spline parameters and flat parameter triples.
//!
//! Renderers without a spline parameter type take three parameters instead:
//! `<name>Positions` (floats), `<name>Values` (floats or colors) and
//! `<name>Basis` (a basis name). [`expand_spline_parameters`] produces that
//! form and [`collapse_spline_parameters`] reads it back.
//!
//! OSL drops the first and last segment of linear splines, so expansion
//! duplicates the end points of linear splines and collapsing removes them
//! again. A linear triple that didn't come from expansion therefore loses
//! its end points when collapsed.

use crate::network::ShaderNetwork;
use crate::value::{ParameterValue, Parameters, Spline, SplineBasis};
use std::borrow::Cow;

const BASIS_SUFFIX: &str = "Basis";
const POSITIONS_SUFFIX: &str = "Positions";
const VALUES_SUFFIX: &str = "Values";

fn load_spline<Y: Clone>(basis: SplineBasis, positions: &[f32], values: &[Y]) -> Spline<Y> {
    // Mismatched lengths are truncated to the shorter array
    let n = positions.len().min(values.len());
    let unduplicate_end_points = basis == SplineBasis::Linear;

    let points = positions
        .iter()
        .zip(values)
        .enumerate()
        .filter(|(i, _)| !(unduplicate_end_points && (*i == 0 || *i + 1 == n)))
        .map(|(_, (x, y))| (*x, y.clone()));

    Spline::new(basis, points)
}

fn expand_spline<Y: Clone>(
    name: &str,
    spline: &Spline<Y>,
    values_parameter: fn(Vec<Y>) -> ParameterValue,
    parameters: &mut Parameters,
) {
    let duplicate_end_points = spline.basis == SplineBasis::Linear && !spline.is_empty();
    let extra = if duplicate_end_points { 2 } else { 0 };

    let mut positions = Vec::with_capacity(spline.len() + extra);
    let mut values = Vec::with_capacity(spline.len() + extra);

    if let (true, Some((x, y))) = (duplicate_end_points, spline.points().first()) {
        positions.push(*x);
        values.push(y.clone());
    }
    for (x, y) in spline.points() {
        positions.push(*x);
        values.push(y.clone());
    }
    if let (true, Some((x, y))) = (duplicate_end_points, spline.points().last()) {
        positions.push(*x);
        values.push(y.clone());
    }

    parameters.insert(
        format!("{name}{POSITIONS_SUFFIX}"),
        ParameterValue::FloatVector(positions),
    );
    parameters.insert(format!("{name}{VALUES_SUFFIX}"), values_parameter(values));
    parameters.insert(
        format!("{name}{BASIS_SUFFIX}"),
        ParameterValue::String(spline.basis.name().to_string()),
    );
}

/// Replace every complete `<name>Basis`/`<name>Positions`/`<name>Values`
/// triple with a single spline parameter `<name>`.
///
/// Triples with an unknown basis name or unsupported array types are left
/// alone. Returns the input itself when nothing was collapsed.
pub fn collapse_spline_parameters(parameters: &Parameters) -> Cow<'_, Parameters> {
    let mut collapsed: Option<Parameters> = None;

    for (basis_name, basis) in parameters {
        let Some(prefix) = basis_name.strip_suffix(BASIS_SUFFIX) else {
            continue;
        };
        let Some(basis) = basis.as_str().and_then(SplineBasis::from_name) else {
            continue;
        };

        let positions_name = format!("{prefix}{POSITIONS_SUFFIX}");
        let Some(ParameterValue::FloatVector(positions)) = parameters.get(&positions_name) else {
            continue;
        };

        let values_name = format!("{prefix}{VALUES_SUFFIX}");
        let spline = match parameters.get(&values_name) {
            Some(ParameterValue::FloatVector(values)) => {
                ParameterValue::SplineFf(load_spline(basis, positions, values))
            }
            Some(ParameterValue::Color3fVector(values)) => {
                ParameterValue::SplinefColor3f(load_spline(basis, positions, values))
            }
            Some(ParameterValue::Color4fVector(values)) => {
                ParameterValue::SplinefColor4f(load_spline(basis, positions, values))
            }
            _ => continue,
        };

        tracing::trace!(parameter = prefix, basis = basis.name(), "Collapsing spline parameters");
        let target = collapsed.get_or_insert_with(|| parameters.clone());
        target.shift_remove(basis_name);
        target.shift_remove(&positions_name);
        target.shift_remove(&values_name);
        target.insert(prefix.to_string(), spline);
    }

    match collapsed {
        Some(collapsed) => Cow::Owned(collapsed),
        None => Cow::Borrowed(parameters),
    }
}

/// Replace every spline parameter `<name>` with the three flat parameters
/// `<name>Positions`, `<name>Values` and `<name>Basis`.
///
/// Returns the input itself when it holds no splines.
pub fn expand_spline_parameters(parameters: &Parameters) -> Cow<'_, Parameters> {
    let splines = parameters.values().filter(|v| v.is_spline()).count();
    if splines == 0 {
        return Cow::Borrowed(parameters);
    }

    let mut expanded = Parameters::with_capacity(parameters.len() + 2 * splines);
    for (name, value) in parameters {
        match value {
            ParameterValue::SplineFf(spline) => {
                expand_spline(name, spline, ParameterValue::FloatVector, &mut expanded);
            }
            ParameterValue::SplinefColor3f(spline) => {
                expand_spline(name, spline, ParameterValue::Color3fVector, &mut expanded);
            }
            ParameterValue::SplinefColor4f(spline) => {
                expand_spline(name, spline, ParameterValue::Color4fVector, &mut expanded);
            }
            _ => {
                expanded.insert(name.clone(), value.clone());
            }
        }
    }

    Cow::Owned(expanded)
}

/// Collapse spline triples on every shader of `network`.
/// Returns the number of shaders that changed.
pub fn collapse_network_splines(network: &mut ShaderNetwork) -> usize {
    rewrite_network_parameters(network, collapse_spline_parameters)
}

/// Expand spline parameters on every shader of `network`.
/// Returns the number of shaders that changed.
pub fn expand_network_splines(network: &mut ShaderNetwork) -> usize {
    rewrite_network_parameters(network, expand_spline_parameters)
}

fn rewrite_network_parameters(
    network: &mut ShaderNetwork,
    rewrite: fn(&Parameters) -> Cow<'_, Parameters>,
) -> usize {
    let mut changed = 0;
    for (handle, shader) in network.shaders_mut() {
        let rewritten = match rewrite(&shader.parameters) {
            Cow::Owned(parameters) => Some(parameters),
            Cow::Borrowed(_) => None,
        };
        if let Some(parameters) = rewritten {
            tracing::debug!(shader = %handle, "Rewrote spline parameters");
            shader.parameters = parameters;
            changed += 1;
        }
    }
    changed
}
