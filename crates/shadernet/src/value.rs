// SPDX-License-Identifier: MIT OR Apache-2.0
//! Parameter values stored on shaders.
//!
//! A [`ParameterValue`] is a closed set of the value kinds a shading network
//! can carry: scalars, small vectors and colors, matrices, strings, splines
//! and arrays of all of these. Values are replaced wholesale, never edited
//! through a shared reference, and compare structurally.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Named parameter values of a single shader.
///
/// Ordering carries no meaning; it is preserved so that output is stable.
pub type Parameters = IndexMap<String, ParameterValue>;

/// 4x4 matrix, row major
pub type M44f = [[f32; 4]; 4];

/// Interpolation scheme of a spline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SplineBasis {
    /// Cubic bezier
    Bezier,
    /// Uniform cubic b-spline
    BSpline,
    /// Piecewise linear
    Linear,
    /// Catmull-Rom
    #[default]
    CatmullRom,
}

impl SplineBasis {
    /// Name used by renderer-neutral flat spline parameters
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bezier => "bezier",
            Self::BSpline => "bspline",
            Self::Linear => "linear",
            Self::CatmullRom => "catmull-rom",
        }
    }

    /// Parse a basis name, returning `None` for names we don't know
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bezier" => Some(Self::Bezier),
            "bspline" => Some(Self::BSpline),
            "linear" => Some(Self::Linear),
            "catmull-rom" => Some(Self::CatmullRom),
            _ => None,
        }
    }
}

/// A spline mapping scalar positions to values of type `Y`.
///
/// Points are kept sorted by position. Several points may share a position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spline<Y> {
    /// Interpolation basis
    pub basis: SplineBasis,
    points: Vec<(f32, Y)>,
}

impl<Y> Spline<Y> {
    /// Create a spline from an unordered list of points.
    /// Points with equal positions keep their relative order.
    pub fn new(basis: SplineBasis, points: impl IntoIterator<Item = (f32, Y)>) -> Self {
        let mut points: Vec<(f32, Y)> = points.into_iter().collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { basis, points }
    }

    /// Control points in position order
    pub fn points(&self) -> &[(f32, Y)] {
        &self.points
    }

    /// Number of control points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the spline has no control points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl<'de, Y: Deserialize<'de>> Deserialize<'de> for Spline<Y> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(rename = "Spline")]
        struct SplineData<Y> {
            basis: SplineBasis,
            points: Vec<(f32, Y)>,
        }

        // Points in files may be unordered
        let data = SplineData::deserialize(deserializer)?;
        Ok(Self::new(data.basis, data.points))
    }
}

impl<Y> Default for Spline<Y> {
    fn default() -> Self {
        Self {
            basis: SplineBasis::default(),
            points: Vec::new(),
        }
    }
}

/// Value of a shader parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i32),
    /// Float
    Float(f32),
    /// String
    String(String),
    /// 2D vector
    V2f([f32; 2]),
    /// 3D vector
    V3f([f32; 3]),
    /// RGB color
    Color3f([f32; 3]),
    /// RGBA color
    Color4f([f32; 4]),
    /// 4x4 matrix
    M44f(M44f),
    /// Float to float spline
    SplineFf(Spline<f32>),
    /// Float to RGB spline
    SplinefColor3f(Spline<[f32; 3]>),
    /// Float to RGBA spline
    SplinefColor4f(Spline<[f32; 4]>),
    /// Boolean array
    BoolVector(Vec<bool>),
    /// Integer array
    IntVector(Vec<i32>),
    /// Float array
    FloatVector(Vec<f32>),
    /// String array
    StringVector(Vec<String>),
    /// 2D vector array
    V2fVector(Vec<[f32; 2]>),
    /// 3D vector array
    V3fVector(Vec<[f32; 3]>),
    /// RGB color array
    Color3fVector(Vec<[f32; 3]>),
    /// RGBA color array
    Color4fVector(Vec<[f32; 4]>),
    /// Matrix array
    M44fVector(Vec<M44f>),
}

impl ParameterValue {
    /// Stable name of the value kind, used in log output
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::Float(_) => "Float",
            Self::String(_) => "String",
            Self::V2f(_) => "V2f",
            Self::V3f(_) => "V3f",
            Self::Color3f(_) => "Color3f",
            Self::Color4f(_) => "Color4f",
            Self::M44f(_) => "M44f",
            Self::SplineFf(_) => "SplineFf",
            Self::SplinefColor3f(_) => "SplinefColor3f",
            Self::SplinefColor4f(_) => "SplinefColor4f",
            Self::BoolVector(_) => "BoolVector",
            Self::IntVector(_) => "IntVector",
            Self::FloatVector(_) => "FloatVector",
            Self::StringVector(_) => "StringVector",
            Self::V2fVector(_) => "V2fVector",
            Self::V3fVector(_) => "V3fVector",
            Self::Color3fVector(_) => "Color3fVector",
            Self::Color4fVector(_) => "Color4fVector",
            Self::M44fVector(_) => "M44fVector",
        }
    }

    /// String contents, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Three channel contents of a vector or RGB color
    pub fn as_triple(&self) -> Option<[f32; 3]> {
        match self {
            Self::V3f(v) | Self::Color3f(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether the value is one of the spline kinds
    pub fn is_spline(&self) -> bool {
        matches!(
            self,
            Self::SplineFf(_) | Self::SplinefColor3f(_) | Self::SplinefColor4f(_)
        )
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for ParameterValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basis_names() {
        for basis in [
            SplineBasis::Bezier,
            SplineBasis::BSpline,
            SplineBasis::Linear,
            SplineBasis::CatmullRom,
        ] {
            assert_eq!(SplineBasis::from_name(basis.name()), Some(basis));
        }
        assert_eq!(SplineBasis::from_name("hermite"), None);
        assert_eq!(SplineBasis::default(), SplineBasis::CatmullRom);
    }

    #[test]
    fn test_spline_points_sorted() {
        let spline = Spline::new(
            SplineBasis::Linear,
            [(1.0, 10.0), (0.5, 5.0), (0.0, 0.0), (0.5, 6.0)],
        );

        let positions: Vec<f32> = spline.points().iter().map(|p| p.0).collect();
        assert_eq!(positions, vec![0.0, 0.5, 0.5, 1.0]);
        // Equal positions keep their input order
        assert_eq!(spline.points()[1].1, 5.0);
        assert_eq!(spline.points()[2].1, 6.0);
    }

    #[test]
    fn test_structural_equality() {
        let a = ParameterValue::Color3f([1.0, 0.5, 0.0]);
        let b = ParameterValue::Color3f([1.0, 0.5, 0.0]);
        let c = ParameterValue::V3f([1.0, 0.5, 0.0]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_triple(), c.as_triple());
    }

    #[test]
    fn test_serialization() {
        let value = ParameterValue::SplinefColor3f(Spline::new(
            SplineBasis::Bezier,
            [(0.0, [0.0, 0.0, 0.0]), (1.0, [1.0, 1.0, 1.0])],
        ));
        let ron_str = ron::ser::to_string_pretty(&value, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: ParameterValue = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded, value);
    }

    #[test]
    fn test_deserialized_points_sorted() {
        let loaded: Spline<f32> =
            ron::from_str("(basis: Linear, points: [(1.0, 1.0), (0.0, 0.0)])").unwrap();
        assert_eq!(loaded, Spline::new(SplineBasis::Linear, [(0.0, 0.0), (1.0, 1.0)]));
    }
}
