//! Plain data carried by dispatch calls: contexts, capabilities and
//! primitive topologies.

use std::fmt;

/// Opaque scene context handle.
pub type Context = u64;

bitflags::bitflags! {
    /// Call families a backend implements.
    ///
    /// The facade does not forward a gated call to a backend that lacks
    /// the family; it warns once per backend and family instead.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        const POINTS = 1 << 0;
        const CURVES = 1 << 1;
        const PATCHES = 1 << 2;
        const MESHES = 1 << 3;
        const SPHERES = 1 << 4;
        const BLOBBIES = 1 << 5;
        const INSTANCES = 1 << 6;
        const SHADERS = 1 << 7;
        const LIGHTS = 1 << 8;
        const LOOKS = 1 << 9;

        const GEOMETRY = Self::POINTS.bits()
            | Self::CURVES.bits()
            | Self::PATCHES.bits()
            | Self::MESHES.bits()
            | Self::SPHERES.bits()
            | Self::BLOBBIES.bits();
    }
}

/// Shader slot a shader is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Surface,
    Displacement,
    Volume,
    Light,
    Imager,
    /// Node inside a shader tree.
    Generic,
}

impl ShaderKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Surface => "surface",
            Self::Displacement => "displacement",
            Self::Volume => "volume",
            Self::Light => "light",
            Self::Imager => "imager",
            Self::Generic => "shader",
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Interpolation basis for curves and parametric patches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CurveBasis {
    /// Polylines / bilinear patches
    #[default]
    Linear,
    Bezier,
    BSpline,
    CatmullRom,
    Hermite,
    Power,
}

impl CurveBasis {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Bezier => "bezier",
            Self::BSpline => "b-spline",
            Self::CatmullRom => "catmull-rom",
            Self::Hermite => "hermite",
            Self::Power => "power",
        }
    }

    /// Whether the basis is cubic (as opposed to linear).
    pub const fn is_cubic(self) -> bool {
        !matches!(self, Self::Linear)
    }

    /// Number of varying values for a curve with `vertices` control points
    /// under this basis (non-periodic).
    pub fn varying_count(self, vertices: usize) -> usize {
        match self {
            Self::Linear => vertices,
            Self::Bezier => (vertices.saturating_sub(4)) / 3 + 2,
            Self::Hermite => (vertices.saturating_sub(4)) / 2 + 2,
            Self::BSpline | Self::CatmullRom | Self::Power => vertices.saturating_sub(2),
        }
    }
}

/// Curve/patch wrap mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Wrap {
    /// Open curves
    #[default]
    NonPeriodic,
    /// Closed curves
    Periodic,
}

impl Wrap {
    pub const fn name(self) -> &'static str {
        match self {
            Self::NonPeriodic => "nonperiodic",
            Self::Periodic => "periodic",
        }
    }
}

/// Curve set topology.
#[derive(Clone, Debug, PartialEq)]
pub enum CurveTopology {
    /// `curves` curves of `vertices` control points each.
    Uniform { curves: usize, vertices: usize },
    /// Control point count per curve.
    PerCurve(Vec<i32>),
    /// NURBS curves with explicit orders and knots.
    Nurbs {
        counts: Vec<i32>,
        orders: Vec<i32>,
        knots: Vec<f32>,
        min: Vec<f32>,
        max: Vec<f32>,
    },
}

impl CurveTopology {
    pub fn num_curves(&self) -> usize {
        match self {
            Self::Uniform { curves, .. } => *curves,
            Self::PerCurve(counts) => counts.len(),
            Self::Nurbs { counts, .. } => counts.len(),
        }
    }

    /// Total control point count.
    pub fn num_vertices(&self) -> usize {
        match self {
            Self::Uniform { curves, vertices } => curves * vertices,
            Self::PerCurve(counts) | Self::Nurbs { counts, .. } => {
                counts.iter().map(|&c| c.max(0) as usize).sum()
            }
        }
    }
}

/// Patch topology.
#[derive(Clone, Debug, PartialEq)]
pub enum PatchTopology {
    Parametric {
        basis: CurveBasis,
        nu: usize,
        nv: usize,
        uwrap: Wrap,
        vwrap: Wrap,
    },
    Nurbs {
        nu: usize,
        uorder: usize,
        uknot: Vec<f32>,
        umin: f32,
        umax: f32,
        nv: usize,
        vorder: usize,
        vknot: Vec<f32>,
        vmin: f32,
        vmax: f32,
    },
}

/// Mesh interpretation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MeshScheme {
    #[default]
    Polygon,
    /// Subdivision surface with the named scheme (e.g. `catmull-clark`).
    Subdivision(String),
}

/// Face-indexed mesh topology.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshTopology {
    pub scheme: MeshScheme,
    pub face_counts: Vec<i32>,
    pub vertex_indices: Vec<i32>,
}

impl MeshTopology {
    pub fn num_faces(&self) -> usize {
        self.face_counts.len()
    }

    /// Number of face corners (face-varying element count).
    pub fn num_corners(&self) -> usize {
        self.vertex_indices.len()
    }
}

/// Sphere primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SphereShape {
    /// Full quadric with sweep limits (degrees).
    Quadric { radius: f32, zmin: f32, zmax: f32, theta_max: f32 },
    /// Implicit-surface shorthand: a single ellipsoid blob of `radius`.
    Blob { radius: f32 },
}

impl SphereShape {
    /// Closed sphere of `radius`.
    pub fn full(radius: f32) -> Self {
        Self::Quadric { radius, zmin: -radius, zmax: radius, theta_max: 360.0 }
    }
}

/// Flat implicit-surface program: opcodes, float operands, string operands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlobbyStream {
    /// Number of leaf primitives (what `varying` values are counted against).
    pub leaves: usize,
    pub codes: Vec<i32>,
    pub floats: Vec<f32>,
    pub strings: Vec<String>,
}
