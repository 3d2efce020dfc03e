//! What the exporter needs to know about a host scene object.

use std::fmt;
use std::sync::Arc;

use crate::core::Scalar;
use crate::geom::GeometryData;
use crate::render::ShaderKind;
use crate::util::{BBox3f, Time};

/// Primitive an object currently holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Mesh,
    NurbsSurface,
    NurbsCurve,
    Hair,
    Particles,
    ImplicitSphere,
    /// Reference to geometry written elsewhere.
    Archive,
    /// Transform only.
    #[default]
    Null,
}

impl PrimitiveKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mesh => "mesh",
            Self::NurbsSurface => "nurbs-surface",
            Self::NurbsCurve => "nurbs-curve",
            Self::Hair => "hair",
            Self::Particles => "particles",
            Self::ImplicitSphere => "implicit-sphere",
            Self::Archive => "archive",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A host property evaluated at one time.
#[derive(Clone, Debug, PartialEq)]
pub struct HostProperty {
    pub name: String,
    pub value: Scalar,
}

impl HostProperty {
    pub fn new(name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Shared handle to a host object.
pub type ObjectRef = Arc<dyn SceneObject>;

/// Host scene object.
pub trait SceneObject: Send + Sync {
    /// Full hierarchical name, unique in the scene.
    fn full_name(&self) -> String;

    fn kind(&self) -> PrimitiveKind;

    /// Evaluated world transform: 16 floats, row-major.
    fn transform_at(&self, time: Time) -> [f32; 16];

    /// World bounds as center and full extent.
    fn bounds_at(&self, time: Time) -> ([f32; 3], [f32; 3]);

    /// Custom properties at `time`.
    fn properties(&self, time: Time) -> Vec<HostProperty>;

    fn parent(&self) -> Option<ObjectRef> {
        None
    }

    /// Groups (owners) the object belongs to; the first names its look.
    fn groups(&self) -> Vec<String> {
        Vec::new()
    }

    /// Shaders bound directly to this object, in the host's order.
    fn shaders(&self) -> Vec<(ShaderKind, String)> {
        Vec::new()
    }

    /// Geometry sample at `time`, ready to write.
    fn geometry_at(&self, time: Time) -> Option<Box<dyn GeometryData>> {
        let _ = time;
        None
    }
}

/// World bounds of `object` at `time`.
pub fn object_bounds(object: &dyn SceneObject, time: Time) -> BBox3f {
    let (center, extent) = object.bounds_at(time);
    BBox3f::from_center_extent(center.into(), extent.into())
}
