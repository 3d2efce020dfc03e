//! Geometry emitters.
//!
//! Each emitter is built from one host geometry sample at one time value
//! and turns it into a list of [`TypedValue`]s plus topology, then into
//! facade calls:
//! - [`MeshEmitter`] - polygon and subdivision meshes
//! - [`CurvesEmitter`] - linear and cubic curve sets
//! - [`ParticlesEmitter`] - particle clouds (points, discs, spheres, blobbies)
//! - [`SphereEmitter`] - spheres, optionally fused into blobby groups
//! - [`HairEmitter`] - hair systems written in chunks
//!
//! Every emitter writes exactly one geometry call per grain (or a zero
//! translate standing in for one), so motion blocks stay balanced.

use crate::core::TypedValue;
use crate::render::RendererFacade;
use crate::util::{BBox3f, Vec3};

pub mod blobby;
pub mod curves;
pub mod displace;
pub mod hair;
pub mod mesh;
pub mod particles;
pub mod sphere;

pub use blobby::{BlobbyGroups, BlobbyGroupsRef, BlobbyNode, BlobbyOp, BlobbyTree};
pub use curves::{classify_width, CurvesEmitter, CurvesSample};
pub use displace::{displaced, DisplacementMap, DisplacementSource, DISPLACEMENT_BATCH};
pub use hair::{HairChunk, HairEmitter, HairSource};
pub use mesh::{MeshEmitter, MeshSample};
pub use particles::{ParticlesEmitter, ParticlesSample, RenderMode};
pub use sphere::{BlobMember, SphereEmitter, SphereSample};

/// Geometry a node can write, one sample at one time.
///
/// Large primitives split their data into grains. The node calls
/// [`start_grain`](Self::start_grain) once and then
/// [`write_next_grain`](Self::write_next_grain) [`granularity`](Self::granularity)
/// times; the default is a single grain holding everything.
pub trait GeometryData {
    /// Object-space bounds of the sample.
    fn bounds(&self) -> BBox3f;

    /// Emit the whole sample under `handle`.
    fn write(&mut self, facade: &mut RendererFacade, handle: &str);

    fn granularity(&self) -> usize {
        1
    }

    fn start_grain(&mut self) {}

    /// Emit the next grain; returns true when it was the last one.
    fn write_next_grain(&mut self, facade: &mut RendererFacade, handle: &str) -> bool {
        self.write(facade, handle);
        true
    }
}

/// Replay values as primitive parameters.
pub(crate) fn emit_parameters(facade: &mut RendererFacade, values: &[TypedValue]) {
    for value in values {
        facade.parameter(value);
    }
}

/// Neutral stand-in for a primitive that has nothing to draw.
pub(crate) fn emit_placeholder(facade: &mut RendererFacade) {
    facade.translate(Vec3::ZERO);
}
