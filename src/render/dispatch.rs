//! Backend renderer interface.
//!
//! Every method has a no-op default, so a backend implements only the
//! families it supports and advertises them through
//! [`RendererDispatch::capabilities`]. Handles arriving here are always
//! non-empty; the facade mints them before dispatching.

use std::sync::Arc;

use parking_lot::Mutex;

use super::types::{
    BlobbyStream, Capabilities, Context, CurveBasis, CurveTopology, MeshTopology, PatchTopology,
    ShaderKind, SphereShape, Wrap,
};
use crate::core::TypedValue;
use crate::util::{Mat4, Time, Vec3};

/// Shared handle to a registered backend. Identity is the allocation.
pub type RendererRef = Arc<Mutex<dyn RendererDispatch + Send>>;

/// Scene description calls a backend renderer receives.
#[allow(unused_variables)]
pub trait RendererDispatch {
    /// Name used in diagnostics.
    fn name(&self) -> &str {
        "renderer"
    }

    /// Call families this backend implements.
    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Start a scene and return the backend's own context handle.
    fn begin_scene(&mut self, destination: &str, binary: bool, compressed: bool) -> Context {
        0
    }
    fn switch_scene(&mut self, context: Context) {}
    fn current_scene(&self) -> Context {
        0
    }
    fn end_scene(&mut self, context: Context) {}

    // ========================================================================
    // Scene setup
    // ========================================================================

    fn world(&mut self) {}
    fn camera(&mut self, handle: &str) {}
    fn output(&mut self, name: &str, format: &str, data_channel: &str, camera: &str) {}
    fn render(&mut self, camera: &str) {}
    /// The next `times.len()` geometry or transform calls are the samples
    /// at these offsets.
    fn motion(&mut self, times: &[Time]) {}

    // ========================================================================
    // State stack
    // ========================================================================

    fn push_attributes(&mut self) {}
    fn pop_attributes(&mut self) {}
    fn push_space(&mut self) {}
    fn pop_space(&mut self) {}

    // ========================================================================
    // Values
    // ========================================================================

    /// Attach to the next primitive.
    fn parameter(&mut self, value: &TypedValue) {}
    /// Set on the current attribute state.
    fn attribute(&mut self, value: &TypedValue) {}
    /// Global renderer configuration.
    fn option(&mut self, value: &TypedValue) {}
    /// Generic named declaration.
    fn variable(&mut self, value: &TypedValue) {}

    // ========================================================================
    // Transforms
    // ========================================================================

    fn space(&mut self, matrix: &Mat4) {}
    fn append_space(&mut self, matrix: &Mat4) {}
    fn translate(&mut self, offset: Vec3) {}
    fn rotate(&mut self, degrees: f32, axis: Vec3) {}
    fn scale(&mut self, factors: Vec3) {}
    fn name_space(&mut self, handle: &str) {}

    // ========================================================================
    // Shading
    // ========================================================================

    fn shader_tree_begin(&mut self, handle: &str) {}
    fn shader_tree_end(&mut self) {}
    fn shader_tree(&mut self, handle: &str) {}
    fn connect_shaders(&mut self, handle: &str, src: &str, src_port: &str, dst: &str, dst_port: &str) {}
    fn shader(&mut self, kind: ShaderKind, name: &str, handle: &str) {}
    fn light(&mut self, name: &str, handle: &str) {}
    fn switch_light(&mut self, handle: &str, on: bool) {}

    // ========================================================================
    // Looks
    // ========================================================================

    fn begin_look(&mut self, handle: &str) {}
    fn end_look(&mut self) {}
    fn name_look(&mut self, handle: &str) {}
    fn look(&mut self, handle: &str) {}
    fn append_look(&mut self, handle: &str) {}

    // ========================================================================
    // Geometry
    // ========================================================================

    fn points(&mut self, handle: &str, count: usize) {}
    fn curves(&mut self, handle: &str, basis: CurveBasis, wrap: Wrap, topology: &CurveTopology) {}
    fn patch(&mut self, handle: &str, topology: &PatchTopology) {}
    fn mesh(&mut self, handle: &str, topology: &MeshTopology) {}
    fn sphere(&mut self, handle: &str, shape: &SphereShape) {}
    fn blobby(&mut self, handle: &str, stream: &BlobbyStream) {}
    /// Re-emit previously emitted geometry or an archive by handle.
    fn instance(&mut self, handle: &str) {}
}

/// Wrap a backend for registration.
pub fn renderer_ref<R: RendererDispatch + Send + 'static>(renderer: R) -> RendererRef {
    Arc::new(Mutex::new(renderer))
}

/// Identity of a registered backend (address of its allocation).
pub(crate) fn renderer_addr(renderer: &RendererRef) -> *const () {
    Arc::as_ptr(renderer).cast::<()>()
}
