//! The multiplexing renderer facade.
//!
//! [`RendererFacade`] is the single entry point the scene layer talks to.
//! It forwards every call to each registered backend in registration
//! order, translates facade scene contexts into the per-backend contexts
//! they were opened with, mints handles for unnamed objects and keeps the
//! set of looks defined while any scene is open.
//!
//! The facade is single-threaded by contract. Hosts that need it on more
//! than one thread wrap it in a [`SharedFacade`], which serializes all calls.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use super::dispatch::{renderer_addr, RendererDispatch, RendererRef};
use super::handles::{HandleKind, HandleMinter};
use super::types::{
    BlobbyStream, Capabilities, Context, CurveBasis, CurveTopology, MeshTopology, PatchTopology,
    ShaderKind, SphereShape, Wrap,
};
use crate::core::{Scalar, TypedValue};
use crate::util::{Error, Mat4, Result, Severity, SinkRef, Time, TracingSink, Vec3};

/// Facade shared across threads; every call goes through the one lock.
pub type SharedFacade = Arc<Mutex<RendererFacade>>;

type Backend = dyn RendererDispatch + Send;

struct Registered {
    id: u64,
    renderer: RendererRef,
    /// Capabilities already reported missing.
    warned: Capabilities,
}

/// Backend context a facade context was opened with.
#[derive(Clone, Copy, Debug)]
struct SubContext {
    renderer: u64,
    context: Context,
}

/// Fan-out front end over any number of backends.
pub struct RendererFacade {
    renderers: Vec<Registered>,
    next_renderer: u64,
    contexts: BTreeMap<Context, Vec<SubContext>>,
    current: Option<Context>,
    next_context: Context,
    looks: HashSet<String>,
    /// One entry per open look block; `false` when the block was refused.
    open_looks: Vec<bool>,
    handles: HandleMinter,
    sink: SinkRef,
}

impl Default for RendererFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl RendererFacade {
    /// Facade logging through `tracing`.
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    /// Facade reporting diagnostics to `sink`.
    pub fn with_sink(sink: SinkRef) -> Self {
        Self {
            renderers: Vec::new(),
            next_renderer: 0,
            contexts: BTreeMap::new(),
            current: None,
            next_context: 1,
            looks: HashSet::new(),
            open_looks: Vec::new(),
            handles: HandleMinter::new(),
            sink,
        }
    }

    pub fn into_shared(self) -> SharedFacade {
        Arc::new(Mutex::new(self))
    }

    /// Diagnostics sink, for collaborators reporting through the same channel.
    pub fn sink(&self) -> &SinkRef {
        &self.sink
    }

    pub(crate) fn log(&self, message: &str, severity: Severity) {
        self.sink.log(message, severity);
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Append a backend unless this very backend is already registered.
    pub fn register_renderer(&mut self, renderer: RendererRef) {
        let addr = renderer_addr(&renderer);
        if self.renderers.iter().any(|r| renderer_addr(&r.renderer) == addr) {
            let name = renderer.lock().name().to_string();
            self.log(&format!("renderer '{name}' is already registered"), Severity::Info);
            return;
        }
        let id = self.next_renderer;
        self.next_renderer += 1;
        tracing::debug!(id, name = renderer.lock().name(), "register renderer");
        self.renderers.push(Registered { id, renderer, warned: Capabilities::empty() });
    }

    /// Remove a backend if registered.
    pub fn unregister_renderer(&mut self, renderer: &RendererRef) {
        let addr = renderer_addr(renderer);
        let Some(pos) = self.renderers.iter().position(|r| renderer_addr(&r.renderer) == addr) else {
            return;
        };
        let removed = self.renderers.remove(pos);
        for subs in self.contexts.values_mut() {
            subs.retain(|s| s.renderer != removed.id);
        }
        tracing::debug!(id = removed.id, "unregister renderer");
    }

    pub fn num_renderers(&self) -> usize {
        self.renderers.len()
    }

    fn each(&self, mut f: impl FnMut(&mut Backend)) {
        for r in &self.renderers {
            f(&mut *r.renderer.lock());
        }
    }

    /// Like [`each`](Self::each) but skips backends lacking `cap`.
    fn each_capable(&mut self, cap: Capabilities, call: &str, mut f: impl FnMut(&mut Backend)) {
        for r in self.renderers.iter_mut() {
            let mut backend = r.renderer.lock();
            if backend.capabilities().contains(cap) {
                f(&mut *backend);
            } else if !r.warned.contains(cap) {
                r.warned |= cap;
                self.sink.log(
                    &format!("renderer '{}' does not support {call}; calls skipped", backend.name()),
                    Severity::Warning,
                );
            }
        }
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Open a scene on every backend and make it current.
    pub fn begin_scene(&mut self, destination: &str, binary: bool, compressed: bool) -> Context {
        let context = self.next_context;
        self.next_context += 1;
        let subs = self
            .renderers
            .iter()
            .map(|r| SubContext {
                renderer: r.id,
                context: r.renderer.lock().begin_scene(destination, binary, compressed),
            })
            .collect();
        self.contexts.insert(context, subs);
        self.current = Some(context);
        tracing::debug!(context, destination, "begin scene");
        context
    }

    /// Make `context` current on every backend. Unknown contexts are
    /// reported and ignored.
    pub fn switch_scene(&mut self, context: Context) {
        if !self.contexts.contains_key(&context) {
            self.log(&format!("switch_scene: {}", Error::UnknownContext(context)), Severity::Error);
            return;
        }
        self.sync_to(context);
    }

    pub fn current_scene(&self) -> Option<Context> {
        self.current
    }

    pub fn num_scenes(&self) -> usize {
        self.contexts.len()
    }

    /// End `context` (the current one when `None`).
    ///
    /// When other scenes remain open the most recently opened one becomes
    /// current; when none remain the look set is cleared.
    pub fn end_scene(&mut self, context: Option<Context>) {
        let Some(context) = context.or(self.current) else {
            self.log("end_scene: no scene is open", Severity::Error);
            return;
        };
        let Some(subs) = self.contexts.remove(&context) else {
            self.log(&format!("end_scene: {}", Error::UnknownContext(context)), Severity::Error);
            return;
        };
        for r in &self.renderers {
            if let Some(sub) = subs.iter().find(|s| s.renderer == r.id) {
                r.renderer.lock().end_scene(sub.context);
            }
        }
        tracing::debug!(context, "end scene");

        match self.contexts.keys().next_back().copied() {
            Some(remaining) => self.sync_to(remaining),
            None => {
                self.current = None;
                self.looks.clear();
                self.open_looks.clear();
            }
        }
    }

    fn sync_to(&mut self, context: Context) {
        let Some(subs) = self.contexts.get(&context) else {
            return;
        };
        for r in &self.renderers {
            match subs.iter().find(|s| s.renderer == r.id) {
                Some(sub) => r.renderer.lock().switch_scene(sub.context),
                None => tracing::debug!(context, renderer = r.id, "renderer has no scene for context"),
            }
        }
        self.current = Some(context);
    }

    // ========================================================================
    // Scene setup
    // ========================================================================

    pub fn world(&mut self) {
        self.each(|r| r.world());
    }

    pub fn camera(&mut self, handle: &str) -> String {
        let handle = self.handles.resolve(HandleKind::Camera, handle);
        self.each(|r| r.camera(&handle));
        handle
    }

    pub fn output(&mut self, name: &str, format: &str, data_channel: &str, camera: &str) {
        self.each(|r| r.output(name, format, data_channel, camera));
    }

    /// Render and close every scene; rendering ends the whole session.
    pub fn render(&mut self, camera: &str) {
        self.each(|r| r.render(camera));
        self.contexts.clear();
        self.current = None;
        self.looks.clear();
        self.open_looks.clear();
        tracing::debug!(camera, "render");
    }

    /// Declare that the next `times.len()` geometry/transform calls are
    /// motion samples.
    pub fn motion(&mut self, times: &[Time]) {
        self.each(|r| r.motion(times));
    }

    // ========================================================================
    // State stack
    // ========================================================================

    pub fn push_attributes(&mut self) {
        self.each(|r| r.push_attributes());
    }

    pub fn pop_attributes(&mut self) {
        self.each(|r| r.pop_attributes());
    }

    pub fn push_space(&mut self) {
        self.each(|r| r.push_space());
    }

    pub fn pop_space(&mut self) {
        self.each(|r| r.pop_space());
    }

    // ========================================================================
    // Values
    // ========================================================================

    pub fn parameter(&mut self, value: &TypedValue) {
        self.each(|r| r.parameter(value));
    }

    pub fn attribute(&mut self, value: &TypedValue) {
        self.each(|r| r.attribute(value));
    }

    pub fn option(&mut self, value: &TypedValue) {
        self.each(|r| r.option(value));
    }

    pub fn variable(&mut self, value: &TypedValue) {
        self.each(|r| r.variable(value));
    }

    pub fn parameter_value(&mut self, name: &str, value: impl Into<Scalar>) {
        self.parameter(&TypedValue::scalar(name, value));
    }

    pub fn attribute_value(&mut self, name: &str, value: impl Into<Scalar>) {
        self.attribute(&TypedValue::scalar(name, value));
    }

    pub fn option_value(&mut self, name: &str, value: impl Into<Scalar>) {
        self.option(&TypedValue::scalar(name, value));
    }

    pub fn variable_value(&mut self, name: &str, value: impl Into<Scalar>) {
        self.variable(&TypedValue::scalar(name, value));
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    pub fn space(&mut self, matrix: &Mat4) {
        self.each(|r| r.space(matrix));
    }

    pub fn append_space(&mut self, matrix: &Mat4) {
        self.each(|r| r.append_space(matrix));
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.each(|r| r.translate(offset));
    }

    pub fn rotate(&mut self, degrees: f32, axis: Vec3) {
        self.each(|r| r.rotate(degrees, axis));
    }

    pub fn scale(&mut self, factors: Vec3) {
        self.each(|r| r.scale(factors));
    }

    /// Record the current transform under a name.
    pub fn name_space(&mut self, handle: &str) -> String {
        let handle = self.handles.resolve(HandleKind::Space, handle);
        self.each(|r| r.name_space(&handle));
        handle
    }

    // ========================================================================
    // Shading
    // ========================================================================

    pub fn shader_tree_begin(&mut self, handle: &str) -> String {
        let handle = self.handles.resolve(HandleKind::ShaderTree, handle);
        self.each_capable(Capabilities::SHADERS, "shader trees", |r| r.shader_tree_begin(&handle));
        handle
    }

    pub fn shader_tree_end(&mut self) {
        self.each_capable(Capabilities::SHADERS, "shader trees", |r| r.shader_tree_end());
    }

    pub fn shader_tree(&mut self, handle: &str) {
        self.each_capable(Capabilities::SHADERS, "shader trees", |r| r.shader_tree(handle));
    }

    /// Wire `src.src_port` into `dst.dst_port` as a new node.
    pub fn connect_shaders(&mut self, handle: &str, src: &str, src_port: &str, dst: &str, dst_port: &str) -> String {
        let handle = self.handles.resolve(HandleKind::ShaderNode, handle);
        self.each_capable(Capabilities::SHADERS, "shader trees", |r| {
            r.connect_shaders(&handle, src, src_port, dst, dst_port)
        });
        handle
    }

    pub fn shader(&mut self, kind: ShaderKind, name: &str, handle: &str) -> String {
        let handle = self.handles.resolve(HandleKind::Shader, handle);
        self.each_capable(Capabilities::SHADERS, "shaders", |r| r.shader(kind, name, &handle));
        handle
    }

    pub fn light(&mut self, name: &str, handle: &str) -> String {
        let handle = self.handles.resolve(HandleKind::Light, handle);
        self.each_capable(Capabilities::LIGHTS, "lights", |r| r.light(name, &handle));
        handle
    }

    pub fn switch_light(&mut self, handle: &str, on: bool) {
        self.each_capable(Capabilities::LIGHTS, "lights", |r| r.switch_light(handle, on));
    }

    // ========================================================================
    // Looks
    // ========================================================================

    /// Whether a look of that name was defined in the open session.
    pub fn has_look(&self, handle: &str) -> bool {
        self.looks.contains(handle)
    }

    pub fn num_looks(&self) -> usize {
        self.looks.len()
    }

    /// Open a look block.
    ///
    /// A name already defined is refused with [`Error::LookAlreadyDefined`]
    /// and nothing is dispatched; the matching [`end_look`](Self::end_look)
    /// is still expected and is swallowed.
    pub fn begin_look(&mut self, handle: &str) -> Result<String> {
        let handle = self.handles.resolve(HandleKind::Look, handle);
        if self.looks.contains(&handle) {
            self.open_looks.push(false);
            self.log(&format!("begin_look: look '{handle}' is already defined"), Severity::Warning);
            return Err(Error::LookAlreadyDefined(handle));
        }
        self.each_capable(Capabilities::LOOKS, "looks", |r| r.begin_look(&handle));
        self.looks.insert(handle.clone());
        self.open_looks.push(true);
        Ok(handle)
    }

    /// Close the innermost look block.
    pub fn end_look(&mut self) -> Result<()> {
        match self.open_looks.pop() {
            Some(true) => {
                self.each_capable(Capabilities::LOOKS, "looks", |r| r.end_look());
                Ok(())
            }
            Some(false) => Ok(()),
            None => {
                self.log("end_look: no look block is open", Severity::Error);
                Err(Error::NoOpenLook)
            }
        }
    }

    /// Snapshot the current state as a look. Same duplicate policy as
    /// [`begin_look`](Self::begin_look).
    pub fn name_look(&mut self, handle: &str) -> Result<String> {
        let handle = self.handles.resolve(HandleKind::Look, handle);
        if self.looks.contains(&handle) {
            self.log(&format!("name_look: look '{handle}' is already defined"), Severity::Warning);
            return Err(Error::LookAlreadyDefined(handle));
        }
        self.each_capable(Capabilities::LOOKS, "looks", |r| r.name_look(&handle));
        self.looks.insert(handle.clone());
        Ok(handle)
    }

    pub fn look(&mut self, handle: &str) {
        self.each_capable(Capabilities::LOOKS, "looks", |r| r.look(handle));
    }

    pub fn append_look(&mut self, handle: &str) {
        self.each_capable(Capabilities::LOOKS, "looks", |r| r.append_look(handle));
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    pub fn points(&mut self, handle: &str, count: usize) -> String {
        let handle = self.handles.resolve(HandleKind::Object, handle);
        self.each_capable(Capabilities::POINTS, "points", |r| r.points(&handle, count));
        handle
    }

    pub fn curves(&mut self, handle: &str, basis: CurveBasis, wrap: Wrap, topology: &CurveTopology) -> String {
        let handle = self.handles.resolve(HandleKind::Object, handle);
        self.each_capable(Capabilities::CURVES, "curves", |r| r.curves(&handle, basis, wrap, topology));
        handle
    }

    pub fn patch(&mut self, handle: &str, topology: &PatchTopology) -> String {
        let handle = self.handles.resolve(HandleKind::Object, handle);
        self.each_capable(Capabilities::PATCHES, "patches", |r| r.patch(&handle, topology));
        handle
    }

    pub fn mesh(&mut self, handle: &str, topology: &MeshTopology) -> String {
        let handle = self.handles.resolve(HandleKind::Object, handle);
        self.each_capable(Capabilities::MESHES, "meshes", |r| r.mesh(&handle, topology));
        handle
    }

    pub fn sphere(&mut self, handle: &str, shape: &SphereShape) -> String {
        let handle = self.handles.resolve(HandleKind::Object, handle);
        self.each_capable(Capabilities::SPHERES, "spheres", |r| r.sphere(&handle, shape));
        handle
    }

    pub fn blobby(&mut self, handle: &str, stream: &BlobbyStream) -> String {
        let handle = self.handles.resolve(HandleKind::Object, handle);
        self.each_capable(Capabilities::BLOBBIES, "blobbies", |r| r.blobby(&handle, stream));
        handle
    }

    pub fn instance(&mut self, handle: &str) {
        self.each_capable(Capabilities::INSTANCES, "instances", |r| r.instance(handle));
    }
}
