//! A backend that records every call it receives.
//!
//! Useful as a call trace for hosts and as the mock backend in tests.

use super::dispatch::RendererDispatch;
use super::types::{
    BlobbyStream, Capabilities, Context, CurveBasis, CurveTopology, MeshTopology, PatchTopology,
    ShaderKind, SphereShape, Wrap,
};
use crate::core::TypedValue;
use crate::util::{Mat4, Time, Vec3};

/// First context id a recording backend hands out.
pub const FIRST_RECORDED_CONTEXT: Context = 100;

/// One dispatched call.
#[derive(Clone, Debug)]
pub enum Call {
    BeginScene { destination: String, binary: bool, compressed: bool, context: Context },
    SwitchScene(Context),
    EndScene(Context),
    World,
    Camera(String),
    Output { name: String, format: String, data_channel: String, camera: String },
    Render(String),
    Motion(Vec<Time>),
    PushAttributes,
    PopAttributes,
    PushSpace,
    PopSpace,
    Parameter(TypedValue),
    Attribute(TypedValue),
    Option(TypedValue),
    Variable(TypedValue),
    Space(Mat4),
    AppendSpace(Mat4),
    Translate(Vec3),
    Rotate { degrees: f32, axis: Vec3 },
    Scale(Vec3),
    NameSpace(String),
    ShaderTreeBegin(String),
    ShaderTreeEnd,
    ShaderTree(String),
    ConnectShaders { handle: String, src: String, src_port: String, dst: String, dst_port: String },
    Shader { kind: ShaderKind, name: String, handle: String },
    Light { name: String, handle: String },
    SwitchLight { handle: String, on: bool },
    BeginLook(String),
    EndLook,
    NameLook(String),
    Look(String),
    AppendLook(String),
    Points { handle: String, count: usize },
    Curves { handle: String, basis: CurveBasis, wrap: Wrap, topology: CurveTopology },
    Patch { handle: String, topology: PatchTopology },
    Mesh { handle: String, topology: MeshTopology },
    Sphere { handle: String, shape: SphereShape },
    Blobby { handle: String, stream: BlobbyStream },
    Instance(String),
}

impl Call {
    /// Snake-case name of the dispatch method.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BeginScene { .. } => "begin_scene",
            Self::SwitchScene(_) => "switch_scene",
            Self::EndScene(_) => "end_scene",
            Self::World => "world",
            Self::Camera(_) => "camera",
            Self::Output { .. } => "output",
            Self::Render(_) => "render",
            Self::Motion(_) => "motion",
            Self::PushAttributes => "push_attributes",
            Self::PopAttributes => "pop_attributes",
            Self::PushSpace => "push_space",
            Self::PopSpace => "pop_space",
            Self::Parameter(_) => "parameter",
            Self::Attribute(_) => "attribute",
            Self::Option(_) => "option",
            Self::Variable(_) => "variable",
            Self::Space(_) => "space",
            Self::AppendSpace(_) => "append_space",
            Self::Translate(_) => "translate",
            Self::Rotate { .. } => "rotate",
            Self::Scale(_) => "scale",
            Self::NameSpace(_) => "name_space",
            Self::ShaderTreeBegin(_) => "shader_tree_begin",
            Self::ShaderTreeEnd => "shader_tree_end",
            Self::ShaderTree(_) => "shader_tree",
            Self::ConnectShaders { .. } => "connect_shaders",
            Self::Shader { .. } => "shader",
            Self::Light { .. } => "light",
            Self::SwitchLight { .. } => "switch_light",
            Self::BeginLook(_) => "begin_look",
            Self::EndLook => "end_look",
            Self::NameLook(_) => "name_look",
            Self::Look(_) => "look",
            Self::AppendLook(_) => "append_look",
            Self::Points { .. } => "points",
            Self::Curves { .. } => "curves",
            Self::Patch { .. } => "patch",
            Self::Mesh { .. } => "mesh",
            Self::Sphere { .. } => "sphere",
            Self::Blobby { .. } => "blobby",
            Self::Instance(_) => "instance",
        }
    }

    /// Whether this call emits a primitive (or a placeholder transform
    /// standing in for one inside a motion block).
    pub fn is_motion_sample(&self) -> bool {
        matches!(
            self,
            Self::Points { .. }
                | Self::Curves { .. }
                | Self::Patch { .. }
                | Self::Mesh { .. }
                | Self::Sphere { .. }
                | Self::Blobby { .. }
                | Self::Space(_)
                | Self::AppendSpace(_)
                | Self::Translate(_)
        )
    }
}

/// A call and the backend context current when it arrived.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub context: Context,
    pub call: Call,
}

/// Recording backend.
#[derive(Debug)]
pub struct RecordingBackend {
    name: String,
    capabilities: Capabilities,
    next_context: Context,
    current: Context,
    records: Vec<Recorded>,
}

impl RecordingBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: Capabilities::all(),
            next_context: FIRST_RECORDED_CONTEXT,
            current: 0,
            records: Vec::new(),
        }
    }

    /// Builder: advertise only `capabilities`.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn records(&self) -> &[Recorded] {
        &self.records
    }

    pub fn calls(&self) -> impl DoubleEndedIterator<Item = &Call> + '_ {
        self.records.iter().map(|r| &r.call)
    }

    /// Number of calls to the named method.
    pub fn count(&self, name: &str) -> usize {
        self.calls().filter(|c| c.name() == name).count()
    }

    /// Method names in call order.
    pub fn names(&self) -> Vec<&'static str> {
        self.calls().map(Call::name).collect()
    }

    /// Most recent parameter of that name.
    pub fn last_parameter(&self, name: &str) -> Option<&TypedValue> {
        self.calls()
            .filter_map(|c| match c {
                Call::Parameter(v) if v.name() == name => Some(v),
                _ => None,
            })
            .last()
    }

    /// Most recent attribute of that name.
    pub fn last_attribute(&self, name: &str) -> Option<&TypedValue> {
        self.calls()
            .filter_map(|c| match c {
                Call::Attribute(v) if v.name() == name => Some(v),
                _ => None,
            })
            .last()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    fn record(&mut self, call: Call) {
        tracing::trace!(backend = %self.name, call = call.name(), "record");
        self.records.push(Recorded { context: self.current, call });
    }
}

impl RendererDispatch for RecordingBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn begin_scene(&mut self, destination: &str, binary: bool, compressed: bool) -> Context {
        let context = self.next_context;
        self.next_context += 1;
        self.current = context;
        self.record(Call::BeginScene {
            destination: destination.to_string(),
            binary,
            compressed,
            context,
        });
        context
    }

    fn switch_scene(&mut self, context: Context) {
        self.current = context;
        self.record(Call::SwitchScene(context));
    }

    fn current_scene(&self) -> Context {
        self.current
    }

    fn end_scene(&mut self, context: Context) {
        self.record(Call::EndScene(context));
    }

    fn world(&mut self) {
        self.record(Call::World);
    }

    fn camera(&mut self, handle: &str) {
        self.record(Call::Camera(handle.to_string()));
    }

    fn output(&mut self, name: &str, format: &str, data_channel: &str, camera: &str) {
        self.record(Call::Output {
            name: name.to_string(),
            format: format.to_string(),
            data_channel: data_channel.to_string(),
            camera: camera.to_string(),
        });
    }

    fn render(&mut self, camera: &str) {
        self.record(Call::Render(camera.to_string()));
    }

    fn motion(&mut self, times: &[Time]) {
        self.record(Call::Motion(times.to_vec()));
    }

    fn push_attributes(&mut self) {
        self.record(Call::PushAttributes);
    }

    fn pop_attributes(&mut self) {
        self.record(Call::PopAttributes);
    }

    fn push_space(&mut self) {
        self.record(Call::PushSpace);
    }

    fn pop_space(&mut self) {
        self.record(Call::PopSpace);
    }

    fn parameter(&mut self, value: &TypedValue) {
        self.record(Call::Parameter(value.clone()));
    }

    fn attribute(&mut self, value: &TypedValue) {
        self.record(Call::Attribute(value.clone()));
    }

    fn option(&mut self, value: &TypedValue) {
        self.record(Call::Option(value.clone()));
    }

    fn variable(&mut self, value: &TypedValue) {
        self.record(Call::Variable(value.clone()));
    }

    fn space(&mut self, matrix: &Mat4) {
        self.record(Call::Space(*matrix));
    }

    fn append_space(&mut self, matrix: &Mat4) {
        self.record(Call::AppendSpace(*matrix));
    }

    fn translate(&mut self, offset: Vec3) {
        self.record(Call::Translate(offset));
    }

    fn rotate(&mut self, degrees: f32, axis: Vec3) {
        self.record(Call::Rotate { degrees, axis });
    }

    fn scale(&mut self, factors: Vec3) {
        self.record(Call::Scale(factors));
    }

    fn name_space(&mut self, handle: &str) {
        self.record(Call::NameSpace(handle.to_string()));
    }

    fn shader_tree_begin(&mut self, handle: &str) {
        self.record(Call::ShaderTreeBegin(handle.to_string()));
    }

    fn shader_tree_end(&mut self) {
        self.record(Call::ShaderTreeEnd);
    }

    fn shader_tree(&mut self, handle: &str) {
        self.record(Call::ShaderTree(handle.to_string()));
    }

    fn connect_shaders(&mut self, handle: &str, src: &str, src_port: &str, dst: &str, dst_port: &str) {
        self.record(Call::ConnectShaders {
            handle: handle.to_string(),
            src: src.to_string(),
            src_port: src_port.to_string(),
            dst: dst.to_string(),
            dst_port: dst_port.to_string(),
        });
    }

    fn shader(&mut self, kind: ShaderKind, name: &str, handle: &str) {
        self.record(Call::Shader { kind, name: name.to_string(), handle: handle.to_string() });
    }

    fn light(&mut self, name: &str, handle: &str) {
        self.record(Call::Light { name: name.to_string(), handle: handle.to_string() });
    }

    fn switch_light(&mut self, handle: &str, on: bool) {
        self.record(Call::SwitchLight { handle: handle.to_string(), on });
    }

    fn begin_look(&mut self, handle: &str) {
        self.record(Call::BeginLook(handle.to_string()));
    }

    fn end_look(&mut self) {
        self.record(Call::EndLook);
    }

    fn name_look(&mut self, handle: &str) {
        self.record(Call::NameLook(handle.to_string()));
    }

    fn look(&mut self, handle: &str) {
        self.record(Call::Look(handle.to_string()));
    }

    fn append_look(&mut self, handle: &str) {
        self.record(Call::AppendLook(handle.to_string()));
    }

    fn points(&mut self, handle: &str, count: usize) {
        self.record(Call::Points { handle: handle.to_string(), count });
    }

    fn curves(&mut self, handle: &str, basis: CurveBasis, wrap: Wrap, topology: &CurveTopology) {
        self.record(Call::Curves {
            handle: handle.to_string(),
            basis,
            wrap,
            topology: topology.clone(),
        });
    }

    fn patch(&mut self, handle: &str, topology: &PatchTopology) {
        self.record(Call::Patch { handle: handle.to_string(), topology: topology.clone() });
    }

    fn mesh(&mut self, handle: &str, topology: &MeshTopology) {
        self.record(Call::Mesh { handle: handle.to_string(), topology: topology.clone() });
    }

    fn sphere(&mut self, handle: &str, shape: &SphereShape) {
        self.record(Call::Sphere { handle: handle.to_string(), shape: *shape });
    }

    fn blobby(&mut self, handle: &str, stream: &BlobbyStream) {
        self.record(Call::Blobby { handle: handle.to_string(), stream: stream.clone() });
    }

    fn instance(&mut self, handle: &str) {
        self.record(Call::Instance(handle.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contexts_and_tagging() {
        let mut rec = RecordingBackend::new("rec");
        let a = rec.begin_scene("a", false, false);
        rec.world();
        let b = rec.begin_scene("b", true, false);
        rec.world();
        rec.switch_scene(a);
        rec.world();

        assert_eq!((a, b), (FIRST_RECORDED_CONTEXT, FIRST_RECORDED_CONTEXT + 1));
        let worlds: Vec<Context> = rec
            .records()
            .iter()
            .filter(|r| matches!(r.call, Call::World))
            .map(|r| r.context)
            .collect();
        assert_eq!(worlds, vec![a, b, a]);
        assert_eq!(rec.current_scene(), a);
    }

    #[test]
    fn test_lookup_helpers() {
        let mut rec = RecordingBackend::new("rec");
        rec.parameter(&TypedValue::from_float("width", 1.0));
        rec.parameter(&TypedValue::from_float("width", 2.0));
        rec.attribute(&TypedValue::from_int("id", 7));
        rec.points("p", 0);

        assert_eq!(rec.last_parameter("width").and_then(|v| v.first::<f32>()), Some(&2.0));
        assert_eq!(rec.last_attribute("id").and_then(|v| v.first::<i32>()), Some(&7));
        assert!(rec.last_parameter("missing").is_none());
        assert_eq!(rec.names(), vec!["parameter", "parameter", "attribute", "points"]);
    }
}
