//! Integration tests for the scene layer: nodes scanned from a mock host
//! and written through the facade.

use std::sync::Arc;

use parking_lot::Mutex;

use ueberman::core::{ExportOptions, Scalar};
use ueberman::geom::{
    BlobMember, BlobbyGroupsRef, GeometryData, HairChunk, HairEmitter, HairSource, MeshEmitter, MeshSample,
    ParticlesEmitter, ParticlesSample, RenderMode, SphereEmitter, SphereSample,
};
use ueberman::render::{Call, CurveBasis, RecordingBackend, RendererFacade, ShaderKind};
use ueberman::scene::{ExportPass, Finish, HostProperty, Node, ObjectRef, PrimitiveKind, SceneObject};
use ueberman::util::{BBox3f, MemorySink, Mat4, Result, Severity, Time, Vec3};
use ueberman::Error;

#[derive(Clone)]
enum Shape {
    Empty,
    Mesh(MeshSample),
    Hair(usize),
    /// Strand count at the first sample, then at every later one.
    GrowingHair(usize, usize),
    /// Every chunk read fails.
    BrokenHair(usize),
    Particles(ParticlesSample),
    Sphere(SphereSample, BlobbyGroupsRef),
}

/// Host object moving with constant velocity.
#[derive(Clone)]
struct Mock {
    name: String,
    kind: PrimitiveKind,
    velocity: Vec3,
    properties: Vec<HostProperty>,
    parent: Option<ObjectRef>,
    groups: Vec<String>,
    shaders: Vec<(ShaderKind, String)>,
    shape: Shape,
}

impl Mock {
    fn new(name: &str, kind: PrimitiveKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            velocity: Vec3::ZERO,
            properties: Vec::new(),
            parent: None,
            groups: Vec::new(),
            shaders: Vec::new(),
            shape: Shape::Empty,
        }
    }

    fn into_ref(self) -> ObjectRef {
        Arc::new(self)
    }
}

impl SceneObject for Mock {
    fn full_name(&self) -> String {
        self.name.clone()
    }

    fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    fn transform_at(&self, time: Time) -> [f32; 16] {
        Mat4::from_translation(self.velocity * time).to_cols_array()
    }

    fn bounds_at(&self, time: Time) -> ([f32; 3], [f32; 3]) {
        ((self.velocity * time).to_array(), [1.0; 3])
    }

    fn properties(&self, _time: Time) -> Vec<HostProperty> {
        self.properties.clone()
    }

    fn parent(&self) -> Option<ObjectRef> {
        self.parent.clone()
    }

    fn groups(&self) -> Vec<String> {
        self.groups.clone()
    }

    fn shaders(&self) -> Vec<(ShaderKind, String)> {
        self.shaders.clone()
    }

    fn geometry_at(&self, time: Time) -> Option<Box<dyn GeometryData>> {
        let hair = |source: Box<dyn HairSource>| -> Option<Box<dyn GeometryData>> {
            Some(Box::new(HairEmitter::new(source, CurveBasis::Linear, 10)))
        };
        match &self.shape {
            Shape::Empty => None,
            Shape::Mesh(sample) => Some(Box::new(MeshEmitter::new(sample.clone(), None))),
            Shape::Hair(strands) => hair(Box::new(Comb(*strands))),
            Shape::GrowingHair(first, later) => hair(Box::new(Comb(if time == 0.0 { *first } else { *later }))),
            Shape::BrokenHair(strands) => hair(Box::new(Broken(*strands))),
            Shape::Particles(sample) => {
                Some(Box::new(ParticlesEmitter::new(sample.clone(), &ExportOptions::default(), None)))
            }
            Shape::Sphere(sample, groups) => {
                Some(Box::new(SphereEmitter::new(sample.clone(), time, groups.clone())))
            }
        }
    }
}

/// Two-point strands along Y.
struct Comb(usize);

impl HairSource for Comb {
    fn num_strands(&self) -> usize {
        self.0
    }

    fn bounds(&self) -> BBox3f {
        BBox3f::new(Vec3::ZERO, Vec3::new(self.0 as f32, 1.0, 0.0))
    }

    fn read(&mut self, first: usize, count: usize) -> Result<HairChunk> {
        let positions = (first..first + count)
            .flat_map(|s| [Vec3::new(s as f32, 0.0, 0.0), Vec3::new(s as f32, 1.0, 0.0)])
            .collect();
        Ok(HairChunk { counts: vec![2; count], positions, widths: vec![0.05] })
    }
}

/// Hair whose host reads always fail.
struct Broken(usize);

impl HairSource for Broken {
    fn num_strands(&self) -> usize {
        self.0
    }

    fn bounds(&self) -> BBox3f {
        BBox3f::EMPTY
    }

    fn read(&mut self, first: usize, _count: usize) -> Result<HairChunk> {
        Err(Error::other(format!("strand {first} unreadable")))
    }
}

fn triangle() -> MeshSample {
    MeshSample {
        positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
        face_counts: vec![3],
        face_indices: vec![0, 1, 2],
        ..Default::default()
    }
}

fn facade() -> (RendererFacade, Arc<Mutex<RecordingBackend>>) {
    let mut facade = RendererFacade::new();
    let rec = Arc::new(Mutex::new(RecordingBackend::new("rec")));
    facade.register_renderer(rec.clone());
    (facade, rec)
}

fn blurred() -> ExportOptions {
    ExportOptions { motion_samples: 2, ..Default::default() }
}

/// For every `motion` call: the sample count it declared and the number of
/// sample calls that follow it. Parameters between samples are skipped; a
/// block ends at the first call that is not a sample or that switches
/// between transform and geometry samples.
fn motion_blocks(rec: &RecordingBackend) -> Vec<(usize, usize)> {
    let calls: Vec<&Call> = rec.calls().collect();
    let mut blocks = Vec::new();
    for (i, call) in calls.iter().enumerate() {
        let Call::Motion(times) = call else {
            continue;
        };
        let mut transforms = None;
        let mut samples = 0;
        for next in &calls[i + 1..] {
            if matches!(next, Call::Parameter(_)) {
                continue;
            }
            if !next.is_motion_sample() {
                break;
            }
            let is_space = matches!(next, Call::Space(_) | Call::AppendSpace(_));
            if *transforms.get_or_insert(is_space) != is_space {
                break;
            }
            samples += 1;
        }
        blocks.push((times.len(), samples));
    }
    blocks
}

fn assert_balanced(rec: &RecordingBackend) {
    let blocks = motion_blocks(rec);
    assert!(!blocks.is_empty());
    for (declared, written) in blocks {
        assert_eq!(declared, written, "{:?}", rec.names());
    }
}

#[test]
fn test_motion_blocks_match_sample_count() {
    let (mut facade, rec) = facade();
    let mut mesh = Mock::new("|tri", PrimitiveKind::Mesh);
    mesh.velocity = Vec3::X;
    mesh.shape = Shape::Mesh(triangle());

    ExportPass::new(blurred()).run(&mut facade, &[mesh.into_ref()], Finish::EndScene);

    let rec = rec.lock();
    assert_eq!(
        rec.names(),
        vec![
            "begin_scene", "option", "world", //
            "push_attributes", "attribute", "attribute", //
            "motion", "space", "space", //
            "motion", "parameter", "mesh", "parameter", "mesh", //
            "pop_attributes", "end_scene",
        ]
    );
    let spaces: Vec<Mat4> = rec
        .calls()
        .filter_map(|c| match c {
            Call::Space(m) => Some(*m),
            _ => None,
        })
        .collect();
    assert_eq!(spaces, vec![Mat4::IDENTITY, Mat4::from_translation(Vec3::new(0.5, 0.0, 0.0))]);
    assert!(matches!(rec.calls().nth(6), Some(Call::Motion(t)) if t == &[0.0, 0.5]));
    assert_balanced(&rec);
}

#[test]
fn test_placeholders_keep_motion_blocks_balanced() {
    let (mut facade, rec) = facade();
    let pass = ExportPass::new(blurred());

    let members = vec![
        BlobMember { world: Mat4::IDENTITY, radius: 1.0 },
        BlobMember { world: Mat4::from_translation(Vec3::X), radius: 1.0 },
    ];
    let spheres = members.iter().enumerate().map(|(i, m)| {
        let mut sample = SphereSample::new(m.radius);
        sample.world = m.world;
        sample.group = Some(3);
        sample.members = members.clone();
        let mut obj = Mock::new(&format!("|blob{i}"), PrimitiveKind::ImplicitSphere);
        obj.shape = Shape::Sphere(sample, pass.blobby_groups());
        obj.into_ref()
    });

    let mut mesh = Mock::new("|tri", PrimitiveKind::Mesh);
    mesh.velocity = Vec3::Y;
    mesh.shape = Shape::Mesh(triangle());
    let mut cloud = Mock::new("|cloud", PrimitiveKind::Particles);
    cloud.shape = Shape::Particles(ParticlesSample::new(RenderMode::Points));
    let mut broken = Mock::new("|broken", PrimitiveKind::Hair);
    broken.shape = Shape::BrokenHair(15);
    let mut growing = Mock::new("|growing", PrimitiveKind::Hair);
    growing.shape = Shape::GrowingHair(5, 25);

    let objects: Vec<ObjectRef> = [mesh, cloud, broken, growing]
        .into_iter()
        .map(Mock::into_ref)
        .chain(spheres)
        .collect();
    pass.run(&mut facade, &objects, Finish::EndScene);

    let rec = rec.lock();
    assert_balanced(&rec);
    // Transform blocks for all six objects; geometry blocks for the mesh,
    // the cloud, two broken hair chunks and both spheres.
    assert_eq!(motion_blocks(&rec).len(), 6 + 6);
    assert_eq!(rec.count("blobby"), 2);
    // Lost blobby claims, empty cloud, unreadable hair chunks.
    assert_eq!(rec.count("translate"), 2 + 2 + 4);
}

#[test]
fn test_mismatched_grains_fall_back_to_first_sample() {
    let (mut facade, rec) = facade();
    let mut hair = Mock::new("|fur", PrimitiveKind::Hair);
    hair.shape = Shape::GrowingHair(5, 25);

    let sink = MemorySink::new();
    let mut node = Node::scan(&hair, &[0.0, 0.5], &sink);
    assert_eq!(node.num_geometry_samples(), 1);
    assert!(sink.contains(Severity::Warning, "grains"));
    node.write(&mut facade);

    let rec = rec.lock();
    assert_balanced(&rec);
    assert_eq!(rec.count("motion"), 1);
    let curves: Vec<&str> = rec
        .calls()
        .filter_map(|c| match c {
            Call::Curves { handle, .. } => Some(handle.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(curves, vec!["|fur"]);
    assert_eq!(rec.last_parameter("P").map(|v| v.size()), Some(10));
}

#[test]
fn test_grouped_objects_share_one_look() {
    let (mut facade, rec) = facade();
    let objects: Vec<ObjectRef> = ["|a", "|b"]
        .into_iter()
        .map(|name| {
            let mut m = Mock::new(name, PrimitiveKind::Null);
            m.groups = vec!["chrome".into()];
            m.shaders = vec![(ShaderKind::Surface, "metal".into())];
            m.properties = vec![HostProperty::new("roughness", 0.1f32)];
            m.into_ref()
        })
        .collect();

    ExportPass::new(ExportOptions::default()).run(&mut facade, &objects, Finish::EndScene);

    let rec = rec.lock();
    assert_eq!(rec.count("begin_look"), 1);
    assert_eq!(rec.count("look"), 2);
    assert_eq!(rec.count("shader"), 1);
    let names = rec.names();
    let begin = names.iter().position(|n| *n == "begin_look").unwrap();
    assert_eq!(&names[begin..begin + 5], &["begin_look", "attribute", "shader", "end_look", "look"]);
    assert!(matches!(
        rec.calls().find(|c| c.name() == "shader"),
        Some(Call::Shader { kind: ShaderKind::Surface, name, handle }) if name == "metal" && handle == "__ueberManShader0"
    ));
}

#[test]
fn test_nearest_layer_wins() {
    let mut parent = Mock::new("|root", PrimitiveKind::Null);
    parent.properties = vec![HostProperty::new("color", "red"), HostProperty::new("visible", true)];
    parent.shaders = vec![
        (ShaderKind::Surface, "plastic".into()),
        (ShaderKind::Displacement, "bumps".into()),
    ];
    let mut child = Mock::new("|root|child", PrimitiveKind::Null);
    child.parent = Some(parent.into_ref());
    child.properties = vec![HostProperty::new("color", "blue")];
    child.shaders = vec![(ShaderKind::Surface, "metal".into()), (ShaderKind::Surface, "gold".into())];

    let sink = MemorySink::new();
    let node = Node::scan(&child, &[0.0], &sink);

    let color = node.attributes().get("color").and_then(|v| v.first::<String>()).cloned();
    assert_eq!(color.as_deref(), Some("blue"));
    assert!(node.attributes().contains("visible"));
    assert_eq!(
        node.shaders(),
        &[
            (ShaderKind::Surface, "metal".to_string()),
            (ShaderKind::Displacement, "bumps".to_string()),
        ]
    );
    assert!(sink.contains(Severity::Warning, "gold"));
    assert_eq!(sink.count(Severity::Warning), 1);
}

#[test]
fn test_archive_is_instanced() {
    let (mut facade, rec) = facade();
    let mut archive = Mock::new("|set", PrimitiveKind::Archive);
    archive.shape = Shape::Mesh(triangle());

    let sink = MemorySink::new();
    let mut node = Node::scan(&archive, &[0.0], &sink);
    assert!(node.is_archive());
    assert_eq!(node.num_geometry_samples(), 0);
    node.write(&mut facade);

    let rec = rec.lock();
    assert_eq!(rec.count("mesh"), 0);
    assert!(matches!(rec.calls().nth_back(1), Some(Call::Instance(h)) if h == "|set"));
}

#[test]
fn test_hair_grains_are_motion_blocked() {
    let (mut facade, rec) = facade();
    let mut hair = Mock::new("|fur", PrimitiveKind::Hair);
    hair.shape = Shape::Hair(15);

    let sink = MemorySink::new();
    let mut node = Node::scan(&hair, &[0.0, 0.5], &sink);
    node.write(&mut facade);

    let rec = rec.lock();
    assert_eq!(rec.count("motion"), 3);
    assert_eq!(rec.count("curves"), 4);
    let handles: Vec<&str> = rec
        .calls()
        .filter_map(|c| match c {
            Call::Curves { handle, .. } => Some(handle.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(handles, vec!["|fur:0", "|fur:0", "|fur:1", "|fur:1"]);
}

#[test]
fn test_render_finish_uses_camera() {
    let (mut facade, rec) = facade();
    let options = ExportOptions { camera: "persp".into(), ..Default::default() };
    let context = ExportPass::new(options).run(&mut facade, &[], Finish::Render);

    assert_eq!(context, 1);
    assert_eq!(facade.current_scene(), None);
    let rec = rec.lock();
    assert_eq!(rec.names(), vec!["begin_scene", "option", "camera", "world", "render"]);
    assert!(matches!(rec.calls().last(), Some(Call::Render(cam)) if cam == "persp"));
    let shutter = match rec.calls().nth(1) {
        Some(Call::Option(v)) => v.as_slice::<f32>().map(<[f32]>::to_vec),
        _ => None,
    };
    assert_eq!(shutter, Some(vec![0.0, 0.5]));
}

#[test]
fn test_host_scalars_become_constants() {
    let p = HostProperty::new("count", 3);
    assert_eq!(p.value, Scalar::Int(3));
}
