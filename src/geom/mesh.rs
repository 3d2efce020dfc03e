//! Polygon and subdivision meshes.

use super::displace::{displaced, DisplacementSource};
use super::{emit_parameters, emit_placeholder, GeometryData};
use crate::core::TypedValue;
use crate::render::{MeshScheme, MeshTopology, RendererFacade};
use crate::util::{BBox3f, ElementType, Error, Result, Severity, StorageClass, Vec2, Vec3};

/// One mesh sample.
#[derive(Clone, Debug, Default)]
pub struct MeshSample {
    pub scheme: MeshScheme,
    pub positions: Vec<Vec3>,
    pub face_counts: Vec<i32>,
    pub face_indices: Vec<i32>,
    /// Per point or per face corner.
    pub normals: Vec<Vec3>,
    /// Per point or per face corner.
    pub uvs: Vec<Vec2>,
    pub values: Vec<TypedValue>,
}

impl MeshSample {
    pub fn num_points(&self) -> usize {
        self.positions.len()
    }

    pub fn num_faces(&self) -> usize {
        self.face_counts.len()
    }

    /// Class of a per-element array of `len` entries, if it fits one.
    fn class_of(&self, len: usize) -> Option<StorageClass> {
        if len == self.positions.len() {
            Some(StorageClass::Vertex)
        } else if len == self.face_indices.len() {
            Some(StorageClass::FaceVarying)
        } else if len == self.face_counts.len() {
            Some(StorageClass::Uniform)
        } else {
            None
        }
    }

    fn validate(&self) -> Result<()> {
        let corners: usize = self.face_counts.iter().map(|&c| c.max(0) as usize).sum();
        if corners != self.face_indices.len() {
            return Err(Error::SizeMismatch { expected: corners, actual: self.face_indices.len() });
        }
        let points = self.positions.len();
        if let Some(&bad) = self.face_indices.iter().find(|&&i| i < 0 || i as usize >= points) {
            return Err(Error::IndexOutOfBounds { index: bad.max(0) as usize, count: points });
        }
        Ok(())
    }
}

/// Writes a mesh, optionally displaced along its point normals.
#[derive(Debug)]
pub struct MeshEmitter {
    sample: MeshSample,
}

impl MeshEmitter {
    /// Displacement needs per-point normals and texture coordinates; when
    /// they are missing or the lookup fails the mesh is written as is.
    pub fn new(mut sample: MeshSample, displacement: Option<&DisplacementSource>) -> Self {
        if let Some(source) = displacement {
            if let Some(moved) = displaced(&sample.positions, &sample.normals, &sample.uvs, source) {
                sample.positions = moved;
            }
        }
        Self { sample }
    }

    pub fn sample(&self) -> &MeshSample {
        &self.sample
    }

    pub fn topology(&self) -> MeshTopology {
        MeshTopology {
            scheme: self.sample.scheme.clone(),
            face_counts: self.sample.face_counts.clone(),
            vertex_indices: self.sample.face_indices.clone(),
        }
    }

    /// Values handed to the mesh call.
    pub fn values(&self) -> Result<Vec<TypedValue>> {
        let s = &self.sample;
        s.validate()?;

        let mut out = Vec::with_capacity(s.values.len() + 4);
        out.push(TypedValue::from_vec3("P", StorageClass::Vertex, ElementType::Point, &s.positions)?);

        if !s.normals.is_empty() {
            match s.class_of(s.normals.len()) {
                Some(class) => out.push(TypedValue::from_vec3("N", class, ElementType::Normal, &s.normals)?),
                None => tracing::debug!(normals = s.normals.len(), "mesh normals dropped"),
            }
        }
        if !s.uvs.is_empty() {
            match s.class_of(s.uvs.len()) {
                Some(class) => {
                    let u: Vec<f32> = s.uvs.iter().map(|uv| uv.x).collect();
                    let v: Vec<f32> = s.uvs.iter().map(|uv| uv.y).collect();
                    out.push(TypedValue::new("s", class, ElementType::Float, u)?);
                    out.push(TypedValue::new("t", class, ElementType::Float, v)?);
                }
                None => tracing::debug!(uvs = s.uvs.len(), "mesh texture coordinates dropped"),
            }
        }
        out.extend(s.values.iter().cloned());
        Ok(out)
    }
}

impl GeometryData for MeshEmitter {
    fn bounds(&self) -> BBox3f {
        BBox3f::from_points(&self.sample.positions)
    }

    fn write(&mut self, facade: &mut RendererFacade, handle: &str) {
        if self.sample.face_counts.is_empty() {
            facade.log(&format!("mesh '{handle}' has no faces"), Severity::Info);
            emit_placeholder(facade);
            return;
        }
        match self.values() {
            Ok(values) => {
                emit_parameters(facade, &values);
                facade.mesh(handle, &self.topology());
            }
            Err(e) => {
                facade.log(&format!("mesh '{handle}': {e}"), Severity::Error);
                emit_placeholder(facade);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::DisplacementMap;
    use crate::render::{Call, RecordingBackend};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn quad() -> MeshSample {
        MeshSample {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y],
            face_counts: vec![4],
            face_indices: vec![0, 1, 2, 3],
            ..Default::default()
        }
    }

    struct Flat(f32);

    impl DisplacementMap for Flat {
        fn sample(&self, uvs: &[Vec2]) -> Result<Vec<f32>> {
            Ok(vec![self.0; uvs.len()])
        }
    }

    #[test]
    fn test_write_quad() {
        let mut facade = RendererFacade::new();
        let rec = Arc::new(Mutex::new(RecordingBackend::new("rec")));
        facade.register_renderer(rec.clone());

        let mut sample = quad();
        sample.scheme = MeshScheme::Subdivision("catmull-clark".into());
        sample.normals = vec![Vec3::Z; 4];
        MeshEmitter::new(sample, None).write(&mut facade, "floor");

        let rec = rec.lock();
        assert_eq!(rec.names(), vec!["parameter", "parameter", "mesh"]);
        let Some(Call::Mesh { handle, topology }) = rec.calls().last() else {
            panic!("expected mesh");
        };
        assert_eq!(handle, "floor");
        assert_eq!(topology.scheme, MeshScheme::Subdivision("catmull-clark".into()));
        assert_eq!(topology.num_corners(), 4);
    }

    #[test]
    fn test_face_varying_uvs() {
        let mut sample = quad();
        sample.face_counts = vec![3, 3];
        sample.face_indices = vec![0, 1, 2, 0, 2, 3];
        sample.uvs = vec![Vec2::ZERO; 6];
        let values = MeshEmitter::new(sample, None).values().unwrap();
        assert_eq!(values[1].name(), "s");
        assert_eq!(values[1].class(), StorageClass::FaceVarying);
        assert_eq!(values[2].size(), 6);
    }

    #[test]
    fn test_bad_indices_are_reported() {
        let mut sample = quad();
        sample.face_indices = vec![0, 1, 2, 9];
        assert!(matches!(
            MeshEmitter::new(sample, None).values(),
            Err(Error::IndexOutOfBounds { index: 9, count: 4 })
        ));
    }

    #[test]
    fn test_displacement() {
        let mut sample = quad();
        sample.normals = vec![Vec3::Z; 4];
        sample.uvs = vec![Vec2::ZERO; 4];
        let source = DisplacementSource::new(Arc::new(Flat(1.0)), 0.5);
        let mesh = MeshEmitter::new(sample, Some(&source));
        assert!(mesh.sample().positions.iter().all(|p| p.z == 0.25));

        // No normals: written undisplaced.
        let mesh = MeshEmitter::new(quad(), Some(&source));
        assert!(mesh.sample().positions.iter().all(|p| p.z == 0.0));
    }
}
