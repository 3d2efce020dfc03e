//! Particle clouds.

use std::fmt;

use super::blobby::{particle_order, BlobbyTree};
use super::displace::{displaced, DisplacementSource};
use super::{emit_parameters, emit_placeholder, GeometryData};
use crate::core::{ExportOptions, TypedValue, ValueData};
use crate::render::RendererFacade;
use crate::util::{BBox3f, ElementType, Result, Severity, StorageClass, Vec2, Vec3};

/// How a particle cloud is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    #[default]
    Points,
    Discs,
    Spheres,
    /// One implicit surface over all particles.
    Blobby,
    /// Camera-facing cards.
    Sprites,
}

impl RenderMode {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Discs => "disk",
            Self::Spheres => "sphere",
            Self::Blobby => "blobby",
            Self::Sprites => "sprite",
        }
    }

    /// Parse the host's particle type parameter. Unknown names draw points.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "disc" | "discs" | "disk" | "disks" => Self::Discs,
            "sphere" | "spheres" => Self::Spheres,
            "blobby" | "blobbies" | "blob" => Self::Blobby,
            "sprite" | "sprites" => Self::Sprites,
            _ => Self::Points,
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One particle cloud sample.
#[derive(Clone, Debug, Default)]
pub struct ParticlesSample {
    pub mode: RenderMode,
    pub positions: Vec<Vec3>,
    /// Optional, used for displacement.
    pub normals: Vec<Vec3>,
    /// Optional, used for displacement.
    pub uvs: Vec<Vec2>,
    /// Custom attributes, per particle or constant. A `width` array or a
    /// `size` constant sets the particle size.
    pub values: Vec<TypedValue>,
}

impl ParticlesSample {
    pub fn new(mode: RenderMode) -> Self {
        Self { mode, ..Default::default() }
    }

    pub fn num_particles(&self) -> usize {
        self.positions.len()
    }
}

/// Particle size source.
#[derive(Clone, Debug, PartialEq)]
enum Widths {
    PerParticle(Vec<f32>),
    Constant(f32),
}

/// Take the first `width` array or `size` constant out of `values`.
fn take_widths(values: &mut Vec<TypedValue>, count: usize, default: f32) -> Widths {
    let found = values.iter().position(|v| {
        v.element_type() == ElementType::Float
            && ((v.name() == "width" && v.size() == count && count > 0)
                || (v.name() == "size" && v.size() == 1))
    });
    let Some(index) = found else {
        return Widths::Constant(default);
    };
    let value = values.remove(index);
    match value.as_slice::<f32>() {
        Some(w) if value.name() == "width" => Widths::PerParticle(w.to_vec()),
        Some(&[size]) => Widths::Constant(size),
        _ => Widths::Constant(default),
    }
}

/// Take the per-particle group id attribute out of `values`.
fn take_groups(values: &mut Vec<TypedValue>, name: &str, count: usize) -> Option<Vec<i32>> {
    let index = values.iter().position(|v| v.name() == name && v.size() == count)?;
    let value = values.remove(index);
    match value.data() {
        ValueData::Int(ids) => Some(ids.to_vec()),
        ValueData::Float(ids) => Some(ids.iter().map(|g| g.round() as i32).collect()),
        _ => None,
    }
}

fn permute<T: Clone>(src: &[T], components: usize, order: &[usize]) -> Vec<T> {
    order
        .iter()
        .flat_map(|&i| src[i * components..(i + 1) * components].iter().cloned())
        .collect()
}

/// `value` with its elements reordered, when it holds one per particle.
fn permuted(value: &TypedValue, order: &[usize]) -> Result<TypedValue> {
    if value.size() != order.len() {
        return Ok(value.clone());
    }
    let c = value.element_type().components();
    let data = match value.data() {
        ValueData::Bool(v) => ValueData::from(permute(v, c, order)),
        ValueData::Int(v) => ValueData::from(permute(v, c, order)),
        ValueData::Float(v) => ValueData::from(permute(v, c, order)),
        ValueData::String(v) => ValueData::from(permute(v, c, order)),
        ValueData::Unset => return Ok(value.clone()),
    };
    TypedValue::new(value.name(), value.class(), value.element_type(), data)
}

/// Writes a particle cloud as points or as a blobby.
#[derive(Debug)]
pub struct ParticlesEmitter {
    mode: RenderMode,
    positions: Vec<Vec3>,
    widths: Widths,
    groups: Option<Vec<i32>>,
    values: Vec<TypedValue>,
    threshold: f32,
}

impl ParticlesEmitter {
    pub fn new(sample: ParticlesSample, options: &ExportOptions, displacement: Option<&DisplacementSource>) -> Self {
        let ParticlesSample { mode, mut positions, normals, uvs, mut values } = sample;
        let count = positions.len();

        if let Some(source) = displacement {
            if let Some(moved) = displaced(&positions, &normals, &uvs, source) {
                positions = moved;
            }
        }

        let widths = take_widths(&mut values, count, options.default_particle_width);
        let groups = match mode {
            RenderMode::Blobby => take_groups(&mut values, &options.blobby_group_attribute, count),
            _ => None,
        };

        Self { mode, positions, widths, groups, values, threshold: options.blobby_threshold }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn num_particles(&self) -> usize {
        self.positions.len()
    }

    fn max_width(&self) -> f32 {
        match &self.widths {
            Widths::PerParticle(w) => w.iter().copied().fold(0.0, f32::max),
            Widths::Constant(w) => *w,
        }
    }

    fn point_values(&self) -> Result<Vec<TypedValue>> {
        let mut out = Vec::with_capacity(self.values.len() + 3);
        out.push(TypedValue::from_vec3("P", StorageClass::Vertex, ElementType::Point, &self.positions)?);
        out.push(match &self.widths {
            Widths::PerParticle(w) => TypedValue::new("width", StorageClass::Vertex, ElementType::Float, w.clone())?,
            Widths::Constant(w) => TypedValue::from_float("constantwidth", *w),
        });
        if self.mode != RenderMode::Points {
            out.push(TypedValue::from_string("type", self.mode.name()));
        }
        out.extend(self.values.iter().cloned());
        Ok(out)
    }

    fn write_points(&self, facade: &mut RendererFacade, handle: &str) -> Result<()> {
        let values = self.point_values()?;
        emit_parameters(facade, &values);
        facade.points(handle, self.positions.len());
        Ok(())
    }

    fn write_blobby(&self, facade: &mut RendererFacade, handle: &str) -> Result<()> {
        let widths = match &self.widths {
            Widths::PerParticle(w) => w.clone(),
            Widths::Constant(w) => vec![*w],
        };
        let groups = self.groups.as_deref();
        let tree = BlobbyTree::from_particles(&self.positions, &widths, groups);
        let order = particle_order(self.positions.len(), groups);

        facade.parameter(&TypedValue::from_float("threshold", self.threshold));
        for value in &self.values {
            facade.parameter(&permuted(value, &order)?);
        }
        facade.blobby(handle, &tree.encode());
        Ok(())
    }
}

impl GeometryData for ParticlesEmitter {
    fn bounds(&self) -> BBox3f {
        let mut b = BBox3f::from_points(&self.positions);
        if !b.is_empty() {
            b.pad(self.max_width() * 0.5);
        }
        b
    }

    fn write(&mut self, facade: &mut RendererFacade, handle: &str) {
        if self.positions.is_empty() {
            facade.log(&format!("particles '{handle}' are empty"), Severity::Info);
            emit_placeholder(facade);
            return;
        }
        let written = match self.mode {
            RenderMode::Blobby => self.write_blobby(facade, handle),
            _ => self.write_points(facade, handle),
        };
        if let Err(e) = written {
            facade.log(&format!("particles '{handle}': {e}"), Severity::Error);
            emit_placeholder(facade);
        }
    }
}
