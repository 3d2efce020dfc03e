//! Curve sets.

use super::{emit_parameters, emit_placeholder, GeometryData};
use crate::core::TypedValue;
use crate::render::{CurveBasis, CurveTopology, RendererFacade, Wrap};
use crate::util::{BBox3f, ElementType, Result, Severity, StorageClass, Vec3};

/// Varying values for one curve of `vertices` control points.
pub fn varying_per_curve(basis: CurveBasis, wrap: Wrap, vertices: usize) -> usize {
    match (wrap, basis) {
        (Wrap::NonPeriodic, _) => basis.varying_count(vertices),
        (Wrap::Periodic, CurveBasis::Bezier) => vertices / 3,
        (Wrap::Periodic, CurveBasis::Hermite) => vertices / 2,
        (Wrap::Periodic, _) => vertices,
    }
}

/// Fix the class of a generic `width` value from its element count.
///
/// A single width becomes `constantwidth`; otherwise the class follows
/// whichever count it matches, varying before vertex. Other names are
/// left alone.
pub fn classify_width(value: &mut TypedValue, varying: usize, vertices: usize) {
    if value.name() != "width" {
        return;
    }
    match value.size() {
        1 => {
            value.set_name("constantwidth");
            value.set_class(StorageClass::Constant);
        }
        n if n == varying => value.set_class(StorageClass::Varying),
        n if n == vertices => value.set_class(StorageClass::Vertex),
        n => tracing::debug!(count = n, varying, vertices, "width count matches no class"),
    }
}

/// One curve set sample.
#[derive(Clone, Debug, Default)]
pub struct CurvesSample {
    pub basis: CurveBasis,
    pub wrap: Wrap,
    /// Control points per curve.
    pub counts: Vec<i32>,
    pub positions: Vec<Vec3>,
    /// One, per varying value, or per control point.
    pub widths: Vec<f32>,
    pub normals: Vec<Vec3>,
    pub values: Vec<TypedValue>,
}

impl CurvesSample {
    pub fn num_curves(&self) -> usize {
        self.counts.len()
    }

    pub fn num_vertices(&self) -> usize {
        self.counts.iter().map(|&c| c.max(0) as usize).sum()
    }

    pub fn num_varying(&self) -> usize {
        self.counts
            .iter()
            .map(|&c| varying_per_curve(self.basis, self.wrap, c.max(0) as usize))
            .sum()
    }

    pub fn topology(&self) -> CurveTopology {
        match self.counts.first() {
            Some(&first) if self.counts.iter().all(|&c| c == first) => CurveTopology::Uniform {
                curves: self.counts.len(),
                vertices: first.max(0) as usize,
            },
            _ => CurveTopology::PerCurve(self.counts.clone()),
        }
    }
}

/// Writes a curve set.
#[derive(Debug)]
pub struct CurvesEmitter {
    sample: CurvesSample,
}

impl CurvesEmitter {
    pub fn new(sample: CurvesSample) -> Self {
        Self { sample }
    }

    pub fn sample(&self) -> &CurvesSample {
        &self.sample
    }

    /// Values handed to the curves call.
    pub fn values(&self) -> Result<Vec<TypedValue>> {
        curve_values(&self.sample)
    }
}

/// Build positions, widths, normals and custom values for a curve set.
pub(crate) fn curve_values(s: &CurvesSample) -> Result<Vec<TypedValue>> {
    let vertices = s.num_vertices();
    let varying = s.num_varying();
    if s.positions.len() != vertices {
        return Err(crate::util::Error::SizeMismatch { expected: vertices, actual: s.positions.len() });
    }

    let mut out = Vec::with_capacity(s.values.len() + 3);
    out.push(TypedValue::from_vec3("P", StorageClass::Vertex, ElementType::Point, &s.positions)?);
    if !s.widths.is_empty() {
        let mut width = TypedValue::new("width", StorageClass::Vertex, ElementType::Float, s.widths.clone())?;
        classify_width(&mut width, varying, vertices);
        out.push(width);
    }
    if !s.normals.is_empty() {
        let class = if s.normals.len() == vertices {
            Some(StorageClass::Vertex)
        } else if s.normals.len() == varying {
            Some(StorageClass::Varying)
        } else {
            None
        };
        match class {
            Some(class) => out.push(TypedValue::from_vec3("N", class, ElementType::Normal, &s.normals)?),
            None => tracing::debug!(normals = s.normals.len(), "curve normals dropped"),
        }
    }
    for value in &s.values {
        let mut value = value.clone();
        classify_width(&mut value, varying, vertices);
        out.push(value);
    }
    Ok(out)
}

impl GeometryData for CurvesEmitter {
    fn bounds(&self) -> BBox3f {
        let mut b = BBox3f::from_points(&self.sample.positions);
        let widest = self.sample.widths.iter().copied().fold(0.0, f32::max);
        b.pad(widest * 0.5);
        b
    }

    fn write(&mut self, facade: &mut RendererFacade, handle: &str) {
        if self.sample.counts.is_empty() {
            facade.log(&format!("curves '{handle}' are empty"), Severity::Info);
            emit_placeholder(facade);
            return;
        }
        match self.values() {
            Ok(values) => {
                emit_parameters(facade, &values);
                facade.curves(handle, self.sample.basis, self.sample.wrap, &self.sample.topology());
            }
            Err(e) => {
                facade.log(&format!("curves '{handle}': {e}"), Severity::Error);
                emit_placeholder(facade);
            }
        }
    }
}
