//! Per-object export state.
//!
//! A [`Node`] is scanned from a host object once per export pass and then
//! written to the facade:
//!
//! ```text
//! push_attributes
//!   attribute "name", attribute "bound"
//!   begin_look .. end_look, look        (grouped objects, first member defines)
//!   or: attributes + shaders inline
//!   [motion] space ...
//!   [motion] geometry ... per grain     (or instance for archives)
//! pop_attributes
//! ```

use std::collections::HashSet;

use super::host::{object_bounds, ObjectRef, PrimitiveKind, SceneObject};
use crate::core::{AttributeMap, TypedValue};
use crate::geom::GeometryData;
use crate::render::{RendererFacade, ShaderKind};
use crate::util::{matrix_from_host, BBox3f, LogSink, Mat4, Severity, StorageClass, Time};

/// Exported view of one host object.
pub struct Node {
    name: String,
    kind: PrimitiveKind,
    look: Option<String>,
    attributes: AttributeMap,
    shaders: Vec<(ShaderKind, String)>,
    times: Vec<Time>,
    transforms: Vec<Mat4>,
    geometry: Vec<Box<dyn GeometryData>>,
    bounds: BBox3f,
}

impl Node {
    /// Scan `object` at every motion sample in `times`.
    ///
    /// Attributes and shaders are collected up the parent chain, nearest
    /// first; an ancestor only fills names and slots still unset.
    pub fn scan(object: &dyn SceneObject, times: &[Time], sink: &dyn LogSink) -> Self {
        let name = object.full_name();
        let kind = object.kind();
        let first = times.first().copied().unwrap_or(0.0);

        let mut attributes = AttributeMap::new();
        let mut shaders: Vec<(ShaderKind, String)> = Vec::new();
        let mut layer = Some(OwnedOrRef::Ref(object));
        while let Some(current) = layer {
            let obj = current.get();
            attributes.merge_layer(
                obj.properties(first)
                    .into_iter()
                    .map(|p| TypedValue::scalar(p.name, p.value)),
            );
            merge_shaders(&mut shaders, obj, sink);
            layer = obj.parent().map(OwnedOrRef::Owned);
        }

        let mut bounds = BBox3f::EMPTY;
        let mut transforms = Vec::with_capacity(times.len());
        let mut geometry = Vec::new();
        for &time in times {
            transforms.push(matrix_from_host(&object.transform_at(time)));
            bounds.expand_by_box(&object_bounds(object, time));
            if kind != PrimitiveKind::Archive {
                geometry.extend(object.geometry_at(time));
            }
        }
        if !geometry.is_empty() && geometry.len() != times.len() {
            sink.log(
                &format!("'{name}': {} of {} geometry samples available; writing the first", geometry.len(), times.len()),
                Severity::Warning,
            );
            geometry.truncate(1);
        }
        let grains: Vec<usize> = geometry.iter().map(|g| g.granularity()).collect();
        if grains.windows(2).any(|w| w[0] != w[1]) {
            sink.log(
                &format!("'{name}': motion samples split into {grains:?} grains; writing the first"),
                Severity::Warning,
            );
            geometry.truncate(1);
        }

        tracing::debug!(name = %name, kind = %kind, attributes = attributes.len(), "scanned");
        Self {
            name,
            kind,
            look: object.groups().into_iter().next(),
            attributes,
            shaders,
            times: times.to_vec(),
            transforms,
            geometry,
            bounds,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn is_archive(&self) -> bool {
        self.kind == PrimitiveKind::Archive
    }

    pub fn look(&self) -> Option<&str> {
        self.look.as_deref()
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    pub fn shaders(&self) -> &[(ShaderKind, String)] {
        &self.shaders
    }

    pub fn bounds(&self) -> BBox3f {
        self.bounds
    }

    pub fn num_geometry_samples(&self) -> usize {
        self.geometry.len()
    }

    /// Write the node.
    pub fn write(&mut self, facade: &mut RendererFacade) {
        facade.push_attributes();
        facade.attribute(&TypedValue::from_string("name", self.name.as_str()));
        if !self.bounds.is_empty() {
            let b = [self.bounds.min.to_array(), self.bounds.max.to_array()].concat();
            facade.attribute(&TypedValue::array(b).named("bound").with_class(StorageClass::Constant));
        }

        match self.look.clone() {
            Some(look) => {
                if !facade.has_look(&look) {
                    self.define_look(facade, &look);
                }
                facade.look(&look);
            }
            None => self.write_shading(facade),
        }

        self.write_transforms(facade);
        if self.is_archive() {
            facade.instance(&self.name);
        } else {
            self.write_geometry(facade);
        }
        facade.pop_attributes();
    }

    fn define_look(&self, facade: &mut RendererFacade, look: &str) {
        if let Err(e) = facade.begin_look(look) {
            tracing::debug!(look, error = %e, "look not defined");
        }
        self.write_shading(facade);
        if let Err(e) = facade.end_look() {
            tracing::debug!(look, error = %e, "look not closed");
        }
    }

    fn write_shading(&self, facade: &mut RendererFacade) {
        for value in self.attributes.iter() {
            facade.attribute(value);
        }
        for (kind, shader) in &self.shaders {
            facade.shader(*kind, shader, "");
        }
    }

    fn write_transforms(&self, facade: &mut RendererFacade) {
        if self.transforms.len() > 1 {
            facade.motion(&self.times);
        }
        for m in &self.transforms {
            facade.space(m);
        }
    }

    /// One geometry call per sample and grain, all samples advancing in
    /// lockstep.
    fn write_geometry(&mut self, facade: &mut RendererFacade) {
        let Some(grains) = self.geometry.first().map(|g| g.granularity()) else {
            return;
        };
        for sample in &mut self.geometry {
            sample.start_grain();
        }
        for _ in 0..grains {
            if self.geometry.len() > 1 {
                facade.motion(&self.times);
            }
            for sample in &mut self.geometry {
                sample.write_next_grain(facade, &self.name);
            }
        }
    }
}

/// Parent chain walker: the scanned object is borrowed, ancestors are owned.
enum OwnedOrRef<'a> {
    Ref(&'a dyn SceneObject),
    Owned(ObjectRef),
}

impl OwnedOrRef<'_> {
    fn get(&self) -> &dyn SceneObject {
        match self {
            Self::Ref(r) => *r,
            Self::Owned(o) => o.as_ref(),
        }
    }
}

/// Fill unset shader slots from `obj`. Two shaders for the same slot on
/// one object: the first wins and the collision is reported.
fn merge_shaders(slots: &mut Vec<(ShaderKind, String)>, obj: &dyn SceneObject, sink: &dyn LogSink) {
    let taken: HashSet<ShaderKind> = slots.iter().map(|(k, _)| *k).collect();
    let mut seen: HashSet<ShaderKind> = HashSet::new();
    for (kind, shader) in obj.shaders() {
        if !seen.insert(kind) {
            sink.log(
                &format!("'{}': second {kind} shader '{shader}' ignored", obj.full_name()),
                Severity::Warning,
            );
            continue;
        }
        if !taken.contains(&kind) {
            slots.push((kind, shader));
        }
    }
}
