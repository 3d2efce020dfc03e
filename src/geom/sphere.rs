//! Spheres, optionally fused with the other members of a blobby group.

use super::blobby::{BlobbyGroupsRef, BlobbyNode, BlobbyTree};
use super::{emit_placeholder, GeometryData};
use crate::render::{RendererFacade, SphereShape};
use crate::util::{BBox3f, Mat4, Severity, Time, Vec3};

/// Another sphere of the same blobby group, as seen by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlobMember {
    pub world: Mat4,
    pub radius: f32,
}

/// One sphere sample.
#[derive(Clone, Debug)]
pub struct SphereSample {
    pub radius: f32,
    pub world: Mat4,
    /// Blobby group id, if the sphere carries one.
    pub group: Option<i32>,
    /// Every sphere sharing `group`, this one included.
    pub members: Vec<BlobMember>,
}

impl SphereSample {
    pub fn new(radius: f32) -> Self {
        Self { radius, world: Mat4::IDENTITY, group: None, members: Vec::new() }
    }
}

/// Writes a sphere, or the fused blobby of its group.
///
/// The first member visited at a time sample claims the group in the
/// shared registry and writes the whole group in its own space; the others
/// write a zero translate so motion blocks stay balanced.
#[derive(Debug)]
pub struct SphereEmitter {
    sample: SphereSample,
    time: Time,
    groups: BlobbyGroupsRef,
}

impl SphereEmitter {
    pub fn new(sample: SphereSample, time: Time, groups: BlobbyGroupsRef) -> Self {
        Self { sample, time, groups }
    }

    /// Group surface in this sphere's object space.
    pub fn group_tree(&self) -> BlobbyTree {
        let to_local = self.sample.world.inverse();
        let leaves = if self.sample.members.is_empty() {
            vec![BlobbyNode::Ellipsoid(Mat4::from_scale(Vec3::splat(self.sample.radius)))]
        } else {
            self.sample
                .members
                .iter()
                .map(|m| BlobbyNode::Ellipsoid(to_local * m.world * Mat4::from_scale(Vec3::splat(m.radius))))
                .collect()
        };
        BlobbyTree::new(BlobbyNode::sum(leaves))
    }
}

impl GeometryData for SphereEmitter {
    fn bounds(&self) -> BBox3f {
        let r = self.sample.radius;
        if self.sample.group.is_none() || self.sample.members.is_empty() {
            return BBox3f::new(Vec3::splat(-r), Vec3::splat(r));
        }
        let to_local = self.sample.world.inverse();
        let mut b = BBox3f::EMPTY;
        for m in &self.sample.members {
            let center = (to_local * m.world).transform_point3(Vec3::ZERO);
            let scale = (to_local * m.world).to_scale_rotation_translation().0.max_element();
            b.expand_by_box(&BBox3f::from_center_extent(center, Vec3::splat(2.0 * m.radius * scale)));
        }
        b
    }

    fn write(&mut self, facade: &mut RendererFacade, handle: &str) {
        let Some(group) = self.sample.group else {
            facade.sphere(handle, &SphereShape::full(self.sample.radius));
            return;
        };
        if !self.groups.lock().claim(self.time, group) {
            tracing::debug!(group, time = self.time, "blobby group already written");
            emit_placeholder(facade);
            return;
        }
        if self.sample.members.is_empty() {
            facade.log(&format!("blobby group {group} has no members besides '{handle}'"), Severity::Info);
        }
        facade.blobby(handle, &self.group_tree().encode());
    }
}
