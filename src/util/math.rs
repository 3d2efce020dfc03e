//! Math type re-exports and bounding boxes.
//!
//! Matrices follow the row-vector convention of most scene description
//! APIs: the 16 floats are row-major with the translation in elements
//! 12..15. That memory layout is identical to glam's column-major
//! column-vector [`Mat4`], so host matrices load without a transpose.

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Time offset of a motion sample (in frames, relative to the current frame).
pub type Time = f32;

/// Build a [`Mat4`] from 16 host floats (row-major, row-vector convention).
#[inline]
pub fn matrix_from_host(m: &[f32; 16]) -> Mat4 {
    Mat4::from_cols_array(m)
}

/// 3D bounding box with single precision.
#[derive(Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BBox3f {
    pub min: Vec3,
    pub max: Vec3,
}

impl BBox3f {
    /// Empty bounding box (inverted, will expand on first point).
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create a new bounding box from min and max points.
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create from a center and full extent, the form hosts report.
    #[inline]
    pub fn from_center_extent(center: Vec3, extent: Vec3) -> Self {
        let half = extent.abs() * 0.5;
        Self { min: center - half, max: center + half }
    }

    /// Bounds of a point set; `EMPTY` for no points.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut b = Self::EMPTY;
        for p in points {
            b.expand_by_point(*p);
        }
        b
    }

    /// Check if this box is empty (has no volume).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include a point.
    #[inline]
    pub fn expand_by_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Expand this box to include another box.
    #[inline]
    pub fn expand_by_box(&mut self, other: &Self) {
        if !other.is_empty() {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        }
    }

    /// Grow the box uniformly by `amount` on every side.
    #[inline]
    pub fn pad(&mut self, amount: f32) {
        if !self.is_empty() {
            self.min -= Vec3::splat(amount);
            self.max += Vec3::splat(amount);
        }
    }
}

impl Default for BBox3f {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for BBox3f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BBox3f({:?} - {:?})", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox3f() {
        let mut b = BBox3f::EMPTY;
        assert!(b.is_empty());

        b.expand_by_point(Vec3::ZERO);
        assert!(!b.is_empty());

        b.expand_by_point(Vec3::ONE);
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::ONE);
    }

    #[test]
    fn test_bbox_center_extent() {
        let b = BBox3f::from_center_extent(Vec3::new(1.0, 0.0, 0.0), Vec3::splat(2.0));
        assert_eq!(b.min, Vec3::new(0.0, -1.0, -1.0));
        assert_eq!(b.max, Vec3::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn test_pad_ignores_empty() {
        let mut b = BBox3f::EMPTY;
        b.pad(1.0);
        assert!(b.is_empty());

        let mut b = BBox3f::from_points(&[Vec3::ZERO]);
        b.pad(0.5);
        assert_eq!((b.min, b.max), (Vec3::splat(-0.5), Vec3::splat(0.5)));
    }

    #[test]
    fn test_host_matrix_translation() {
        let mut m = [0.0f32; 16];
        m[0] = 1.0;
        m[5] = 1.0;
        m[10] = 1.0;
        m[15] = 1.0;
        m[12] = 3.0;
        let mat = matrix_from_host(&m);
        assert_eq!(mat.transform_point3(Vec3::ZERO), Vec3::new(3.0, 0.0, 0.0));
    }
}
