//! Displacement of sample positions along their normals.
//!
//! The lookup itself is opaque: a [`DisplacementMap`] turns texture
//! coordinates into grayscale values in `[0, 1]`. Positions move by
//! `(value - 0.5) * scale` along the normal. Lookups run in batches of
//! [`DISPLACEMENT_BATCH`] elements.

use std::sync::Arc;

use crate::util::{Result, Vec2, Vec3};

/// Largest number of elements looked up at once.
pub const DISPLACEMENT_BATCH: usize = 1000;

/// Batched grayscale lookup.
pub trait DisplacementMap: Send + Sync {
    /// One value per coordinate, in order.
    fn sample(&self, uvs: &[Vec2]) -> Result<Vec<f32>>;
}

/// A map plus the scale it is applied with.
#[derive(Clone)]
pub struct DisplacementSource {
    pub map: Arc<dyn DisplacementMap>,
    pub scale: f32,
}

impl DisplacementSource {
    pub fn new(map: Arc<dyn DisplacementMap>, scale: f32) -> Self {
        Self { map, scale }
    }
}

impl std::fmt::Debug for DisplacementSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplacementSource").field("scale", &self.scale).finish_non_exhaustive()
    }
}

/// Displaced copy of `positions`, or `None` when the inputs do not line
/// up or a lookup fails. Callers keep the undisplaced positions then.
pub fn displaced(
    positions: &[Vec3],
    normals: &[Vec3],
    uvs: &[Vec2],
    source: &DisplacementSource,
) -> Option<Vec<Vec3>> {
    if normals.len() != positions.len() || uvs.len() != positions.len() {
        tracing::debug!(
            positions = positions.len(),
            normals = normals.len(),
            uvs = uvs.len(),
            "displacement skipped: mismatched inputs"
        );
        return None;
    }

    let mut out = Vec::with_capacity(positions.len());
    for (start, batch) in uvs.chunks(DISPLACEMENT_BATCH).enumerate() {
        let offset = start * DISPLACEMENT_BATCH;
        let values = match source.map.sample(batch) {
            Ok(v) if v.len() == batch.len() => v,
            Ok(v) => {
                tracing::debug!(expected = batch.len(), actual = v.len(), "displacement lookup short");
                return None;
            }
            Err(e) => {
                tracing::debug!(error = %e, "displacement lookup failed");
                return None;
            }
        };
        for (i, value) in values.into_iter().enumerate() {
            let k = offset + i;
            out.push(positions[k] + normals[k] * ((value - 0.5) * source.scale));
        }
    }
    Some(out)
}
