//! Export options that persist between runs.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::path::Path;

use crate::util::{Result, Time};

/// Default number of hair strands per emitted chunk.
pub const DEFAULT_HAIR_CHUNK_SIZE: usize = 10_000;

/// Default custom attribute naming a blobby group.
pub const DEFAULT_BLOBBY_GROUP_ATTRIBUTE: &str = "blobbyGroup";

/// Motion sample offsets; most exports use two to four.
pub type MotionTimes = SmallVec<[Time; 4]>;

/// Options for one export run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    // Output
    pub destination: String,
    pub binary: bool,
    pub compressed: bool,
    pub camera: String,

    // Motion blur
    pub shutter_open: Time,
    pub shutter_close: Time,
    pub motion_samples: usize,

    // Geometry
    pub hair_chunk_size: usize,
    pub displacement_scale: f32,
    pub default_particle_width: f32,
    pub blobby_group_attribute: String,
    /// Iso level written with blobby primitives.
    pub blobby_threshold: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            destination: "scene".to_string(),
            binary: false,
            compressed: false,
            camera: String::new(),
            shutter_open: 0.0,
            shutter_close: 0.5,
            motion_samples: 1,
            hair_chunk_size: DEFAULT_HAIR_CHUNK_SIZE,
            displacement_scale: 1.0,
            default_particle_width: 1.0,
            blobby_group_attribute: DEFAULT_BLOBBY_GROUP_ATTRIBUTE.to_string(),
            blobby_threshold: 0.5,
        }
    }
}

impl ExportOptions {
    /// Load options from a JSON file and validate them.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut options: Self = serde_json::from_str(&text)?;
        options.validate();
        Ok(options)
    }

    /// Save options as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Clamp values that make no sense.
    pub fn validate(&mut self) {
        if self.motion_samples == 0 {
            self.motion_samples = 1;
        }
        if self.hair_chunk_size == 0 {
            self.hair_chunk_size = 1;
        }
        if self.shutter_close < self.shutter_open {
            std::mem::swap(&mut self.shutter_open, &mut self.shutter_close);
        }
        if self.default_particle_width.is_nan() || self.default_particle_width <= 0.0 {
            self.default_particle_width = 1.0;
        }
    }

    /// Ordered sample offsets, evenly spread over the shutter interval.
    pub fn motion_times(&self) -> MotionTimes {
        if self.motion_samples <= 1 {
            return smallvec::smallvec![self.shutter_open];
        }
        let span = self.shutter_close - self.shutter_open;
        let last = (self.motion_samples - 1) as Time;
        (0..self.motion_samples)
            .map(|i| self.shutter_open + span * i as Time / last)
            .collect()
    }

    /// Whether geometry and transforms are written as motion blocks.
    pub fn motion_blur(&self) -> bool {
        self.motion_samples > 1
    }
}
