//! Hair systems, written in chunks of strands.
//!
//! A hair system can hold millions of strands. The emitter pulls one chunk
//! at a time from the host and writes it as its own curves primitive, so
//! only one chunk's buffers are alive at once.

use super::curves::{curve_values, CurvesSample};
use super::{emit_parameters, emit_placeholder, GeometryData};
use crate::render::{CurveBasis, RendererFacade, Wrap};
use crate::util::{BBox3f, Result, Severity, Vec3};

/// Strands read from the host in one go.
#[derive(Clone, Debug, Default)]
pub struct HairChunk {
    /// Control points per strand.
    pub counts: Vec<i32>,
    pub positions: Vec<Vec3>,
    /// Per control point, per varying value, or a single width.
    pub widths: Vec<f32>,
}

/// Host accessor for hair data.
pub trait HairSource: Send {
    fn num_strands(&self) -> usize;

    fn bounds(&self) -> BBox3f;

    /// Read `count` strands starting at strand `first`.
    fn read(&mut self, first: usize, count: usize) -> Result<HairChunk>;
}

/// Writes a hair system one chunk at a time.
pub struct HairEmitter {
    source: Box<dyn HairSource>,
    basis: CurveBasis,
    chunk_size: usize,
    next_chunk: usize,
}

impl HairEmitter {
    pub fn new(source: Box<dyn HairSource>, basis: CurveBasis, chunk_size: usize) -> Self {
        Self { source, basis, chunk_size: chunk_size.max(1), next_chunk: 0 }
    }

    pub fn num_strands(&self) -> usize {
        self.source.num_strands()
    }

    /// Chunks needed for all strands; at least one.
    pub fn number_of_chunks(&self) -> usize {
        self.num_strands().div_ceil(self.chunk_size).max(1)
    }

    fn chunk_handle(&self, handle: &str, chunk: usize) -> String {
        if handle.is_empty() || self.number_of_chunks() == 1 {
            handle.to_string()
        } else {
            format!("{handle}:{chunk}")
        }
    }

    /// Write the next chunk; returns true when it was the last one.
    pub fn write_chunk(&mut self, facade: &mut RendererFacade, handle: &str) -> bool {
        let chunks = self.number_of_chunks();
        let chunk = self.next_chunk.min(chunks - 1);
        self.next_chunk = chunk + 1;

        let first = chunk * self.chunk_size;
        let count = self.chunk_size.min(self.num_strands().saturating_sub(first));
        let handle = self.chunk_handle(handle, chunk);

        let written = if count == 0 {
            tracing::debug!(handle = %handle, chunk, "empty hair chunk");
            Ok(false)
        } else {
            self.source.read(first, count).and_then(|c| self.write_strands(facade, &handle, c))
        };
        match written {
            Ok(true) => {}
            Ok(false) => emit_placeholder(facade),
            Err(e) => {
                facade.log(&format!("hair '{handle}' chunk {chunk}: {e}"), Severity::Error);
                emit_placeholder(facade);
            }
        }
        self.next_chunk >= chunks
    }

    fn write_strands(&self, facade: &mut RendererFacade, handle: &str, chunk: HairChunk) -> Result<bool> {
        if chunk.counts.is_empty() {
            return Ok(false);
        }
        let sample = CurvesSample {
            basis: self.basis,
            wrap: Wrap::NonPeriodic,
            counts: chunk.counts,
            positions: chunk.positions,
            widths: chunk.widths,
            ..Default::default()
        };
        let values = curve_values(&sample)?;
        emit_parameters(facade, &values);
        facade.curves(handle, sample.basis, sample.wrap, &sample.topology());
        Ok(true)
    }
}

impl GeometryData for HairEmitter {
    fn bounds(&self) -> BBox3f {
        self.source.bounds()
    }

    fn write(&mut self, facade: &mut RendererFacade, handle: &str) {
        self.start_grain();
        while !self.write_chunk(facade, handle) {}
    }

    fn granularity(&self) -> usize {
        self.number_of_chunks()
    }

    fn start_grain(&mut self) {
        self.next_chunk = 0;
    }

    fn write_next_grain(&mut self, facade: &mut RendererFacade, handle: &str) -> bool {
        self.write_chunk(facade, handle)
    }
}
