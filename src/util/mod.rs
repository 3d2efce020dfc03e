//! Utility types shared by every layer.
//!
//! - [`ElementType`] / [`StorageClass`] - typed value semantics
//! - [`Error`] / [`Result`] - error handling
//! - [`LogSink`] / [`Severity`] - diagnostics routing
//! - Math type re-exports from glam and [`BBox3f`]

mod element;
mod error;
mod log;
mod math;
mod storage;

pub use element::*;
pub use error::*;
pub use log::*;
pub use math::*;
pub use storage::*;
