//! Core layer - typed values and the collections built from them.
//!
//! This module provides:
//! - [`TypedValue`] - named, typed, storage-classed value buffer
//! - [`ValueData`] - the shared/owned buffer behind it
//! - [`AttributeMap`] - first-writer-wins value collection
//! - [`ExportOptions`] - per-run configuration

mod attributes;
mod options;
mod value;

pub use attributes::AttributeMap;
pub use options::{ExportOptions, MotionTimes, DEFAULT_BLOBBY_GROUP_ATTRIBUTE, DEFAULT_HAIR_CHUNK_SIZE};
pub use value::{Scalar, Shared, TypedValue, ValueData, ValueScalar, UNNAMED};
