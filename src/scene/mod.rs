//! Scene layer: host objects in, facade calls out.
//!
//! - [`SceneObject`] - the narrow host interface
//! - [`Node`] - one object's attributes, shaders, transforms and geometry
//! - [`ExportPass`] - a full run over a list of objects

mod host;
mod node;
mod pass;

pub use host::{object_bounds, HostProperty, ObjectRef, PrimitiveKind, SceneObject};
pub use node::Node;
pub use pass::{ExportPass, Finish};
