//! # ueberman
//!
//! Renderer-agnostic scene description.
//!
//! Host scene objects are scanned into typed, time-sampled values and
//! written through a single [`RendererFacade`](render::RendererFacade),
//! which fans every call out to any number of registered backend renderers.
//!
//! ## Modules
//!
//! - [`util`] - Element types, storage classes, errors, math, diagnostics
//! - [`core`] - Typed values, attribute maps, export options
//! - [`render`] - Backend contract, fan-out facade, handles, call recording
//! - [`geom`] - Geometry emitters (mesh, curves, particles, spheres, hair)
//! - [`scene`] - Host object interface, nodes and the export pass
//!
//! ## Example
//!
//! ```ignore
//! use ueberman::prelude::*;
//!
//! let mut facade = RendererFacade::new();
//! facade.register_renderer(renderer_ref(RecordingBackend::new("trace")));
//!
//! let pass = ExportPass::new(ExportOptions::load("export.json")?);
//! pass.run(&mut facade, &objects, Finish::Render);
//! ```

pub mod core;
pub mod geom;
pub mod render;
pub mod scene;
pub mod util;

// Re-export commonly used types
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{AttributeMap, ExportOptions, Scalar, TypedValue};
    pub use crate::geom::*;
    pub use crate::render::{
        renderer_ref, Capabilities, Context, RecordingBackend, RendererDispatch, RendererFacade,
        RendererRef, SharedFacade,
    };
    pub use crate::scene::{ExportPass, Finish, HostProperty, Node, ObjectRef, PrimitiveKind, SceneObject};
    pub use crate::util::{ElementType, Error, Result, Severity, StorageClass};
}
