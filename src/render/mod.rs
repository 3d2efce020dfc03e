//! Renderer dispatch: the backend contract, the fan-out facade and the
//! data its calls carry.

mod dispatch;
mod facade;
mod handles;
mod recording;
mod types;

pub use dispatch::{renderer_ref, RendererDispatch, RendererRef};
pub use facade::{RendererFacade, SharedFacade};
pub use handles::{HandleKind, HandleMinter, HANDLE_PREFIX};
pub use recording::{Call, Recorded, RecordingBackend, FIRST_RECORDED_CONTEXT};
pub use types::{
    BlobbyStream, Capabilities, Context, CurveBasis, CurveTopology, MeshScheme, MeshTopology,
    PatchTopology, ShaderKind, SphereShape, Wrap,
};
