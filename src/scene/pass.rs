//! One export run over a list of host objects.

use std::sync::Arc;

use super::host::ObjectRef;
use super::node::Node;
use crate::core::{ExportOptions, TypedValue};
use crate::geom::{BlobbyGroups, BlobbyGroupsRef};
use crate::render::{Context, RendererFacade};
use crate::util::{Severity, StorageClass};

/// What happens once all nodes are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Finish {
    /// Render through the configured camera; closes every scene.
    Render,
    /// End only the scene this pass opened.
    #[default]
    EndScene,
}

/// Export pass: opens a scene, writes the world and every node, then
/// renders or ends the scene.
#[derive(Debug)]
pub struct ExportPass {
    options: ExportOptions,
    blobby_groups: BlobbyGroupsRef,
}

impl ExportPass {
    pub fn new(mut options: ExportOptions) -> Self {
        options.validate();
        Self { options, blobby_groups: BlobbyGroups::shared() }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Registry hosts hand to the sphere emitters they build.
    pub fn blobby_groups(&self) -> BlobbyGroupsRef {
        Arc::clone(&self.blobby_groups)
    }

    /// Write `objects` as one scene and return its context.
    pub fn run(&self, facade: &mut RendererFacade, objects: &[ObjectRef], finish: Finish) -> Context {
        let o = &self.options;
        let context = facade.begin_scene(&o.destination, o.binary, o.compressed);
        tracing::info!(context, destination = %o.destination, objects = objects.len(), "export");

        let shutter = TypedValue::array(vec![o.shutter_open, o.shutter_close])
            .named("shutter")
            .with_class(StorageClass::Constant);
        facade.option(&shutter);
        let camera = if o.camera.is_empty() { String::new() } else { facade.camera(&o.camera) };
        facade.world();

        self.blobby_groups.lock().clear();
        let times = o.motion_times();
        let sink = Arc::clone(facade.sink());
        for object in objects {
            let mut node = Node::scan(object.as_ref(), &times, sink.as_ref());
            node.write(facade);
        }

        match finish {
            Finish::Render => {
                if camera.is_empty() {
                    facade.log("rendering without a camera", Severity::Warning);
                }
                facade.render(&camera);
            }
            Finish::EndScene => facade.end_scene(Some(context)),
        }
        context
    }
}
