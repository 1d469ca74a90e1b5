//! The hidden mirror the measurer renders text into.
//!
//! A surface is a zero-size, absolutely positioned container appended to
//! the body. Its shadow root holds a single content node, so page styles
//! cannot reach the mirrored text and mirror styles cannot leak out.

use tracing::{debug, warn};

use crate::error::{MeasureError, Result};
use crate::host::DomHost;

/// Id of the mirror container when the caller picks none.
pub const DEFAULT_MIRROR_ID: &str = "caretkit-mirror-text-node";

/// Class of the content node inside the shadow root.
pub const CONTENT_CLASS: &str = "mirror-text-container";

const CONTAINER_STYLE: &str = "position: absolute; width: 0px; height: 0px; overflow: hidden;";
const CONTENT_STYLE: &str = "display: block;";

/// One mirror container, identified by its element id.
///
/// Surfaces with the same id share the container in the document.
#[derive(Debug)]
pub struct MirrorSurface<N> {
    id: String,
    content: Option<N>,
}

impl<N: Clone> MirrorSurface<N> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The content node found or created by the last [`ensure`](Self::ensure).
    pub fn content(&self) -> Option<&N> {
        self.content.as_ref()
    }

    /// Return the content node, creating the container if the document has
    /// none with this id.
    ///
    /// An existing container is reused when its shadow root holds a content
    /// node; without one the surface was tampered with and this fails.
    pub fn ensure<H: DomHost<Node = N>>(&mut self, host: &mut H) -> Result<N> {
        if let Some(content) = &self.content {
            if host.is_connected(content) {
                return Ok(content.clone());
            }
        }

        if let Some(container) = host.element_by_id(&self.id) {
            let content = host
                .shadow_root(&container)
                .and_then(|shadow| host.element_children(&shadow).into_iter().next());
            let Some(content) = content else {
                warn!(id = %self.id, "Mirror container has no content node");
                return Err(MeasureError::Initialization {
                    id: self.id.clone(),
                });
            };
            debug!(id = %self.id, "Reusing mirror surface");
            self.content = Some(content.clone());
            return Ok(content);
        }

        let body = host.body().ok_or(MeasureError::Environment)?;
        let content = self.create(host, &body).map_err(MeasureError::host)?;
        debug!(id = %self.id, "Created mirror surface");
        self.content = Some(content.clone());
        Ok(content)
    }

    fn create<H: DomHost<Node = N>>(
        &self,
        host: &mut H,
        body: &N,
    ) -> std::result::Result<N, H::Error> {
        let container = host.create_element("div");
        host.set_attribute(&container, "contenteditable", "false")?;
        host.set_attribute(&container, "id", &self.id)?;
        host.set_css_text(&container, CONTAINER_STYLE)?;
        host.append_child(body, container.clone())?;

        let shadow = host.attach_shadow(&container)?;
        let content = host.create_element("div");
        host.set_attribute(&content, "class", CONTENT_CLASS)?;
        host.set_css_text(&content, CONTENT_STYLE)?;
        host.append_child(&shadow, content.clone())?;
        Ok(content)
    }

    /// Remove the container from the document. Does nothing when it is
    /// already gone.
    pub fn teardown<H: DomHost<Node = N>>(&mut self, host: &mut H) -> Result<()> {
        self.content = None;
        let Some(container) = host.element_by_id(&self.id) else {
            return Ok(());
        };
        if let Some(parent) = host.parent_element(&container) {
            host.remove_child(&parent, &container)
                .map_err(MeasureError::host)?;
            debug!(id = %self.id, "Removed mirror surface");
        }
        Ok(())
    }
}
