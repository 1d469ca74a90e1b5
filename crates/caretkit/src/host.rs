//! The rendering environment measurements run against.
//!
//! [`DomHost`] is the slice of a browser's DOM and CSSOM the measurer needs:
//! tree mutation, a shadow root for isolation, computed styles and offset
//! geometry. [`Page`] implements it on top of the in-tree engine.

use std::rc::Rc;

use caretkit_dom::Node;
use caretkit_engine::{EngineError, Page};

/// Offset geometry of an element, relative to its offsetParent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OffsetRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Border box of an element in page coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClientRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A DOM-like document with layout.
///
/// Mutations take `&mut self`; queries take `&self` and may lay the
/// document out lazily.
pub trait DomHost {
    /// Handle to a node of the host document.
    type Node: Clone;
    /// Failure of a host operation.
    type Error: std::error::Error + Send + Sync + 'static;

    fn body(&self) -> Option<Self::Node>;

    /// First connected element with `id`, outside shadow trees.
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    fn create_element(&mut self, tag_name: &str) -> Self::Node;

    fn create_text_node(&mut self, data: &str) -> Self::Node;

    fn set_attribute(
        &mut self,
        element: &Self::Node,
        name: &str,
        value: &str,
    ) -> Result<(), Self::Error>;

    /// Replace the inline style of `element`.
    fn set_css_text(&mut self, element: &Self::Node, css_text: &str) -> Result<(), Self::Error> {
        self.set_attribute(element, "style", css_text)
    }

    fn append_child(&mut self, parent: &Self::Node, child: Self::Node) -> Result<(), Self::Error>;

    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;

    fn replace_children(
        &mut self,
        parent: &Self::Node,
        children: Vec<Self::Node>,
    ) -> Result<(), Self::Error>;

    /// Attach an open shadow root to `host` and return it.
    fn attach_shadow(&mut self, host: &Self::Node) -> Result<Self::Node, Self::Error>;

    fn shadow_root(&self, element: &Self::Node) -> Option<Self::Node>;

    fn element_children(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn parent_element(&self, node: &Self::Node) -> Option<Self::Node>;

    fn is_connected(&self, node: &Self::Node) -> bool;

    /// `getComputedStyle(element).getPropertyValue(name)`.
    fn computed_style(&self, element: &Self::Node, name: &str) -> Result<String, Self::Error>;

    fn bounding_client_rect(&self, element: &Self::Node) -> Result<ClientRect, Self::Error>;

    fn offset_rect(&self, element: &Self::Node) -> Result<OffsetRect, Self::Error>;

    fn client_width(&self, element: &Self::Node) -> Result<f32, Self::Error>;

    fn scroll_width(&self, element: &Self::Node) -> Result<f32, Self::Error>;

    fn scroll_height(&self, element: &Self::Node) -> Result<f32, Self::Error>;
}

impl DomHost for Page {
    type Node = Rc<Node>;
    type Error = EngineError;

    fn body(&self) -> Option<Rc<Node>> {
        Page::body(self)
    }

    fn element_by_id(&self, id: &str) -> Option<Rc<Node>> {
        Page::element_by_id(self, id)
    }

    fn create_element(&mut self, tag_name: &str) -> Rc<Node> {
        Page::create_element(self, tag_name)
    }

    fn create_text_node(&mut self, data: &str) -> Rc<Node> {
        Page::create_text_node(self, data)
    }

    fn set_attribute(
        &mut self,
        element: &Rc<Node>,
        name: &str,
        value: &str,
    ) -> Result<(), EngineError> {
        Page::set_attribute(self, element, name, value)
    }

    fn append_child(&mut self, parent: &Rc<Node>, child: Rc<Node>) -> Result<(), EngineError> {
        Page::append_child(self, parent, child)
    }

    fn remove_child(&mut self, parent: &Rc<Node>, child: &Rc<Node>) -> Result<(), EngineError> {
        Page::remove_child(self, parent, child)
    }

    fn replace_children(
        &mut self,
        parent: &Rc<Node>,
        children: Vec<Rc<Node>>,
    ) -> Result<(), EngineError> {
        Page::replace_children(self, parent, children)
    }

    fn attach_shadow(&mut self, host: &Rc<Node>) -> Result<Rc<Node>, EngineError> {
        Page::attach_shadow(self, host)
    }

    fn shadow_root(&self, element: &Rc<Node>) -> Option<Rc<Node>> {
        element.shadow_root()
    }

    fn element_children(&self, node: &Rc<Node>) -> Vec<Rc<Node>> {
        node.element_children()
    }

    fn parent_element(&self, node: &Rc<Node>) -> Option<Rc<Node>> {
        node.parent_element()
    }

    fn is_connected(&self, node: &Rc<Node>) -> bool {
        node.is_connected()
    }

    fn computed_style(&self, element: &Rc<Node>, name: &str) -> Result<String, EngineError> {
        Page::computed_style(self, element, name)
    }

    fn bounding_client_rect(&self, element: &Rc<Node>) -> Result<ClientRect, EngineError> {
        let rect = Page::bounding_client_rect(self, element)?;
        Ok(ClientRect {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        })
    }

    fn offset_rect(&self, element: &Rc<Node>) -> Result<OffsetRect, EngineError> {
        let rect = Page::offset_rect(self, element)?;
        Ok(OffsetRect {
            left: rect.left,
            top: rect.top,
            width: rect.width,
            height: rect.height,
        })
    }

    fn client_width(&self, element: &Rc<Node>) -> Result<f32, EngineError> {
        Page::client_width(self, element)
    }

    fn scroll_width(&self, element: &Rc<Node>) -> Result<f32, EngineError> {
        Page::scroll_width(self, element)
    }

    fn scroll_height(&self, element: &Rc<Node>) -> Result<f32, EngineError> {
        Page::scroll_height(self, element)
    }
}
