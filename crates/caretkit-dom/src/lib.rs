//! # CaretKit DOM
//!
//! Mutable DOM tree for the CaretKit measurement engine.
//! Uses html5ever for HTML parsing and constructs a traversable, mutable tree.
//!
//! ## Design Goals
//!
//! 1. **Spec-compliant parsing**: html5ever implements the HTML5 parsing algorithm
//! 2. **Mutation support**: Node insertion, removal, attribute modification
//! 3. **Shadow roots**: An isolation boundary that hides a subtree from the
//!    document's id lookup and author stylesheets
//! 4. **Change tracking**: Every mutation bumps a generation counter so derived
//!    state (styles, layout) can be invalidated cheaply

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use thiserror::Error;
use tracing::{debug, trace};

/// Errors that can occur in DOM operations.
#[derive(Error, Debug)]
pub enum DomError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Node not found")]
    NodeNotFound,

    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Unique identifier for a DOM node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Create a new NodeId.
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> usize {
        self.0
    }
}

/// Encapsulation mode of a shadow root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowRootMode {
    #[default]
    Open,
    Closed,
}

/// Type of DOM node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    Document,
    DocumentType {
        name: String,
        public_id: String,
        system_id: String,
    },
    Element {
        tag_name: String,
        namespace: String,
    },
    Text(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        data: String,
    },
    /// Root of a shadow tree; its host is reachable through [`Node::host`].
    ShadowRoot { mode: ShadowRootMode },
}

/// A DOM node.
#[derive(Debug)]
pub struct Node {
    /// Unique ID for this node.
    pub id: NodeId,
    /// Node type and associated data.
    pub node_type: NodeType,
    /// Element attributes, empty for every other node type.
    attributes: RefCell<HashMap<String, String>>,
    /// Parent node (weak reference to avoid cycles).
    parent: RefCell<Option<Weak<Node>>>,
    /// Child nodes.
    children: RefCell<Vec<Rc<Node>>>,
    /// Attached shadow root, for shadow hosts.
    shadow_root: RefCell<Option<Rc<Node>>>,
    /// Shadow host, for shadow roots.
    host: RefCell<Option<Weak<Node>>>,
}

impl Node {
    /// Create a new, detached node.
    pub fn new(id: NodeId, node_type: NodeType) -> Rc<Self> {
        Rc::new(Self {
            id,
            node_type,
            attributes: RefCell::new(HashMap::new()),
            parent: RefCell::new(None),
            children: RefCell::new(Vec::new()),
            shadow_root: RefCell::new(None),
            host: RefCell::new(None),
        })
    }

    /// Get the tag name for element nodes.
    pub fn tag_name(&self) -> Option<&str> {
        match &self.node_type {
            NodeType::Element { tag_name, .. } => Some(tag_name),
            _ => None,
        }
    }

    /// Get an attribute value.
    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    /// The element's class list.
    pub fn class_list(&self) -> Vec<String> {
        self.get_attribute("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Get the text content.
    pub fn text_content(&self) -> String {
        let mut result = String::new();
        self.collect_text(&mut result);
        result
    }

    fn collect_text(&self, result: &mut String) {
        match &self.node_type {
            NodeType::Text(text) => result.push_str(text),
            _ => {
                for child in self.children.borrow().iter() {
                    child.collect_text(result);
                }
            }
        }
    }

    /// Get parent node.
    pub fn parent(&self) -> Option<Rc<Node>> {
        self.parent.borrow().as_ref().and_then(|w| w.upgrade())
    }

    /// Get the parent if it is an element. Shadow roots and the document are
    /// not elements, so children of a shadow root have no parent element.
    pub fn parent_element(&self) -> Option<Rc<Node>> {
        self.parent().filter(|p| p.is_element())
    }

    /// Get child nodes.
    pub fn children(&self) -> Vec<Rc<Node>> {
        self.children.borrow().clone()
    }

    /// Get element children, in document order.
    pub fn element_children(&self) -> Vec<Rc<Node>> {
        self.children
            .borrow()
            .iter()
            .filter(|c| c.is_element())
            .cloned()
            .collect()
    }

    /// Attached shadow root, if this element is a shadow host.
    pub fn shadow_root(&self) -> Option<Rc<Node>> {
        self.shadow_root.borrow().clone()
    }

    /// Host element, if this node is a shadow root.
    pub fn host(&self) -> Option<Rc<Node>> {
        self.host.borrow().as_ref().and_then(|w| w.upgrade())
    }

    /// Check if this is an element node.
    pub fn is_element(&self) -> bool {
        matches!(self.node_type, NodeType::Element { .. })
    }

    /// Check if this is a text node.
    pub fn is_text(&self) -> bool {
        matches!(self.node_type, NodeType::Text(_))
    }

    /// Check if this is a shadow root.
    pub fn is_shadow_root(&self) -> bool {
        matches!(self.node_type, NodeType::ShadowRoot { .. })
    }

    /// Whether the node is reachable from a document root, crossing shadow
    /// boundaries through their hosts.
    pub fn is_connected(&self) -> bool {
        match self.node_type {
            NodeType::Document => return true,
            NodeType::ShadowRoot { .. } => {
                return self.host().is_some_and(|h| h.is_connected());
            }
            _ => {}
        }
        self.parent().is_some_and(|p| p.is_connected())
    }

    /// Whether the node lives inside a shadow tree.
    pub fn in_shadow_tree(&self) -> bool {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.is_shadow_root() {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Check whether `self` is `other` or one of its inclusive ancestors,
    /// crossing shadow boundaries.
    pub fn is_inclusive_ancestor_of(&self, other: &Node) -> bool {
        if self.id == other.id {
            return true;
        }
        let mut current = other.parent().or_else(|| other.host());
        while let Some(node) = current {
            if node.id == self.id {
                return true;
            }
            current = node.parent().or_else(|| node.host());
        }
        false
    }

    pub(crate) fn set_attribute(&self, name: &str, value: &str) {
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    pub(crate) fn append_child(self: &Rc<Self>, child: Rc<Node>) {
        *child.parent.borrow_mut() = Some(Rc::downgrade(self));
        self.children.borrow_mut().push(child);
    }

    pub(crate) fn detach_child(&self, child: &Node) -> Option<Rc<Node>> {
        let mut children = self.children.borrow_mut();
        let index = children.iter().position(|c| c.id == child.id)?;
        let removed = children.remove(index);
        *removed.parent.borrow_mut() = None;
        Some(removed)
    }
}

/// A complete DOM document.
pub struct Document {
    /// Root node of the document.
    root: Rc<Node>,
    /// Next node ID.
    next_id: Cell<usize>,
    /// Bumped on every mutation.
    generation: Cell<u64>,
}

impl Document {
    /// Create a new empty document with no elements at all.
    pub fn new() -> Self {
        Self {
            root: Node::new(NodeId::new(0), NodeType::Document),
            next_id: Cell::new(1),
            generation: Cell::new(0),
        }
    }

    /// Create a document with an empty `<html><head></head><body></body></html>`
    /// skeleton.
    pub fn blank() -> Self {
        let doc = Self::new();
        let html = doc.alloc(NodeType::Element {
            tag_name: "html".to_string(),
            namespace: HTML_NAMESPACE.to_string(),
        });
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        html.append_child(head);
        html.append_child(body);
        doc.root.append_child(html);
        doc
    }

    /// Parse HTML and create a document.
    pub fn parse_html(html: &str) -> Result<Self, DomError> {
        debug!(len = html.len(), "Parsing HTML");

        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())
            .map_err(|e| DomError::ParseError(e.to_string()))?;

        let doc = Document::new();
        doc.convert_rcdom(&dom.document, &doc.root.clone());

        debug!(node_count = doc.next_id.get(), "HTML parsed");
        Ok(doc)
    }

    fn convert_rcdom(&self, handle: &Handle, parent: &Rc<Node>) {
        for child_handle in handle.children.borrow().iter() {
            let mut attributes = Vec::new();
            let node_type = match &child_handle.data {
                NodeData::Document => continue, // Skip document node itself
                NodeData::Doctype {
                    name,
                    public_id,
                    system_id,
                } => NodeType::DocumentType {
                    name: name.to_string(),
                    public_id: public_id.to_string(),
                    system_id: system_id.to_string(),
                },
                NodeData::Element { name, attrs, .. } => {
                    for attr in attrs.borrow().iter() {
                        let name = attr.name.local.to_string();
                        attributes.push((name, attr.value.to_string()));
                    }
                    NodeType::Element {
                        tag_name: name.local.to_string(),
                        namespace: name.ns.to_string(),
                    }
                }
                NodeData::Text { contents } => NodeType::Text(contents.borrow().to_string()),
                NodeData::Comment { contents } => NodeType::Comment(contents.to_string()),
                NodeData::ProcessingInstruction { target, contents } => {
                    NodeType::ProcessingInstruction {
                        target: target.to_string(),
                        data: contents.to_string(),
                    }
                }
            };

            let node = self.alloc(node_type);
            for (name, value) in &attributes {
                node.set_attribute(name, value);
            }
            parent.append_child(node.clone());

            // Recurse for children
            self.convert_rcdom(child_handle, &node);
        }
    }

    fn alloc(&self, node_type: NodeType) -> Rc<Node> {
        let id = NodeId::new(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        Node::new(id, node_type)
    }

    fn touch(&self) {
        self.generation.set(self.generation.get() + 1);
    }

    /// Mutation counter. Changes whenever the tree, an attribute, or a shadow
    /// root changes.
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Get the document root.
    pub fn root(&self) -> &Rc<Node> {
        &self.root
    }

    /// Get the document element (<html>).
    pub fn document_element(&self) -> Option<Rc<Node>> {
        self.root
            .children()
            .into_iter()
            .find(|n| n.tag_name() == Some("html"))
    }

    /// Get the <head> element.
    pub fn head(&self) -> Option<Rc<Node>> {
        self.document_element()?
            .children()
            .into_iter()
            .find(|n| n.tag_name() == Some("head"))
    }

    /// Get the <body> element.
    pub fn body(&self) -> Option<Rc<Node>> {
        self.document_element()?
            .children()
            .into_iter()
            .find(|n| n.tag_name() == Some("body"))
    }

    /// Get the first connected element with the given id, in document order.
    /// Shadow trees are not searched.
    pub fn get_element_by_id(&self, id: &str) -> Option<Rc<Node>> {
        let mut found = None;
        self.traverse(|node| {
            if found.is_none() && node.get_attribute("id").as_deref() == Some(id) {
                found = Some(node.clone());
            }
        });
        found
    }

    /// Get elements by tag name.
    pub fn get_elements_by_tag_name(&self, tag_name: &str) -> Vec<Rc<Node>> {
        let mut result = Vec::new();
        self.traverse(|node| {
            if node
                .tag_name()
                .is_some_and(|t| t.eq_ignore_ascii_case(tag_name))
            {
                result.push(node.clone());
            }
        });
        result
    }

    /// Create a detached element in the HTML namespace.
    pub fn create_element(&self, tag_name: &str) -> Rc<Node> {
        self.alloc(NodeType::Element {
            tag_name: tag_name.to_ascii_lowercase(),
            namespace: HTML_NAMESPACE.to_string(),
        })
    }

    /// Create a detached text node.
    pub fn create_text_node(&self, data: &str) -> Rc<Node> {
        self.alloc(NodeType::Text(data.to_string()))
    }

    /// [DOM § 4.2.3](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// Append `child` as the last child of `parent`, removing it from its
    /// previous parent first.
    pub fn append_child(&self, parent: &Rc<Node>, child: Rc<Node>) -> Result<(), DomError> {
        if matches!(
            child.node_type,
            NodeType::Document | NodeType::ShadowRoot { .. }
        ) {
            return Err(DomError::HierarchyRequest(
                "documents and shadow roots cannot be inserted".to_string(),
            ));
        }
        if parent.is_text() {
            return Err(DomError::HierarchyRequest(
                "text nodes cannot have children".to_string(),
            ));
        }
        if child.is_inclusive_ancestor_of(parent) {
            return Err(DomError::HierarchyRequest(
                "a node cannot be inserted into its own subtree".to_string(),
            ));
        }

        if let Some(old_parent) = child.parent() {
            old_parent.detach_child(&child);
        }
        trace!(
            parent = parent.id.raw(),
            child = child.id.raw(),
            "append_child"
        );
        parent.append_child(child);
        self.touch();
        Ok(())
    }

    /// Remove `child` from `parent`.
    pub fn remove_child(&self, parent: &Rc<Node>, child: &Rc<Node>) -> Result<Rc<Node>, DomError> {
        let removed = parent.detach_child(child).ok_or(DomError::NodeNotFound)?;
        trace!(
            parent = parent.id.raw(),
            child = child.id.raw(),
            "remove_child"
        );
        self.touch();
        Ok(removed)
    }

    /// Replace all children of `parent` with `children`.
    pub fn replace_children(
        &self,
        parent: &Rc<Node>,
        children: Vec<Rc<Node>>,
    ) -> Result<(), DomError> {
        for old in parent.children() {
            parent.detach_child(&old);
        }
        for child in children {
            self.append_child(parent, child)?;
        }
        self.touch();
        Ok(())
    }

    /// Set an attribute on an element.
    pub fn set_attribute(&self, node: &Rc<Node>, name: &str, value: &str) -> Result<(), DomError> {
        if !node.is_element() {
            return Err(DomError::InvalidOperation(format!(
                "cannot set attribute `{name}` on a non-element node"
            )));
        }
        node.set_attribute(&name.to_ascii_lowercase(), value);
        self.touch();
        Ok(())
    }

    /// [DOM § 4.9](https://dom.spec.whatwg.org/#dom-element-attachshadow)
    ///
    /// Attach a shadow root to `host`. Fails if `host` is not an element or
    /// already hosts a shadow tree.
    pub fn attach_shadow(
        &self,
        host: &Rc<Node>,
        mode: ShadowRootMode,
    ) -> Result<Rc<Node>, DomError> {
        if !host.is_element() {
            return Err(DomError::InvalidOperation(
                "shadow roots can only be attached to elements".to_string(),
            ));
        }
        if host.shadow_root().is_some() {
            return Err(DomError::InvalidOperation(format!(
                "element {} already hosts a shadow root",
                host.id.raw()
            )));
        }

        let shadow = self.alloc(NodeType::ShadowRoot { mode });
        *shadow.host.borrow_mut() = Some(Rc::downgrade(host));
        *host.shadow_root.borrow_mut() = Some(shadow.clone());
        debug!(
            host = host.id.raw(),
            shadow = shadow.id.raw(),
            "Attached shadow root"
        );
        self.touch();
        Ok(shadow)
    }

    /// Traverse all light-tree nodes depth-first, in document order.
    pub fn traverse<F>(&self, mut callback: F)
    where
        F: FnMut(&Rc<Node>),
    {
        traverse_node(&self.root, &mut callback);
    }
}

fn traverse_node<F>(node: &Rc<Node>, callback: &mut F)
where
    F: FnMut(&Rc<Node>),
{
    callback(node);
    for child in node.children() {
        traverse_node(&child, callback);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Namespace of HTML elements.
pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
