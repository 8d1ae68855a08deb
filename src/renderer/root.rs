//! RenderRoot - the attachment point an element renders into.
//!
//! A root is created once, when the element is constructed, and never
//! replaced. Renderers commit a list of [`Node`]s into it; hosts and tests
//! read it back with the query helpers and deliver events with
//! [`RenderRoot::dispatch`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

// =============================================================================
// Root Mode
// =============================================================================

/// Where an element's output lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootMode {
    /// An isolated rendering boundary. Open roots are reachable from the
    /// host through `Element::shadow_root()`, closed roots are not.
    Shadow { open: bool },
    /// Render directly into the element's own light tree.
    Light,
}

impl Default for RootMode {
    fn default() -> Self {
        Self::Shadow { open: true }
    }
}

// =============================================================================
// Nodes
// =============================================================================

/// Event handler already bound to its event context.
pub type BoundListener = Rc<dyn Fn()>;

/// A committed node.
#[derive(Clone)]
pub enum Node {
    Text(String),
    Element(ElementNode),
}

/// A committed element with its bound listeners.
#[derive(Clone)]
pub struct ElementNode {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
    pub(crate) listeners: Vec<(String, BoundListener)>,
}

impl Node {
    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl ElementNode {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Names of the events this element listens to.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.listeners.iter().map(|(event, _)| event.as_str())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Node::Element(element) => element.fmt(f),
        }
    }
}

impl fmt::Debug for ElementNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementNode")
            .field("tag", &self.tag)
            .field("attributes", &self.attributes)
            .field("children", &self.children)
            .field("events", &self.events().collect::<Vec<_>>())
            .finish()
    }
}

/// Depth-first search for the first element named `tag`.
fn find<'a>(nodes: &'a [Node], tag: &str) -> Option<&'a ElementNode> {
    nodes.iter().find_map(|node| match node {
        Node::Text(_) => None,
        Node::Element(element) if element.tag == tag => Some(element),
        Node::Element(element) => find(&element.children, tag),
    })
}

// =============================================================================
// Render Root
// =============================================================================

pub struct RenderRoot {
    mode: RootMode,
    children: RefCell<Vec<Node>>,
    commits: Cell<u64>,
}

impl RenderRoot {
    pub fn new(mode: RootMode) -> Self {
        Self {
            mode,
            children: RefCell::new(Vec::new()),
            commits: Cell::new(0),
        }
    }

    pub fn mode(&self) -> RootMode {
        self.mode
    }

    /// Replace the root's content. Called by renderers.
    pub fn commit(&self, nodes: Vec<Node>) {
        *self.children.borrow_mut() = nodes;
        self.commits.set(self.commits.get() + 1);
    }

    /// How many times a renderer committed into this root.
    pub fn commits(&self) -> u64 {
        self.commits.get()
    }

    pub fn is_empty(&self) -> bool {
        self.children.borrow().is_empty()
    }

    /// Read the committed nodes.
    pub fn with_children<R>(&self, f: impl FnOnce(&[Node]) -> R) -> R {
        f(&self.children.borrow()[..])
    }

    /// Concatenated text of everything committed.
    pub fn text_content(&self) -> String {
        self.children
            .borrow()
            .iter()
            .map(Node::text_content)
            .collect()
    }

    /// Text of the first element named `tag`.
    pub fn query_text(&self, tag: &str) -> Option<String> {
        let children = self.children.borrow();
        find(&children, tag).map(|element| {
            element
                .children
                .iter()
                .map(Node::text_content)
                .collect()
        })
    }

    /// Attribute `name` of the first element named `tag`.
    pub fn query_attribute(&self, tag: &str, name: &str) -> Option<String> {
        let children = self.children.borrow();
        find(&children, tag)
            .and_then(|element| element.attribute(name))
            .map(str::to_string)
    }

    /// Deliver `event` to the first element named `tag`.
    ///
    /// Returns the number of listeners invoked. Listeners run after the
    /// root is released, so they may write state freely.
    pub fn dispatch(&self, tag: &str, event: &str) -> usize {
        let listeners: Vec<BoundListener> = {
            let children = self.children.borrow();
            match find(&children, tag) {
                Some(element) => element
                    .listeners
                    .iter()
                    .filter(|(name, _)| name == event)
                    .map(|(_, listener)| listener.clone())
                    .collect(),
                None => Vec::new(),
            }
        };

        for listener in &listeners {
            listener();
        }
        listeners.len()
    }
}

impl Default for RenderRoot {
    fn default() -> Self {
        Self::new(RootMode::default())
    }
}

impl fmt::Debug for RenderRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderRoot")
            .field("mode", &self.mode)
            .field("children", &*self.children.borrow())
            .field("commits", &self.commits.get())
            .finish()
    }
}
