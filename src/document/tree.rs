// src/document/tree.rs

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::document::selector::Selector;

/// Style properties every element carries even without inline styles, in the
/// spirit of a computed-style lookup. Inline styles overlay these.
const DEFAULT_STYLES: &[(&str, &str)] = &[
    ("background-color", "transparent"),
    ("color", "rgb(0, 0, 0)"),
    ("display", "block"),
    ("opacity", "1"),
    ("pointer-events", "auto"),
    ("position", "static"),
    ("visibility", "visible"),
];

/// Identity of a node within one document.
///
/// Ids are monotonic and never reused, so a replaced element always has a
/// different id than its predecessor even when attributes and text match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(u64);

#[derive(Debug)]
pub(crate) struct ElementData {
    pub(crate) tag: String,
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) styles: BTreeMap<String, String>,
}

#[derive(Debug)]
enum NodeKind {
    Root,
    Element(ElementData),
    Text(String),
}

#[derive(Debug)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// The tree behind a [`Document`] handle.
#[derive(Debug)]
pub(crate) struct DocumentTree {
    nodes: HashMap<NodeId, NodeData>,
    root: NodeId,
    next_id: u64,
}

impl DocumentTree {
    fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            NodeData {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Root,
            },
        );
        Self {
            nodes,
            root,
            next_id: 1,
        }
    }

    fn alloc(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            NodeData {
                parent: Some(parent),
                children: Vec::new(),
                kind,
            },
        );
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(id);
        }
        id
    }

    pub(crate) fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.nodes.get(&id).map(|n| &n.kind) {
            Some(NodeKind::Element(data)) => Some(data),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.nodes.get_mut(&id).map(|n| &mut n.kind) {
            Some(NodeKind::Element(data)) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    fn is_connected(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Concatenated text of all descendant text nodes, in document order.
    fn text_of(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack: Vec<NodeId> = match self.nodes.get(&id) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(current) = stack.pop() {
            match self.nodes.get(&current).map(|n| &n.kind) {
                Some(NodeKind::Text(text)) => out.push_str(text),
                Some(_) => {
                    if let Some(node) = self.nodes.get(&current) {
                        stack.extend(node.children.iter().rev().copied());
                    }
                }
                None => {}
            }
        }
        out
    }

    /// Drop every child subtree of `id`.
    fn clear_children(&mut self, id: NodeId) {
        let children = match self.nodes.get_mut(&id) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for child in children {
            self.purge_subtree(child);
        }
    }

    /// Detach `id` from its parent and drop it together with its subtree.
    fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            if let Some(parent_node) = self.nodes.get_mut(&parent) {
                parent_node.children.retain(|child| *child != id);
            }
        }
        self.purge_subtree(id);
    }

    fn purge_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
            }
        }
    }

    /// All connected elements matching `selector`, in document (depth-first
    /// pre-order) order.
    pub(crate) fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        let mut matched = Vec::new();
        let mut stack: Vec<NodeId> = match self.nodes.get(&self.root) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return matched,
        };
        while let Some(current) = stack.pop() {
            if self.element(current).is_some() && selector.matches(self, current) {
                matched.push(current);
            }
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        matched
    }

    fn element_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|n| matches!(n.kind, NodeKind::Element(_)))
            .count()
    }
}

/// Shared handle to an in-memory document.
///
/// Cloning is cheap; all clones see the same tree. The host mutates the
/// document through this handle while watchers query it between frames.
#[derive(Clone)]
pub struct Document {
    inner: Arc<RwLock<DocumentTree>>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("elements", &self.element_count())
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document (a root with no elements).
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(DocumentTree::new())),
        }
    }

    /// Append a new element under `parent` (or under the root when `None`)
    /// and return a handle to it.
    pub fn append_element(&self, parent: Option<&ElementRef>, tag: &str) -> ElementRef {
        let mut tree = self.inner.write();
        let parent_id = match parent {
            Some(parent_ref) if tree.nodes.contains_key(&parent_ref.node) => parent_ref.node,
            Some(parent_ref) => {
                warn!(
                    parent = ?parent_ref.node,
                    tag,
                    "parent element no longer exists; attaching to root"
                );
                tree.root
            }
            None => tree.root,
        };
        let id = tree.alloc(
            parent_id,
            NodeKind::Element(ElementData {
                tag: tag.to_string(),
                attributes: BTreeMap::new(),
                styles: BTreeMap::new(),
            }),
        );
        debug!(node = ?id, tag, "element appended");
        ElementRef {
            document: self.clone(),
            node: id,
        }
    }

    /// All connected elements matching the compiled `selector`, in document
    /// order.
    pub fn query_all(&self, selector: &Selector) -> Vec<ElementRef> {
        let tree = self.inner.read();
        tree.query_all(selector)
            .into_iter()
            .map(|node| ElementRef::from_node(self.clone(), node))
            .collect()
    }

    /// Number of elements currently in the document (for tests and logs).
    pub fn element_count(&self) -> usize {
        self.inner.read().element_count()
    }

    fn same_document(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Handle to one element of a [`Document`].
///
/// Handles are cheap to clone and compare by element identity: two handles
/// are equal only if they designate the same node of the same document. A
/// handle to a removed element stays valid to hold; accessors return
/// empty/`None` values and mutations become no-ops.
#[derive(Clone)]
pub struct ElementRef {
    document: Document,
    node: NodeId,
}

impl PartialEq for ElementRef {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.document.same_document(&other.document)
    }
}

impl Eq for ElementRef {}

impl std::fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementRef")
            .field("node", &self.node)
            .field("tag", &self.tag())
            .field("id", &self.id_attr())
            .finish()
    }
}

impl ElementRef {
    pub(crate) fn from_node(document: Document, node: NodeId) -> Self {
        Self { document, node }
    }

    /// The element's tag name, or an empty string if it was removed.
    pub fn tag(&self) -> String {
        let tree = self.document.inner.read();
        tree.element(self.node)
            .map(|el| el.tag.clone())
            .unwrap_or_default()
    }

    /// Raw attribute value, if set.
    pub fn attribute(&self, name: &str) -> Option<String> {
        let tree = self.document.inner.read();
        tree.element(self.node)
            .and_then(|el| el.attributes.get(name).cloned())
    }

    /// The `id` attribute, if set.
    pub fn id_attr(&self) -> Option<String> {
        self.attribute("id")
    }

    /// Class list from the `class` attribute (whitespace-separated).
    pub fn classes(&self) -> Vec<String> {
        self.attribute("class")
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        let mut tree = self.document.inner.write();
        if let Some(el) = tree.element_mut(self.node) {
            el.attributes.insert(name.to_string(), value.to_string());
        }
    }

    /// Concatenated text content of the element's subtree.
    pub fn text(&self) -> String {
        let tree = self.document.inner.read();
        tree.text_of(self.node)
    }

    /// Replace the element's children with a single text node.
    pub fn set_text(&self, text: &str) {
        let mut tree = self.document.inner.write();
        if tree.element(self.node).is_none() {
            return;
        }
        tree.clear_children(self.node);
        if !text.is_empty() {
            tree.alloc(self.node, NodeKind::Text(text.to_string()));
        }
    }

    /// Effective style value: the inline style if set, else the built-in
    /// default. Unknown properties yield an empty string, like a
    /// `getPropertyValue` lookup.
    pub fn style(&self, property: &str) -> String {
        let tree = self.document.inner.read();
        if let Some(el) = tree.element(self.node) {
            if let Some(value) = el.styles.get(property) {
                return value.clone();
            }
        }
        DEFAULT_STYLES
            .iter()
            .find(|(name, _)| *name == property)
            .map(|(_, value)| value.to_string())
            .unwrap_or_default()
    }

    pub fn set_style(&self, property: &str, value: &str) {
        let mut tree = self.document.inner.write();
        if let Some(el) = tree.element_mut(self.node) {
            el.styles.insert(property.to_string(), value.to_string());
        }
    }

    pub fn remove_style(&self, property: &str) {
        let mut tree = self.document.inner.write();
        if let Some(el) = tree.element_mut(self.node) {
            el.styles.remove(property);
        }
    }

    /// Full effective style map: built-in defaults overlaid with inline
    /// styles, dashed property names.
    pub fn computed_style(&self) -> BTreeMap<String, String> {
        let tree = self.document.inner.read();
        let mut styles: BTreeMap<String, String> = DEFAULT_STYLES
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        if let Some(el) = tree.element(self.node) {
            for (name, value) in &el.styles {
                styles.insert(name.clone(), value.clone());
            }
        }
        styles
    }

    /// Whether the element still exists and is connected to the document
    /// root.
    pub fn is_attached(&self) -> bool {
        let tree = self.document.inner.read();
        tree.element(self.node).is_some() && tree.is_connected(self.node)
    }

    /// Append a child element and return a handle to it.
    pub fn append_element(&self, tag: &str) -> ElementRef {
        self.document.append_element(Some(self), tag)
    }

    /// Detach this element from its parent and drop its subtree.
    pub fn remove(&self) {
        let mut tree = self.document.inner.write();
        tree.remove(self.node);
        debug!(node = ?self.node, "element removed");
    }
}
