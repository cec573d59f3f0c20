//! Descriptor tree for parsed MBUI documents.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Every node
//! keeps the index of its parent, so "nearest ancestor of kind K" is a walk
//! over parent pointers rather than a query over the document.

use indexmap::IndexMap;
use smallvec::SmallVec;
use std::fmt;

/// Index of a node inside a [`DescriptorTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a descriptor node, derived from its element name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    View,
    Metadata,
    VerticalNavigation,
    Item,
    SubItem,
    Table,
    Columns,
    Column,
    Form,
    Attributes,
    Attribute,
    SuggestHandler,
    Templates,
    Template,
    /// Any element outside the MBUI vocabulary (HTML and the like).
    Markup,
    /// Character data.
    Text,
}

impl NodeKind {
    /// Map an element name to its kind.
    pub fn from_tag(name: &str) -> Self {
        match name {
            "view" => NodeKind::View,
            "metadata" => NodeKind::Metadata,
            "vertical-navigation" => NodeKind::VerticalNavigation,
            "item" => NodeKind::Item,
            "sub-item" => NodeKind::SubItem,
            "table" => NodeKind::Table,
            "columns" => NodeKind::Columns,
            "column" => NodeKind::Column,
            "form" => NodeKind::Form,
            "attributes" => NodeKind::Attributes,
            "attribute" => NodeKind::Attribute,
            "suggest-handler" => NodeKind::SuggestHandler,
            "templates" => NodeKind::Templates,
            "template" => NodeKind::Template,
            _ => NodeKind::Markup,
        }
    }

    /// The element name of this kind, if it belongs to the MBUI vocabulary.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            NodeKind::View => Some("view"),
            NodeKind::Metadata => Some("metadata"),
            NodeKind::VerticalNavigation => Some("vertical-navigation"),
            NodeKind::Item => Some("item"),
            NodeKind::SubItem => Some("sub-item"),
            NodeKind::Table => Some("table"),
            NodeKind::Columns => Some("columns"),
            NodeKind::Column => Some("column"),
            NodeKind::Form => Some("form"),
            NodeKind::Attributes => Some("attributes"),
            NodeKind::Attribute => Some("attribute"),
            NodeKind::SuggestHandler => Some("suggest-handler"),
            NodeKind::Templates => Some("templates"),
            NodeKind::Template => Some("template"),
            NodeKind::Markup | NodeKind::Text => None,
        }
    }

    /// Tables and forms can be embedded as references in navigation content.
    pub fn is_embeddable(&self) -> bool {
        matches!(self, NodeKind::Table | NodeKind::Form)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag() {
            Some(tag) => f.write_str(tag),
            None if *self == NodeKind::Text => f.write_str("#text"),
            None => f.write_str("markup"),
        }
    }
}

/// Source span for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A single node of the descriptor tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub kind: NodeKind,
    /// Element name as written in the source (`#text` for character data).
    pub name: String,
    /// Attributes in source order.
    pub attributes: IndexMap<String, String>,
    /// Character data, only set for [`NodeKind::Text`].
    pub text: Option<String>,
    pub parent: Option<NodeId>,
    pub children: SmallVec<[NodeId; 4]>,
    pub span: Span,
}

impl Node {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }
}

/// An ordered tree of descriptor nodes.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescriptorTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl DescriptorTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element. A parentless element becomes the root if there is none yet.
    pub fn add_element(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
        attributes: IndexMap<String, String>,
        span: Span,
    ) -> NodeId {
        let name = name.into();
        let node = Node {
            kind: NodeKind::from_tag(&name),
            name,
            attributes,
            text: None,
            parent,
            children: SmallVec::new(),
            span,
        };
        self.push(node)
    }

    /// Append character data under `parent`.
    pub fn add_text(&mut self, parent: NodeId, text: impl Into<String>, span: Span) -> NodeId {
        let node = Node {
            kind: NodeKind::Text,
            name: "#text".to_string(),
            attributes: IndexMap::new(),
            text: Some(text.into()),
            parent: Some(parent),
            children: SmallVec::new(),
            span,
        };
        self.push(node)
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        match node.parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None if self.root.is_none() => self.root = Some(id),
            None => {}
        }
        self.nodes.push(node);
        id
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Kind of a node. Unknown ids report [`NodeKind::Markup`].
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).map(|n| n.kind).unwrap_or(NodeKind::Markup)
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).and_then(|n| n.attribute(name))
    }

    pub fn id(&self, id: NodeId) -> Option<&str> {
        self.attribute(id, "id")
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).map(|n| n.span).unwrap_or_default()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Direct children in document order, character data included.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Direct element children in document order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.kind(child) != NodeKind::Text)
    }

    pub fn children_of_kind(
        &self,
        id: NodeId,
        kind: NodeKind,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.kind(child) == kind)
    }

    pub fn first_child_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children_of_kind(id, kind).next()
    }

    /// Ancestors of a node, nearest first. The node itself is not included.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Nearest ancestor matching `pred`.
    pub fn nearest_ancestor(&self, id: NodeId, pred: impl Fn(&Node) -> bool) -> Option<NodeId> {
        self.ancestors(id)
            .find(|&ancestor| self.node(ancestor).is_some_and(&pred))
    }

    pub fn nearest_ancestor_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.nearest_ancestor(id, |n| n.kind == kind)
    }

    /// All nodes of the tree in document order.
    pub fn preorder(&self) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: self.root.into_iter().collect(),
        }
    }

    /// A node and everything below it, in document order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    /// Every node in the tree whose `id` attribute equals `id`, in document order.
    pub fn find_by_id(&self, id: &str) -> Vec<NodeId> {
        self.preorder()
            .filter(|&node| self.id(node) == Some(id))
            .collect()
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = NodeId> + '_ {
        self.preorder().filter(move |&node| self.kind(node) == kind)
    }

    /// Compact XML rendering of a subtree.
    pub fn to_markup(&self, id: NodeId) -> String {
        crate::markup::render(self, id)
    }

    /// Compact XML rendering of a node's start tag.
    pub fn start_tag(&self, id: NodeId) -> String {
        crate::markup::render_start_tag(self, id)
    }
}

/// Iterator over the ancestors of a node.
pub struct Ancestors<'a> {
    tree: &'a DescriptorTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Document-order traversal of a subtree.
pub struct Descendants<'a> {
    tree: &'a DescriptorTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(current).iter().rev().copied());
        Some(current)
    }
}
