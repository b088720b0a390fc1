use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque node identifier, unique across a tree and immutable once assigned.
///
/// Serializes as a bare JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Arena handle. Only meaningful for the tree that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Slot(pub(crate) usize);

// ============================================================================
// Nodes
// ============================================================================

/// A titled prompt in the tree.
///
/// Nodes are owned by their [`PromptTree`](crate::tree::PromptTree) and are
/// only handed out as shared references; every change goes through the
/// tree's mutation API. Children and parent are arena handles, resolve them
/// with [`PromptTree::children_of`](crate::tree::PromptTree::children_of)
/// and [`PromptTree::parent_of`](crate::tree::PromptTree::parent_of).
#[derive(Debug, Clone)]
pub struct PromptNode {
    pub(crate) id: NodeId,
    pub(crate) title: String,
    pub(crate) prompt: String,
    pub(crate) children: Vec<Slot>,
    pub(crate) parent: Option<Slot>,
}

impl PromptNode {
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A partial edit of a node's mutable fields.
///
/// ```
/// use prompttree::v1::NodeUpdate;
///
/// let update = NodeUpdate::default().with_title("Research");
/// assert_eq!(update.title.as_deref(), Some("Research"));
/// assert!(update.prompt.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeUpdate {
    pub title: Option<String>,
    pub prompt: Option<String>,
}

impl NodeUpdate {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.prompt.is_none()
    }
}

// ============================================================================
// Paths
// ============================================================================

/// Root-to-node chain of ids; each element is the parent of the next.
///
/// Paths are derived from a tree and are never empty: a path of length one
/// denotes the root. They go stale when the tree changes underneath them,
/// so re-derive them with [`PromptTree::path_to`](crate::tree::PromptTree::path_to)
/// after any structural mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreePath(Vec<NodeId>);

impl TreePath {
    pub(crate) fn from_ids(ids: Vec<NodeId>) -> Self {
        debug_assert!(!ids.is_empty(), "tree paths always contain the root");
        Self(ids)
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for paths produced by a tree; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn root(&self) -> &NodeId {
        &self.0[0]
    }

    /// The node this path points at.
    pub fn current(&self) -> &NodeId {
        &self.0[self.0.len() - 1]
    }

    /// Parent of the current node, `None` at the root.
    pub fn parent(&self) -> Option<&NodeId> {
        self.0.len().checked_sub(2).map(|i| &self.0[i])
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|p| p.as_str() == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.0.iter().position(|p| p.as_str() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeId> {
        self.0.iter()
    }

    pub(crate) fn child(&self, id: NodeId) -> Self {
        let mut ids = self.0.clone();
        ids.push(id);
        Self(ids)
    }

    pub(crate) fn sibling(&self, id: NodeId) -> Self {
        let mut ids = self.0.clone();
        if let Some(last) = ids.last_mut() {
            *last = id;
        }
        Self(ids)
    }

    /// Path to the parent; the root path is returned unchanged.
    pub(crate) fn up(&self) -> Self {
        self.truncated(self.0.len().saturating_sub(1).max(1))
    }

    pub(crate) fn truncated(&self, len: usize) -> Self {
        Self(self.0[..len.clamp(1, self.0.len())].to_vec())
    }
}

impl<'a> IntoIterator for &'a TreePath {
    type Item = &'a NodeId;
    type IntoIter = std::slice::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            f.write_str(id.as_str())?;
        }
        Ok(())
    }
}

// ============================================================================
// Document
// ============================================================================

/// Value-only snapshot of a tree, the import/export format.
///
/// Parent links are not stored; they are rebuilt on import.
///
/// # JSON shape
///
/// ```json
/// {
///   "id": "root",
///   "title": "AI Project Assistant",
///   "prompt": "This is the root node...",
///   "children": [
///     { "id": "research", "title": "Research", "prompt": "...", "children": [] }
///   ]
/// }
/// ```
///
/// # Builder API
///
/// ```
/// use prompttree::v1::NodeDocument;
///
/// let doc = NodeDocument::new("root", "Root", "You are helpful.")
///     .with_child(NodeDocument::new("tone", "Tone", "Be concise."));
/// assert_eq!(doc.node_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub id: NodeId,
    pub title: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub children: Vec<NodeDocument>,
}

impl NodeDocument {
    pub fn new(
        id: impl Into<NodeId>,
        title: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            prompt: prompt.into(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: NodeDocument) -> Self {
        self.children.push(child);
        self
    }

    /// Total number of nodes, this one included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(doc) = stack.pop() {
            count += 1;
            stack.extend(doc.children.iter());
        }
        count
    }

    /// Parse a document from JSON. Shape is checked here; id uniqueness
    /// is checked when the document is turned into a tree.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        parse_json(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Parse JSON without serde_json's nesting limit.
///
/// Every tree level costs two levels of JSON nesting, so the default limit
/// of 128 would reject trees deeper than about 63 nodes. The stack grows on
/// demand while parsing. Writing a document and dropping it still recurse
/// once per level, which bounds practical depth to the tens of thousands.
pub fn parse_json<T: DeserializeOwned>(json: &str) -> Result<T, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_str(json);
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}
