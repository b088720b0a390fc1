//! Arena-backed prompt tree.

use crate::error::{Result, TreeError};
use crate::types::{NodeDocument, NodeId, NodeUpdate, PromptNode, Slot, TreePath};
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Id given to the root of freshly created trees.
pub const ROOT_ID: &str = "root";

/// A rooted, ordered tree of [`PromptNode`]s.
///
/// Nodes live in a slot arena; parent and child links are slot handles and
/// ids are resolved through an index, so the structure has no ownership
/// cycles even though links run both ways. All mutation goes through
/// [`add_child`](Self::add_child), [`delete_node`](Self::delete_node) and
/// [`update_node`](Self::update_node), which together keep these
/// invariants:
///
/// 1. exactly one node (the root) has no parent;
/// 2. every non-root node appears exactly once in its parent's children;
/// 3. ids are unique across the tree;
/// 4. the tree is finite and acyclic.
///
/// # Example
///
/// ```
/// use prompttree::v1::PromptTree;
///
/// let mut tree = PromptTree::new("Assistant", "You are a project assistant.");
/// let research = tree.add_child("root", "Research", "Survey the field.").unwrap();
/// tree.add_child(research.as_str(), "Papers", "Read recent papers.").unwrap();
///
/// let path = tree.path_to(research.as_str()).unwrap();
/// assert_eq!(path.len(), 2);
/// assert_eq!(tree.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct PromptTree {
    slots: Vec<Option<PromptNode>>,
    free: Vec<Slot>,
    index: HashMap<NodeId, Slot>,
    root: Slot,
}

impl PromptTree {
    /// A single-node tree whose root id is [`ROOT_ID`].
    pub fn new(title: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::with_root(NodeId::from(ROOT_ID), title.into(), prompt.into())
    }

    fn with_root(id: NodeId, title: String, prompt: String) -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            root: Slot(0),
        };
        tree.root = tree.create_node(id, title, prompt, None);
        tree
    }

    /// The built-in starter tree.
    pub fn seed() -> Self {
        let doc = NodeDocument::new(
            ROOT_ID,
            "AI Project Assistant",
            "This is the root node of our AI project assistant. It contains overall project description and status information.",
        )
        .with_child(
            NodeDocument::new(
                "research",
                "Research",
                "Conduct thorough research on AI technologies and methodologies relevant to our project.",
            )
            .with_child(NodeDocument::new(
                "literature-review",
                "Literature Review",
                "Review recent academic papers and articles on AI advancements.",
            ))
            .with_child(NodeDocument::new(
                "market-analysis",
                "Market Analysis",
                "Analyze current AI products and services in the market.",
            )),
        )
        .with_child(
            NodeDocument::new(
                "development",
                "Development",
                "Guide the development process of our AI project.",
            )
            .with_child(NodeDocument::new(
                "model-architecture",
                "Model Architecture",
                "Design and implement the AI model architecture.",
            ))
            .with_child(NodeDocument::new(
                "data-pipeline",
                "Data Pipeline",
                "Develop robust data ingestion and preprocessing pipelines.",
            )),
        )
        .with_child(NodeDocument::new(
            "evaluation",
            "Evaluation",
            "Set up evaluation metrics and testing procedures for our AI system.",
        ));
        Self::build(doc)
    }

    // ── Lookup ─────────────────────────────────────────────────────────

    pub fn root(&self) -> &PromptNode {
        self.node(self.root)
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root().id
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&PromptNode> {
        self.index.get(id).map(|slot| self.node(*slot))
    }

    /// Like [`find_by_id`](Self::find_by_id) but reports a miss as
    /// [`TreeError::NotFound`].
    pub fn get(&self, id: &str) -> Result<&PromptNode> {
        self.find_by_id(id).ok_or_else(|| TreeError::not_found(id))
    }

    /// Children of `node` in sibling order.
    pub fn children_of<'a>(
        &'a self,
        node: &'a PromptNode,
    ) -> impl ExactSizeIterator<Item = &'a PromptNode> + 'a {
        node.children.iter().map(move |slot| self.node(*slot))
    }

    pub fn parent_of(&self, node: &PromptNode) -> Option<&PromptNode> {
        node.parent.map(|slot| self.node(slot))
    }

    /// Ids of the children of `id`, in sibling order.
    pub fn child_ids(&self, id: &str) -> Result<Vec<NodeId>> {
        let node = self.get(id)?;
        Ok(self.children_of(node).map(|c| c.id.clone()).collect())
    }

    /// Root-to-node path for `id`, or `None` if the id is absent.
    pub fn path_to(&self, id: &str) -> Option<TreePath> {
        let mut slot = *self.index.get(id)?;
        let mut ids = vec![self.node(slot).id.clone()];
        while let Some(parent) = self.node(slot).parent {
            ids.push(self.node(parent).id.clone());
            slot = parent;
        }
        ids.reverse();
        Some(TreePath::from_ids(ids))
    }

    /// Pre-order traversal starting at the root.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![self.root],
        }
    }

    /// Pre-order traversal of the subtree rooted at `node`, `node` included.
    pub fn subtree<'a>(&'a self, node: &PromptNode) -> PreOrder<'a> {
        let start = self.index.get(node.id.as_str()).copied();
        PreOrder {
            tree: self,
            stack: start.into_iter().collect(),
        }
    }

    // ── Mutation ───────────────────────────────────────────────────────

    /// Append a new node with a fresh id to the children of `parent_id`.
    pub fn add_child(
        &mut self,
        parent_id: &str,
        title: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Result<NodeId> {
        let parent = *self
            .index
            .get(parent_id)
            .ok_or_else(|| TreeError::not_found(parent_id))?;
        let id = self.fresh_id();
        let slot = self.create_node(id.clone(), title.into(), prompt.into(), Some(parent));
        self.node_mut(parent).children.push(slot);
        log::debug!("added node {} under {}", id, parent_id);
        Ok(id)
    }

    /// Remove `id` and discard its whole subtree. Returns how many nodes
    /// were discarded.
    pub fn delete_node(&mut self, id: &str) -> Result<usize> {
        let slot = *self.index.get(id).ok_or_else(|| TreeError::not_found(id))?;
        let Some(parent) = self.node(slot).parent else {
            return Err(TreeError::InvalidOperation(
                "the root node cannot be deleted".to_string(),
            ));
        };
        self.node_mut(parent).children.retain(|child| *child != slot);

        let mut removed = 0;
        let mut stack = vec![slot];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.slots[next.0].take() {
                self.index.remove(&node.id);
                stack.extend(node.children);
                self.free.push(next);
                removed += 1;
            }
        }
        log::debug!("deleted node {} ({} nodes discarded)", id, removed);
        Ok(removed)
    }

    /// Merge `update` into the node's title and prompt.
    pub fn update_node(&mut self, id: &str, update: NodeUpdate) -> Result<()> {
        let slot = *self.index.get(id).ok_or_else(|| TreeError::not_found(id))?;
        let node = self.node_mut(slot);
        if let Some(title) = update.title {
            node.title = title;
        }
        if let Some(prompt) = update.prompt {
            node.prompt = prompt;
        }
        log::debug!("updated node {}", id);
        Ok(())
    }

    // ── Serialization ──────────────────────────────────────────────────

    /// Value-only snapshot of the whole tree.
    pub fn serialize(&self) -> NodeDocument {
        self.document_for(self.root)
    }

    /// Post-order walk with an explicit stack; each entry holds a node and
    /// the documents of the children finished so far.
    fn document_for(&self, slot: Slot) -> NodeDocument {
        let mut stack: Vec<(Slot, Vec<NodeDocument>)> = vec![(slot, Vec::new())];
        while let Some((current, children)) = stack.pop() {
            let node = self.node(current);
            if let Some(next) = node.children.get(children.len()).copied() {
                stack.push((current, children));
                stack.push((next, Vec::new()));
                continue;
            }
            let doc = NodeDocument {
                id: node.id.clone(),
                title: node.title.clone(),
                prompt: node.prompt.clone(),
                children,
            };
            match stack.last_mut() {
                Some((_, siblings)) => siblings.push(doc),
                None => return doc,
            }
        }
        unreachable!("the walk returns once the starting node is finished")
    }

    /// Rebuild a tree from a snapshot, restoring parent links.
    ///
    /// Fails with [`TreeError::MalformedDocument`] if any id is empty or
    /// appears more than once.
    pub fn deserialize(doc: NodeDocument) -> Result<Self> {
        validate_document(&doc)?;
        Ok(Self::build(doc))
    }

    fn build(doc: NodeDocument) -> Self {
        let NodeDocument {
            id,
            title,
            prompt,
            children,
        } = doc;
        let mut tree = Self::with_root(id, title, prompt);
        let mut pending: Vec<(Slot, Vec<NodeDocument>)> = vec![(tree.root, children)];
        while let Some((parent, children)) = pending.pop() {
            for child in children {
                let slot = tree.create_node(child.id, child.title, child.prompt, Some(parent));
                tree.node_mut(parent).children.push(slot);
                pending.push((slot, child.children));
            }
        }
        tree
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc = NodeDocument::from_json(json)
            .map_err(|e| TreeError::MalformedDocument(e.to_string()))?;
        Self::deserialize(doc)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        self.serialize().to_json()
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        self.serialize().to_json_pretty()
    }

    // ── Arena internals ────────────────────────────────────────────────

    /// Allocate a node without attaching it to `parent`'s children; callers
    /// push the returned slot themselves.
    fn create_node(
        &mut self,
        id: NodeId,
        title: String,
        prompt: String,
        parent: Option<Slot>,
    ) -> Slot {
        let node = PromptNode {
            id: id.clone(),
            title,
            prompt,
            children: Vec::new(),
            parent,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot.0] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                Slot(self.slots.len() - 1)
            }
        };
        self.index.insert(id, slot);
        slot
    }

    fn fresh_id(&self) -> NodeId {
        let mut rng = rand::rng();
        loop {
            let candidate = NodeId::new(format!(
                "new-{}-{:04x}",
                chrono::Utc::now().timestamp_millis(),
                rng.random::<u16>()
            ));
            if !self.index.contains_key(candidate.as_str()) {
                return candidate;
            }
        }
    }

    fn node(&self, slot: Slot) -> &PromptNode {
        match &self.slots[slot.0] {
            Some(node) => node,
            None => unreachable!("live links never point at a freed slot"),
        }
    }

    fn node_mut(&mut self, slot: Slot) -> &mut PromptNode {
        match &mut self.slots[slot.0] {
            Some(node) => node,
            None => unreachable!("live links never point at a freed slot"),
        }
    }
}

impl Default for PromptTree {
    fn default() -> Self {
        Self::new("Project Assistant", "This is the root node of our AI project assistant.")
    }
}

impl<'a> IntoIterator for &'a PromptTree {
    type Item = &'a PromptNode;
    type IntoIter = PreOrder<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pre-order iterator over a tree; children are visited in sibling order.
pub struct PreOrder<'a> {
    tree: &'a PromptTree,
    stack: Vec<Slot>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a PromptNode;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.stack.pop()?;
        let node = self.tree.node(slot);
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

fn validate_document(doc: &NodeDocument) -> Result<()> {
    let mut seen = HashSet::new();
    let mut stack = vec![doc];
    while let Some(node) = stack.pop() {
        if node.id.as_str().is_empty() {
            return Err(TreeError::MalformedDocument(
                "node ids must not be empty".to_string(),
            ));
        }
        if !seen.insert(node.id.as_str()) {
            return Err(TreeError::MalformedDocument(format!(
                "duplicate node id: {}",
                node.id
            )));
        }
        stack.extend(node.children.iter());
    }
    Ok(())
}
