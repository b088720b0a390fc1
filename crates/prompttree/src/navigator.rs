//! Cursor over a prompt tree: the current path plus its sibling carousel.

use crate::error::{Result, TreeError};
use crate::query::{self, PromptFormat};
use crate::tree::PromptTree;
use crate::types::{NodeId, NodeUpdate, PromptNode, TreePath};

/// Lateral movement within the sibling carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    pub fn offset(self) -> isize {
        match self {
            Self::Prev => -1,
            Self::Next => 1,
        }
    }
}

/// A user-facing editor command, as issued by a UI collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Up,
    Prev,
    Next,
    /// Drill into a child of the current node.
    SelectChild(NodeId),
    /// Jump to any node by id.
    Goto(NodeId),
    Rename(String),
    EditPrompt(String),
    AddChild { title: String, prompt: String },
    Delete,
}

/// Where the cursor is: the path, the current node's siblings, and the
/// current node's index among them.
///
/// `siblings[index]` is always the last element of `path`. At the root the
/// sibling set is the root alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    path: TreePath,
    siblings: Vec<NodeId>,
    index: usize,
}

impl NavigationState {
    pub fn path(&self) -> &TreePath {
        &self.path
    }

    pub fn siblings(&self) -> &[NodeId] {
        &self.siblings
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &NodeId {
        self.path.current()
    }
}

/// Derive a fresh [`NavigationState`] for `path` against `tree`.
///
/// Every tree mutation made through a [`Navigator`] is followed by this in
/// the same call. Fails with `NotFound` if any element of `path` is gone,
/// and with `InvalidOperation` if the ids do not form a root-to-node chain.
pub fn recompute_navigation(tree: &PromptTree, path: TreePath) -> Result<NavigationState> {
    let nodes = query::resolve_path(tree, &path)?;
    let Some(first) = nodes.first() else {
        return Err(TreeError::InvalidOperation("empty path".to_string()));
    };
    if !first.is_root() {
        return Err(TreeError::InvalidOperation(format!(
            "path does not start at the root: {path}"
        )));
    }
    for pair in nodes.windows(2) {
        let linked = tree
            .parent_of(pair[1])
            .is_some_and(|parent| parent.id() == pair[0].id());
        if !linked {
            return Err(TreeError::InvalidOperation(format!(
                "{} is not a child of {}",
                pair[1].id(),
                pair[0].id()
            )));
        }
    }

    let current = nodes[nodes.len() - 1];
    let siblings: Vec<NodeId> = match tree.parent_of(current) {
        Some(parent) => tree.children_of(parent).map(|c| c.id().clone()).collect(),
        None => vec![current.id().clone()],
    };
    let index = siblings
        .iter()
        .position(|id| id == current.id())
        .ok_or_else(|| TreeError::not_found(current.id().as_str()))?;

    Ok(NavigationState {
        path,
        siblings,
        index,
    })
}

/// Read-only view for display: the current node, its siblings, its index
/// and the chain of ancestors from the root down to its parent.
#[derive(Debug)]
pub struct Snapshot<'a> {
    pub current: &'a PromptNode,
    pub siblings: Vec<&'a PromptNode>,
    pub index: usize,
    pub ancestors: Vec<&'a PromptNode>,
}

/// Owns a [`PromptTree`] and a cursor into it.
///
/// Every operation either produces a consistent new state or returns an
/// error and leaves both tree and state untouched. Moving past either end
/// of the sibling carousel, or up from the root, is a silent no-op.
///
/// # Example
///
/// ```
/// use prompttree::v1::{Direction, Navigator, PromptTree};
///
/// let mut nav = Navigator::new(PromptTree::seed());
/// nav.move_into("research").unwrap();
/// nav.move_into("literature-review").unwrap();
/// nav.move_to_sibling(Direction::Next).unwrap();
/// assert_eq!(nav.current().title(), "Market Analysis");
///
/// nav.move_up().unwrap();
/// assert_eq!(nav.state().path().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Navigator {
    tree: PromptTree,
    state: NavigationState,
}

impl Navigator {
    /// Start at the root.
    pub fn new(tree: PromptTree) -> Self {
        let root = tree.root_id().clone();
        let state = NavigationState {
            path: TreePath::from_ids(vec![root.clone()]),
            siblings: vec![root],
            index: 0,
        };
        Self { tree, state }
    }

    /// Start at `id`, falling back to the root if the id is gone.
    pub fn resume(tree: PromptTree, id: &str) -> Self {
        let mut nav = Self::new(tree);
        if let Err(e) = nav.move_to_id(id) {
            log::warn!("selection lost ({e}), starting at the root");
        }
        nav
    }

    pub fn tree(&self) -> &PromptTree {
        &self.tree
    }

    pub fn into_tree(self) -> PromptTree {
        self.tree
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn current(&self) -> &PromptNode {
        self.resolve(self.state.current())
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let ids = self.state.path.ids();
        Snapshot {
            current: self.current(),
            siblings: self.state.siblings.iter().map(|id| self.resolve(id)).collect(),
            index: self.state.index,
            ancestors: ids[..ids.len() - 1].iter().map(|id| self.resolve(id)).collect(),
        }
    }

    /// Look up an id held by the navigation state.
    fn resolve(&self, id: &NodeId) -> &PromptNode {
        match self.tree.find_by_id(id.as_str()) {
            Some(node) => node,
            None => unreachable!("navigation state names a missing node: {id}"),
        }
    }

    fn reposition(&mut self, path: TreePath) -> Result<&NavigationState> {
        self.state = recompute_navigation(&self.tree, path)?;
        log::debug!("now at {}", self.state.path);
        Ok(&self.state)
    }

    // ── Movement ───────────────────────────────────────────────────────

    pub fn move_into(&mut self, child_id: &str) -> Result<&NavigationState> {
        let is_child = self
            .tree
            .child_ids(self.state.current().as_str())?
            .iter()
            .any(|id| id.as_str() == child_id);
        if !is_child {
            return Err(TreeError::not_found(child_id));
        }
        let path = self.state.path.child(NodeId::from(child_id));
        self.reposition(path)
    }

    pub fn move_up(&mut self) -> Result<&NavigationState> {
        if self.state.path.is_root() {
            return Ok(&self.state);
        }
        let path = self.state.path.up();
        self.reposition(path)
    }

    pub fn move_to_sibling(&mut self, direction: Direction) -> Result<&NavigationState> {
        let target = self.state.index as isize + direction.offset();
        if target < 0 || target as usize >= self.state.siblings.len() {
            return Ok(&self.state);
        }
        let sibling = self.state.siblings[target as usize].clone();
        let path = self.state.path.sibling(sibling);
        self.reposition(path)
    }

    pub fn move_to_id(&mut self, id: &str) -> Result<&NavigationState> {
        let path = self.tree.path_to(id).ok_or_else(|| TreeError::not_found(id))?;
        self.reposition(path)
    }

    // ── Editing ────────────────────────────────────────────────────────

    /// Add a child under the current node and move into it.
    pub fn add_child_at_current(
        &mut self,
        title: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Result<&NavigationState> {
        let id = self
            .tree
            .add_child(self.state.current().as_str(), title, prompt)?;
        let path = self.state.path.child(id);
        self.reposition(path)
    }

    /// Delete the current node and move to its former parent.
    pub fn delete_current(&mut self) -> Result<&NavigationState> {
        let current = self.state.current().clone();
        self.delete_node(current.as_str())
    }

    /// Delete any node. If it is the current node or one of its ancestors,
    /// the cursor collapses to the deleted node's parent, the nearest
    /// ancestor that survives.
    pub fn delete_node(&mut self, id: &str) -> Result<&NavigationState> {
        self.tree.delete_node(id)?;
        let path = match self.state.path.position(id) {
            Some(pos) => self.state.path.truncated(pos),
            None => self.state.path.clone(),
        };
        self.reposition(path)
    }

    pub fn rename_current(&mut self, title: impl Into<String>) -> Result<()> {
        let id = self.state.current().clone();
        self.tree
            .update_node(id.as_str(), NodeUpdate::default().with_title(title))
    }

    pub fn edit_current(&mut self, prompt: impl Into<String>) -> Result<()> {
        let id = self.state.current().clone();
        self.tree
            .update_node(id.as_str(), NodeUpdate::default().with_prompt(prompt))
    }

    /// Swap in a freshly imported tree and reset the cursor to its root.
    pub fn replace_tree(&mut self, tree: PromptTree) -> &NavigationState {
        *self = Self::new(tree);
        &self.state
    }

    // ── Resolution ─────────────────────────────────────────────────────

    pub fn effective_prompt(&self, path: &TreePath, format: PromptFormat) -> Result<String> {
        query::effective_prompt(&self.tree, path, format)
    }

    /// Effective prompt of the current position.
    pub fn current_prompt(&self, format: PromptFormat) -> Result<String> {
        self.effective_prompt(&self.state.path, format)
    }

    /// Dispatch a UI command.
    pub fn apply(&mut self, command: Command) -> Result<&NavigationState> {
        match command {
            Command::Up => self.move_up(),
            Command::Prev => self.move_to_sibling(Direction::Prev),
            Command::Next => self.move_to_sibling(Direction::Next),
            Command::SelectChild(id) => self.move_into(id.as_str()),
            Command::Goto(id) => self.move_to_id(id.as_str()),
            Command::Rename(title) => {
                self.rename_current(title)?;
                Ok(&self.state)
            }
            Command::EditPrompt(prompt) => {
                self.edit_current(prompt)?;
                Ok(&self.state)
            }
            Command::AddChild { title, prompt } => self.add_child_at_current(title, prompt),
            Command::Delete => self.delete_current(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::tests::{assert_consistent, sample_tree};
    use crate::types::NodeDocument;

    fn path_ids(state: &NavigationState) -> Vec<&str> {
        state.path().iter().map(NodeId::as_str).collect()
    }

    fn sibling_ids(state: &NavigationState) -> Vec<&str> {
        state.siblings().iter().map(NodeId::as_str).collect()
    }

    fn assert_state_consistent(nav: &Navigator) {
        let state = nav.state();
        assert_eq!(&state.siblings()[state.index()], state.current());
        let fresh = recompute_navigation(nav.tree(), state.path().clone()).unwrap();
        assert_eq!(&fresh, state);
        assert_consistent(nav.tree());
    }

    /// `root -> A -> B`
    fn chain() -> Navigator {
        let doc = NodeDocument::new("root", "Root", "root text").with_child(
            NodeDocument::new("A", "A", "a text").with_child(NodeDocument::new(
                "B", "B", "b text",
            )),
        );
        Navigator::new(PromptTree::deserialize(doc).unwrap())
    }

    // ── init ───────────────────────────────────────────────────────────

    #[test]
    fn test_init_at_root() {
        let nav = Navigator::new(sample_tree());
        assert_eq!(path_ids(nav.state()), vec!["root"]);
        assert_eq!(sibling_ids(nav.state()), vec!["root"]);
        assert_eq!(nav.state().index(), 0);
        assert_state_consistent(&nav);
    }

    // ── move_into ──────────────────────────────────────────────────────

    #[test]
    fn test_move_into_child() {
        let mut nav = Navigator::new(sample_tree());
        let state = nav.move_into("c").unwrap();
        assert_eq!(path_ids(state), vec!["root", "c"]);
        assert_eq!(sibling_ids(state), vec!["a", "c"]);
        assert_eq!(state.index(), 1);
        assert_state_consistent(&nav);
    }

    #[test]
    fn test_move_into_non_child_fails() {
        let mut nav = Navigator::new(sample_tree());
        let before = nav.state().clone();
        assert_eq!(
            nav.move_into("b").unwrap_err(),
            TreeError::NotFound("b".into())
        );
        assert_eq!(nav.move_into("zzz").unwrap_err(), TreeError::NotFound("zzz".into()));
        assert_eq!(nav.state(), &before);
    }

    // ── move_up ────────────────────────────────────────────────────────

    #[test]
    fn test_move_up_at_root_is_noop() {
        let mut nav = Navigator::new(sample_tree());
        let before = nav.state().clone();
        assert_eq!(nav.move_up().unwrap(), &before);
    }

    #[test]
    fn test_move_up_recomputes_siblings() {
        let mut nav = Navigator::new(sample_tree());
        nav.move_into("a").unwrap();
        nav.move_into("b").unwrap();
        assert_eq!(sibling_ids(nav.state()), vec!["b"]);
        let state = nav.move_up().unwrap();
        assert_eq!(path_ids(state), vec!["root", "a"]);
        assert_eq!(sibling_ids(state), vec!["a", "c"]);
        assert_eq!(state.index(), 0);
        assert_state_consistent(&nav);
    }

    // ── move_to_sibling ────────────────────────────────────────────────

    #[test]
    fn test_sibling_next_and_prev() {
        let mut nav = Navigator::new(sample_tree());
        nav.move_into("a").unwrap();
        let state = nav.move_to_sibling(Direction::Next).unwrap();
        assert_eq!(path_ids(state), vec!["root", "c"]);
        assert_eq!(state.index(), 1);
        let state = nav.move_to_sibling(Direction::Prev).unwrap();
        assert_eq!(path_ids(state), vec!["root", "a"]);
        assert_eq!(state.index(), 0);
        assert_state_consistent(&nav);
    }

    #[test]
    fn test_sibling_next_at_last_is_noop() {
        let mut nav = Navigator::new(sample_tree());
        nav.move_into("c").unwrap();
        let before = nav.state().clone();
        assert_eq!(nav.move_to_sibling(Direction::Next).unwrap(), &before);
    }

    #[test]
    fn test_sibling_prev_at_first_is_noop() {
        let mut nav = Navigator::new(sample_tree());
        nav.move_into("a").unwrap();
        let before = nav.state().clone();
        assert_eq!(nav.move_to_sibling(Direction::Prev).unwrap(), &before);
    }

    #[test]
    fn test_sibling_at_root_is_noop() {
        let mut nav = Navigator::new(sample_tree());
        let before = nav.state().clone();
        assert_eq!(nav.move_to_sibling(Direction::Next).unwrap(), &before);
        assert_eq!(nav.move_to_sibling(Direction::Prev).unwrap(), &before);
    }

    #[test]
    fn test_direction_offsets() {
        assert_eq!(Direction::Prev.offset(), -1);
        assert_eq!(Direction::Next.offset(), 1);
    }

    // ── move_to_id ─────────────────────────────────────────────────────

    #[test]
    fn test_move_to_id_builds_full_path() {
        let mut nav = Navigator::new(sample_tree());
        let state = nav.move_to_id("b").unwrap();
        assert_eq!(path_ids(state), vec!["root", "a", "b"]);
        assert_state_consistent(&nav);
    }

    #[test]
    fn test_move_to_missing_id_keeps_state() {
        let mut nav = Navigator::new(sample_tree());
        nav.move_to_id("b").unwrap();
        let before = nav.state().clone();
        assert!(matches!(nav.move_to_id("gone"), Err(TreeError::NotFound(_))));
        assert_eq!(nav.state(), &before);
    }

    #[test]
    fn test_resume_falls_back_to_root() {
        let nav = Navigator::resume(sample_tree(), "gone");
        assert_eq!(path_ids(nav.state()), vec!["root"]);
        let nav = Navigator::resume(sample_tree(), "b");
        assert_eq!(path_ids(nav.state()), vec!["root", "a", "b"]);
    }

    // ── add_child_at_current ───────────────────────────────────────────

    #[test]
    fn test_add_child_then_move_to_id() {
        let mut nav = Navigator::new(sample_tree());
        nav.move_to_id("a").unwrap();
        let parent_len = nav.state().path().len();
        let new_id = nav.add_child_at_current("New", "text").unwrap().current().clone();

        nav.move_to_id("root").unwrap();
        let state = nav.move_to_id(new_id.as_str()).unwrap();
        assert_eq!(state.current(), &new_id);
        assert_eq!(state.path().len(), parent_len + 1);
        assert_state_consistent(&nav);
    }

    #[test]
    fn test_chain_example() {
        let mut nav = chain();
        nav.move_into("A").unwrap();
        let state = nav.add_child_at_current("C", "p").unwrap();
        assert_eq!(state.siblings().len(), 2);
        assert_eq!(state.siblings()[0].as_str(), "B");
        assert_eq!(state.index(), 1);
        assert_eq!(nav.current().title(), "C");

        let state = nav.move_up().unwrap();
        assert_eq!(path_ids(state), vec!["root", "A"]);

        nav.move_to_id("B").unwrap();
        let text = nav.current_prompt(PromptFormat::Plain).unwrap();
        assert_eq!(text, "root text\n\na text\n\nb text");
        assert_state_consistent(&nav);
    }

    // ── delete ─────────────────────────────────────────────────────────

    #[test]
    fn test_delete_current_leaf_moves_to_parent() {
        let mut nav = Navigator::new(sample_tree());
        nav.move_to_id("b").unwrap();
        let state = nav.delete_current().unwrap();
        assert_eq!(path_ids(state), vec!["root", "a"]);
        assert!(nav.tree().find_by_id("b").is_none());
        assert_state_consistent(&nav);
    }

    #[test]
    fn test_delete_current_at_root_rejected() {
        let mut nav = Navigator::new(sample_tree());
        let before = nav.state().clone();
        assert!(matches!(
            nav.delete_current(),
            Err(TreeError::InvalidOperation(_))
        ));
        assert_eq!(nav.state(), &before);
        assert_eq!(nav.tree().len(), 4);
    }

    #[test]
    fn test_delete_ancestor_collapses_path() {
        let mut nav = Navigator::new(sample_tree());
        nav.move_to_id("b").unwrap();
        let state = nav.delete_node("a").unwrap();
        assert_eq!(path_ids(state), vec!["root"]);
        assert!(!nav.tree().contains("b"));
        assert_state_consistent(&nav);
    }

    #[test]
    fn test_delete_sibling_reindexes() {
        let mut nav = Navigator::new(sample_tree());
        nav.move_to_id("c").unwrap();
        assert_eq!(nav.state().index(), 1);
        let state = nav.delete_node("a").unwrap();
        assert_eq!(path_ids(state), vec!["root", "c"]);
        assert_eq!(sibling_ids(state), vec!["c"]);
        assert_eq!(state.index(), 0);
        assert_state_consistent(&nav);
    }

    // ── rename / edit ──────────────────────────────────────────────────

    #[test]
    fn test_rename_and_edit_keep_path() {
        let mut nav = Navigator::new(sample_tree());
        nav.move_to_id("b").unwrap();
        let before = nav.state().clone();
        nav.rename_current("Bee").unwrap();
        nav.edit_current("buzz").unwrap();
        assert_eq!(nav.state(), &before);
        assert_eq!(nav.current().title(), "Bee");
        assert_eq!(nav.current().prompt(), "buzz");
    }

    // ── snapshot / apply / replace ─────────────────────────────────────

    #[test]
    fn test_snapshot() {
        let mut nav = Navigator::new(sample_tree());
        nav.move_to_id("b").unwrap();
        let snap = nav.snapshot();
        assert_eq!(snap.current.id().as_str(), "b");
        assert_eq!(snap.index, 0);
        assert_eq!(snap.siblings.len(), 1);
        let ancestors: Vec<_> = snap.ancestors.iter().map(|n| n.title()).collect();
        assert_eq!(ancestors, vec!["Root", "A"]);
    }

    #[test]
    fn test_snapshot_matches_state_after_edits() {
        let mut nav = Navigator::new(sample_tree());
        nav.move_to_id("c").unwrap();
        nav.add_child_at_current("D", "d").unwrap();
        nav.move_up().unwrap();
        nav.delete_node("a").unwrap();
        let snap = nav.snapshot();
        let siblings: Vec<_> = snap.siblings.iter().map(|n| n.id()).collect();
        let expected: Vec<_> = nav.state().siblings().iter().collect();
        assert_eq!(siblings, expected);
        assert_eq!(snap.index, 0);
        assert_eq!(snap.current.id(), nav.state().current());
        assert_eq!(snap.ancestors.len(), nav.state().path().len() - 1);
    }

    #[test]
    #[should_panic(expected = "navigation state names a missing node: ghost")]
    fn test_current_with_dangling_cursor_panics() {
        let mut nav = Navigator::new(sample_tree());
        nav.state.path = TreePath::from_ids(vec![NodeId::from("root"), NodeId::from("ghost")]);
        let _ = nav.current();
    }

    #[test]
    #[should_panic(expected = "navigation state names a missing node: ghost")]
    fn test_snapshot_with_dangling_sibling_panics() {
        let mut nav = Navigator::new(sample_tree());
        nav.move_to_id("a").unwrap();
        nav.state.siblings.push(NodeId::from("ghost"));
        let _ = nav.snapshot();
    }

    #[test]
    fn test_apply_commands() {
        let mut nav = Navigator::new(sample_tree());
        nav.apply(Command::SelectChild("a".into())).unwrap();
        nav.apply(Command::Next).unwrap();
        assert_eq!(nav.current().id().as_str(), "c");
        nav.apply(Command::AddChild {
            title: "D".into(),
            prompt: "d".into(),
        })
        .unwrap();
        nav.apply(Command::Rename("Dee".into())).unwrap();
        nav.apply(Command::EditPrompt("dee".into())).unwrap();
        assert_eq!(nav.current().title(), "Dee");
        nav.apply(Command::Delete).unwrap();
        assert_eq!(nav.current().id().as_str(), "c");
        nav.apply(Command::Prev).unwrap();
        nav.apply(Command::Up).unwrap();
        assert!(nav.state().path().is_root());
        nav.apply(Command::Goto("b".into())).unwrap();
        assert_eq!(nav.state().path().len(), 3);
        assert_state_consistent(&nav);
    }

    #[test]
    fn test_replace_tree_resets_to_root() {
        let mut nav = Navigator::new(sample_tree());
        nav.move_to_id("b").unwrap();
        let state = nav.replace_tree(PromptTree::seed());
        assert_eq!(path_ids(state), vec!["root"]);
        assert_eq!(nav.tree().len(), 8);
    }

    #[test]
    fn test_recompute_rejects_broken_chain() {
        let tree = sample_tree();
        let bogus = TreePath::from_ids(vec!["root".into(), "b".into()]);
        assert!(matches!(
            recompute_navigation(&tree, bogus),
            Err(TreeError::InvalidOperation(_))
        ));
        let not_root = TreePath::from_ids(vec!["a".into()]);
        assert!(matches!(
            recompute_navigation(&tree, not_root),
            Err(TreeError::InvalidOperation(_))
        ));
    }
}
