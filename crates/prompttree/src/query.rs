//! Read-only queries over prompt trees and paths.

use crate::error::Result;
use crate::tree::PromptTree;
use crate::types::{PromptNode, TreePath};

/// How each path element is rendered inside an effective prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptFormat {
    /// `---\n**<title>**: <prompt>\n` per element.
    #[default]
    Markdown,
    /// Bare prompt text, elements separated by a blank line.
    Plain,
}

/// Render a single node the way it appears inside an effective prompt.
pub fn render_node(node: &PromptNode, format: PromptFormat) -> String {
    match format {
        PromptFormat::Markdown => format!("---\n**{}**: {}\n", node.title(), node.prompt()),
        PromptFormat::Plain => node.prompt().to_string(),
    }
}

/// Concatenate the rendered form of every node on `path`, root first.
///
/// The ordering is the contract: downstream consumers read earlier
/// (broader) context before the more specific text of the current node.
/// Fails with `NotFound` if the path has gone stale.
///
/// # Examples
///
/// ```
/// use prompttree::v1::{PromptTree, query};
/// use prompttree::v1::query::PromptFormat;
///
/// let mut tree = PromptTree::new("Root", "You are a cool guy.");
/// let dance = tree.add_child("root", "Gottadance", "And you gotta dance.").unwrap();
/// let path = tree.path_to(dance.as_str()).unwrap();
///
/// let text = query::effective_prompt(&tree, &path, PromptFormat::Plain).unwrap();
/// assert_eq!(text, "You are a cool guy.\n\nAnd you gotta dance.");
/// ```
pub fn effective_prompt(tree: &PromptTree, path: &TreePath, format: PromptFormat) -> Result<String> {
    let nodes = resolve_path(tree, path)?;
    let rendered = nodes.into_iter().map(|node| render_node(node, format));
    Ok(match format {
        PromptFormat::Markdown => rendered.collect::<String>(),
        PromptFormat::Plain => rendered.collect::<Vec<_>>().join("\n\n"),
    })
}

/// Look up every id on `path`, root first.
pub fn resolve_path<'a>(tree: &'a PromptTree, path: &TreePath) -> Result<Vec<&'a PromptNode>> {
    path.iter().map(|id| tree.get(id.as_str())).collect()
}

/// Nodes whose title contains `needle`, case-insensitively, in pre-order.
/// An empty needle matches every node.
pub fn search<'a>(tree: &'a PromptTree, needle: &str) -> Vec<&'a PromptNode> {
    let needle = needle.to_lowercase();
    tree.iter()
        .filter(|node| node.title().to_lowercase().contains(&needle))
        .collect()
}

/// Distance from the root; the root itself is at depth 0.
pub fn depth(tree: &PromptTree, id: &str) -> Option<usize> {
    tree.path_to(id).map(|path| path.len() - 1)
}

/// Every node below `id`, in pre-order, `id` itself excluded.
pub fn descendants<'a>(tree: &'a PromptTree, id: &str) -> Result<Vec<&'a PromptNode>> {
    let node = tree.get(id)?;
    Ok(tree.subtree(node).skip(1).collect())
}

/// Nodes without children, in pre-order.
pub fn leaves(tree: &PromptTree) -> Vec<&PromptNode> {
    tree.iter().filter(|node| node.is_leaf()).collect()
}
