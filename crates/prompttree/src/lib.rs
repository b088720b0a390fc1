#![doc = include_str!("../README.md")]

mod error;
mod navigator;
mod query;
mod tree;
mod types;

pub mod v1 {
    //! Versioned public API for prompt trees and navigation.
    //!
    //! Everything you need is re-exported from this module. Types are
    //! organized into three groups:
    //!
    //! # Tree
    //!
    //! - [`PromptTree`] — arena-backed rooted tree that owns every node
    //! - [`PromptNode`] — read-only view of one node (id, title, prompt)
    //! - [`NodeId`] — opaque unique identifier
    //! - [`NodeUpdate`] — partial edit of a node's title and prompt
    //! - [`TreePath`] — root-to-node chain of ids
    //!
    //! # Documents
    //!
    //! - [`NodeDocument`] — value-only snapshot used for import and export
    //!
    //! # Navigation
    //!
    //! - [`Navigator`] — owns a tree plus a cursor into it
    //! - [`NavigationState`] — current path, sibling set, and index
    //! - [`Direction`], [`Command`] — inputs issued by a UI
    //! - [`Snapshot`] — read-only view for display
    //!
    //! # Example — build, navigate, resolve
    //!
    //! ```
    //! use prompttree::v1::*;
    //! use prompttree::v1::query::PromptFormat;
    //!
    //! let mut nav = Navigator::new(PromptTree::new("Root", "You are a cool guy."));
    //! nav.add_child_at_current("Dance", "And you gotta dance.").unwrap();
    //! nav.add_child_at_current("Fire", "And your hair is on fire.").unwrap();
    //!
    //! let text = nav.current_prompt(PromptFormat::Markdown).unwrap();
    //! assert!(text.starts_with("---\n**Root**: You are a cool guy.\n"));
    //! assert!(text.ends_with("**Fire**: And your hair is on fire.\n"));
    //!
    //! nav.delete_current().unwrap();
    //! assert_eq!(nav.current().title(), "Dance");
    //!
    //! let json = nav.tree().to_json().unwrap();
    //! let restored = PromptTree::from_json(&json).unwrap();
    //! assert_eq!(restored.len(), 2);
    //! ```

    /// Read-only queries: effective prompt resolution, search, depth.
    ///
    /// # Example — search and resolve
    ///
    /// ```
    /// use prompttree::v1::{PromptTree, query};
    /// use prompttree::v1::query::PromptFormat;
    ///
    /// let tree = PromptTree::seed();
    /// let hit = query::search(&tree, "pipeline")[0];
    /// let path = tree.path_to(hit.id().as_str()).unwrap();
    ///
    /// let text = query::effective_prompt(&tree, &path, PromptFormat::Markdown).unwrap();
    /// assert!(text.starts_with("---\n**AI Project Assistant**"));
    /// assert!(text.contains("**Development**"));
    /// assert_eq!(query::depth(&tree, "data-pipeline"), Some(2));
    /// ```
    pub mod query {
        pub use crate::query::{
            PromptFormat, depth, descendants, effective_prompt, leaves, render_node,
            resolve_path, search,
        };
    }
    pub use crate::error::TreeError;
    pub use crate::navigator::{
        Command, Direction, NavigationState, Navigator, Snapshot, recompute_navigation,
    };
    pub use crate::tree::{PreOrder, PromptTree, ROOT_ID};
    pub use crate::types::{NodeDocument, NodeId, NodeUpdate, PromptNode, TreePath, parse_json};
}
