//! Generate Graphviz DOT visualizations from prompt trees.
//!
//! Nodes become boxes labelled with their title and a truncated preview of
//! their prompt; parent links become edges. Boxes are tinted by depth, and
//! an optional highlighted node is drawn bold together with the path that
//! leads to it from the root, so the effective prompt's ingredients stand
//! out.
//!
//! # Example
//!
//! ```
//! use prompttree::v1::{Navigator, PromptTree};
//! use prompttree_dot::{render, render_navigator, RenderOptions};
//!
//! let tree = PromptTree::seed();
//! let dot = render(&tree, &RenderOptions::default());
//! assert!(dot.contains("digraph prompttree"));
//! assert!(dot.contains("\"research\" -> \"market-analysis\""));
//!
//! let mut nav = Navigator::new(tree);
//! nav.move_to_id("data-pipeline").unwrap();
//! let dot = render_navigator(&nav, &RenderOptions::default());
//! assert!(dot.contains("penwidth=3"));
//! ```
//!
//! Pipe the output through Graphviz to produce images:
//!
//! ```bash
//! ptree render dot session.json | dot -Tpng -o tree.png
//! ```

use std::collections::HashSet;

use prompttree::v1::{Navigator, NodeId, PromptNode, PromptTree, query};

/// Options controlling what information is rendered in the DOT output.
pub struct RenderOptions {
    /// Include a preview of each node's prompt text.
    pub show_prompts: bool,
    /// Maximum characters of prompt text shown per node.
    pub prompt_width: usize,
    /// Node to emphasize, along with its root-to-node path.
    pub highlight: Option<NodeId>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_prompts: true,
            prompt_width: 40,
            highlight: None,
        }
    }
}

/// Render a whole tree as a DOT digraph.
pub fn render(tree: &PromptTree, options: &RenderOptions) -> String {
    let active: HashSet<&str> = options
        .highlight
        .as_ref()
        .and_then(|id| tree.path_to(id.as_str()))
        .map(|path| {
            path.iter()
                .filter_map(|id| tree.find_by_id(id.as_str()))
                .map(|n| n.id().as_str())
                .collect()
        })
        .unwrap_or_default();
    let focus = options.highlight.as_ref().map(NodeId::as_str);

    let mut dot = String::new();
    dot.push_str("digraph prompttree {\n");
    dot.push_str("  rankdir=TB;\n");
    dot.push_str("  node [shape=box, style=rounded, fontname=\"Helvetica\"];\n");
    dot.push_str("  edge [color=\"#666666\"];\n\n");

    dot.push_str("  labelloc=\"t\";\n");
    dot.push_str(&format!(
        "  label=\"{}\";\n",
        escape_dot(tree.root().title())
    ));
    dot.push_str("  fontsize=16;\n");
    dot.push_str("  fontname=\"Helvetica-Bold\";\n\n");

    for node in tree.iter() {
        let id = node.id().as_str();
        let depth = query::depth(tree, id).unwrap_or(0);
        let label = format_node_label_html(node, options);

        let (style, penwidth) = if Some(id) == focus {
            ("rounded,filled,bold", "3")
        } else if active.contains(id) {
            ("rounded,filled", "2")
        } else {
            ("rounded,filled", "1")
        };

        dot.push_str(&format!(
            "  \"{}\" [label={}, fillcolor=\"{}\", style=\"{}\", penwidth={}];\n",
            escape_dot(id),
            label,
            depth_color(depth),
            style,
            penwidth
        ));
    }

    dot.push('\n');

    for node in tree.iter() {
        for child in tree.children_of(node) {
            let on_path = active.contains(node.id().as_str())
                && active.contains(child.id().as_str());
            let edge_style = if on_path {
                " [color=\"#333333\", penwidth=2]"
            } else {
                ""
            };
            dot.push_str(&format!(
                "  \"{}\" -> \"{}\"{};\n",
                escape_dot(node.id().as_str()),
                escape_dot(child.id().as_str()),
                edge_style
            ));
        }
    }

    dot.push_str("}\n");
    dot
}

/// Render the navigator's tree, highlighting its current position unless
/// `options` already names a node.
pub fn render_navigator(nav: &Navigator, options: &RenderOptions) -> String {
    let highlight = options
        .highlight
        .clone()
        .or_else(|| Some(nav.state().current().clone()));
    render(
        nav.tree(),
        &RenderOptions {
            show_prompts: options.show_prompts,
            prompt_width: options.prompt_width,
            highlight,
        },
    )
}

fn format_node_label_html(node: &PromptNode, options: &RenderOptions) -> String {
    let mut rows = vec![format!("<b>{}</b>", escape_html(node.title()))];

    if options.show_prompts && !node.prompt().is_empty() {
        rows.push(format!(
            "<font point-size=\"9\"><i>{}</i></font>",
            escape_html(&truncate(node.prompt(), options.prompt_width))
        ));
    }

    if !node.is_leaf() {
        rows.push(format!(
            "<font point-size=\"8\" color=\"#666666\">{} children</font>",
            node.child_count()
        ));
    }

    format!("<{}>", rows.join("<br/>"))
}

/// Fill color for a node at `depth`; cycles after five levels.
pub fn depth_color(depth: usize) -> &'static str {
    const PALETTE: [&str; 5] = [
        "#e2d5f1", // Light purple
        "#cce5ff", // Light blue
        "#d4edda", // Light green
        "#fff3cd", // Light yellow
        "#f8d7da", // Light pink
    ];
    PALETTE[depth % PALETTE.len()]
}

/// Shorten `s` to at most `width` characters, marking the cut with an ellipsis.
fn truncate(s: &str, width: usize) -> String {
    let flat = s.replace('\n', " ");
    if flat.chars().count() > width {
        let kept: String = flat.chars().take(width.saturating_sub(1)).collect();
        format!("{}\u{2026}", kept)
    } else {
        flat
    }
}

/// Escape a string for use in DOT label attributes (double-quoted context).
pub fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Escape a string for use inside HTML-like DOT labels.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
