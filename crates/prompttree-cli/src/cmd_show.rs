use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use prompttree::v1::{Navigator, PromptNode, query};

use crate::session::Session;

/// One-line description of where the cursor is:
/// `Root > Research > Market Analysis  [2/2]  (market-analysis)`.
pub fn format_position(nav: &Navigator) -> String {
    let snap = nav.snapshot();
    let crumbs: Vec<&str> = snap
        .ancestors
        .iter()
        .chain(std::iter::once(&snap.current))
        .map(|node| node.title())
        .collect();
    format!(
        "{}  [{}/{}]  ({})",
        crumbs.join(" > "),
        snap.index + 1,
        snap.siblings.len(),
        snap.current.id()
    )
}

/// Indented outline of the whole tree; the current node is marked with `*`
/// and its ancestors with `>`.
pub fn format_outline(nav: &Navigator) -> String {
    let tree = nav.tree();
    let path = nav.state().path();
    let mut out = String::new();
    for node in tree.iter() {
        let id = node.id().as_str();
        let depth = query::depth(tree, id).unwrap_or(0);
        let marker = if id == path.current().as_str() {
            '*'
        } else if path.contains(id) {
            '>'
        } else {
            ' '
        };
        out.push_str(&format!(
            "{} {}{} ({})\n",
            marker,
            "  ".repeat(depth),
            node.title(),
            id
        ));
    }
    out
}

/// Title, prompt and children of the current node.
pub fn format_current(nav: &Navigator) -> String {
    let current = nav.current();
    let mut out = format!("{}\n\n{}\n", format_position(nav), current.prompt());
    let children: Vec<_> = nav.tree().children_of(current).collect();
    if !children.is_empty() {
        out.push_str("\nChild nodes:\n");
        for child in children {
            out.push_str(&format!("  - {} ({})\n", child.title(), child.id()));
        }
    }
    out
}

#[derive(Debug, Serialize)]
struct NodeSummary<'a> {
    id: &'a str,
    title: &'a str,
    prompt: &'a str,
    children: usize,
}

impl<'a> NodeSummary<'a> {
    fn of(node: &'a PromptNode) -> Self {
        Self {
            id: node.id().as_str(),
            title: node.title(),
            prompt: node.prompt(),
            children: node.child_count(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PositionReport<'a> {
    current: NodeSummary<'a>,
    index: usize,
    siblings: Vec<&'a str>,
    ancestors: Vec<&'a str>,
    children: Vec<NodeSummary<'a>>,
}

fn position_report(nav: &Navigator) -> PositionReport<'_> {
    let snap = nav.snapshot();
    PositionReport {
        current: NodeSummary::of(snap.current),
        index: snap.index,
        siblings: snap.siblings.iter().map(|n| n.id().as_str()).collect(),
        ancestors: snap.ancestors.iter().map(|n| n.id().as_str()).collect(),
        children: nav
            .tree()
            .children_of(snap.current)
            .map(NodeSummary::of)
            .collect(),
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("failed to serialize output")
}

pub fn run_show(session: PathBuf, json: bool, pretty: bool) -> Result<()> {
    let session = Session::open(&session)?;
    let nav = session.nav();
    if json {
        println!("{}", to_json(&position_report(nav), pretty)?);
    } else {
        print!("{}", format_outline(nav));
        println!();
        print!("{}", format_current(nav));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct SearchHit<'a> {
    id: &'a str,
    title: &'a str,
    depth: usize,
}

pub fn run_search(session: PathBuf, needle: String, json: bool, pretty: bool) -> Result<()> {
    let session = Session::open(&session)?;
    let tree = session.nav().tree();
    let hits: Vec<SearchHit> = query::search(tree, &needle)
        .into_iter()
        .map(|node| SearchHit {
            id: node.id().as_str(),
            title: node.title(),
            depth: query::depth(tree, node.id().as_str()).unwrap_or(0),
        })
        .collect();

    if json {
        println!("{}", to_json(&hits, pretty)?);
    } else if hits.is_empty() {
        println!("No prompts match {:?}.", needle);
    } else {
        for hit in &hits {
            println!("{}{} ({})", "  ".repeat(hit.depth), hit.title, hit.id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use prompttree::v1::PromptTree;

    #[test]
    fn test_format_position_root() {
        let nav = Navigator::new(PromptTree::seed());
        assert_eq!(format_position(&nav), "AI Project Assistant  [1/1]  (root)");
    }

    #[test]
    fn test_format_position_nested() {
        let mut nav = Navigator::new(PromptTree::seed());
        nav.move_to_id("market-analysis").unwrap();
        assert_eq!(
            format_position(&nav),
            "AI Project Assistant > Research > Market Analysis  [2/2]  (market-analysis)"
        );
    }

    #[test]
    fn test_format_outline_marks_path() {
        let mut nav = Navigator::new(PromptTree::seed());
        nav.move_to_id("data-pipeline").unwrap();
        let outline = format_outline(&nav);
        let lines: Vec<&str> = outline.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "> AI Project Assistant (root)");
        assert_eq!(lines[1], "   Research (research)");
        assert_eq!(lines[4], ">   Development (development)");
        assert_eq!(lines[6], "*     Data Pipeline (data-pipeline)");
    }

    #[test]
    fn test_format_current_lists_children() {
        let mut nav = Navigator::new(PromptTree::seed());
        nav.move_to_id("research").unwrap();
        let text = format_current(&nav);
        assert!(text.contains("Conduct thorough research"));
        assert!(text.contains("Child nodes:"));
        assert!(text.contains("  - Literature Review (literature-review)"));
    }

    #[test]
    fn test_position_report_json() {
        let mut nav = Navigator::new(PromptTree::seed());
        nav.move_to_id("development").unwrap();
        let json = to_json(&position_report(&nav), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["current"]["id"], "development");
        assert_eq!(value["index"], 1);
        assert_eq!(value["siblings"].as_array().unwrap().len(), 3);
        assert_eq!(value["ancestors"][0], "root");
        assert_eq!(value["children"][1]["title"], "Data Pipeline");
    }
}
