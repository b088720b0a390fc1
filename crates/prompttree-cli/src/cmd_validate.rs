use anyhow::{Context, Result};
use std::path::PathBuf;

use prompttree::v1::{PromptTree, query};

pub fn run(input: PathBuf) -> Result<()> {
    let content =
        std::fs::read_to_string(&input).with_context(|| format!("Failed to read {:?}", input))?;
    println!("{}", validate_content(&content)?);
    Ok(())
}

fn validate_content(content: &str) -> Result<String> {
    match PromptTree::from_json(content) {
        Ok(tree) => Ok(format!(
            "Valid: prompt tree (root: {}, {} nodes, {} leaves)",
            tree.root_id(),
            tree.len(),
            query::leaves(&tree).len()
        )),
        Err(e) => Err(anyhow::anyhow!("Invalid: {}", e)),
    }
}
