use anyhow::{Context, Result};
use similar::TextDiff;
use std::path::PathBuf;

use crate::cmd_show::format_position;
use crate::session::{Session, read_stdin};

pub const DEFAULT_CHILD_TITLE: &str = "New Child Node";
pub const DEFAULT_CHILD_PROMPT: &str = "Enter child prompt here";

/// Unified diff between two prompt texts, `None` when they are identical.
pub fn compute_diff(old: &str, new: &str) -> Option<String> {
    let diff = TextDiff::from_lines(old, new);
    let unified = diff
        .unified_diff()
        .context_radius(3)
        .header("before", "after")
        .to_string();
    if old == new || unified.is_empty() {
        None
    } else {
        Some(unified)
    }
}

pub fn run_add(session_path: PathBuf, title: Option<String>, prompt: Option<String>) -> Result<()> {
    let mut session = Session::open(&session_path)?;
    session
        .nav_mut()
        .add_child_at_current(
            title.unwrap_or_else(|| DEFAULT_CHILD_TITLE.to_string()),
            prompt.unwrap_or_else(|| DEFAULT_CHILD_PROMPT.to_string()),
        )
        .context("cannot add child")?;
    session.save()?;
    println!("{}", format_position(session.nav()));
    Ok(())
}

pub fn run_delete(session_path: PathBuf, id: Option<String>) -> Result<()> {
    let mut session = Session::open(&session_path)?;
    let nav = session.nav_mut();
    let deleted = match &id {
        Some(id) => nav.delete_node(id),
        None => nav.delete_current(),
    };
    deleted.context("cannot delete")?;
    session.save()?;
    println!("{}", format_position(session.nav()));
    Ok(())
}

pub fn run_rename(session_path: PathBuf, title: String) -> Result<()> {
    let mut session = Session::open(&session_path)?;
    session
        .nav_mut()
        .rename_current(title)
        .context("cannot rename")?;
    session.save()?;
    println!("{}", format_position(session.nav()));
    Ok(())
}

/// Replace the current node's prompt; `-` reads the new text from stdin.
/// Prints a unified diff of the change.
pub fn run_edit(session_path: PathBuf, prompt: String) -> Result<()> {
    let prompt = if prompt == "-" {
        read_stdin()?.trim_end_matches('\n').to_string()
    } else {
        prompt
    };
    let diff = edit_prompt(&session_path, prompt)?;
    match diff {
        Some(diff) => print!("{diff}"),
        None => println!("Prompt unchanged."),
    }
    Ok(())
}

fn edit_prompt(session_path: &std::path::Path, prompt: String) -> Result<Option<String>> {
    let mut session = Session::open(session_path)?;
    let old = session.nav().current().prompt().to_string();
    let diff = compute_diff(&old, &prompt);
    if diff.is_some() {
        session
            .nav_mut()
            .edit_current(prompt)
            .context("cannot edit prompt")?;
        session.save()?;
    }
    Ok(diff)
}
