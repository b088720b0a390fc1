use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use prompttree::v1::{Navigator, NodeDocument, NodeId, PromptTree, parse_json};

const SESSION_VERSION: u32 = 1;

// ============================================================================
// Session file (the tree plus the id of the node being edited)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    cursor: NodeId,
    created_at: String,
    updated_at: String,
    tree: NodeDocument,
}

/// An editing session backed by a JSON file.
///
/// Only the tree and the current node id are persisted; the sibling set and
/// index are rederived by the navigator every time the session is opened.
pub struct Session {
    path: PathBuf,
    created_at: String,
    nav: Navigator,
}

impl Session {
    /// Start a new session at the root of `tree` and write it to `path`.
    pub fn create(path: &Path, tree: PromptTree, force: bool) -> Result<Self> {
        if path.exists() && !force {
            anyhow::bail!(
                "session file already exists: {} (use --force to overwrite)",
                path.display()
            );
        }
        let session = Self {
            path: path.to_path_buf(),
            created_at: now_iso8601(),
            nav: Navigator::new(tree),
        };
        session.save()?;
        log::info!("created session {}", path.display());
        Ok(session)
    }

    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read session file: {}", path.display()))?;
        let file: SessionFile = parse_json(&data)
            .with_context(|| format!("failed to parse session file: {}", path.display()))?;
        if file.version != SESSION_VERSION {
            anyhow::bail!(
                "unsupported session version {} in {}",
                file.version,
                path.display()
            );
        }
        let tree = PromptTree::deserialize(file.tree)
            .with_context(|| format!("session tree is invalid: {}", path.display()))?;
        log::debug!("opened session {} at {}", path.display(), file.cursor);
        Ok(Self {
            path: path.to_path_buf(),
            created_at: file.created_at,
            nav: Navigator::resume(tree, file.cursor.as_str()),
        })
    }

    /// Write the session atomically: a temp file in the same directory is
    /// persisted over the target.
    pub fn save(&self) -> Result<()> {
        let file = SessionFile {
            version: SESSION_VERSION,
            cursor: self.nav.state().current().clone(),
            created_at: self.created_at.clone(),
            updated_at: now_iso8601(),
            tree: self.nav.tree().serialize(),
        };
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let tmp = tempfile::NamedTempFile::new_in(dir)
            .context("failed to create temp file for atomic write")?;
        serde_json::to_writer_pretty(&tmp, &file).context("failed to serialize session")?;
        tmp.persist(&self.path)
            .with_context(|| format!("failed to persist session file: {}", self.path.display()))?;
        log::debug!("saved session {}", self.path.display());
        Ok(())
    }

    pub fn nav(&self) -> &Navigator {
        &self.nav
    }

    pub fn nav_mut(&mut self) -> &mut Navigator {
        &mut self.nav
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ============================================================================
// Helpers shared by subcommands
// ============================================================================

pub fn now_iso8601() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

/// Read a whole file, or stdin when `input` is `None` or `-`.
pub fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path)),
        _ => read_stdin(),
    }
}

pub fn load_tree(content: &str) -> Result<PromptTree> {
    PromptTree::from_json(content).context("Failed to load prompt tree document")
}

pub fn format_document(doc: &NodeDocument, pretty: bool) -> Result<String> {
    if pretty {
        doc.to_json_pretty()
    } else {
        doc.to_json()
    }
    .context("failed to serialize document")
}
