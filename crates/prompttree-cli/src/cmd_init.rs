use anyhow::Result;
use std::path::{Path, PathBuf};

use prompttree::v1::PromptTree;

use crate::cmd_show::format_position;
use crate::session::{Session, load_tree, read_input};

/// Where the initial tree of a new session comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// The built-in starter tree.
    Seed,
    /// A node document on disk (`-` for stdin).
    Document(PathBuf),
    /// A lone root node.
    Root {
        title: Option<String>,
        prompt: Option<String>,
    },
}

impl Origin {
    pub fn from_args(
        seed: bool,
        from: Option<PathBuf>,
        title: Option<String>,
        prompt: Option<String>,
    ) -> Self {
        match (seed, from) {
            (true, _) => Origin::Seed,
            (false, Some(path)) => Origin::Document(path),
            (false, None) => Origin::Root { title, prompt },
        }
    }

    fn build(self) -> Result<PromptTree> {
        match self {
            Origin::Seed => Ok(PromptTree::seed()),
            Origin::Document(path) => load_tree(&read_input(Some(&path))?),
            Origin::Root { title, prompt } => {
                let default = PromptTree::default();
                Ok(PromptTree::new(
                    title.unwrap_or_else(|| default.root().title().to_string()),
                    prompt.unwrap_or_else(|| default.root().prompt().to_string()),
                ))
            }
        }
    }
}

pub fn run(session_path: PathBuf, origin: Origin, force: bool) -> Result<()> {
    let session = init(&session_path, origin, force)?;
    println!(
        "Started session {} ({} nodes)",
        session.path().display(),
        session.nav().tree().len()
    );
    println!("{}", format_position(session.nav()));
    Ok(())
}

fn init(session_path: &Path, origin: Origin, force: bool) -> Result<Session> {
    let tree = origin.build()?;
    Session::create(session_path, tree, force)
}
