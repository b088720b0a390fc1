use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;

use prompttree::v1::{Command, NodeId};

use crate::cmd_show::format_position;
use crate::session::Session;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum NavOp {
    /// Move to the parent (no-op at the root)
    Up,
    /// Move to the previous sibling (no-op at the first)
    Prev,
    /// Move to the next sibling (no-op at the last)
    Next,
    /// Drill into a child of the current node
    Into {
        /// Child node id
        id: String,
    },
    /// Jump to any node by id
    Goto {
        /// Node id
        id: String,
    },
}

impl From<NavOp> for Command {
    fn from(op: NavOp) -> Self {
        match op {
            NavOp::Up => Command::Up,
            NavOp::Prev => Command::Prev,
            NavOp::Next => Command::Next,
            NavOp::Into { id } => Command::SelectChild(NodeId::from(id)),
            NavOp::Goto { id } => Command::Goto(NodeId::from(id)),
        }
    }
}

pub fn run(session_path: PathBuf, op: NavOp) -> Result<()> {
    let mut session = Session::open(&session_path)?;
    let description = format!("{op:?}").to_lowercase();
    session
        .nav_mut()
        .apply(op.into())
        .with_context(|| format!("cannot move ({description})"))?;
    session.save()?;
    println!("{}", format_position(session.nav()));
    Ok(())
}
