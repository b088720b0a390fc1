use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;

use prompttree::v1::NodeId;
use prompttree_dot::RenderOptions;

use crate::session::{Session, load_tree, read_input};

#[derive(Subcommand, Debug)]
pub enum RenderFormat {
    /// Render as Graphviz DOT
    Dot {
        /// Session file; its current node is highlighted
        session: Option<PathBuf>,

        /// Render a standalone node document instead (- for stdin)
        #[arg(short, long, conflicts_with = "session")]
        input: Option<PathBuf>,

        /// Output file (writes to stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave prompt previews out of node labels
        #[arg(long)]
        no_prompts: bool,

        /// Maximum characters of prompt preview per node
        #[arg(long, default_value = "40")]
        prompt_width: usize,

        /// Highlight this node and its path instead of the cursor
        #[arg(long)]
        highlight: Option<String>,
    },
}

pub fn run(format: RenderFormat) -> Result<()> {
    match format {
        RenderFormat::Dot {
            session,
            input,
            output,
            no_prompts,
            prompt_width,
            highlight,
        } => {
            let options = RenderOptions {
                show_prompts: !no_prompts,
                prompt_width,
                highlight: highlight.map(NodeId::from),
            };
            let dot = render_dot(session, input, &options)?;
            write_output(output, &dot)
        }
    }
}

fn render_dot(
    session: Option<PathBuf>,
    input: Option<PathBuf>,
    options: &RenderOptions,
) -> Result<String> {
    match session {
        Some(path) => {
            let session = Session::open(&path)?;
            Ok(prompttree_dot::render_navigator(session.nav(), options))
        }
        None => {
            let content = read_input(input.as_deref())?;
            let tree = load_tree(&content)?;
            Ok(prompttree_dot::render(&tree, options))
        }
    }
}

fn write_output(output: Option<PathBuf>, dot: &str) -> Result<()> {
    if let Some(path) = &output {
        std::fs::write(path, dot).with_context(|| format!("Failed to write {:?}", path))?;
        eprintln!("Wrote {}", path.display());
    } else {
        print!("{}", dot);
    }
    Ok(())
}
