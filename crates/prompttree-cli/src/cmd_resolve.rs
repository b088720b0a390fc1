use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;

use prompttree::v1::Navigator;
use prompttree::v1::query::{self, PromptFormat};

use crate::session::Session;

const BANNER: &str = "===============";

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `---` separated sections with bold titles
    #[default]
    Markdown,
    /// Prompt text only, separated by blank lines
    Plain,
}

impl From<OutputFormat> for PromptFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Markdown => PromptFormat::Markdown,
            OutputFormat::Plain => PromptFormat::Plain,
        }
    }
}

/// Effective prompt for `id`, or for the cursor when no id is given.
pub fn resolve(nav: &Navigator, id: Option<&str>, format: OutputFormat) -> Result<String> {
    let format = PromptFormat::from(format);
    match id {
        Some(id) => {
            let path = nav
                .tree()
                .path_to(id)
                .with_context(|| format!("node not found: {id}"))?;
            Ok(query::effective_prompt(nav.tree(), &path, format)?)
        }
        None => Ok(nav.current_prompt(format)?),
    }
}

/// Frame a markdown prompt the way it is handed to the model.
pub fn with_banner(prompt: &str) -> String {
    format!("{BANNER}\nHierarchical Prompts:\n{prompt}{BANNER}")
}

pub fn run(
    session_path: PathBuf,
    id: Option<String>,
    format: OutputFormat,
    banner: bool,
) -> Result<()> {
    let session = Session::open(&session_path)?;
    let prompt = resolve(session.nav(), id.as_deref(), format)?;
    if banner {
        println!("{}", with_banner(&prompt));
    } else if prompt.ends_with('\n') {
        print!("{prompt}");
    } else {
        println!("{prompt}");
    }
    Ok(())
}
