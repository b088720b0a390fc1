//! Line-oriented editing loop.
//!
//! Every input line is one command. Failures are reported on the output
//! and the loop keeps going; the session is saved on `save`, `quit` and
//! end of input.

use anyhow::{Result, anyhow, bail};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use prompttree::v1::query::PromptFormat;
use prompttree::v1::{Command, NodeId};

use crate::cmd_edit::{DEFAULT_CHILD_PROMPT, DEFAULT_CHILD_TITLE};
use crate::cmd_show::{format_current, format_outline, format_position};
use crate::session::Session;

const HELP: &str = "\
commands:
  up | prev | next          move around
  into <id> | goto <id>     select a child / jump anywhere
  add [title]               add a child and move into it
  delete                    delete the current node
  rename <title>            retitle the current node
  edit <prompt>             replace the current prompt
  show | tree               current node / whole outline
  resolve                   effective prompt of the current path
  save | quit | help";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Edit(Command),
    Show,
    Outline,
    Resolve,
    Save,
    Help,
    Quit,
}

fn required<'a>(arg: &'a str, what: &str) -> Result<&'a str> {
    if arg.is_empty() {
        bail!("missing {what}");
    }
    Ok(arg)
}

fn parse_line(line: &str) -> Result<Option<ReplCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let cmd = match word.to_ascii_lowercase().as_str() {
        "up" => ReplCommand::Edit(Command::Up),
        "prev" => ReplCommand::Edit(Command::Prev),
        "next" => ReplCommand::Edit(Command::Next),
        "into" => ReplCommand::Edit(Command::SelectChild(NodeId::from(required(rest, "node id")?))),
        "goto" => ReplCommand::Edit(Command::Goto(NodeId::from(required(rest, "node id")?))),
        "add" => ReplCommand::Edit(Command::AddChild {
            title: if rest.is_empty() { DEFAULT_CHILD_TITLE } else { rest }.to_string(),
            prompt: DEFAULT_CHILD_PROMPT.to_string(),
        }),
        "delete" => ReplCommand::Edit(Command::Delete),
        "rename" => ReplCommand::Edit(Command::Rename(required(rest, "title")?.to_string())),
        "edit" => ReplCommand::Edit(Command::EditPrompt(rest.to_string())),
        "show" => ReplCommand::Show,
        "tree" => ReplCommand::Outline,
        "resolve" => ReplCommand::Resolve,
        "save" => ReplCommand::Save,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        other => return Err(anyhow!("unknown command: {other} (try `help`)")),
    };
    Ok(Some(cmd))
}

/// Drive `session` from `input` until `quit` or end of input.
pub fn run_loop<R: BufRead, W: Write>(session: &mut Session, input: R, out: &mut W) -> Result<()> {
    writeln!(out, "{}", format_position(session.nav()))?;
    for line in input.lines() {
        let line = line?;
        let cmd = match parse_line(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "error: {e}")?;
                continue;
            }
        };
        match cmd {
            ReplCommand::Edit(command) => match session.nav_mut().apply(command).map(|_| ()) {
                Ok(()) => writeln!(out, "{}", format_position(session.nav()))?,
                Err(e) => writeln!(out, "error: {e}")?,
            },
            ReplCommand::Show => write!(out, "{}", format_current(session.nav()))?,
            ReplCommand::Outline => write!(out, "{}", format_outline(session.nav()))?,
            ReplCommand::Resolve => match session.nav().current_prompt(PromptFormat::Markdown) {
                Ok(prompt) => write!(out, "{prompt}")?,
                Err(e) => writeln!(out, "error: {e}")?,
            },
            ReplCommand::Save => match session.save() {
                Ok(()) => writeln!(out, "saved {}", session.path().display())?,
                Err(e) => writeln!(out, "error: {e:#}")?,
            },
            ReplCommand::Help => writeln!(out, "{HELP}")?,
            ReplCommand::Quit => {
                return session.save();
            }
        }
    }
    session.save()
}

pub fn run(session_path: PathBuf) -> Result<()> {
    let mut session = Session::open(&session_path)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_loop(&mut session, stdin.lock(), &mut stdout)
}
