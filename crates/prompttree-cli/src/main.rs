mod cmd_edit;
mod cmd_export;
mod cmd_init;
mod cmd_nav;
mod cmd_render;
mod cmd_repl;
mod cmd_resolve;
mod cmd_show;
mod cmd_validate;
mod session;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ptree")]
#[command(about = "Edit, navigate, and resolve hierarchical prompt trees")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start a new editing session
    Init {
        /// Session file to create
        session: PathBuf,

        /// Start from the built-in example tree
        #[arg(long, conflicts_with = "from")]
        seed: bool,

        /// Start from a node document (use - for stdin)
        #[arg(long)]
        from: Option<PathBuf>,

        /// Root title for a fresh tree
        #[arg(long, conflicts_with_all = ["seed", "from"])]
        title: Option<String>,

        /// Root prompt for a fresh tree
        #[arg(long, conflicts_with_all = ["seed", "from"])]
        prompt: Option<String>,

        /// Overwrite an existing session file
        #[arg(long)]
        force: bool,
    },
    /// Show the tree outline and the current node
    Show {
        session: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Move the cursor
    Nav {
        session: PathBuf,

        #[command(subcommand)]
        op: cmd_nav::NavOp,
    },
    /// Add a child under the current node and move into it
    Add {
        session: PathBuf,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        prompt: Option<String>,
    },
    /// Delete the current node (or --id) with its subtree
    Delete {
        session: PathBuf,

        /// Delete this node instead of the current one
        #[arg(long)]
        id: Option<String>,
    },
    /// Retitle the current node
    Rename { session: PathBuf, title: String },
    /// Replace the current node's prompt and print the diff
    Edit {
        session: PathBuf,

        /// New prompt text (use - for stdin)
        prompt: String,
    },
    /// Print the effective prompt of the current path
    Resolve {
        session: PathBuf,

        /// Resolve the path to this node instead of the cursor
        #[arg(long)]
        id: Option<String>,

        #[arg(long, value_enum, default_value_t = cmd_resolve::OutputFormat::Markdown)]
        format: cmd_resolve::OutputFormat,

        /// Wrap the output in the "Hierarchical Prompts" banner
        #[arg(long)]
        banner: bool,
    },
    /// Find nodes by title (case-insensitive)
    Search {
        session: PathBuf,
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the session's tree as a node document
    Export {
        session: PathBuf,

        /// Output file (writes to stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace the session's tree with a node document
    Import {
        session: PathBuf,

        /// Node document (use - for stdin)
        input: PathBuf,
    },
    /// Validate a node document
    Validate {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Render prompt trees to other formats
    Render {
        #[command(subcommand)]
        format: cmd_render::RenderFormat,
    },
    /// Interactive line editor on stdin
    Repl { session: PathBuf },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Init {
            session,
            seed,
            from,
            title,
            prompt,
            force,
        } => cmd_init::run(
            session,
            cmd_init::Origin::from_args(seed, from, title, prompt),
            force,
        ),
        Commands::Show { session, json } => cmd_show::run_show(session, json, cli.pretty),
        Commands::Nav { session, op } => cmd_nav::run(session, op),
        Commands::Add {
            session,
            title,
            prompt,
        } => cmd_edit::run_add(session, title, prompt),
        Commands::Delete { session, id } => cmd_edit::run_delete(session, id),
        Commands::Rename { session, title } => cmd_edit::run_rename(session, title),
        Commands::Edit { session, prompt } => cmd_edit::run_edit(session, prompt),
        Commands::Resolve {
            session,
            id,
            format,
            banner,
        } => cmd_resolve::run(session, id, format, banner),
        Commands::Search {
            session,
            query,
            json,
        } => cmd_show::run_search(session, query, json, cli.pretty),
        Commands::Export { session, output } => cmd_export::run_export(session, output, cli.pretty),
        Commands::Import { session, input } => cmd_export::run_import(session, input),
        Commands::Validate { input } => cmd_validate::run(input),
        Commands::Render { format } => cmd_render::run(format),
        Commands::Repl { session } => cmd_repl::run(session),
    }
}
