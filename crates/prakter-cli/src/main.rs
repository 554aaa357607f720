mod cmd;
mod output;
mod prompter;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    changelog::ChangelogSubcommand, config::ConfigSubcommand, todo::TodoSubcommand,
    tree::TreeKind,
};
use prakter_core::scaffold::ScaffoldChoice;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "prakter",
    about = "Manage a project's README.md, CHANGELOG.json and TODO.json",
    version,
    propagate_version = true
)]
struct Cli {
    /// Workspace root (default: auto-detect from .prakter/ or .git/)
    #[arg(long, global = true, env = "PRAKTER_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create README.md, CHANGELOG.json and TODO.json
    Init {
        /// Generate content with the configured generator
        #[arg(long)]
        generate: bool,

        /// Overwrite files that already exist
        #[arg(long, conflicts_with = "missing_only")]
        replace_all: bool,

        /// Only create files that are missing
        #[arg(long)]
        missing_only: bool,
    },

    /// Manage tasks in TODO.json
    Todo {
        #[command(subcommand)]
        subcommand: TodoSubcommand,
    },

    /// Manage CHANGELOG.json
    Changelog {
        #[command(subcommand)]
        subcommand: ChangelogSubcommand,
    },

    /// Print the tree view of TODO.json or CHANGELOG.json
    Tree {
        #[arg(value_enum)]
        kind: TreeKind,

        /// Show a version's changes alongside its sub-entries
        #[arg(long)]
        with_changes: bool,
    },

    /// Re-read all project files and report their state
    Refresh,

    /// Show or initialise .prakter/config.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Launch the web UI
    Ui {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "0")]
        port: u16,

        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Ui { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    // RUST_LOG, when set and valid, replaces the per-command default.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init {
            generate,
            replace_all,
            missing_only,
        } => {
            let choice = if replace_all {
                Some(ScaffoldChoice::ReplaceAll)
            } else if missing_only {
                Some(ScaffoldChoice::CreateMissing)
            } else {
                None
            };
            cmd::init::run(&root, generate, choice, cli.json)
        }
        Commands::Todo { subcommand } => cmd::todo::run(&root, subcommand, cli.json),
        Commands::Changelog { subcommand } => cmd::changelog::run(&root, subcommand, cli.json),
        Commands::Tree { kind, with_changes } => cmd::tree::run(&root, kind, with_changes, cli.json),
        Commands::Refresh => cmd::refresh::run(&root, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Ui { port, no_open } => cmd::ui::run(&root, port, no_open),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
