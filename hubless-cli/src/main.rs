//! hubless: open, restart and quit Unity projects without the Hub.
//!
//! # Usage
//!
//! ```text
//! hubless open     [PATH] [--search-root DIR] [--max-depth N] [--build-target T] [--json] [-- ARGS...]
//! hubless restart  [PATH] [--search-root DIR] [--max-depth N] [--build-target T] [--json] [-- ARGS...]
//! hubless quit     [PATH] [--search-root DIR] [--max-depth N] [--json]
//! hubless register [PATH] [--search-root DIR] [--max-depth N] [--favorite | --unfavorite] [--json]
//! hubless which    [PATH] [--search-root DIR] [--max-depth N] [--json]
//! hubless ps       [--json]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    launch::LaunchArgs, ps::PsArgs, quit::QuitArgs, register::RegisterArgs, which::WhichArgs,
};
use hubless_core::DesiredAction;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "hubless",
    version,
    about = "Launch, focus, restart and quit Unity editors per project",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the project, or bring its running editor to the front.
    Open(LaunchArgs),

    /// Kill the project's editor if running, then launch it again.
    Restart(LaunchArgs),

    /// Ask the project's editor to quit, killing it if it does not.
    Quit(QuitArgs),

    /// Add or refresh the project in the Hub's project list.
    Register(RegisterArgs),

    /// List running editors and their projects.
    Ps(PsArgs),

    /// Print the resolved project and the editor version it needs.
    Which(WhichArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    hubless_runtime::init_tracing(cli.verbose);
    match cli.command {
        Commands::Open(args) => args.run(DesiredAction::Launch),
        Commands::Restart(args) => args.run(DesiredAction::Restart),
        Commands::Quit(args) => args.run(),
        Commands::Register(args) => args.run(),
        Commands::Ps(args) => args.run(),
        Commands::Which(args) => args.run(),
    }
}
