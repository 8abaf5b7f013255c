//! Subcommand implementations and the plumbing they share.

pub mod launch;
pub mod ps;
pub mod quit;
pub mod register;
pub mod which;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use hubless_core::{
    config, registry::HubRegistry, types::SearchDepth, Config, DesiredAction, EditorProfile,
    OrchestrationRequest,
};
use hubless_process::{Platform, TerminationPolicy};
use hubless_runtime::{NativeLauncher, OrchestrationReport, Orchestrator};

/// Project selection shared by every project-scoped subcommand.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Project directory. When omitted, the nearest project under the
    /// search root is used.
    pub path: Option<PathBuf>,

    /// Directory to search from when PATH is omitted (default: current directory).
    #[arg(long, value_name = "DIR")]
    pub search_root: Option<PathBuf>,

    /// Maximum search depth; -1 searches without limit (default: config, else 3).
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub max_depth: Option<i64>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl TargetArgs {
    pub fn request(&self, action: DesiredAction, config: &Config) -> Result<OrchestrationRequest> {
        let search_root = match &self.search_root {
            Some(root) => root.clone(),
            None => std::env::current_dir().context("could not determine current directory")?,
        };
        let mut request = OrchestrationRequest::new(action, search_root);
        request.explicit_project_path = self.path.clone();
        request.search_max_depth = match self.max_depth {
            Some(depth) => SearchDepth::from_signed(depth),
            None => config.search_depth(),
        };
        Ok(request)
    }
}

pub fn load_config() -> Result<Config> {
    config::load().context("failed to load hubless config")
}

/// Orchestrator wired to the host OS, the Hub registry and installed editors.
pub fn native_orchestrator(config: &Config) -> Result<Orchestrator> {
    let profile = EditorProfile::unity();
    let registry =
        HubRegistry::from_config(config).context("could not locate the Hub project registry")?;
    Ok(Orchestrator::new(
        Platform::native(profile),
        Arc::new(NativeLauncher::from_config(config, profile)),
        Arc::new(registry),
        TerminationPolicy::from(&config.termination),
    ))
}

/// Run one pass on a single-threaded runtime and print its outcome.
pub fn run_pass(config: &Config, request: OrchestrationRequest, json: bool) -> Result<()> {
    let orchestrator = native_orchestrator(config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start async runtime")?;
    let action = request.desired_action;
    let report = runtime
        .block_on(orchestrator.run(&request))
        .with_context(|| format!("{action} failed"))?;
    print_report(&report, json)
}

pub fn print_report(report: &OrchestrationReport, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(report).context("failed to serialize report")?
        );
        return Ok(());
    }

    println!(
        "{} {}",
        report.result.to_string().green().bold(),
        report.project.path.display().to_string().bright_black()
    );
    for warning in &report.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning.message);
    }
    Ok(())
}
