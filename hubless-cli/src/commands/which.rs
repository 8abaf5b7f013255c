//! `hubless which`: resolve a project without touching any process.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use hubless_core::{
    registry::{HubRecord, HubRegistry, RegistryStore},
    DesiredAction, ProjectRecord,
};

use super::{load_config, native_orchestrator, TargetArgs};

#[derive(Args, Debug)]
pub struct WhichArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Serialize)]
struct WhichJson<'a> {
    project: &'a ProjectRecord,
    hub_record: Option<&'a HubRecord>,
}

impl WhichArgs {
    pub fn run(self) -> Result<()> {
        let config = load_config()?;
        let request = self.target.request(DesiredAction::Launch, &config)?;
        let project = native_orchestrator(&config)?
            .resolve_project(&request)
            .context("could not resolve project")?;
        let hub_record = lookup_hub_record(&config, &project);

        if self.target.json {
            let payload = WhichJson {
                project: &project,
                hub_record: hub_record.as_ref(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize project")?
            );
            return Ok(());
        }

        println!("{}", project.path.display());
        println!("{} {}", "version:".bright_black(), project.required_version.bold());
        match hub_record {
            Some(record) => println!("{} {}", "hub:".bright_black(), record.title),
            None => println!("{} {}", "hub:".bright_black(), "not registered".bright_black()),
        }
        Ok(())
    }
}

/// Hub entry for `project`; registry problems only hide the entry.
fn lookup_hub_record(
    config: &hubless_core::Config,
    project: &ProjectRecord,
) -> Option<HubRecord> {
    let registry = HubRegistry::from_config(config).ok()?;
    match registry.find(&project.canonical) {
        Ok(record) => record,
        Err(err) => {
            eprintln!("{} {err}", "warning:".yellow().bold());
            None
        }
    }
}
