//! `hubless ps`: running editors and the projects they have open.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use hubless_core::{EditorProfile, RunningInstance};
use hubless_process::Platform;

#[derive(Args, Debug)]
pub struct PsArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct PsTableRow {
    #[tabled(rename = "pid")]
    pid: u32,
    #[tabled(rename = "project")]
    project: String,
}

impl PsArgs {
    pub fn run(self) -> Result<()> {
        let instances = Platform::native(EditorProfile::unity())
            .registry()
            .list_running_instances();
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&instances).context("failed to serialize instances")?
            );
            return Ok(());
        }
        print_table(instances);
        Ok(())
    }
}

fn table_rows(instances: Vec<RunningInstance>) -> Vec<PsTableRow> {
    instances
        .into_iter()
        .map(|instance| PsTableRow {
            pid: instance.pid,
            project: instance.project_path.display().to_string(),
        })
        .collect()
}

fn print_table(instances: Vec<RunningInstance>) {
    if instances.is_empty() {
        println!("{}", "No running editors.".bright_black());
        return;
    }
    let mut table = Table::new(table_rows(instances));
    table.with(Style::rounded());
    println!("{table}");
}
