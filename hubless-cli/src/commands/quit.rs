//! `hubless quit`.

use anyhow::Result;
use clap::Args;

use hubless_core::DesiredAction;

use super::{load_config, run_pass, TargetArgs};

#[derive(Args, Debug)]
pub struct QuitArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

impl QuitArgs {
    pub fn run(self) -> Result<()> {
        let config = load_config()?;
        let request = self.target.request(DesiredAction::Quit, &config)?;
        run_pass(&config, request, self.target.json)
    }
}
