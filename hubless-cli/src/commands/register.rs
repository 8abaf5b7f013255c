//! `hubless register`: touch the Hub registry without starting anything.

use anyhow::Result;
use clap::Args;

use hubless_core::DesiredAction;

use super::{load_config, run_pass, TargetArgs};

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Mark the project as a favorite.
    #[arg(long, conflicts_with = "unfavorite")]
    pub favorite: bool,

    /// Clear the project's favorite mark.
    #[arg(long)]
    pub unfavorite: bool,
}

impl RegisterArgs {
    pub fn run(self) -> Result<()> {
        let config = load_config()?;
        let mut request = self.target.request(DesiredAction::RegisterOnly, &config)?;
        request.favorite = favorite_flag(self.favorite, self.unfavorite);
        run_pass(&config, request, self.target.json)
    }
}

fn favorite_flag(favorite: bool, unfavorite: bool) -> Option<bool> {
    match (favorite, unfavorite) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}
