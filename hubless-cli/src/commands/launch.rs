//! `hubless open` / `hubless restart`.

use anyhow::Result;
use clap::Args;

use hubless_core::DesiredAction;

use super::{load_config, run_pass, TargetArgs};

/// Arguments shared by `open` and `restart`.
#[derive(Args, Debug)]
pub struct LaunchArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Platform target passed to the editor (e.g. Android, iOS, StandaloneWindows64).
    /// Ignored when the extra arguments already contain -buildTarget.
    #[arg(long, value_name = "TARGET")]
    pub build_target: Option<String>,

    /// Extra editor arguments, appended after everything else.
    #[arg(last = true, value_name = "ARGS")]
    pub passthrough: Vec<String>,
}

impl LaunchArgs {
    pub fn run(self, action: DesiredAction) -> Result<()> {
        let config = load_config()?;
        let mut request = self.target.request(action, &config)?;
        request.platform_target = self.build_target;
        request.passthrough_args = self.passthrough;
        run_pass(&config, request, self.target.json)
    }
}
