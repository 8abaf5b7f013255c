//! Orchestration runtime: the decision procedure behind every `hubless`
//! subcommand, the editor launcher and tracing setup.

mod error;
pub mod launch;
mod logging;
pub mod orchestrator;

pub use error::OrchestrateError;
pub use launch::{build_launch_args, LaunchSpec, Launcher, NativeLauncher};
pub use logging::init_tracing;
pub use orchestrator::{OrchestrationReport, Orchestrator, Step, StepOutcome, Warning};
