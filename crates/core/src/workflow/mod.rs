//! Magnet workflow orchestration.
//!
//! Drives one inbound message through the states:
//! `Start -> MagnetExtracted -> MetadataResolved -> DestinationDecided ->
//! FolderPhase -> TaskPhase -> Done`, aborting from any step.
//!
//! - **FolderPhase** is a soft dependency: any failure downgrades the run to
//!   the default download location.
//! - **TaskPhase** failures end the run with a failure reply.

mod runner;
mod types;

pub use runner::MagnetWorkflow;
pub use types::{Outcome, WorkflowError, PREPARING_MESSAGE};
