//! Unit-file update pipeline: resolve, authorize, write, reload.

mod locks;
mod orchestrator;
mod writer;

pub use locks::UnitLocks;
pub use orchestrator::{UnitFileUpdater, UpdateOutcome};
pub use writer::write_unit_file;
