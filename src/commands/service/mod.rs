//! Service inventory and lifecycle commands.

mod control;
mod list;
mod status;

pub use control::ServiceControlCommand;
pub use list::ServiceListCommand;
pub use status::ServiceStatusCommand;
