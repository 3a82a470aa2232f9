//! Unit-file read and write commands.

mod read;
mod write;

pub use read::UnitFileReadCommand;
pub use write::UnitFileWriteCommand;
