//! System-level commands.

mod ping;

pub use ping::PingCommand;
