//! Input validation module.
//!
//! Provides validators for unit names, lifecycle actions, and write paths.

mod action;
mod path;
mod unit_name;

pub use action::ServiceAction;
pub use path::{authorize_write_path, normalize_lexical, refuse_symlink};
pub use unit_name::validate_unit_name;
