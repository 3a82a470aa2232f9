//! Service inventory module.
//!
//! Turns systemctl's legend-bearing text reports into a merged, typed
//! service inventory.

mod parser;
mod record;

pub use parser::{merge_enabled, parse_unit_files, parse_unit_list, ParsedUnitFiles, ParsedUnitList};
pub use record::ServiceRecord;
