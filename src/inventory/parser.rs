//! Parsers for systemctl's semi-structured text reports.
//!
//! The tool's output is not a stable contract, so these parsers are
//! deliberately forgiving: lines that do not look like data are counted and
//! skipped, never fatal. Callers get both the accepted records and the
//! skipped-line count so degraded parses stay observable.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::record::ServiceRecord;

/// Result of parsing `list-units` output.
#[derive(Debug, Clone)]
pub struct ParsedUnitList {
    pub records: Vec<ServiceRecord>,
    /// Lines that looked like data but were not parseable as unit rows.
    /// Expected noise (legend, footer, headers, blanks) is not counted.
    pub skipped: usize,
}

/// Result of parsing `list-unit-files` output.
#[derive(Debug, Clone)]
pub struct ParsedUnitFiles {
    /// Unit name to enabled-state string.
    pub statuses: HashMap<String, String>,
    pub skipped: usize,
}

/// Split a line on whitespace runs into at most `max_fields` fields, with the
/// final field absorbing the remainder of the line.
fn split_fields(line: &str, max_fields: usize) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut rest = line.trim();
    while fields.len() + 1 < max_fields {
        rest = rest.trim_start();
        match rest.find(char::is_whitespace) {
            Some(idx) => {
                fields.push(&rest[..idx]);
                rest = &rest[idx..];
            }
            None => break,
        }
    }
    let rest = rest.trim();
    if !rest.is_empty() {
        fields.push(rest);
    }
    fields
}

/// True for the summary footer line at the end of `list-units` output.
fn is_unit_list_footer(line: &str) -> bool {
    line.to_lowercase().ends_with("loaded units listed.")
}

/// True for legend or explanatory lines that systemctl emits around the data.
fn is_legend(line: &str) -> bool {
    line.starts_with("LEGEND:") || line.starts_with("To show") || line.starts_with("Pass --all")
}

/// Parse `systemctl list-units --type=service --all --no-legend` output.
///
/// Each accepted row has exactly five semantic fields: unit, load, active,
/// sub, description. The unit field must contain a type-suffix dot. The tool
/// prefixes problem units with an unescaped non-ASCII bullet; that marker is
/// stripped and the row parsed normally.
pub fn parse_unit_list(raw: &str) -> ParsedUnitList {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || is_unit_list_footer(line) || is_legend(line) {
            continue;
        }

        // Strip the problem-unit bullet (e.g. '●') rather than failing on it.
        let line = match line.chars().next() {
            Some(c) if !c.is_ascii() => line[c.len_utf8()..].trim_start(),
            _ => line,
        };

        let fields = split_fields(line, 5);
        if fields.len() >= 5 && fields[0].contains('.') {
            records.push(ServiceRecord::new(
                fields[0], fields[1], fields[2], fields[3], fields[4],
            ));
        } else if fields.first() == Some(&"UNIT") || fields.get(1) == Some(&"=") {
            // Column header or per-column legend line, expected noise
        } else {
            skipped += 1;
            debug!(
                fields = fields.len(),
                line = %line.chars().take(100).collect::<String>(),
                "Skipping line that does not look like a unit row"
            );
        }
    }

    if records.is_empty() && !raw.trim().is_empty() {
        warn!(skipped, "Unit list parser matched no records in non-empty input");
    }

    ParsedUnitList { records, skipped }
}

/// Parse `systemctl list-unit-files --type=service --no-legend` output into a
/// unit-name to enabled-state map.
///
/// The trailing unit-file-count footer is skipped silently; any other
/// unparseable line is logged and counted but does not abort the parse.
pub fn parse_unit_files(raw: &str) -> ParsedUnitFiles {
    let mut statuses = HashMap::new();
    let mut skipped = 0usize;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields = split_fields(line, 2);
        if fields.len() == 2 && fields[0].ends_with(".service") {
            statuses.insert(fields[0].to_string(), fields[1].to_string());
        } else if line.ends_with("unit files listed.") || fields.first() == Some(&"UNIT") {
            // Summary footer or column header, expected noise
        } else {
            skipped += 1;
            warn!(line = %line, "Could not parse unit-file listing line");
        }
    }

    ParsedUnitFiles { statuses, skipped }
}

/// Merge enabled-state lookups into the base records.
///
/// Total over the input: every record ends up with a defined enabled value,
/// defaulting to "unknown" for units absent from the map.
pub fn merge_enabled(records: &mut [ServiceRecord], statuses: &HashMap<String, String>) {
    for record in records {
        record.enabled = statuses
            .get(&record.unit)
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());
    }
}
