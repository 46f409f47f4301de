//! Terminal output utilities.
//!
//! Provides formatting helpers for terminal output.

use crate::models::NodeKind;
use colored::{ColoredString, Colorize};

/// Format a value as a quoted, right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
///
/// # Returns
/// A quoted, right-aligned string
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let value_str = value.to_string();
    let quoted = format!("\"{value_str}\"");
    let quoted_len = quoted.len();

    if quoted_len >= width {
        quoted
    } else {
        format!("{quoted:>width$}")
    }
}

/// Colored label for a node kind.
pub fn kind_label(kind: NodeKind) -> ColoredString {
    let label = kind.to_string();
    match kind {
        NodeKind::Cluster => label.bold(),
        NodeKind::Region => label.blue().bold(),
        NodeKind::Zone => label.cyan(),
        NodeKind::Subnet => label.green(),
    }
}

/// Colored label for reserved (free) space.
pub fn reserved_label() -> ColoredString {
    "reserved".yellow()
}
