//! CSV output of every block in a plan.

use super::terminal::format_field;
use crate::models::{AllocationNode, NodeKind};

/// One printable block, named or reserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRow {
    /// Node kind, or "Reserved" for free space.
    pub kind: String,
    /// Slash-separated names from the first region down.
    pub path: String,
    pub cidr: String,
    pub ip_count: u64,
    pub first: String,
    pub last: String,
}

/// Flatten a plan into rows, parents before children, free blocks after
/// the named children of the same parent.
pub fn block_rows(cluster: &AllocationNode) -> Vec<BlockRow> {
    let mut rows = Vec::new();
    collect_rows(cluster, "", &mut rows);
    rows
}

fn collect_rows(node: &AllocationNode, parent_path: &str, rows: &mut Vec<BlockRow>) {
    let path = match node.kind {
        NodeKind::Cluster => String::new(),
        _ if parent_path.is_empty() => node.name.clone(),
        _ => format!("{parent_path}/{}", node.name),
    };
    rows.push(BlockRow {
        kind: node.kind.to_string(),
        path: if path.is_empty() { node.name.clone() } else { path.clone() },
        cidr: node.cidr.to_string(),
        ip_count: node.address_count,
        first: node.first_address.to_string(),
        last: node.last_address.to_string(),
    });

    for child in &node.children {
        collect_rows(child, &path, rows);
    }
    for free in &node.free_blocks {
        rows.push(BlockRow {
            kind: "Reserved".to_string(),
            path: if path.is_empty() { "-".to_string() } else { path.clone() },
            cidr: free.cidr.to_string(),
            ip_count: free.address_count,
            first: free.first_address.to_string(),
            last: free.last_address.to_string(),
        });
    }
}

/// Render a plan as CSV with quoted, aligned fields.
pub fn render_csv(cluster: &AllocationNode) -> String {
    let mut out = String::new();
    out.push_str(r#""kind",                         "path",        "cidr", "ip_count",           "first",            "last""#);
    out.push('\n');
    for row in block_rows(cluster) {
        out.push_str(&format!(
            "{kind},{path},{cidr},{ip_count},{first},{last}\n",
            kind = format_field(&row.kind, 10),
            path = format_field(&row.path, 24),
            cidr = format_field(&row.cidr, 20),
            ip_count = format_field(row.ip_count, 11),
            first = format_field(&row.first, 17),
            last = format_field(&row.last, 17),
        ));
    }
    out
}
