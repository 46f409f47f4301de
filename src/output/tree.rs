//! Indented tree view of a plan.

use super::terminal::{kind_label, reserved_label};
use crate::models::{AllocationNode, CidrBlock, NodeKind};

const INDENT: &str = "    ";

fn stats(depth: usize, count: u64, cidr: &CidrBlock) -> String {
    format!(
        "{}{count} IPs, from {} to {}\n",
        INDENT.repeat(depth),
        cidr.lo(),
        cidr.hi()
    )
}

fn draw(out: &mut String, node: &AllocationNode, depth: usize) {
    let pad = INDENT.repeat(depth);
    let label = kind_label(node.kind);
    let line = match (&node.kind, &node.location) {
        (NodeKind::Cluster, _) => format!("{pad}{label} ({})\n", node.cidr),
        (NodeKind::Region, Some(region)) => {
            format!("{pad}{label} {} @ {region} ({})\n", node.name, node.cidr)
        }
        (NodeKind::Zone, Some(zone_id)) => format!("{pad}{label} {zone_id} ({})\n", node.cidr),
        _ => format!("{pad}{label} {} ({})\n", node.name, node.cidr),
    };
    out.push_str(&line);
    out.push_str(&stats(depth + 1, node.address_count, &node.cidr));

    for child in &node.children {
        draw(out, child, depth + 1);
    }
    for free in &node.free_blocks {
        out.push_str(&format!("{pad}{INDENT}{} CIDR ({})\n", reserved_label(), free.cidr));
        out.push_str(&stats(depth + 2, free.address_count, &free.cidr));
    }
}

/// Render a plan as an indented tree, one line per block plus its stats.
pub fn render_tree(cluster: &AllocationNode) -> String {
    let mut out = String::new();
    draw(&mut out, cluster, 0);
    out
}
