//! JSON export of a plan.

use crate::models::{AllocationNode, FreeBlock};
use serde_json::{json, Value};

fn reserved(free_blocks: &[FreeBlock]) -> Vec<Value> {
    free_blocks.iter().map(|f| json!({ "cidr": f.cidr })).collect()
}

fn subnet_json(subnet: &AllocationNode) -> Value {
    json!({
        "name": subnet.name,
        "cidr": subnet.cidr,
    })
}

fn zone_json(zone: &AllocationNode) -> Value {
    json!({
        "name": zone.name,
        "zone": zone.location,
        "cidr": zone.cidr,
        "subnets": zone.children.iter().map(subnet_json).collect::<Vec<_>>(),
        "reserved_cidrs": reserved(&zone.free_blocks),
    })
}

fn region_json(vpc: &AllocationNode) -> Value {
    json!({
        "name": vpc.name,
        "region": vpc.location,
        "cidr": vpc.cidr,
        "zones": vpc.children.iter().map(zone_json).collect::<Vec<_>>(),
        "reserved_cidrs": reserved(&vpc.free_blocks),
    })
}

/// Build the JSON document for a planned cluster.
pub fn to_json(cluster: &AllocationNode) -> Value {
    json!({
        "cidr": cluster.cidr,
        "ip_count": cluster.address_count,
        "regions": cluster.children.iter().map(region_json).collect::<Vec<_>>(),
        "reserved_cidrs": reserved(&cluster.free_blocks),
    })
}

/// Pretty-printed JSON for a planned cluster.
pub fn render_json(cluster: &AllocationNode) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&to_json(cluster))
}
