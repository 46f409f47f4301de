//! The planned allocation tree.
//!
//! One node type serves all four levels (cluster, region, zone, subnet);
//! [`NodeKind`] tells them apart.

use super::CidrBlock;
use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;

#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Cluster,
    Region,
    Zone,
    Subnet,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Cluster => "Cluster",
            NodeKind::Region => "Region",
            NodeKind::Zone => "Zone",
            NodeKind::Subnet => "Subnet",
        };
        write!(f, "{s}")
    }
}

/// Address space inside a parent that no named child uses.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FreeBlock {
    pub cidr: CidrBlock,
    pub address_count: u64,
    pub first_address: Ipv4Addr,
    pub last_address: Ipv4Addr,
}

impl FreeBlock {
    pub fn new(cidr: CidrBlock) -> FreeBlock {
        FreeBlock {
            cidr,
            address_count: cidr.address_count(),
            first_address: cidr.lo(),
            last_address: cidr.hi(),
        }
    }
}

/// A named block with its carved children and leftover free blocks.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AllocationNode {
    pub kind: NodeKind,
    pub name: String,
    /// Cloud region for a VPC, zone id for a zone or subnet.
    pub location: Option<String>,
    pub cidr: CidrBlock,
    /// Usable addresses. Equal to the block size except for subnets, which
    /// lose the provider's reservation.
    pub address_count: u64,
    pub first_address: Ipv4Addr,
    pub last_address: Ipv4Addr,
    pub children: Vec<AllocationNode>,
    pub free_blocks: Vec<FreeBlock>,
}

impl AllocationNode {
    /// Create a leaf node covering the whole of `cidr`.
    pub fn new(kind: NodeKind, name: &str, location: Option<String>, cidr: CidrBlock) -> Self {
        AllocationNode {
            kind,
            name: name.to_string(),
            location,
            cidr,
            address_count: cidr.address_count(),
            first_address: cidr.lo(),
            last_address: cidr.hi(),
            children: vec![],
            free_blocks: vec![],
        }
    }

    pub fn with_address_count(mut self, address_count: u64) -> Self {
        self.address_count = address_count;
        self
    }

    pub fn with_children(mut self, children: Vec<AllocationNode>, free: Vec<CidrBlock>) -> Self {
        self.children = children;
        self.free_blocks = free.into_iter().map(FreeBlock::new).collect();
        self
    }

    /// Addresses covered by children plus free blocks. For every node but a
    /// subnet this equals the block size.
    pub fn covered_address_count(&self) -> u64 {
        let children: u64 = self.children.iter().map(|c| c.cidr.address_count()).sum();
        let free: u64 = self.free_blocks.iter().map(|f| f.address_count).sum();
        children + free
    }

    /// Depth-first walk over this node and all its descendants.
    pub fn walk(&self) -> Vec<&AllocationNode> {
        let mut nodes = vec![self];
        for child in &self.children {
            nodes.extend(child.walk());
        }
        nodes
    }
}

impl fmt::Display for AllocationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.kind, self.name, self.cidr)?;
        if let Some(location) = &self.location {
            write!(f, " @ {location}")?;
        }
        Ok(())
    }
}
