//! Domain models for address planning.
//!
//! This module contains the core data structures used throughout the application:
//! - [`Address`] and the address codec functions
//! - [`CidrBlock`] - base address plus mask length
//! - [`ClusterRequest`], [`RegionRequest`], [`RouteRequest`] - what to carve
//! - [`Provider`] - provider-specific reservation and size rules
//! - [`AllocationNode`] and [`FreeBlock`] - the planned tree

mod address;
mod allocation;
mod cidr;
mod provider;
mod request;

// Re-export public types
pub use address::{address_to_text, text_to_address, Address};
pub use allocation::{AllocationNode, FreeBlock, NodeKind};
pub use cidr::{block_size, get_cidr_mask, lo_mask, CidrBlock, MAX_LENGTH};
pub use provider::Provider;
pub use request::{ClusterRequest, RegionRequest, RouteRequest, SizeClass};
