//! Address planning logic.
//!
//! This module contains the range algebra and the planner built on it:
//! - [`cidr_range`] - CIDR to range conversion and minimal re-coverage
//! - [`address_set`] - Ordered set of free blocks
//! - [`feasibility`] - Pre-flight check of a request set
//! - [`planner`] - Recursive cluster/region/zone/subnet carving

mod address_set;
mod cidr_range;
mod feasibility;
mod planner;

// Re-export public functions
pub use address_set::AddressSet;
pub use cidr_range::{
    aligned_cidrs, cidr_address_count, cidr_subnets, cidr_to_range, range_to_cidrs,
};
pub use feasibility::{assert_valid_request, assert_valid_routes, bits_for};
pub use planner::{carve, plan_cluster, plan_region, plan_zone, zone_suffix, Carving, Slot};
