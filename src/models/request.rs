//! Planning requests: what the caller asks the planner to carve.

use super::{CidrBlock, Provider};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbolic subnet size relative to the zone's baseline mask.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum SizeClass {
    #[serde(rename = "s", alias = "small")]
    Small,
    #[default]
    #[serde(rename = "m", alias = "medium")]
    Medium,
    #[serde(rename = "l", alias = "large")]
    Large,
}

impl SizeClass {
    /// Mask-bit delta from the baseline: large blocks are twice the
    /// baseline, small blocks half.
    pub fn mask_delta(&self) -> i8 {
        match self {
            SizeClass::Small => 1,
            SizeClass::Medium => 0,
            SizeClass::Large => -1,
        }
    }

    /// Cost in the feasibility budget. Must stay consistent with
    /// [`SizeClass::mask_delta`]: one mask bit less doubles the cost.
    pub fn units(&self) -> i64 {
        1 << (1 - self.mask_delta())
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SizeClass::Small => "s",
            SizeClass::Medium => "m",
            SizeClass::Large => "l",
        };
        write!(f, "{s}")
    }
}

/// A named subnet request, carved once in every zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub name: String,
    pub size: SizeClass,
}

impl RouteRequest {
    pub fn new(name: &str, size: SizeClass) -> RouteRequest {
        RouteRequest {
            name: name.to_string(),
            size,
        }
    }
}

/// A named VPC request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRequest {
    /// Name of the VPC.
    pub name: String,
    /// Cloud region the VPC lives in, e.g. "us-west-2".
    pub region: String,
    pub zone_count: u32,
}

impl RegionRequest {
    pub fn new(name: &str, region: &str, zone_count: u32) -> RegionRequest {
        RegionRequest {
            name: name.to_string(),
            region: region.to_string(),
            zone_count,
        }
    }
}

/// Everything needed to plan one cluster. Regions and routes keep the
/// order the caller gave them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterRequest {
    pub provider: Provider,
    pub cidr: CidrBlock,
    pub regions: Vec<RegionRequest>,
    pub routes: Vec<RouteRequest>,
}

impl ClusterRequest {
    /// The largest zone count of any region, used for the feasibility check.
    pub fn max_zone_count(&self) -> u32 {
        self.regions.iter().map(|r| r.zone_count).max().unwrap_or(0)
    }
}
