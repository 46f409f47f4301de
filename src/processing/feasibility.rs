//! Pre-flight check that a request set fits before anything is carved.
//!
//! Route capacity is modelled as a balanced binary tree of units:
//!
//! ```text
//!         L
//!      M     M
//!     S S   S S
//! ```
//!
//! With `total_units = 2^bits_for(route_count) * 2`, a large route costs 4
//! units, medium 2 and small 1. At least one unit must stay free for the
//! zone's reserved block.

use crate::error::PlanError;
use crate::models::{CidrBlock, ClusterRequest, RouteRequest, MAX_LENGTH};

/// Mask bits needed to give `count` siblings plus one reserved spot a slot
/// each: `ceil(log2(count + 1))`.
///
/// 1 -> 1, 2 -> 2, 3 -> 2, 4 -> 3
pub fn bits_for(count: u64) -> u8 {
    count
        .saturating_add(1)
        .checked_next_power_of_two()
        .map(|p| p.trailing_zeros() as u8)
        .unwrap_or(64)
}

/// Reject region/zone/route combinations that cannot fit in `cidr`.
pub fn assert_valid_routes(
    cidr: &CidrBlock,
    region_count: usize,
    zone_count: u32,
    routes: &[RouteRequest],
) -> Result<(), PlanError> {
    let region_mask = cidr.mask as i64 + bits_for(region_count as u64) as i64;
    assert_fits(cidr, region_count, region_mask, zone_count, routes)
}

/// [`assert_valid_routes`] for a whole request, taking the provider's region
/// size cap into account: a capped region is smaller than its slice, which
/// leaves fewer bits for zones and routes.
pub fn assert_valid_request(request: &ClusterRequest) -> Result<(), PlanError> {
    let cidr = &request.cidr;
    let region_count = request.regions.len();
    let mut region_mask = cidr.mask as i64 + bits_for(region_count as u64) as i64;
    if let Some(cap) = request.provider.max_region_block() {
        region_mask = region_mask.max(cap as i64);
    }
    assert_fits(
        cidr,
        region_count,
        region_mask,
        request.max_zone_count(),
        &request.routes,
    )
}

fn assert_fits(
    cidr: &CidrBlock,
    region_count: usize,
    region_mask: i64,
    zone_count: u32,
    routes: &[RouteRequest],
) -> Result<(), PlanError> {
    let available_bits = MAX_LENGTH as i64 - region_mask - bits_for(zone_count as u64) as i64;

    if available_bits <= 0 {
        return Err(PlanError::CidrTooSmall {
            cidr: *cidr,
            region_count,
            zone_count,
            available_bits,
        });
    }

    let route_bits = bits_for(routes.len() as u64) as u32;
    let total_units = 1i64.checked_shl(route_bits + 1).unwrap_or(i64::MAX);
    let mut avail_units = total_units;

    for route in routes {
        avail_units -= route.size.units();
        // zero left means no room for the reserved block
        if avail_units <= 0 {
            return Err(PlanError::RouteTooLarge {
                route: route.name.clone(),
                total_units,
            });
        }
    }

    // the smallest subnet must still be a valid mask
    let deepest = routes
        .iter()
        .map(|r| route_bits as i64 + r.size.mask_delta() as i64)
        .max()
        .unwrap_or(0);
    if deepest > available_bits {
        return Err(PlanError::CidrTooSmall {
            cidr: *cidr,
            region_count,
            zone_count,
            available_bits: available_bits - deepest,
        });
    }

    log::debug!(
        "routes fit {cidr}: {available_bits} bit(s) below zones, {avail_units}/{total_units} unit(s) spare"
    );
    Ok(())
}
