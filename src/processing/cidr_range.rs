//! Conversions between CIDR blocks and integer address ranges.

use crate::error::PlanError;
use crate::models::{block_size, lo_mask, Address, CidrBlock, MAX_LENGTH};

/// Inclusive `[min, max]` address range of a CIDR string.
///
/// # Examples
/// ```
/// use vpc_planner::processing::cidr_to_range;
/// assert_eq!(cidr_to_range("10.0.8.0/20").unwrap(), (167774208, 167778303));
/// ```
pub fn cidr_to_range(cidr: &str) -> Result<(Address, Address), PlanError> {
    Ok(CidrBlock::parse(cidr)?.range())
}

/// Number of addresses in a CIDR string.
pub fn cidr_address_count(cidr: &str) -> Result<u64, PlanError> {
    let (min, max) = cidr_to_range(cidr)?;
    Ok(max as u64 - min as u64 + 1)
}

/// Split `cidr` into `2^(new_mask - mask)` equal, contiguous sub-blocks in
/// ascending address order.
pub fn cidr_subnets(cidr: &CidrBlock, new_mask: u8) -> Result<Vec<CidrBlock>, PlanError> {
    if new_mask < cidr.mask || new_mask > MAX_LENGTH {
        return Err(PlanError::InvalidArgument(format!(
            "cannot split {cidr} into /{new_mask} blocks"
        )));
    }
    let subnet_count = 1u64 << (new_mask - cidr.mask);
    let subnet_size = 1u64 << (MAX_LENGTH - new_mask);

    (0..subnet_count)
        .map(|i| CidrBlock::new((cidr.base as u64 + i * subnet_size) as Address, new_mask))
        .collect()
}

/// Minimal list of CIDR blocks exactly covering `[min, max]`, ascending.
///
/// Each step picks the smallest mask whose block is at least as large as
/// the remainder. A perfect fit ends the scan; otherwise the block one mask
/// bit smaller is emitted at the current base and the scan repeats on what
/// is left. The base is not checked for alignment, so a block such as
/// `10.0.8.0/20` may be emitted; blocks always tile the range exactly.
///
/// # Examples
/// ```
/// use vpc_planner::processing::range_to_cidrs;
/// let cidrs: Vec<String> = range_to_cidrs(167774208, 167780351)
///     .unwrap()
///     .iter()
///     .map(|c| c.to_string())
///     .collect();
/// assert_eq!(cidrs, vec!["10.0.8.0/20", "10.0.24.0/21"]);
/// ```
pub fn range_to_cidrs(min: Address, max: Address) -> Result<Vec<CidrBlock>, PlanError> {
    if min > max {
        log::error!("got invalid range for cidr conversion {min} {max}");
        return Err(PlanError::InvalidRange { min, max });
    }

    let max = max as u64;
    let mut base = min as u64;
    let mut cidrs = Vec::new();

    while base <= max {
        let remaining = max - base;
        // host_bits == 32 always fits, so the scan cannot run dry
        for host_bits in 0..=MAX_LENGTH {
            let span = (1u64 << host_bits) - 1;
            if span == remaining {
                cidrs.push(CidrBlock::new(base as Address, MAX_LENGTH - host_bits)?);
                base = max + 1;
                break;
            } else if span > remaining {
                // host_bits >= 1 here since span 0 never exceeds remaining
                let mask = MAX_LENGTH - host_bits + 1;
                cidrs.push(CidrBlock::new(base as Address, mask)?);
                base += 1u64 << (host_bits - 1);
                break;
            }
        }
    }

    log::trace!(
        "range_to_cidrs({min}, {max}) = {cidrs:?}",
        min = crate::models::address_to_text(min)
    );
    Ok(cidrs)
}

/// List of aligned CIDR blocks exactly covering `[min, max]`, ascending.
///
/// Every block starts on a multiple of its own size, so its text form names
/// exactly the addresses it covers. Each step takes the largest block the
/// current base is aligned to that still fits in the remainder.
///
/// # Examples
/// ```
/// use vpc_planner::processing::aligned_cidrs;
/// let cidrs: Vec<String> = aligned_cidrs(167774208, 167780351)
///     .unwrap()
///     .iter()
///     .map(|c| c.to_string())
///     .collect();
/// assert_eq!(cidrs, vec!["10.0.8.0/21", "10.0.16.0/20"]);
/// ```
pub fn aligned_cidrs(min: Address, max: Address) -> Result<Vec<CidrBlock>, PlanError> {
    if min > max {
        log::error!("got invalid range for cidr conversion {min} {max}");
        return Err(PlanError::InvalidRange { min, max });
    }

    let end = max as u64 + 1;
    let mut base = min as u64;
    let mut cidrs = Vec::new();

    while base < end {
        let remaining = end - base;
        let fit = MAX_LENGTH - (63 - remaining.leading_zeros()) as u8;
        let mask = lo_mask(base as Address).max(fit);
        cidrs.push(CidrBlock::new(base as Address, mask)?);
        base += block_size(mask);
    }
    Ok(cidrs)
}
