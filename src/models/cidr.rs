//! CIDR block type.
//!
//! Provides [`CidrBlock`], a base address plus mask length, along with the
//! mask helpers the range algebra is built on.

use super::address::{address_to_text, text_to_address, Address};
use crate::error::PlanError;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Maximum length for an IPv4 subnet mask (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use vpc_planner::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32, PlanError> {
    if len > MAX_LENGTH {
        Err(PlanError::InvalidArgument(format!(
            "network length /{len} is too long"
        )))
    } else {
        let right_len = MAX_LENGTH - len;
        let all_bits = u32::MAX as u64;

        let mask = (all_bits >> right_len) << right_len;

        Ok(mask as u32)
    }
}

/// Number of addresses in a block with the given mask length.
pub fn block_size(mask: u8) -> u64 {
    1u64 << (MAX_LENGTH - mask.min(MAX_LENGTH))
}

/// Smallest mask length an address can be the base of, from its trailing zeros.
pub fn lo_mask(addr: Address) -> u8 {
    let trailing_zeros = addr.trailing_zeros().min(MAX_LENGTH as u32) as u8;
    MAX_LENGTH - trailing_zeros
}

/// A block of `2^(32 - mask)` contiguous addresses starting at `base`.
///
/// The base is kept as given, so a block need not be aligned: `10.0.8.0/20`
/// covers `10.0.8.0 - 10.0.23.255`. Blocks never run past the end of the
/// address space.
#[derive(Eq, Ord, PartialEq, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct CidrBlock {
    /// First address of the block.
    pub base: Address,
    /// The mask length (0-32).
    pub mask: u8,
}

impl CidrBlock {
    pub fn new(base: Address, mask: u8) -> Result<CidrBlock, PlanError> {
        if mask > MAX_LENGTH {
            return Err(PlanError::InvalidArgument(format!(
                "network length /{mask} is too long"
            )));
        }
        if base as u64 + block_size(mask) - 1 > u32::MAX as u64 {
            return Err(PlanError::InvalidArgument(format!(
                "{}/{mask} runs past the end of the address space",
                address_to_text(base)
            )));
        }
        Ok(CidrBlock { base, mask })
    }

    /// Parse a CIDR string (e.g., "10.0.0.0/24").
    pub fn parse(addr_cidr: &str) -> Result<CidrBlock, PlanError> {
        let addr_cidr = addr_cidr.trim();
        let (addr, mask) = addr_cidr.split_once('/').ok_or_else(|| PlanError::Format {
            input: addr_cidr.to_string(),
            reason: "expected address/mask".to_string(),
        })?;
        let base = text_to_address(addr).map_err(|e| match e {
            PlanError::Format { reason, .. } => PlanError::Format {
                input: addr_cidr.to_string(),
                reason,
            },
            other => other,
        })?;
        let mask: u8 = mask.trim().parse().map_err(|_| PlanError::Format {
            input: addr_cidr.to_string(),
            reason: format!("invalid subnet mask '{mask}'"),
        })?;
        if mask > MAX_LENGTH {
            return Err(PlanError::Format {
                input: addr_cidr.to_string(),
                reason: format!("mask /{mask} is outside 0-32"),
            });
        }
        CidrBlock::new(base, mask)
    }

    /// Lowest address of the block.
    pub fn start(&self) -> Address {
        self.base
    }

    /// Highest address of the block, inclusive.
    pub fn end(&self) -> Address {
        (self.base as u64 + self.address_count() - 1) as Address
    }

    pub fn range(&self) -> (Address, Address) {
        (self.start(), self.end())
    }

    pub fn address_count(&self) -> u64 {
        block_size(self.mask)
    }

    /// Get the lowest (network) address in the block.
    pub fn lo(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.start())
    }

    /// Get the highest (broadcast) address in the block.
    pub fn hi(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.end())
    }

    /// True when the base is a multiple of the block size.
    pub fn is_aligned(&self) -> bool {
        lo_mask(self.base) <= self.mask
    }

    /// The aligned block of the same size that contains the base address.
    pub fn aligned(&self) -> CidrBlock {
        let mask = get_cidr_mask(self.mask).unwrap_or(u32::MAX);
        CidrBlock {
            base: self.base & mask,
            mask: self.mask,
        }
    }

    /// True when `other` lies entirely inside this block.
    pub fn contains(&self, other: &CidrBlock) -> bool {
        self.start() <= other.start() && self.end() >= other.end()
    }

    /// The lowest sub-block of mask length `mask`.
    pub fn first_subnet(&self, mask: u8) -> Result<CidrBlock, PlanError> {
        if mask < self.mask {
            return Err(PlanError::InvalidArgument(format!(
                "{self} can only be cut to a smaller size, not /{mask}"
            )));
        }
        CidrBlock::new(self.base, mask)
    }
}

impl FromStr for CidrBlock {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CidrBlock::parse(s)
    }
}

impl Serialize for CidrBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CidrBlock {
    fn deserialize<D>(deserializer: D) -> Result<CidrBlock, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CidrBlock::parse(&s).map_err(de::Error::custom)
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.lo(), self.mask)
    }
}
