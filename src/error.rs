//! Error taxonomy for address planning.
//!
//! [`PlanError::CidrTooSmall`], [`PlanError::RouteTooLarge`],
//! [`PlanError::Misaligned`] and [`PlanError::Config`] are expected with a
//! bad configuration. Everything else means the address algebra was driven
//! outside its supported shape.

use crate::models::CidrBlock;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// Malformed address or CIDR text.
    #[error("invalid address '{input}': {reason}")]
    Format { input: String, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid range for cidr conversion: {min} > {max}")]
    InvalidRange { min: u32, max: u32 },

    /// The head of an address set cannot donate a block of the requested size.
    #[error("no free block of size /{mask} available (head of set: {head:?})")]
    InsufficientSpace { mask: u8, head: Option<CidrBlock> },

    #[error("cidr {cidr} to subtract is not within the address set")]
    NotContained { cidr: CidrBlock },

    /// Carving out of the middle of a block is not supported.
    #[error("cidr {cidr} is neither a prefix nor a suffix of {superset}")]
    UnsupportedSplit { cidr: CidrBlock, superset: CidrBlock },

    #[error("cidr {cidr} does not start on a block boundary, did you mean {aligned}?")]
    Misaligned { cidr: CidrBlock, aligned: CidrBlock },

    #[error(
        "Given CIDR is too small to meet region and zone requirements. \
         ({cidr} with {region_count} region(s) and {zone_count} zone(s) leaves {available_bits} bit(s))"
    )]
    CidrTooSmall {
        cidr: CidrBlock,
        region_count: usize,
        zone_count: u32,
        available_bits: i64,
    },

    #[error(
        "Invalid route size configuration, sum of all route size is too large. \
         (route '{route}' exhausts the {total_units} available unit(s))"
    )]
    RouteTooLarge { route: String, total_units: i64 },

    #[error("{0}")]
    Config(String),
}

impl PlanError {
    /// True for the errors a user can fix by editing their configuration.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            PlanError::CidrTooSmall { .. }
                | PlanError::RouteTooLarge { .. }
                | PlanError::Misaligned { .. }
                | PlanError::Config(_)
        )
    }
}
