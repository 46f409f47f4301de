//! Cloud provider profiles.

use crate::error::PlanError;
use std::fmt;
use std::str::FromStr;

/// Provider-specific rules applied on top of the generic carving.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Provider {
    #[default]
    Aws,
    /// No reservations and no size caps.
    Generic,
}

impl Provider {
    /// Addresses in every subnet that cannot be assigned to hosts.
    ///
    /// AWS reserves the first 4 addresses and the last one.
    pub fn reserved_addresses(&self) -> u64 {
        match self {
            Provider::Aws => 5,
            Provider::Generic => 0,
        }
    }

    /// Largest block (smallest mask length) a single VPC may use.
    pub fn max_region_block(&self) -> Option<u8> {
        match self {
            Provider::Aws => Some(16),
            Provider::Generic => None,
        }
    }

    /// Usable addresses in a subnet with `address_count` addresses.
    pub fn subnet_capacity(&self, address_count: u64) -> u64 {
        address_count.saturating_sub(self.reserved_addresses())
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Aws => write!(f, "aws"),
            Provider::Generic => write!(f, "generic"),
        }
    }
}

impl FromStr for Provider {
    type Err = PlanError;

    /// Case-insensitive provider name, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.eq_ignore_ascii_case("aws") {
            Ok(Provider::Aws)
        } else if name.eq_ignore_ascii_case("generic") {
            Ok(Provider::Generic)
        } else {
            Err(PlanError::Config(format!(
                "{name} is not a supported provider type"
            )))
        }
    }
}
