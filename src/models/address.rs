//! Address codec: 32-bit positions to and from dotted-quad text.

use crate::error::PlanError;
use std::net::Ipv4Addr;

/// An IPv4 address as an integer position in the 32-bit address space.
pub type Address = u32;

/// Format an address as four dot-separated octets, most significant first.
///
/// # Examples
/// ```
/// use vpc_planner::models::address_to_text;
/// assert_eq!(address_to_text(167774208), "10.0.8.0");
/// ```
pub fn address_to_text(addr: Address) -> String {
    Ipv4Addr::from(addr).to_string()
}

/// Parse four decimal octets into an address.
///
/// Octets are range checked here (0-255, digits only) rather than left to
/// the caller.
pub fn text_to_address(text: &str) -> Result<Address, PlanError> {
    let text = text.trim();
    let parts: Vec<&str> = text.split('.').collect();
    if parts.len() != 4 {
        return Err(format_error(text, "expected four dot-separated octets"));
    }

    let mut addr: Address = 0;
    for part in parts {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format_error(text, &format!("octet '{part}' is not a number")));
        }
        let octet: u8 = part
            .parse()
            .map_err(|_| format_error(text, &format!("octet '{part}' is out of range 0-255")))?;
        addr = (addr << 8) | octet as Address;
    }
    Ok(addr)
}

fn format_error(input: &str, reason: &str) -> PlanError {
    PlanError::Format {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}
