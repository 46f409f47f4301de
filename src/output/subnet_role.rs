//! Subnet roles inferred from route names.

/// How infrastructure code should treat a route's subnets.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SubnetRole {
    Public,
    Private,
    /// No route to the internet in either direction.
    Intra,
}

impl SubnetRole {
    /// `public` and `public_*` routes are public, `intra` and `intra_*` are
    /// isolated, everything else is private.
    pub fn of(route: &str) -> SubnetRole {
        let named = |prefix: &str| route == prefix || route.starts_with(&format!("{prefix}_"));
        if named("public") {
            SubnetRole::Public
        } else if named("intra") {
            SubnetRole::Intra
        } else {
            SubnetRole::Private
        }
    }
}
