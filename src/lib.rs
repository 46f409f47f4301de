//! Hierarchical IPv4 address planning.
//!
//! Carves one top-level block into VPCs, availability zones and subnets,
//! leaving unused space as minimal reserved CIDR blocks at every level.
//!
//! # Modules
//! - [`models`] - Domain models (CIDR blocks, requests, the allocation tree)
//! - [`processing`] - Range algebra and the planner
//! - [`output`] - JSON, tree and CSV rendering
//! - [`config`] - YAML configuration loading
//! - [`error`] - Error taxonomy

pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod processing;

pub use config::{load_config, parse_config, PlanConfig};
pub use error::PlanError;
pub use models::{AllocationNode, CidrBlock, ClusterRequest, NodeKind, Provider, SizeClass};
pub use processing::{assert_valid_routes, plan_cluster};

/// Normalise a config, check it is feasible, and plan the cluster.
pub fn plan_from_config(config: &PlanConfig) -> Result<AllocationNode, PlanError> {
    let request = config.to_request()?;
    plan_cluster(&request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_from_config() {
        let cfg = parse_config(
            r#"
cidr: "10.0.0.0/15"
regions:
    prod: { region: us-west-2 }
    stg: { region: us-west-2 }
    dev: { region: us-west-2 }
subnet_routes:
    public: { size: l }
    private: { size: m }
    private2: { size: s }
"#,
        )
        .unwrap();
        let cluster = plan_from_config(&cfg).unwrap();
        assert_eq!(cluster.address_count, 131072);
        let names: Vec<&str> = cluster.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["prod", "stg", "dev"]);
    }

    #[test]
    fn test_plan_from_config_misaligned_root() {
        let cfg = parse_config("cidr: 10.0.8.0/20\nregions: {a: {region: r}}\nsubnet_routes: {x: {}}\n")
            .unwrap();
        let err = plan_from_config(&cfg).unwrap_err();
        assert!(matches!(err, PlanError::Misaligned { .. }));
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_plan_from_config_infeasible() {
        let cfg = parse_config(
            "cidr: 10.0.0.0/28\nregions: {a: {region: r}, b: {region: r}, c: {region: r}}\nsubnet_routes: {x: {size: s}, y: {size: s}, z: {size: s}}\n",
        )
        .unwrap();
        let err = plan_from_config(&cfg).unwrap_err();
        assert!(err.is_user_facing());
        assert!(matches!(err, PlanError::CidrTooSmall { .. }));
    }
}
