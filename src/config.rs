//! YAML plan configuration.
//!
//! ```yaml
//! provider: aws
//! cidr: "10.10.0.0/15"
//! regions:
//!     us1:
//!         region: "us-west-2"
//!         zone_count: 3
//! subnet_routes:
//!     public:
//!         size: s
//! ```
//!
//! Regions and routes are allocated in the order they appear in the file.

use crate::error::PlanError;
use crate::models::{CidrBlock, ClusterRequest, Provider, RegionRequest, RouteRequest, SizeClass};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

/// Zones per region when the config does not say.
pub const DEFAULT_ZONE_COUNT: u32 = 3;

/// Raw configuration as written by the user, before defaults are applied.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PlanConfig {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub cidr: Option<String>,
    #[serde(default, deserialize_with = "ordered_map")]
    pub regions: Option<Vec<(String, RegionConfig)>>,
    #[serde(default, deserialize_with = "ordered_map")]
    pub subnet_routes: Option<Vec<(String, Option<RouteConfig>)>>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RegionConfig {
    /// Cloud region, e.g. "us-west-2".
    pub region: Option<String>,
    pub zone_count: Option<u32>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RouteConfig {
    pub size: Option<SizeClass>,
}

/// Read and parse a config file.
pub fn load_config(path: &Path) -> Result<PlanConfig, PlanError> {
    log::info!("Loading configuration from: {}", path.display());
    let yaml = std::fs::read_to_string(path).map_err(|e| {
        PlanError::Config(format!("Error reading config file {}: {e}", path.display()))
    })?;
    parse_config(&yaml)
}

/// Parse a config document. Errors name the key path that failed.
pub fn parse_config(yaml: &str) -> Result<PlanConfig, PlanError> {
    let deserializer = serde_yaml::Deserializer::from_str(yaml);
    serde_path_to_error::deserialize(deserializer).map_err(|e| {
        PlanError::Config(format!(
            "Error parsing config at '{}': {}",
            e.path(),
            e.inner()
        ))
    })
}

impl PlanConfig {
    /// Apply defaults and validate, producing a request for the planner.
    pub fn to_request(&self) -> Result<ClusterRequest, PlanError> {
        let provider = match self.provider.as_deref().map(str::trim) {
            None | Some("") => Provider::default(),
            Some(p) => p.parse()?,
        };

        let cidr = self
            .cidr
            .as_deref()
            .ok_or_else(|| PlanError::Config("Missing cidr key in config".to_string()))?;
        let cidr = CidrBlock::parse(cidr)
            .map_err(|e| PlanError::Config(format!("Invalid cidr in config: {e}")))?;

        let regions = self
            .regions
            .as_ref()
            .ok_or_else(|| PlanError::Config("Missing regions key in config".to_string()))?;
        if regions.is_empty() {
            return Err(PlanError::Config(
                "regions must define at least one region".to_string(),
            ));
        }
        let regions = regions
            .iter()
            .map(|(name, region)| -> Result<RegionRequest, PlanError> {
                let cloud_region = region.region.as_deref().ok_or_else(|| {
                    PlanError::Config(format!("Missing region key for \"{name}\" section"))
                })?;
                let zone_count = match region.zone_count {
                    None | Some(0) => DEFAULT_ZONE_COUNT,
                    Some(n) => n,
                };
                Ok(RegionRequest::new(name, cloud_region, zone_count))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let routes = self.subnet_routes.as_ref().ok_or_else(|| {
            PlanError::Config("Missing subnet_routes key in config".to_string())
        })?;
        let routes = routes
            .iter()
            .map(|(name, route)| {
                // a lone route is always medium, other sizes make no sense for it
                let size = if routes.len() == 1 {
                    SizeClass::Medium
                } else {
                    route.as_ref().and_then(|r| r.size).unwrap_or_default()
                };
                RouteRequest::new(name, size)
            })
            .collect();

        Ok(ClusterRequest {
            provider,
            cidr,
            regions,
            routes,
        })
    }
}

/// Deserialize a YAML mapping into `(key, value)` pairs in document order.
fn ordered_map<'de, D, T>(deserializer: D) -> Result<Option<Vec<(String, T)>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<OrderedMap<T>>::deserialize(deserializer).map(|m| m.map(|m| m.0))
}

struct OrderedMap<T>(Vec<(String, T)>);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OrderedMap<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer
            .deserialize_map(OrderedMapVisitor(PhantomData))
            .map(OrderedMap)
    }
}

struct OrderedMapVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<T> {
    type Value = Vec<(String, T)>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a mapping")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries: Vec<(String, T)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, T>()? {
            if entries.iter().any(|(k, _)| *k == key) {
                return Err(de::Error::custom(format!("duplicate key '{key}'")));
            }
            entries.push((key, value));
        }
        Ok(entries)
    }
}
