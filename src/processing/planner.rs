//! Recursive allocation of a cluster block into VPCs, zones and subnets.
//!
//! Every level runs the same carve: siblings share a baseline mask of
//! `parent_mask + bits_for(sibling_count)`, leaving room for at least one
//! spare slot, and whatever is not handed out becomes the level's free
//! blocks.

use super::address_set::AddressSet;
use super::cidr_range::range_to_cidrs;
use super::feasibility::{assert_valid_request, bits_for};
use crate::error::PlanError;
use crate::models::{
    AllocationNode, CidrBlock, ClusterRequest, NodeKind, Provider, RegionRequest, RouteRequest,
    MAX_LENGTH,
};

/// One sibling request at a level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub name: String,
    /// Mask bits relative to the level's baseline; negative is bigger.
    pub mask_delta: i8,
}

impl Slot {
    pub fn new(name: &str, mask_delta: i8) -> Slot {
        Slot {
            name: name.to_string(),
            mask_delta,
        }
    }
}

/// Result of carving one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carving {
    /// Index into the requested slots and the block it received, in
    /// allocation order.
    pub allocated: Vec<(usize, CidrBlock)>,
    pub free: Vec<CidrBlock>,
}

/// Carve `parent` into one block per slot.
///
/// Slots are carved largest first (stable, so equal sizes keep their
/// order). Each block comes off the head of the free set. When
/// `max_block` is set, a slice bigger than that mask is trimmed to its
/// first `/max_block` and the rest is returned as free space once all slots
/// are carved. Free space is returned as aligned blocks.
pub fn carve(parent: CidrBlock, slots: &[Slot], max_block: Option<u8>) -> Result<Carving, PlanError> {
    let baseline = parent.mask as i16 + bits_for(slots.len() as u64) as i16;

    let mut order: Vec<usize> = (0..slots.len()).collect();
    order.sort_by_key(|&i| slots[i].mask_delta);

    let mut avail = AddressSet::new([parent]);
    let mut allocated = Vec::with_capacity(slots.len());
    let mut folded = Vec::new();

    for (n, &i) in order.iter().enumerate() {
        let slot = &slots[i];
        let mask = baseline + slot.mask_delta as i16;
        if mask < parent.mask as i16 || mask > MAX_LENGTH as i16 {
            return Err(PlanError::InvalidArgument(format!(
                "'{}' needs a /{mask} block which does not fit in {parent}",
                slot.name
            )));
        }

        let slice = avail.take_next_block(mask as u8)?;
        avail.remove_block(&slice)?;

        let block = match max_block {
            Some(cap) if slice.mask < cap => {
                let block = slice.first_subnet(cap)?;
                folded.extend(range_to_cidrs(block.end() + 1, slice.end())?);
                log::debug!("'{}' capped from {slice} to {block}", slot.name);
                block
            }
            _ => slice,
        };
        // largest-first carving from an aligned parent keeps every base aligned
        debug_assert!(
            block.is_aligned() || !parent.is_aligned(),
            "{block} carved misaligned from {parent}"
        );
        log::debug!("carved '{}' = {block} from {parent}", slot.name);
        allocated.push((i, block));

        if avail.is_empty() {
            for &skipped in &order[n + 1..] {
                log::warn!(
                    "no space left in {parent}, '{}' was not allocated",
                    slots[skipped].name
                );
            }
            break;
        }
    }

    for block in folded {
        avail.add_block(block)?;
    }

    Ok(Carving {
        allocated,
        free: avail.aligned_blocks()?,
    })
}

/// Zone letter for the zone at `index`: a, b, ... z, aa, ab, ...
pub fn zone_suffix(mut index: usize) -> String {
    let mut suffix = String::new();
    loop {
        suffix.insert(0, (b'a' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    suffix
}

/// Plan a whole cluster.
///
/// Runs the feasibility check first, so an infeasible request fails before
/// any block is carved. The root block must be aligned to its own size.
pub fn plan_cluster(request: &ClusterRequest) -> Result<AllocationNode, PlanError> {
    let cidr = request.cidr;
    if !cidr.is_aligned() {
        return Err(PlanError::Misaligned {
            cidr,
            aligned: cidr.aligned(),
        });
    }
    assert_valid_request(request)?;

    log::info!(
        "Planning {} cluster {cidr}: {} region(s), {} route(s)",
        request.provider,
        request.regions.len(),
        request.routes.len()
    );

    let slots: Vec<Slot> = request.regions.iter().map(|r| Slot::new(&r.name, 0)).collect();
    let carving = carve(cidr, &slots, request.provider.max_region_block())?;

    let regions = carving
        .allocated
        .iter()
        .map(|&(i, block)| {
            plan_region(
                request.provider,
                &request.regions[i],
                block,
                &request.routes,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AllocationNode::new(NodeKind::Cluster, "cluster", None, cidr)
        .with_children(regions, carving.free))
}

/// Plan one VPC: `zone_count` equal zones lettered in allocation order.
pub fn plan_region(
    provider: Provider,
    region: &RegionRequest,
    cidr: CidrBlock,
    routes: &[RouteRequest],
) -> Result<AllocationNode, PlanError> {
    let slots: Vec<Slot> = (0..region.zone_count as usize)
        .map(|i| Slot::new(&zone_suffix(i), 0))
        .collect();
    let carving = carve(cidr, &slots, None)?;

    let zones = carving
        .allocated
        .iter()
        .map(|&(i, block)| {
            let zone_id = format!("{}{}", region.region, slots[i].name);
            plan_zone(provider, &slots[i].name, &zone_id, block, routes)
        })
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(
        "region '{}' {cidr}: {} zone(s), {} free block(s)",
        region.name,
        zones.len(),
        carving.free.len()
    );
    Ok(
        AllocationNode::new(NodeKind::Region, &region.name, Some(region.region.clone()), cidr)
            .with_children(zones, carving.free),
    )
}

/// Plan one zone: a subnet per route, sized by its size class.
pub fn plan_zone(
    provider: Provider,
    name: &str,
    zone_id: &str,
    cidr: CidrBlock,
    routes: &[RouteRequest],
) -> Result<AllocationNode, PlanError> {
    let slots: Vec<Slot> = routes
        .iter()
        .map(|r| Slot::new(&r.name, r.size.mask_delta()))
        .collect();
    let carving = carve(cidr, &slots, None)?;

    let subnets = carving
        .allocated
        .iter()
        .map(|&(i, block)| {
            AllocationNode::new(NodeKind::Subnet, &slots[i].name, Some(zone_id.to_string()), block)
                .with_address_count(provider.subnet_capacity(block.address_count()))
        })
        .collect();

    Ok(
        AllocationNode::new(NodeKind::Zone, name, Some(zone_id.to_string()), cidr)
            .with_children(subnets, carving.free),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SizeClass;

    fn cidr(s: &str) -> CidrBlock {
        CidrBlock::parse(s).unwrap()
    }

    fn strings(cidrs: &[CidrBlock]) -> Vec<String> {
        cidrs.iter().map(|c| c.to_string()).collect()
    }

    fn three_regions(routes: Vec<RouteRequest>) -> ClusterRequest {
        ClusterRequest {
            provider: Provider::Aws,
            cidr: cidr("10.0.0.0/15"),
            regions: vec![
                RegionRequest::new("prod", "us-west-2", 3),
                RegionRequest::new("stg", "us-west-2", 3),
                RegionRequest::new("dev", "us-west-2", 3),
            ],
            routes,
        }
    }

    #[test]
    fn test_zone_suffix() {
        assert_eq!(zone_suffix(0), "a");
        assert_eq!(zone_suffix(2), "c");
        assert_eq!(zone_suffix(25), "z");
        assert_eq!(zone_suffix(26), "aa");
        assert_eq!(zone_suffix(27), "ab");
        assert_eq!(zone_suffix(52), "ba");
    }

    #[test]
    fn test_carve_sorts_largest_first() {
        let slots = vec![
            Slot::new("private2", 1),
            Slot::new("private", 0),
            Slot::new("public", -1),
        ];
        let carving = carve(cidr("10.0.0.0/19"), &slots, None).unwrap();
        let names: Vec<&str> = carving
            .allocated
            .iter()
            .map(|(i, _)| slots[*i].name.as_str())
            .collect();
        assert_eq!(names, vec!["public", "private", "private2"]);
        let blocks: Vec<CidrBlock> = carving.allocated.iter().map(|(_, b)| *b).collect();
        assert_eq!(
            strings(&blocks),
            vec!["10.0.0.0/20", "10.0.16.0/21", "10.0.24.0/22"]
        );
        assert_eq!(strings(&carving.free), vec!["10.0.28.0/22"]);
    }

    #[test]
    fn test_carve_equal_slots_keep_order() {
        let slots = vec![Slot::new("x", 0), Slot::new("y", 0), Slot::new("z", 0)];
        let carving = carve(cidr("10.0.0.0/16"), &slots, None).unwrap();
        assert_eq!(
            carving.allocated,
            vec![
                (0, cidr("10.0.0.0/18")),
                (1, cidr("10.0.64.0/18")),
                (2, cidr("10.0.128.0/18"))
            ]
        );
        assert_eq!(strings(&carving.free), vec!["10.0.192.0/18"]);
    }

    #[test]
    fn test_carve_nothing_requested() {
        let carving = carve(cidr("10.0.0.0/19"), &[], None).unwrap();
        assert!(carving.allocated.is_empty());
        assert_eq!(strings(&carving.free), vec!["10.0.0.0/19"]);
    }

    #[test]
    fn test_carve_stops_when_space_runs_out() {
        // one large slot at baseline /20 takes the whole /19
        let slots = vec![Slot::new("big", -1)];
        let carving = carve(cidr("10.0.0.0/19"), &slots, None).unwrap();
        assert_eq!(carving.allocated, vec![(0, cidr("10.0.0.0/19"))]);
        assert!(carving.free.is_empty());
    }

    #[test]
    fn test_carve_rejects_mask_past_32() {
        let slots = vec![Slot::new("a", 1), Slot::new("b", 1), Slot::new("c", 1)];
        let err = carve(cidr("10.0.0.0/31"), &slots, None).unwrap_err();
        assert!(matches!(err, PlanError::InvalidArgument(_)));
    }

    #[test]
    fn test_carve_caps_and_folds() {
        let slots = vec![Slot::new("us1", 0), Slot::new("us2", 0), Slot::new("eu", 0)];
        let carving = carve(cidr("10.0.0.0/12"), &slots, Some(16)).unwrap();
        let blocks: Vec<CidrBlock> = carving.allocated.iter().map(|(_, b)| *b).collect();
        // each region keeps its own /14 slice boundary but only uses a /16
        assert_eq!(
            strings(&blocks),
            vec!["10.0.0.0/16", "10.4.0.0/16", "10.8.0.0/16"]
        );
        let free: u64 = carving.free.iter().map(|c| c.address_count()).sum();
        assert_eq!(free, (1 << 20) - 3 * 65536);
        assert_eq!(
            strings(&carving.free),
            vec![
                "10.1.0.0/16",
                "10.2.0.0/15",
                "10.5.0.0/16",
                "10.6.0.0/15",
                "10.9.0.0/16",
                "10.10.0.0/15",
                "10.12.0.0/14"
            ]
        );
        for pair in carving.free.windows(2) {
            assert!(pair[0].end() < pair[1].start());
        }
        for block in &blocks {
            assert!(carving.free.iter().all(|f| f.end() < block.start() || f.start() > block.end()));
        }
    }

    #[test]
    fn test_carve_free_blocks_are_aligned() {
        let slots: Vec<Slot> = (0..5).map(|i| Slot::new(&zone_suffix(i), 0)).collect();
        let carving = carve(cidr("10.0.0.0/16"), &slots, None).unwrap();
        assert_eq!(strings(&carving.free), vec!["10.0.160.0/19", "10.0.192.0/18"]);
    }

    /// Every free block is a real network that overlaps nothing else in the tree.
    fn assert_free_blocks_aligned(cluster: &AllocationNode) {
        for node in cluster.walk() {
            let mut blocks: Vec<CidrBlock> = node.children.iter().map(|c| c.cidr).collect();
            for free in &node.free_blocks {
                assert!(free.cidr.is_aligned(), "{} in {}", free.cidr, node.cidr);
                blocks.push(free.cidr);
            }
            blocks.sort();
            for pair in blocks.windows(2) {
                assert!(pair[0].end() < pair[1].start(), "{} overlaps {}", pair[0], pair[1]);
            }
            if node.kind != NodeKind::Subnet {
                assert_eq!(node.covered_address_count(), node.cidr.address_count());
            }
        }
    }

    #[test]
    fn test_plan_free_blocks_are_aligned() {
        let generic = ClusterRequest {
            provider: Provider::Generic,
            cidr: cidr("10.0.0.0/8"),
            regions: (0..5)
                .map(|i| RegionRequest::new(&format!("r{i}"), "us-west-2", 5))
                .collect(),
            routes: vec![
                RouteRequest::new("public", SizeClass::Small),
                RouteRequest::new("private", SizeClass::Medium),
            ],
        };
        let cluster = plan_cluster(&generic).unwrap();
        assert_free_blocks_aligned(&cluster);
        let free: Vec<CidrBlock> = cluster.free_blocks.iter().map(|f| f.cidr).collect();
        assert_eq!(strings(&free), vec!["10.160.0.0/11", "10.192.0.0/10"]);
        let free: Vec<CidrBlock> = cluster.children[0]
            .free_blocks
            .iter()
            .map(|f| f.cidr)
            .collect();
        assert_eq!(strings(&free), vec!["10.20.0.0/14", "10.24.0.0/13"]);

        let capped = ClusterRequest {
            provider: Provider::Aws,
            cidr: cidr("10.0.0.0/12"),
            regions: (0..3)
                .map(|i| RegionRequest::new(&format!("r{i}"), "us-west-2", 3))
                .collect(),
            routes: vec![RouteRequest::new("private", SizeClass::Medium)],
        };
        let cluster = plan_cluster(&capped).unwrap();
        assert_free_blocks_aligned(&cluster);
        assert_eq!(cluster.free_blocks[0].cidr, cidr("10.1.0.0/16"));

        assert_free_blocks_aligned(&plan_cluster(&three_regions(vec![
            RouteRequest::new("public", SizeClass::Large),
            RouteRequest::new("private", SizeClass::Medium),
            RouteRequest::new("private2", SizeClass::Small),
        ]))
        .unwrap());
    }

    #[test]
    fn test_plan_rejects_subnets_past_32_bits() {
        let request = ClusterRequest {
            provider: Provider::Aws,
            cidr: cidr("10.0.0.0/28"),
            regions: vec![RegionRequest::new("only", "us-west-2", 1)],
            routes: vec![
                RouteRequest::new("a", SizeClass::Large),
                RouteRequest::new("b", SizeClass::Medium),
                RouteRequest::new("c", SizeClass::Small),
            ],
        };
        let err = plan_cluster(&request).unwrap_err();
        assert!(matches!(err, PlanError::CidrTooSmall { .. }), "{err:?}");
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_plan_cluster_three_routes() {
        let request = three_regions(vec![
            RouteRequest::new("public", SizeClass::Large),
            RouteRequest::new("private", SizeClass::Medium),
            RouteRequest::new("private2", SizeClass::Small),
        ]);
        let cluster = plan_cluster(&request).unwrap();

        assert_eq!(cluster.address_count, 131072);
        assert_eq!(cluster.children.len(), 3);
        assert_eq!(cluster.free_blocks.len(), 1);
        assert_eq!(cluster.free_blocks[0].cidr, cidr("10.1.128.0/17"));

        for vpc in &cluster.children {
            assert_eq!(vpc.kind, NodeKind::Region);
            assert_eq!(vpc.address_count, 32768);
            assert_eq!(vpc.children.len(), 3);
            for zone in &vpc.children {
                assert_eq!(zone.address_count, 8192);
                assert_eq!(zone.children.len(), 3);
                assert_eq!(zone.free_blocks.len(), 1);
                assert_eq!(zone.children[0].address_count, 4091);
                assert_eq!(zone.children[1].address_count, 2043);
                assert_eq!(zone.children[2].address_count, 1019);
                assert_eq!(zone.free_blocks[0].address_count, 1024);
            }
        }

        let vpc = &cluster.children[0];
        assert_eq!(vpc.name, "prod");
        assert_eq!(vpc.cidr, cidr("10.0.0.0/17"));
        let zone = &vpc.children[0];
        assert_eq!(zone.name, "a");
        assert_eq!(zone.location.as_deref(), Some("us-west-2a"));
        assert_eq!(zone.cidr, cidr("10.0.0.0/19"));
        assert_eq!(zone.children[0].name, "public");
        assert_eq!(zone.children[0].cidr, cidr("10.0.0.0/20"));
        assert_eq!(zone.children[1].cidr, cidr("10.0.16.0/21"));
        assert_eq!(zone.children[2].cidr, cidr("10.0.24.0/22"));
        assert_eq!(zone.free_blocks[0].cidr, cidr("10.0.28.0/22"));
        assert_eq!(vpc.children[2].location.as_deref(), Some("us-west-2c"));
        assert_eq!(cluster.children[2].cidr, cidr("10.1.0.0/17"));
    }

    #[test]
    fn test_plan_cluster_two_routes() {
        let request = three_regions(vec![
            RouteRequest::new("public", SizeClass::Large),
            RouteRequest::new("private", SizeClass::Medium),
        ]);
        let cluster = plan_cluster(&request).unwrap();
        let zone = &cluster.children[0].children[0];
        assert_eq!(zone.children.len(), 2);
        assert_eq!(zone.children[0].address_count, 4091);
        assert_eq!(zone.children[1].address_count, 2043);
        assert_eq!(zone.children[0].cidr, cidr("10.0.0.0/20"));
        assert_eq!(zone.children[1].cidr, cidr("10.0.16.0/21"));
        assert_eq!(zone.free_blocks.len(), 1);
        assert_eq!(zone.free_blocks[0].cidr, cidr("10.0.24.0/21"));
        assert_eq!(zone.free_blocks[0].address_count, 2048);
    }

    #[test]
    fn test_plan_every_level_is_fully_covered() {
        let request = three_regions(vec![
            RouteRequest::new("a", SizeClass::Medium),
            RouteRequest::new("b", SizeClass::Small),
            RouteRequest::new("c", SizeClass::Small),
            RouteRequest::new("d", SizeClass::Medium),
        ]);
        let cluster = plan_cluster(&request).unwrap();
        for node in cluster.walk() {
            if node.kind != NodeKind::Subnet {
                assert_eq!(node.covered_address_count(), node.cidr.address_count(), "{node}");
            } else {
                assert!(node.cidr.is_aligned(), "{node}");
            }
        }
    }

    #[test]
    fn test_plan_generic_has_no_reservation() {
        let mut request = three_regions(vec![RouteRequest::new("only", SizeClass::Medium)]);
        request.provider = Provider::Generic;
        let cluster = plan_cluster(&request).unwrap();
        let subnet = &cluster.children[0].children[0].children[0];
        assert_eq!(subnet.address_count, subnet.cidr.address_count());
    }

    #[test]
    fn test_plan_rejects_misaligned_root() {
        let mut request = three_regions(vec![]);
        request.cidr = cidr("10.0.8.0/20");
        assert_eq!(
            plan_cluster(&request).unwrap_err(),
            PlanError::Misaligned {
                cidr: cidr("10.0.8.0/20"),
                aligned: cidr("10.0.0.0/20")
            }
        );
    }

    #[test]
    fn test_plan_rejects_before_carving() {
        let mut request = three_regions(vec![RouteRequest::new("a", SizeClass::Small)]);
        request.cidr = cidr("10.0.0.0/28");
        assert!(matches!(
            plan_cluster(&request),
            Err(PlanError::CidrTooSmall { .. })
        ));

        let request = three_regions(vec![
            RouteRequest::new("a", SizeClass::Large),
            RouteRequest::new("b", SizeClass::Large),
        ]);
        assert!(matches!(
            plan_cluster(&request),
            Err(PlanError::RouteTooLarge { .. })
        ));
    }

    #[test]
    fn test_plan_large_cluster_caps_regions() {
        let request = ClusterRequest {
            provider: Provider::Aws,
            cidr: cidr("10.0.0.0/12"),
            regions: vec![
                RegionRequest::new("us1", "us-west-2", 3),
                RegionRequest::new("us2", "us-east-2", 3),
            ],
            routes: vec![RouteRequest::new("private", SizeClass::Medium)],
        };
        let cluster = plan_cluster(&request).unwrap();
        assert_eq!(cluster.children[0].cidr, cidr("10.0.0.0/16"));
        assert_eq!(cluster.children[1].cidr, cidr("10.4.0.0/16"));
        assert_eq!(cluster.children[1].location.as_deref(), Some("us-east-2"));
        assert_eq!(cluster.covered_address_count(), 1 << 20);
    }
}
