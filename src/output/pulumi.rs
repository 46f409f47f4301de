//! Pulumi (awsx) program for the planned VPCs.

use super::subnet_role::SubnetRole;
use crate::models::AllocationNode;

fn subnet_entry(kind: &str, subnet: &AllocationNode) -> String {
    format!(
        r#"        {{
            type: "{kind}",
            name: "{name}",
            location: {{cidrBlock: "{cidr}", availabilityZone: "{zone}"}},
            tags: vpc_common_tags,
        }},"#,
        name = subnet.name,
        cidr = subnet.cidr,
        zone = subnet.location.as_deref().unwrap_or_default(),
    )
}

/// The `awsx.ec2.Vpc` declaration for one VPC.
///
/// Subnets are listed private first, then public, then isolated, each in
/// zone order.
pub fn render_pulumi_vpc(vpc: &AllocationNode) -> String {
    let subnets: Vec<&AllocationNode> = vpc.children.iter().flat_map(|z| &z.children).collect();

    let mut parts = vec![format!(
        r#"
vpcs["{name}"] = new awsx.ec2.Vpc("{name}", {{
    cidrBlock: "{cidr}",
    numberOfAvailabilityZones: "all",
    subnets: ["#,
        name = vpc.name,
        cidr = vpc.cidr,
    )];
    for (role, kind) in [
        (SubnetRole::Private, "private"),
        (SubnetRole::Public, "public"),
        (SubnetRole::Intra, "isolated"),
    ] {
        parts.extend(
            subnets
                .iter()
                .filter(|s| SubnetRole::of(&s.name) == role)
                .map(|s| subnet_entry(kind, s)),
        );
    }
    parts.push(
        r#"    ],
    tags: vpc_common_tags,
});"#
            .to_string(),
    );
    parts.join("\n")
}

/// Pulumi program declaring every VPC of a planned cluster.
pub fn render_pulumi(cluster: &AllocationNode) -> String {
    let mut parts = vec![
        r#"import * as awsx from "@pulumi/awsx";"#.to_string(),
        r#"
const vpc_common_tags = {
    "Terraform": "true",
    "Source": "vpc-planner",
};
const vpcs: { [index: string]: awsx.ec2.Vpc } = {};"#
            .to_string(),
    ];
    parts.extend(cluster.children.iter().map(render_pulumi_vpc));
    parts.push("\nexport {vpcs};".to_string());
    parts.join("\n")
}
