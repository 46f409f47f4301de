//! Terraform code for the planned VPCs, one `terraform-aws-modules/vpc`
//! module call per VPC with subnet CIDRs kept in a `locals` block.

use super::subnet_role::SubnetRole;
use crate::models::AllocationNode;

/// Quoted subnet CIDRs of a VPC grouped by route, in first-seen order.
fn route_cidrs(vpc: &AllocationNode) -> Vec<(&str, Vec<String>)> {
    let mut routes: Vec<(&str, Vec<String>)> = Vec::new();
    for zone in &vpc.children {
        for subnet in &zone.children {
            let cidr = format!("\"{}\"", subnet.cidr);
            match routes.iter().position(|(name, _)| *name == subnet.name) {
                Some(i) => routes[i].1.push(cidr),
                None => routes.push((subnet.name.as_str(), vec![cidr])),
            }
        }
    }
    routes
}

/// The `subnet_routes` entry for one VPC.
pub fn render_vpc_routes(vpc: &AllocationNode) -> String {
    let mut parts = vec![format!("    \"{}\" = {{", vpc.name)];
    for (route, cidrs) in route_cidrs(vpc) {
        parts.push(format!("      \"{route}\" = [{}]", cidrs.join(", ")));
    }
    parts.push("    }".to_string());
    parts.join("\n")
}

/// The module call for one VPC. Subnet lists with no routes are left out.
pub fn render_vpc_module(vpc: &AllocationNode) -> String {
    let azs: Vec<String> = vpc
        .children
        .iter()
        .filter_map(|zone| zone.location.as_ref())
        .map(|zone| format!("\"{zone}\""))
        .collect();

    let mut public_subnets = Vec::new();
    let mut private_subnets = Vec::new();
    for (route, _) in route_cidrs(vpc) {
        let local = format!("local.subnet_routes[\"{}\"][\"{route}\"]", vpc.name);
        match SubnetRole::of(route) {
            SubnetRole::Public => public_subnets.push(local),
            _ => private_subnets.push(local),
        }
    }

    let mut out = format!(
        r#"
module "vpc-{name}" {{
  source = "terraform-aws-modules/vpc/aws"

  name = "{name}"
  cidr = "{cidr}"

  azs             = [{azs}]
"#,
        name = vpc.name,
        cidr = vpc.cidr,
        azs = azs.join(", ")
    );
    if !private_subnets.is_empty() {
        out.push_str(&format!(
            "  private_subnets = concat({})\n",
            private_subnets.join(", ")
        ));
    }
    if !public_subnets.is_empty() {
        out.push_str(&format!(
            "  public_subnets  = concat({})\n",
            public_subnets.join(", ")
        ));
    }
    out.push_str(
        r#"
  enable_nat_gateway = true
  enable_vpn_gateway = true

  tags = local.vpc_common_tags
}"#,
    );
    out
}

/// Terraform for every VPC of a planned cluster.
pub fn render_terraform(cluster: &AllocationNode) -> String {
    let mut parts = vec![
        "locals {".to_string(),
        "  vpc_common_tags = {".to_string(),
        "    Terraform = \"true\"".to_string(),
        "    Source    = \"vpc-planner\"".to_string(),
        "  }".to_string(),
        String::new(),
        "  subnet_routes = {".to_string(),
    ];
    parts.extend(cluster.children.iter().map(render_vpc_routes));
    parts.push("  }".to_string());
    parts.push("}".to_string());
    parts.extend(cluster.children.iter().map(render_vpc_module));
    parts.join("\n")
}
