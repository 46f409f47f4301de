//! Output formatting for planned clusters.
//!
//! This module renders a finished plan, read-only:
//! - [`csv`] - CSV output, one row per block
//! - [`json`] - JSON document of regions, zones and subnets
//! - [`tree`] - Indented tree with address stats
//! - [`terraform`] - terraform-aws-modules VPC module calls
//! - [`pulumi`] - awsx VPC declarations
//! - [`terminal`] - Field and color helpers

mod csv;
mod json;
mod pulumi;
mod subnet_role;
mod terminal;
mod terraform;
mod tree;

pub use csv::{block_rows, render_csv, BlockRow};
pub use json::{render_json, to_json};
pub use pulumi::{render_pulumi, render_pulumi_vpc};
pub use subnet_role::SubnetRole;
pub use terminal::format_field;
pub use terraform::{render_terraform, render_vpc_module, render_vpc_routes};
pub use tree::render_tree;
