//! Pure aggregation views over a database fleet.
//!
//! Every function here groups or summarizes a `&[Database]` slice
//! without mutating it. Results borrow the input and are cheap to
//! recompute per call.

pub mod cloud;
pub mod geo;
pub mod group;
pub mod overview;
pub mod tree;

#[cfg(test)]
mod tests;

pub use cloud::{aggregate_by_cloud, CloudAggregate, RegionAggregate};
pub use geo::{marker_color, marker_size, region_markers, RegionMarker};
pub use group::{all_regions, group_by_cloud_and_region, region_groups, RegionGroup};
pub use overview::{fleet_overview, FleetOverview};
pub use tree::{build_database_tree, databases_for_node, NodeKind, TreeNode, MAX_TREE_DATABASES};
