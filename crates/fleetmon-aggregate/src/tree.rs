use fleetmon_common::types::{CloudProvider, Database, HealthStatus};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::group::{count_healthy, count_status};

/// How many database leaves a region node exposes before truncating.
/// The UI derives its "+N more" affordance from the region counts.
pub const MAX_TREE_DATABASES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Cloud,
    Region,
    Database,
}

/// One navigator entry. Cloud and region nodes carry children; database
/// nodes carry the record itself. Counts on a region node cover every
/// database in the region, not just the visible leaves.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode<'a> {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub cloud: CloudProvider,
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'a Database>,
    pub children: Vec<TreeNode<'a>>,
    pub critical_count: usize,
    pub warning_count: usize,
    pub healthy_count: usize,
}

/// Builds the cloud > region > database navigator.
///
/// Clouds sort alphabetically by label. Regions within a cloud sort by
/// critical count, then warning count, then name. Database leaves sort
/// worst-first and are capped at [`MAX_TREE_DATABASES`].
pub fn build_database_tree(databases: &[Database]) -> Vec<TreeNode<'_>> {
    let mut by_cloud: BTreeMap<CloudProvider, Vec<&Database>> = BTreeMap::new();
    for db in databases {
        by_cloud.entry(db.cloud).or_default().push(db);
    }

    let mut tree = Vec::new();

    for (cloud, cloud_dbs) in by_cloud {
        let mut by_region: BTreeMap<String, Vec<&Database>> = BTreeMap::new();
        for db in &cloud_dbs {
            by_region.entry(db.region.clone()).or_default().push(*db);
        }

        let mut region_nodes: Vec<TreeNode<'_>> = by_region
            .into_iter()
            .map(|(region, region_dbs)| region_node(cloud, region, region_dbs))
            .collect();

        region_nodes.sort_by(|a, b| {
            b.critical_count
                .cmp(&a.critical_count)
                .then(b.warning_count.cmp(&a.warning_count))
                .then(a.label.cmp(&b.label))
        });

        tree.push(TreeNode {
            id: format!("cloud-{cloud}"),
            kind: NodeKind::Cloud,
            label: cloud.label().to_string(),
            cloud,
            region: None,
            database: None,
            critical_count: count_status(&cloud_dbs, HealthStatus::Critical),
            warning_count: count_status(&cloud_dbs, HealthStatus::Warning),
            healthy_count: count_healthy(&cloud_dbs),
            children: region_nodes,
        });
    }

    tree.sort_by(|a, b| a.label.cmp(&b.label));
    tree
}

fn region_node(cloud: CloudProvider, region: String, mut databases: Vec<&Database>) -> TreeNode<'_> {
    databases.sort_by_key(|db| db.health_status.sort_rank());

    let children: Vec<TreeNode<'_>> = databases
        .iter()
        .take(MAX_TREE_DATABASES)
        .map(|db| database_node(cloud, &region, *db))
        .collect();

    TreeNode {
        id: format!("region-{cloud}-{region}"),
        kind: NodeKind::Region,
        label: region.clone(),
        cloud,
        region: Some(region),
        database: None,
        critical_count: count_status(&databases, HealthStatus::Critical),
        warning_count: count_status(&databases, HealthStatus::Warning),
        healthy_count: count_healthy(&databases),
        children,
    }
}

fn database_node<'a>(cloud: CloudProvider, region: &str, db: &'a Database) -> TreeNode<'a> {
    TreeNode {
        id: format!("db-{}", db.id),
        kind: NodeKind::Database,
        label: db.name.clone(),
        cloud,
        region: Some(region.to_string()),
        database: Some(db),
        children: Vec::new(),
        critical_count: usize::from(db.health_status == HealthStatus::Critical),
        warning_count: usize::from(db.health_status == HealthStatus::Warning),
        healthy_count: usize::from(db.health_status.is_healthy()),
    }
}

/// Resolves a node back to its databases in the full fleet.
pub fn databases_for_node<'a>(node: &TreeNode<'a>, databases: &'a [Database]) -> Vec<&'a Database> {
    match node.kind {
        NodeKind::Database => node.database.into_iter().collect(),
        NodeKind::Region => match &node.region {
            Some(region) => databases
                .iter()
                .filter(|db| db.cloud == node.cloud && &db.region == region)
                .collect(),
            None => Vec::new(),
        },
        NodeKind::Cloud => databases.iter().filter(|db| db.cloud == node.cloud).collect(),
    }
}
