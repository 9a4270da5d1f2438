use fleetmon_common::types::{CloudProvider, Database, HealthStatus};
use serde::Serialize;
use std::collections::BTreeMap;

/// Flat heatmap cell: one cloud+region pair with its health tallies.
#[derive(Debug, Clone, Serialize)]
pub struct RegionGroup<'a> {
    pub cloud: CloudProvider,
    pub region: String,
    pub databases: Vec<&'a Database>,
    pub critical_count: usize,
    pub warning_count: usize,
    /// Excellent plus good.
    pub healthy_count: usize,
}

/// Groups the fleet by cloud, then region. Only clouds and regions
/// actually present in the input appear as keys.
pub fn group_by_cloud_and_region(
    databases: &[Database],
) -> BTreeMap<CloudProvider, BTreeMap<String, Vec<&Database>>> {
    let mut clouds: BTreeMap<CloudProvider, BTreeMap<String, Vec<&Database>>> = BTreeMap::new();
    for db in databases {
        clouds
            .entry(db.cloud)
            .or_default()
            .entry(db.region.clone())
            .or_default()
            .push(db);
    }
    clouds
}

/// All distinct regions across the fleet, sorted by name.
pub fn all_regions(databases: &[Database]) -> Vec<String> {
    let mut regions: Vec<String> = databases.iter().map(|db| db.region.clone()).collect();
    regions.sort();
    regions.dedup();
    regions
}

/// One heatmap cell per cloud+region pair.
pub fn region_groups(databases: &[Database]) -> Vec<RegionGroup<'_>> {
    let mut groups = Vec::new();
    for (cloud, regions) in group_by_cloud_and_region(databases) {
        for (region, dbs) in regions {
            groups.push(RegionGroup {
                cloud,
                region,
                critical_count: count_status(&dbs, HealthStatus::Critical),
                warning_count: count_status(&dbs, HealthStatus::Warning),
                healthy_count: count_healthy(&dbs),
                databases: dbs,
            });
        }
    }
    groups
}

pub(crate) fn count_status(databases: &[&Database], status: HealthStatus) -> usize {
    databases.iter().filter(|db| db.health_status == status).count()
}

pub(crate) fn count_healthy(databases: &[&Database]) -> usize {
    databases.iter().filter(|db| db.health_status.is_healthy()).count()
}
