use fleetmon_common::types::{CloudProvider, Database, HealthStatus, Trend};
use serde::Serialize;

use crate::group::{count_healthy, count_status, group_by_cloud_and_region};

/// Rollup for one cloud+region pair, including templated problem
/// highlights for the region card.
#[derive(Debug, Clone, Serialize)]
pub struct RegionAggregate {
    pub cloud: CloudProvider,
    pub region: String,
    pub database_count: usize,
    pub critical_count: usize,
    pub warning_count: usize,
    pub avg_health_score: f64,
    pub monthly_cost: f64,
    pub top_issues: Vec<String>,
}

/// Rollup for one cloud provider with nested region aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct CloudAggregate {
    pub cloud: CloudProvider,
    pub database_count: usize,
    pub healthy_count: usize,
    pub warning_count: usize,
    pub critical_count: usize,
    pub monthly_cost: f64,
    pub avg_health_score: f64,
    pub dominant_cost_trend: Trend,
    pub regions: Vec<RegionAggregate>,
}

/// Per-cloud rollups with nested regions, regions sorted by name.
///
/// An empty fleet yields an empty list; averages never divide by zero.
/// The -1 unknown sentinel participates in score averages as-is.
pub fn aggregate_by_cloud(databases: &[Database]) -> Vec<CloudAggregate> {
    let mut aggregates = Vec::new();

    for (cloud, regions) in group_by_cloud_and_region(databases) {
        let members: Vec<&Database> = regions.values().flatten().copied().collect();

        let region_aggregates: Vec<RegionAggregate> = regions
            .iter()
            .map(|(region, dbs)| region_aggregate(cloud, region, dbs))
            .collect();

        aggregates.push(CloudAggregate {
            cloud,
            database_count: members.len(),
            healthy_count: count_healthy(&members),
            warning_count: count_status(&members, HealthStatus::Warning),
            critical_count: count_status(&members, HealthStatus::Critical),
            monthly_cost: members.iter().map(|db| db.monthly_cost).sum(),
            avg_health_score: mean_health_score(&members),
            dominant_cost_trend: dominant_trend(&members),
            regions: region_aggregates,
        });
    }

    aggregates
}

fn region_aggregate(cloud: CloudProvider, region: &str, databases: &[&Database]) -> RegionAggregate {
    RegionAggregate {
        cloud,
        region: region.to_string(),
        database_count: databases.len(),
        critical_count: count_status(databases, HealthStatus::Critical),
        warning_count: count_status(databases, HealthStatus::Warning),
        avg_health_score: mean_health_score(databases),
        monthly_cost: databases.iter().map(|db| db.monthly_cost).sum(),
        top_issues: top_issues(databases),
    }
}

fn mean_health_score(databases: &[&Database]) -> f64 {
    if databases.is_empty() {
        return 0.0;
    }
    let total: i64 = databases.iter().map(|db| i64::from(db.health_score)).sum();
    total as f64 / databases.len() as f64
}

/// Majority cost trend across the group; any tie falls back to stable.
fn dominant_trend(databases: &[&Database]) -> Trend {
    let mut up = 0usize;
    let mut down = 0usize;
    let mut stable = 0usize;
    for db in databases {
        match db.cost_trend {
            Trend::Up => up += 1,
            Trend::Down => down += 1,
            Trend::Stable => stable += 1,
        }
    }
    if up > down && up > stable {
        Trend::Up
    } else if down > up && down > stable {
        Trend::Down
    } else {
        Trend::Stable
    }
}

/// Fixed-threshold problem highlights: CPU, memory or storage at 85%
/// and above, connections at 90% of the pool, latency at or above
/// 100ms.
fn top_issues(databases: &[&Database]) -> Vec<String> {
    let mut issues = Vec::new();
    for db in databases {
        let m = &db.metrics;
        if m.cpu >= 85.0 {
            issues.push(format!("High CPU on {} ({}%)", db.name, m.cpu));
        }
        if m.memory >= 85.0 {
            issues.push(format!("High memory on {} ({}%)", db.name, m.memory));
        }
        if m.storage >= 85.0 {
            issues.push(format!("Storage almost full on {} ({}%)", db.name, m.storage));
        }
        if f64::from(m.connections) >= f64::from(m.max_connections) * 0.9 {
            issues.push(format!(
                "Connection pool near limit on {} ({}/{})",
                db.name, m.connections, m.max_connections
            ));
        }
        if m.latency_ms >= 100.0 {
            issues.push(format!("Elevated latency on {} ({}ms)", db.name, m.latency_ms));
        }
    }
    issues
}
