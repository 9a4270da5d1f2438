use fleetmon_common::types::{
    CloudProvider, Database, DatabaseCost, DbEngine, HealthStatus, Issue, IssueStatus, Severity,
};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Executive rollup of the whole fleet for the overview header.
#[derive(Debug, Clone, Serialize)]
pub struct FleetOverview<'a> {
    pub total_databases: usize,
    pub healthy_count: usize,
    pub warning_count: usize,
    pub critical_count: usize,
    pub unknown_count: usize,
    pub avg_health_score: f64,
    pub total_monthly_cost: f64,
    /// Mean of the per-database cost-trend percent changes.
    pub avg_cost_trend_percent: f64,
    pub active_issue_count: usize,
    pub critical_issue_count: usize,
    pub by_cloud: BTreeMap<CloudProvider, usize>,
    pub by_engine: BTreeMap<DbEngine, usize>,
    /// Worst five active issues, critical first, newest first.
    pub top_issues: Vec<&'a Issue>,
}

/// Fleet-wide executive summary. Empty input produces zero counts and
/// zero averages rather than NaN.
pub fn fleet_overview<'a>(
    databases: &[Database],
    issues: &'a [Issue],
    costs: &[DatabaseCost],
) -> FleetOverview<'a> {
    let mut by_cloud: BTreeMap<CloudProvider, usize> = BTreeMap::new();
    let mut by_engine: BTreeMap<DbEngine, usize> = BTreeMap::new();
    for db in databases {
        *by_cloud.entry(db.cloud).or_insert(0) += 1;
        *by_engine.entry(db.engine).or_insert(0) += 1;
    }

    let avg_health_score = if databases.is_empty() {
        0.0
    } else {
        let total: i64 = databases.iter().map(|db| i64::from(db.health_score)).sum();
        total as f64 / databases.len() as f64
    };

    let avg_cost_trend_percent = if costs.is_empty() {
        0.0
    } else {
        let total: f64 = costs.iter().map(|cost| cost.trend.change_percent).sum();
        total / costs.len() as f64
    };

    let active: Vec<&Issue> = issues
        .iter()
        .filter(|issue| issue.status == IssueStatus::Active)
        .collect();
    let critical_issue_count = active
        .iter()
        .filter(|issue| issue.severity == Severity::Critical)
        .count();

    let mut top_issues = active.clone();
    top_issues.sort_by_key(|issue| (Reverse(issue.severity), Reverse(issue.detected_at)));
    top_issues.truncate(5);

    FleetOverview {
        total_databases: databases.len(),
        healthy_count: databases.iter().filter(|db| db.health_status.is_healthy()).count(),
        warning_count: databases
            .iter()
            .filter(|db| db.health_status == HealthStatus::Warning)
            .count(),
        critical_count: databases
            .iter()
            .filter(|db| db.health_status == HealthStatus::Critical)
            .count(),
        unknown_count: databases
            .iter()
            .filter(|db| db.health_status == HealthStatus::Unknown)
            .count(),
        avg_health_score,
        total_monthly_cost: databases.iter().map(|db| db.monthly_cost).sum(),
        avg_cost_trend_percent,
        active_issue_count: active.len(),
        critical_issue_count,
        by_cloud,
        by_engine,
        top_issues,
    }
}
