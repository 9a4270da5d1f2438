//! Heuristic insight and recommendation lines derived from fleet state.

use fleetmon_common::types::{Database, HealthStatus, Issue, IssueCategory, IssueStatus, Severity};
use std::collections::BTreeMap;

/// Cap on each merged list produced by [`fleet_insights`].
pub const MAX_INSIGHTS: usize = 5;

/// Health-derived observations: state counts first, then resource
/// pressure above the 80% line.
pub fn health_insights(databases: &[Database]) -> Vec<String> {
    let mut insights = Vec::new();

    let critical = databases
        .iter()
        .filter(|db| db.health_status == HealthStatus::Critical)
        .count();
    if critical > 0 {
        insights.push(format!(
            "{critical} database(s) in critical state requiring immediate attention"
        ));
    }

    let warning = databases
        .iter()
        .filter(|db| db.health_status == HealthStatus::Warning)
        .count();
    if warning > 0 {
        insights.push(format!(
            "{warning} database(s) showing warning signs that should be monitored"
        ));
    }

    let high_cpu = databases.iter().filter(|db| db.metrics.cpu > 80.0).count();
    if high_cpu > 0 {
        insights.push(format!(
            "{high_cpu} database(s) experiencing high CPU usage (>80%)"
        ));
    }

    let high_memory = databases.iter().filter(|db| db.metrics.memory > 80.0).count();
    if high_memory > 0 {
        insights.push(format!(
            "{high_memory} database(s) with high memory utilization (>80%)"
        ));
    }

    let high_storage = databases.iter().filter(|db| db.metrics.storage > 80.0).count();
    if high_storage > 0 {
        insights.push(format!(
            "{high_storage} database(s) running low on storage space (>80% used)"
        ));
    }

    insights
}

/// Issue-derived observations plus the remediation lines that follow
/// directly from them.
pub fn issue_insights(issues: &[Issue]) -> (Vec<String>, Vec<String>) {
    let mut insights = Vec::new();
    let mut recommendations = Vec::new();

    let critical = issues
        .iter()
        .filter(|issue| issue.severity == Severity::Critical)
        .count();
    if critical > 0 {
        insights.push(format!(
            "{critical} critical issue(s) detected across monitored databases"
        ));
        recommendations
            .push("Address critical issues immediately to prevent service disruption".to_string());
    }

    let warning = issues
        .iter()
        .filter(|issue| issue.severity == Severity::Warning)
        .count();
    if warning > 0 {
        insights.push(format!("{warning} warning-level issue(s) requiring attention"));
    }

    let mut by_category: BTreeMap<IssueCategory, usize> = BTreeMap::new();
    for issue in issues {
        *by_category.entry(issue.category).or_insert(0) += 1;
    }
    if let Some((category, count)) = by_category.iter().max_by_key(|(_, count)| **count) {
        insights.push(format!(
            "Most common issue category: {category} ({count} occurrences)"
        ));
    }

    (insights, recommendations)
}

/// Capacity and performance recommendations from current metrics and
/// the unresolved-issue backlog.
pub fn fleet_recommendations(databases: &[Database], issues: &[Issue]) -> Vec<String> {
    let mut recommendations = Vec::new();

    let near_pool_limit = databases
        .iter()
        .filter(|db| {
            db.metrics.max_connections > 0
                && f64::from(db.metrics.connections) / f64::from(db.metrics.max_connections) > 0.8
        })
        .count();
    if near_pool_limit > 0 {
        recommendations.push(format!(
            "Consider increasing connection pool limits for {near_pool_limit} database(s) approaching capacity"
        ));
    }

    let slow = databases
        .iter()
        .filter(|db| db.metrics.latency_ms > 100.0)
        .count();
    if slow > 0 {
        recommendations.push(format!(
            "Investigate query performance on {slow} database(s) with high latency (>100ms)"
        ));
    }

    let storage_pressed = databases.iter().filter(|db| db.metrics.storage > 85.0).count();
    if storage_pressed > 0 {
        recommendations.push(format!(
            "Plan storage expansion for {storage_pressed} database(s) approaching capacity limits"
        ));
    }

    let unresolved = issues
        .iter()
        .filter(|issue| {
            matches!(issue.status, IssueStatus::Active | IssueStatus::Acknowledged)
        })
        .count();
    if unresolved > 0 {
        recommendations.push(format!(
            "{unresolved} unresolved issue(s) require investigation and remediation"
        ));
    }

    recommendations
}

/// Merged insight and recommendation lists, each capped at
/// [`MAX_INSIGHTS`]. Health observations come before issue
/// observations; issue remediations come before general ones.
pub fn fleet_insights(databases: &[Database], issues: &[Issue]) -> (Vec<String>, Vec<String>) {
    let mut insights = health_insights(databases);
    let (issue_notes, mut recommendations) = issue_insights(issues);
    insights.extend(issue_notes);
    insights.truncate(MAX_INSIGHTS);

    recommendations.extend(fleet_recommendations(databases, issues));
    recommendations.truncate(MAX_INSIGHTS);

    (insights, recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use fleetmon_common::health::status_for_score;
    use fleetmon_common::types::{
        CloudProvider, DbEngine, Environment, ResourceMetrics, Trend,
    };
    use std::collections::BTreeMap;

    fn make_db(id: &str, score: i32, metrics: ResourceMetrics) -> Database {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        Database {
            id: id.to_string(),
            name: format!("{id}-name"),
            engine: DbEngine::Postgres,
            cloud: CloudProvider::Aws,
            region: "us-east-1".to_string(),
            environment: Environment::Production,
            health_score: score,
            health_status: status_for_score(score),
            health_trend: Trend::Stable,
            metrics,
            active_issues: 0,
            recent_changes: 0,
            monthly_cost: 100.0,
            cost_trend: Trend::Stable,
            created_at: now - Duration::days(10),
            last_checked: now,
            tags: BTreeMap::new(),
        }
    }

    fn calm_metrics() -> ResourceMetrics {
        ResourceMetrics {
            cpu: 30.0,
            memory: 40.0,
            storage: 50.0,
            connections: 20,
            max_connections: 100,
            latency_ms: 20.0,
            throughput_qps: 900.0,
        }
    }

    fn make_issue(id: &str, severity: Severity, category: IssueCategory, status: IssueStatus) -> Issue {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        Issue {
            id: id.to_string(),
            database_id: "db-1".to_string(),
            database_name: "db-1-name".to_string(),
            severity,
            category,
            status,
            title: "High CPU usage detected".to_string(),
            description: "CPU saturated".to_string(),
            explanation: "Sustained load".to_string(),
            recommendation: "Scale up".to_string(),
            detected_at: now,
            first_seen: now - Duration::hours(2),
            last_seen: now,
            occurrences: 3,
            related_metrics: vec!["cpu".to_string()],
            related_logs: Vec::new(),
            related_changes: Vec::new(),
        }
    }

    #[test]
    fn healthy_quiet_fleet_yields_nothing() {
        let fleet = vec![make_db("db-1", 96, calm_metrics())];

        assert!(health_insights(&fleet).is_empty());
        let (insights, recommendations) = issue_insights(&[]);
        assert!(insights.is_empty());
        assert!(recommendations.is_empty());
        assert!(fleet_recommendations(&fleet, &[]).is_empty());
    }

    #[test]
    fn health_insights_cover_state_and_resource_pressure() {
        let hot = ResourceMetrics {
            cpu: 92.0,
            memory: 85.0,
            storage: 88.0,
            ..calm_metrics()
        };
        let fleet = vec![make_db("db-1", 45, hot), make_db("db-2", 75, calm_metrics())];

        let insights = health_insights(&fleet);
        assert_eq!(
            insights,
            vec![
                "1 database(s) in critical state requiring immediate attention",
                "1 database(s) showing warning signs that should be monitored",
                "1 database(s) experiencing high CPU usage (>80%)",
                "1 database(s) with high memory utilization (>80%)",
                "1 database(s) running low on storage space (>80% used)",
            ]
        );
    }

    #[test]
    fn issue_insights_report_severity_and_top_category() {
        let issues = vec![
            make_issue("i-1", Severity::Critical, IssueCategory::Performance, IssueStatus::Active),
            make_issue("i-2", Severity::Warning, IssueCategory::Capacity, IssueStatus::Active),
            make_issue("i-3", Severity::Warning, IssueCategory::Capacity, IssueStatus::Active),
        ];

        let (insights, recommendations) = issue_insights(&issues);
        assert_eq!(
            insights,
            vec![
                "1 critical issue(s) detected across monitored databases",
                "2 warning-level issue(s) requiring attention",
                "Most common issue category: capacity (2 occurrences)",
            ]
        );
        assert_eq!(
            recommendations,
            vec!["Address critical issues immediately to prevent service disruption"]
        );
    }

    #[test]
    fn recommendations_fire_on_pool_latency_storage_and_backlog() {
        let pressed = ResourceMetrics {
            storage: 90.0,
            connections: 85,
            max_connections: 100,
            latency_ms: 150.0,
            ..calm_metrics()
        };
        let fleet = vec![make_db("db-1", 96, pressed)];
        let issues = vec![
            make_issue("i-1", Severity::Warning, IssueCategory::Capacity, IssueStatus::Active),
            make_issue("i-2", Severity::Warning, IssueCategory::Capacity, IssueStatus::Resolved),
        ];

        let recommendations = fleet_recommendations(&fleet, &issues);
        assert_eq!(
            recommendations,
            vec![
                "Consider increasing connection pool limits for 1 database(s) approaching capacity",
                "Investigate query performance on 1 database(s) with high latency (>100ms)",
                "Plan storage expansion for 1 database(s) approaching capacity limits",
                "1 unresolved issue(s) require investigation and remediation",
            ]
        );
    }

    #[test]
    fn merged_lists_cap_at_five() {
        let hot = ResourceMetrics {
            cpu: 92.0,
            memory: 85.0,
            storage: 88.0,
            connections: 85,
            latency_ms: 150.0,
            ..calm_metrics()
        };
        let fleet = vec![make_db("db-1", 45, hot), make_db("db-2", 75, calm_metrics())];
        let issues = vec![make_issue(
            "i-1",
            Severity::Critical,
            IssueCategory::Performance,
            IssueStatus::Active,
        )];

        let (insights, recommendations) = fleet_insights(&fleet, &issues);
        assert_eq!(insights.len(), MAX_INSIGHTS);
        assert_eq!(recommendations.len(), MAX_INSIGHTS);
        assert_eq!(
            insights[0],
            "1 database(s) in critical state requiring immediate attention"
        );
        assert_eq!(
            recommendations[0],
            "Address critical issues immediately to prevent service disruption"
        );
    }
}
