//! Markdown report rendering and summarization context assembly.

use chrono::{DateTime, Utc};
use fleetmon_aggregate::{aggregate_by_cloud, fleet_overview};
use fleetmon_common::types::{
    CloudProvider, CostAnomaly, Database, DatabaseCost, HealthStatus, Issue, Severity,
};

use crate::insight::fleet_insights;

/// Problem databases listed in the summarization context.
const MAX_ATTENTION_DATABASES: usize = 20;
/// Critical issues detailed in the summarization context.
const MAX_CONTEXT_ISSUES: usize = 10;
/// Spenders named in the report's cost section.
const MAX_TOP_SPENDERS: usize = 3;

/// Borrowed inputs for one report run.
pub struct ReportContext<'a> {
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub databases: &'a [Database],
    pub issues: &'a [Issue],
    pub costs: &'a [DatabaseCost],
    pub anomalies: &'a [CostAnomaly],
}

/// Renders the fleet status report as markdown. Sections with nothing
/// to say are omitted entirely.
pub fn render_fleet_report(ctx: &ReportContext<'_>) -> String {
    let overview = fleet_overview(ctx.databases, ctx.issues, ctx.costs);
    let clouds = aggregate_by_cloud(ctx.databases);
    let (insights, recommendations) = fleet_insights(ctx.databases, ctx.issues);

    let mut out = String::new();

    out.push_str(&format!(
        "# Fleet Report - {}\n\n",
        ctx.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    out.push_str(&format!("Seed: {}\n\n", ctx.seed));

    out.push_str("## Overview\n\n");
    out.push_str(&format!(
        "- Databases: {} (healthy {}, warning {}, critical {}, unknown {})\n",
        overview.total_databases,
        overview.healthy_count,
        overview.warning_count,
        overview.critical_count,
        overview.unknown_count
    ));
    out.push_str(&format!(
        "- Average health score: {:.1}\n",
        overview.avg_health_score
    ));
    out.push_str(&format!(
        "- Active issues: {} ({} critical)\n\n",
        overview.active_issue_count, overview.critical_issue_count
    ));

    out.push_str("## Clouds\n\n");
    out.push_str(
        "| Cloud | Databases | Healthy | Warning | Critical | Avg score | Monthly cost | Cost trend |\n",
    );
    out.push_str(
        "|-------|-----------|---------|---------|----------|-----------|--------------|------------|\n",
    );
    for cloud in &clouds {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {:.1} | ${:.2} | {} |\n",
            cloud.cloud.label(),
            cloud.database_count,
            cloud.healthy_count,
            cloud.warning_count,
            cloud.critical_count,
            cloud.avg_health_score,
            cloud.monthly_cost,
            cloud.dominant_cost_trend
        ));
    }
    out.push('\n');

    if !insights.is_empty() {
        out.push_str("## Insights\n\n");
        for line in &insights {
            out.push_str(&format!("- {line}\n"));
        }
        out.push('\n');
    }

    if !recommendations.is_empty() {
        out.push_str("## Recommendations\n\n");
        for line in &recommendations {
            out.push_str(&format!("- {line}\n"));
        }
        out.push('\n');
    }

    if !overview.top_issues.is_empty() {
        out.push_str("## Top issues\n\n");
        for issue in &overview.top_issues {
            out.push_str(&format!(
                "- [{}] {} ({})\n",
                issue.severity, issue.title, issue.database_name
            ));
        }
        out.push('\n');
    }

    out.push_str("## Costs\n\n");
    out.push_str(&format!(
        "- Fleet monthly spend: ${:.2}\n",
        overview.total_monthly_cost
    ));
    let forecast: f64 = ctx.costs.iter().map(|cost| cost.forecast.next_month).sum();
    out.push_str(&format!("- Forecast next month: ${forecast:.2}\n"));
    let spenders = top_spenders(ctx.costs);
    if !spenders.is_empty() {
        out.push_str(&format!("- Top spenders: {}\n", spenders.join(", ")));
    }
    out.push('\n');

    if !ctx.anomalies.is_empty() {
        out.push_str("## Cost anomalies\n\n");
        for anomaly in ctx.anomalies {
            out.push_str(&format!(
                "- {}: {} at ${:.2}/month against a ${:.2} baseline\n",
                anomaly.database_name, anomaly.anomaly_type, anomaly.amount, anomaly.baseline
            ));
        }
        out.push('\n');
    }

    out
}

const CONTEXT_TEMPLATE: &str = r#"You are an infrastructure analyst reviewing a multi-cloud database fleet.

# Current Fleet State

**Generated**: {{GENERATED_AT}}

**Overview**:
- Total Databases: {{TOTAL}}
- Healthy: {{HEALTHY}}
- Warning State: {{WARNING}}
- Critical State: {{CRITICAL}}
- Total Issues: {{TOTAL_ISSUES}}
- Critical Issues: {{CRITICAL_ISSUES}}

**Resource Utilization Summary**:
- Average CPU: {{AVG_CPU}}%
- Average Memory: {{AVG_MEMORY}}%
- Average Storage: {{AVG_STORAGE}}%
- Average Latency: {{AVG_LATENCY}}ms

**Databases by Cloud Provider**:
- AWS: {{AWS_COUNT}}
- GCP: {{GCP_COUNT}}
- Azure: {{AZURE_COUNT}}

# Databases Requiring Attention

{{ATTENTION}}

# Critical Issues

{{CRITICAL_DETAIL}}

Answer questions about this fleet from the data above. Reference
databases by name, prioritize critical issues over warnings, and
consider cost implications when relevant.
"#;

/// Builds the context block a summarization assistant would consume.
pub fn summarization_context(ctx: &ReportContext<'_>) -> String {
    let overview = fleet_overview(ctx.databases, ctx.issues, ctx.costs);
    let cloud_count = |cloud: CloudProvider| {
        overview.by_cloud.get(&cloud).copied().unwrap_or(0).to_string()
    };

    CONTEXT_TEMPLATE
        .replace("{{GENERATED_AT}}", &ctx.generated_at.to_rfc3339())
        .replace("{{TOTAL}}", &overview.total_databases.to_string())
        .replace("{{HEALTHY}}", &overview.healthy_count.to_string())
        .replace("{{WARNING}}", &overview.warning_count.to_string())
        .replace("{{CRITICAL}}", &overview.critical_count.to_string())
        .replace("{{TOTAL_ISSUES}}", &ctx.issues.len().to_string())
        .replace(
            "{{CRITICAL_ISSUES}}",
            &overview.critical_issue_count.to_string(),
        )
        .replace("{{AVG_CPU}}", &mean_rounded(ctx.databases, |db| db.metrics.cpu))
        .replace(
            "{{AVG_MEMORY}}",
            &mean_rounded(ctx.databases, |db| db.metrics.memory),
        )
        .replace(
            "{{AVG_STORAGE}}",
            &mean_rounded(ctx.databases, |db| db.metrics.storage),
        )
        .replace(
            "{{AVG_LATENCY}}",
            &mean_rounded(ctx.databases, |db| db.metrics.latency_ms),
        )
        .replace("{{AWS_COUNT}}", &cloud_count(CloudProvider::Aws))
        .replace("{{GCP_COUNT}}", &cloud_count(CloudProvider::Gcp))
        .replace("{{AZURE_COUNT}}", &cloud_count(CloudProvider::Azure))
        .replace("{{ATTENTION}}", &attention_entries(ctx.databases))
        .replace("{{CRITICAL_DETAIL}}", &critical_issue_entries(ctx.issues))
}

fn mean_rounded<F>(databases: &[Database], metric: F) -> String
where
    F: Fn(&Database) -> f64,
{
    if databases.is_empty() {
        return "0".to_string();
    }
    let total: f64 = databases.iter().map(metric).sum();
    format!("{}", (total / databases.len() as f64).round())
}

fn top_spenders(costs: &[DatabaseCost]) -> Vec<String> {
    let mut ranked: Vec<&DatabaseCost> = costs.iter().collect();
    ranked.sort_by(|a, b| b.total_cost.total_cmp(&a.total_cost));
    ranked
        .iter()
        .take(MAX_TOP_SPENDERS)
        .map(|cost| format!("{} (${:.2})", cost.database_name, cost.total_cost))
        .collect()
}

fn attention_entries(databases: &[Database]) -> String {
    let problem: Vec<&Database> = databases
        .iter()
        .filter(|db| {
            db.health_status == HealthStatus::Critical
                || db.health_status == HealthStatus::Warning
                || db.active_issues > 0
        })
        .take(MAX_ATTENTION_DATABASES)
        .collect();

    if problem.is_empty() {
        return "All databases are operating normally.".to_string();
    }

    let blocks: Vec<String> = problem
        .iter()
        .map(|db| {
            format!(
                "**{}** ({} on {})\n\
                 - Health: {} ({}/100)\n\
                 - CPU: {}%, Memory: {}%, Storage: {}%\n\
                 - Latency: {}ms, Throughput: {} qps\n\
                 - Connections: {}/{}\n\
                 - Active Issues: {}\n\
                 - Monthly Cost: ${:.2} ({})",
                db.name,
                db.engine,
                db.cloud.label(),
                db.health_status,
                db.health_score,
                db.metrics.cpu,
                db.metrics.memory,
                db.metrics.storage,
                db.metrics.latency_ms,
                db.metrics.throughput_qps,
                db.metrics.connections,
                db.metrics.max_connections,
                db.active_issues,
                db.monthly_cost,
                db.cost_trend
            )
        })
        .collect();
    blocks.join("\n\n")
}

fn critical_issue_entries(issues: &[Issue]) -> String {
    let critical: Vec<&Issue> = issues
        .iter()
        .filter(|issue| issue.severity == Severity::Critical)
        .take(MAX_CONTEXT_ISSUES)
        .collect();

    if critical.is_empty() {
        return "No critical issues are currently open.".to_string();
    }

    let blocks: Vec<String> = critical
        .iter()
        .map(|issue| {
            format!(
                "**{}** ({})\n\
                 - Severity: {}\n\
                 - Category: {}\n\
                 - Status: {}\n\
                 - Description: {}\n\
                 - Recommendation: {}",
                issue.title,
                issue.database_name,
                issue.severity,
                issue.category,
                issue.status,
                issue.description,
                issue.recommendation
            )
        })
        .collect();
    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fleetmon_synth::{FleetSnapshot, SnapshotConfig};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn snapshot(seed: u64, databases: usize) -> FleetSnapshot {
        let config = SnapshotConfig {
            databases,
            billing_days: 10,
            seed: Some(seed),
        };
        FleetSnapshot::generate_at(&config, fixed_now())
    }

    fn context_for(snapshot: &FleetSnapshot) -> ReportContext<'_> {
        ReportContext {
            generated_at: snapshot.generated_at,
            seed: snapshot.seed,
            databases: &snapshot.databases,
            issues: &snapshot.issues,
            costs: &snapshot.costs,
            anomalies: &snapshot.anomalies,
        }
    }

    #[test]
    fn report_renders_every_section_for_a_busy_fleet() {
        let snap = snapshot(7, 60);
        let report = render_fleet_report(&context_for(&snap));

        assert!(report.starts_with("# Fleet Report - 2025-06-01 12:00 UTC"));
        assert!(report.contains("Seed: 7"));
        assert!(report.contains("## Overview"));
        assert!(report.contains("- Databases: 60 (healthy "));
        assert!(report.contains("## Clouds"));
        assert!(report.contains("| AWS |"));
        assert!(report.contains("| GCP |"));
        assert!(report.contains("| AZURE |"));
        assert!(report.contains("## Insights"));
        assert!(report.contains("## Recommendations"));
        assert!(report.contains("## Top issues"));
        assert!(report.contains("## Costs"));
        assert!(report.contains("- Top spenders: "));
        assert!(report.contains("## Cost anomalies"));
    }

    #[test]
    fn report_orders_top_issues_critical_first() {
        let snap = snapshot(9, 60);
        let report = render_fleet_report(&context_for(&snap));

        let issues_at = report.find("## Top issues").unwrap();
        let section: String = report[issues_at..]
            .lines()
            .take_while(|line| !line.starts_with("## Costs"))
            .collect::<Vec<_>>()
            .join("\n");
        let first_warning = section.find("- [warning]");
        if let Some(pos) = first_warning {
            assert!(
                !section[pos..].contains("- [critical]"),
                "critical issues must precede warnings"
            );
        }
    }

    #[test]
    fn context_block_fills_every_placeholder() {
        let snap = snapshot(11, 40);
        let context = summarization_context(&context_for(&snap));

        assert!(!context.contains("{{"), "unfilled placeholder in context");
        assert!(context.contains("- Total Databases: 40"));
        assert!(context.contains("**Generated**: 2025-06-01T12:00:00+00:00"));
        assert!(context.contains("- AWS: "));
        assert!(context.contains("# Databases Requiring Attention"));
        assert!(context.contains("# Critical Issues"));
    }

    #[test]
    fn empty_fleet_still_renders() {
        let ctx = ReportContext {
            generated_at: fixed_now(),
            seed: 1,
            databases: &[],
            issues: &[],
            costs: &[],
            anomalies: &[],
        };

        let report = render_fleet_report(&ctx);
        assert!(report.contains("- Databases: 0 (healthy 0, warning 0, critical 0, unknown 0)"));
        assert!(report.contains("- Average health score: 0.0"));
        assert!(!report.contains("## Insights"));
        assert!(!report.contains("## Top issues"));
        assert!(!report.contains("## Cost anomalies"));

        let context = summarization_context(&ctx);
        assert!(context.contains("All databases are operating normally."));
        assert!(context.contains("No critical issues are currently open."));
        assert!(context.contains("- Average CPU: 0%"));
    }
}
