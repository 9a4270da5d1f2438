use chrono::{DateTime, Duration, Utc};
use fleetmon_common::types::{Alert, AlertStatus, AlertType, Database, Severity};
use std::cmp::Reverse;

use crate::rng::FleetRng;

/// One alert template. The message carries a `{{database}}` placeholder.
struct AlertDef {
    severity: Severity,
    title: &'static str,
    message: &'static str,
    details: &'static str,
    source: &'static str,
    action_label: &'static str,
    tags: &'static [&'static str],
}

const PERFORMANCE_ALERTS: &[AlertDef] = &[
    AlertDef {
        severity: Severity::Critical,
        title: "High CPU Usage Alert",
        message: "{{database}} is experiencing CPU usage above 90% for the last 15 minutes",
        details: "CPU utilization has exceeded threshold. Consider scaling up or optimizing queries.",
        source: "Performance Monitor",
        action_label: "View Metrics",
        tags: &["cpu", "performance"],
    },
    AlertDef {
        severity: Severity::Warning,
        title: "Slow Query Detected",
        message: "Multiple slow queries detected on {{database}}",
        details: "Query execution times are higher than baseline. Review query performance.",
        source: "Query Analyzer",
        action_label: "View Queries",
        tags: &["query", "performance"],
    },
    AlertDef {
        severity: Severity::Warning,
        title: "Memory Usage High",
        message: "{{database}} memory usage at 85%",
        details: "Memory consumption is approaching limits. Monitor for potential issues.",
        source: "Resource Monitor",
        action_label: "View Details",
        tags: &["memory", "resources"],
    },
];

const AVAILABILITY_ALERTS: &[AlertDef] = &[
    AlertDef {
        severity: Severity::Critical,
        title: "Database Connection Failed",
        message: "Unable to connect to {{database}}",
        details: "Connection attempts are failing. Database may be down or unreachable.",
        source: "Health Check",
        action_label: "Check Status",
        tags: &["connection", "downtime"],
    },
    AlertDef {
        severity: Severity::Critical,
        title: "Replication Lag Detected",
        message: "{{database}} replica is lagging behind primary by 5+ minutes",
        details: "Replication lag may impact read consistency. Check replica health.",
        source: "Replication Monitor",
        action_label: "View Replication",
        tags: &["replication", "lag"],
    },
    AlertDef {
        severity: Severity::Warning,
        title: "High Connection Count",
        message: "{{database}} has reached 90% of max connections",
        details: "Connection pool is nearly exhausted. Consider increasing limits or closing idle connections.",
        source: "Connection Monitor",
        action_label: "View Connections",
        tags: &["connections", "capacity"],
    },
];

const SECURITY_ALERTS: &[AlertDef] = &[
    AlertDef {
        severity: Severity::Critical,
        title: "Unauthorized Access Attempt",
        message: "Multiple failed login attempts detected on {{database}}",
        details: "Potential security breach. Review access logs and consider blocking suspicious IPs.",
        source: "Security Scanner",
        action_label: "View Logs",
        tags: &["security", "authentication"],
    },
    AlertDef {
        severity: Severity::Warning,
        title: "SSL Certificate Expiring Soon",
        message: "SSL certificate for {{database}} expires in 14 days",
        details: "Renew certificate to prevent connection issues.",
        source: "Certificate Monitor",
        action_label: "Renew Certificate",
        tags: &["ssl", "certificate"],
    },
    AlertDef {
        severity: Severity::Info,
        title: "Security Patch Available",
        message: "Security update available for {{database}}",
        details: "A new security patch has been released. Schedule maintenance window to apply.",
        source: "Update Monitor",
        action_label: "View Patch Notes",
        tags: &["security", "updates"],
    },
];

const COST_ALERTS: &[AlertDef] = &[
    AlertDef {
        severity: Severity::Warning,
        title: "Cost Spike Detected",
        message: "{{database}} costs increased by 45% this week",
        details: "Unusual cost increase detected. Review recent changes and usage patterns.",
        source: "Cost Analyzer",
        action_label: "View Costs",
        tags: &["cost", "billing"],
    },
    AlertDef {
        severity: Severity::Info,
        title: "Cost Optimization Opportunity",
        message: "{{database}} may benefit from reserved instance pricing",
        details: "Stable usage patterns detected. Switching to reserved instances could save 30%.",
        source: "Cost Optimizer",
        action_label: "View Recommendations",
        tags: &["cost", "optimization"],
    },
];

const CAPACITY_ALERTS: &[AlertDef] = &[
    AlertDef {
        severity: Severity::Critical,
        title: "Storage Almost Full",
        message: "{{database}} storage at 95% capacity",
        details: "Database will run out of storage soon. Increase capacity immediately.",
        source: "Storage Monitor",
        action_label: "Increase Storage",
        tags: &["storage", "capacity"],
    },
    AlertDef {
        severity: Severity::Warning,
        title: "IOPS Limit Approaching",
        message: "{{database}} is using 85% of provisioned IOPS",
        details: "I/O operations approaching limit. Performance may degrade.",
        source: "Performance Monitor",
        action_label: "View Metrics",
        tags: &["iops", "performance"],
    },
];

fn template_pool(alert_type: AlertType) -> &'static [AlertDef] {
    match alert_type {
        AlertType::Performance => PERFORMANCE_ALERTS,
        AlertType::Availability => AVAILABILITY_ALERTS,
        AlertType::Security => SECURITY_ALERTS,
        AlertType::Cost => COST_ALERTS,
        AlertType::Capacity => CAPACITY_ALERTS,
    }
}

/// Emits 30-50 alert events spread over the trailing seven days, newest
/// first.
///
/// Alerts reference a random database and are drawn independently of the
/// issue set, so an alert may describe a condition the database's
/// snapshot metrics do not currently show. An empty fleet yields no
/// alerts.
pub fn generate_alerts(
    rng: &mut FleetRng,
    databases: &[Database],
    now: DateTime<Utc>,
) -> Vec<Alert> {
    if databases.is_empty() {
        return Vec::new();
    }

    let count = 30 + rng.int_in(0, 19);
    let mut alerts = Vec::with_capacity(count as usize);

    for index in 0..count {
        let db = rng.pick(databases);
        let alert_type = *rng.pick(&AlertType::ALL);
        let def = rng.pick(template_pool(alert_type));

        alerts.push(Alert {
            id: format!("alert-{}", index + 1),
            database_id: db.id.clone(),
            database_name: db.name.clone(),
            severity: def.severity,
            alert_type,
            status: alert_status(rng),
            title: def.title.to_string(),
            message: def.message.replace("{{database}}", &db.name),
            details: def.details.to_string(),
            timestamp: now - hours_back(rng, 7.0 * 24.0),
            source: def.source.to_string(),
            action_url: format!("/databases/{}", db.id),
            action_label: def.action_label.to_string(),
            tags: def.tags.iter().map(|tag| (*tag).to_string()).collect(),
        });
    }

    alerts.sort_by_key(|alert| Reverse(alert.timestamp));

    tracing::debug!(count = alerts.len(), "Generated alert feed");
    alerts
}

/// 30% unread, 40% read, 30% dismissed.
fn alert_status(rng: &mut FleetRng) -> AlertStatus {
    let roll = rng.unit();
    if roll < 0.3 {
        AlertStatus::Unread
    } else if roll < 0.7 {
        AlertStatus::Read
    } else {
        AlertStatus::Dismissed
    }
}

/// Uniform offset up to `max_hours` back, at millisecond resolution.
fn hours_back(rng: &mut FleetRng, max_hours: f64) -> Duration {
    Duration::milliseconds((rng.unit() * max_hours * 3_600_000.0) as i64)
}
