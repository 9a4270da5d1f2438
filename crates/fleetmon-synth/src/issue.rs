use chrono::{DateTime, Duration, Utc};
use fleetmon_common::types::{
    ChangeEvent, ChangeType, Database, HealthStatus, Issue, IssueCategory, IssueStatus, LogEntry,
    LogLevel, Severity,
};
use std::cmp::Reverse;

use crate::rng::FleetRng;

/// One issue template. The description may carry `{{...}}` placeholders
/// filled from the database's current metrics.
struct IssueDef {
    title: &'static str,
    description: &'static str,
    explanation: &'static str,
    recommendation: &'static str,
    category: IssueCategory,
}

const CRITICAL_TEMPLATES: &[IssueDef] = &[
    IssueDef {
        title: "High CPU utilization detected",
        description: "CPU usage consistently above {{cpu}}% for extended period",
        explanation: "Sustained high CPU usage indicates the database is processing more queries than it can efficiently handle. This can lead to increased latency, query timeouts, and degraded user experience.",
        recommendation: "Consider scaling up the instance size, optimizing slow queries, or implementing read replicas to distribute load.",
        category: IssueCategory::Performance,
    },
    IssueDef {
        title: "Memory pressure detected",
        description: "Memory usage at {{memory}}%, experiencing frequent cache evictions",
        explanation: "High memory utilization is causing the database to evict cached data prematurely, leading to more disk I/O and slower query performance.",
        recommendation: "Increase instance memory, optimize query result sets, or review connection pooling configuration.",
        category: IssueCategory::Capacity,
    },
    IssueDef {
        title: "Connection pool exhausted",
        description: "All {{max_connections}} connections in use, new requests queuing",
        explanation: "The database has reached its maximum connection limit. New connection requests are being queued or rejected, impacting application availability.",
        recommendation: "Increase max_connections setting, implement connection pooling at application level, or investigate connection leaks.",
        category: IssueCategory::Capacity,
    },
];

const WARNING_TEMPLATES: &[IssueDef] = &[
    IssueDef {
        title: "Elevated query latency",
        description: "Average query latency increased to {{latency}}ms",
        explanation: "Query response times have increased beyond normal thresholds. This may indicate missing indexes, table locks, or resource contention.",
        recommendation: "Review slow query logs, check for missing indexes, and analyze query execution plans.",
        category: IssueCategory::Performance,
    },
    IssueDef {
        title: "Storage capacity approaching limit",
        description: "Storage utilization at {{storage}}%",
        explanation: "Database storage is nearing capacity. Running out of storage will cause write operations to fail and may lead to database corruption.",
        recommendation: "Increase storage allocation, implement data archival strategy, or clean up unnecessary data.",
        category: IssueCategory::Capacity,
    },
    IssueDef {
        title: "Increased replication lag",
        description: "Replica is {{lag_secs}} seconds behind primary",
        explanation: "Read replicas are falling behind the primary database, which may cause stale data reads and inconsistencies.",
        recommendation: "Check network connectivity, review replica instance size, or reduce write load on primary.",
        category: IssueCategory::Availability,
    },
];

const INFO_TEMPLATES: &[IssueDef] = &[
    IssueDef {
        title: "Scheduled maintenance window upcoming",
        description: "Maintenance scheduled for {{date}}",
        explanation: "A routine maintenance window has been scheduled. Brief downtime or degraded performance may occur.",
        recommendation: "Plan accordingly and notify stakeholders. Consider scheduling during low-traffic periods.",
        category: IssueCategory::Configuration,
    },
    IssueDef {
        title: "Minor version update available",
        description: "New patch version available with security fixes",
        explanation: "A minor version update is available that includes important security patches and bug fixes.",
        recommendation: "Review release notes and schedule update during next maintenance window.",
        category: IssueCategory::Configuration,
    },
];

struct LogDef {
    level: LogLevel,
    message: &'static str,
    source: &'static str,
}

const PERFORMANCE_LOGS: &[LogDef] = &[
    LogDef { level: LogLevel::Error, message: "Query timeout: SELECT statement exceeded 30 second limit", source: "postgresql" },
    LogDef { level: LogLevel::Warn, message: "Slow query detected: execution time 2450ms", source: "query_monitor" },
    LogDef { level: LogLevel::Error, message: "Connection pool exhausted, rejecting new connections", source: "connection_manager" },
];

const CAPACITY_LOGS: &[LogDef] = &[
    LogDef { level: LogLevel::Warn, message: "Storage usage above 80% threshold", source: "storage_monitor" },
    LogDef { level: LogLevel::Error, message: "Out of memory: failed to allocate buffer", source: "postgresql" },
    LogDef { level: LogLevel::Warn, message: "High memory pressure, evicting cache entries", source: "cache_manager" },
];

const AVAILABILITY_LOGS: &[LogDef] = &[
    LogDef { level: LogLevel::Error, message: "Replication connection lost, attempting reconnect", source: "replication" },
    LogDef { level: LogLevel::Warn, message: "Primary database unreachable, failover initiated", source: "ha_manager" },
];

const CONFIGURATION_LOGS: &[LogDef] = &[
    LogDef { level: LogLevel::Info, message: "Configuration parameter changed: max_connections=200", source: "admin" },
    LogDef { level: LogLevel::Info, message: "Maintenance mode enabled", source: "admin" },
];

const COST_LOGS: &[LogDef] = &[
    LogDef { level: LogLevel::Warn, message: "Unusual cost spike detected", source: "billing_monitor" },
];

struct ChangeDef {
    change_type: ChangeType,
    description: &'static str,
}

const CHANGE_TEMPLATES: &[ChangeDef] = &[
    ChangeDef { change_type: ChangeType::Deployment, description: "Application deployment v2.3.1" },
    ChangeDef { change_type: ChangeType::ConfigChange, description: "Updated connection pool settings" },
    ChangeDef { change_type: ChangeType::Scaling, description: "Scaled from t3.medium to t3.large" },
    ChangeDef { change_type: ChangeType::Maintenance, description: "Applied security patches" },
];

const CHANGE_AUTHORS: [&str; 4] = ["john.doe", "jane.smith", "ops-team", "terraform"];

/// Minute offsets (back from now) and occurrence bounds for one issue
/// class.
struct IssueWindow {
    detected_mins: (i64, i64),
    first_seen_mins: (i64, i64),
    last_seen_mins: (i64, i64),
    occurrences: (i64, i64),
}

const CRITICAL_WINDOW: IssueWindow = IssueWindow {
    detected_mins: (30, 180),
    first_seen_mins: (180, 720),
    last_seen_mins: (1, 10),
    occurrences: (10, 50),
};

/// Warning issues riding along on a critical database.
const SECONDARY_WARNING_WINDOW: IssueWindow = IssueWindow {
    detected_mins: (60, 300),
    first_seen_mins: (300, 1440),
    last_seen_mins: (5, 30),
    occurrences: (5, 20),
};

const WARNING_WINDOW: IssueWindow = IssueWindow {
    detected_mins: (60, 360),
    first_seen_mins: (360, 1440),
    last_seen_mins: (10, 60),
    occurrences: (3, 15),
};

const INFO_WINDOW: IssueWindow = IssueWindow {
    detected_mins: (120, 720),
    first_seen_mins: (720, 2880),
    last_seen_mins: (60, 180),
    occurrences: (1, 1),
};

/// Derives the issue set for a fleet, sorted critical-first and newest
/// first within a severity.
///
/// Critical databases accumulate 2-3 critical plus 1-2 warning issues,
/// warning databases 1-3 warning issues, and a good database picks up a
/// single info issue 30% of the time. Excellent and unknown databases
/// produce none.
pub fn generate_issues(
    rng: &mut FleetRng,
    databases: &[Database],
    now: DateTime<Utc>,
) -> Vec<Issue> {
    let mut issues = Vec::new();
    for db in databases {
        issues.extend(issues_for_database(rng, db, now));
    }

    issues.sort_by_key(|issue| (Reverse(issue.severity), Reverse(issue.detected_at)));

    tracing::debug!(count = issues.len(), "Generated issue set");
    issues
}

fn issues_for_database(rng: &mut FleetRng, db: &Database, now: DateTime<Utc>) -> Vec<Issue> {
    let mut issues = Vec::new();

    match db.health_status {
        HealthStatus::Critical => {
            let critical_count = rng.int_in(2, 3);
            let warning_count = rng.int_in(1, 2);

            for index in 0..critical_count {
                let template = rng.pick(CRITICAL_TEMPLATES);
                issues.push(build_issue(
                    rng,
                    db,
                    template,
                    Severity::Critical,
                    index as usize,
                    &CRITICAL_WINDOW,
                    &["cpu", "memory", "latency"],
                    now,
                ));
            }
            for index in 0..warning_count {
                let template = rng.pick(WARNING_TEMPLATES);
                issues.push(build_issue(
                    rng,
                    db,
                    template,
                    Severity::Warning,
                    index as usize,
                    &SECONDARY_WARNING_WINDOW,
                    &["storage", "connections"],
                    now,
                ));
            }
        }
        HealthStatus::Warning => {
            let count = rng.int_in(1, 3);
            for index in 0..count {
                let template = rng.pick(WARNING_TEMPLATES);
                let related = *rng.pick(&[["cpu"], ["memory"], ["latency"], ["storage"]]);
                issues.push(build_issue(
                    rng,
                    db,
                    template,
                    Severity::Warning,
                    index as usize,
                    &WARNING_WINDOW,
                    &related,
                    now,
                ));
            }
        }
        HealthStatus::Good => {
            if rng.chance(0.3) {
                let template = rng.pick(INFO_TEMPLATES);
                issues.push(build_issue(
                    rng,
                    db,
                    template,
                    Severity::Info,
                    0,
                    &INFO_WINDOW,
                    &[],
                    now,
                ));
            }
        }
        HealthStatus::Excellent | HealthStatus::Unknown => {}
    }

    issues
}

#[allow(clippy::too_many_arguments)]
fn build_issue(
    rng: &mut FleetRng,
    db: &Database,
    template: &IssueDef,
    severity: Severity,
    index: usize,
    window: &IssueWindow,
    related_metrics: &[&str],
    now: DateTime<Utc>,
) -> Issue {
    Issue {
        id: format!("issue-{}-{severity}-{index}", db.id),
        database_id: db.id.clone(),
        database_name: db.name.clone(),
        severity,
        category: template.category,
        status: IssueStatus::Active,
        title: template.title.to_string(),
        description: fill_description(rng, template.description, db, now),
        explanation: template.explanation.to_string(),
        recommendation: template.recommendation.to_string(),
        detected_at: now - minutes_in(rng, window.detected_mins),
        first_seen: now - minutes_in(rng, window.first_seen_mins),
        last_seen: now - minutes_in(rng, window.last_seen_mins),
        occurrences: rng.int_in(window.occurrences.0, window.occurrences.1) as u32,
        related_metrics: related_metrics.iter().map(|m| (*m).to_string()).collect(),
        related_logs: related_logs(rng, template.category, now),
        related_changes: related_changes(rng, now),
    }
}

fn minutes_in(rng: &mut FleetRng, bounds: (i64, i64)) -> Duration {
    Duration::minutes(rng.int_in(bounds.0, bounds.1))
}

/// Fills metric placeholders from the database snapshot. The
/// replication-lag figure has no snapshot counterpart and is drawn
/// fresh.
fn fill_description(
    rng: &mut FleetRng,
    template: &str,
    db: &Database,
    now: DateTime<Utc>,
) -> String {
    let mut text = template
        .replace("{{cpu}}", &db.metrics.cpu.to_string())
        .replace("{{memory}}", &db.metrics.memory.to_string())
        .replace("{{storage}}", &db.metrics.storage.to_string())
        .replace("{{latency}}", &db.metrics.latency_ms.to_string())
        .replace("{{max_connections}}", &db.metrics.max_connections.to_string());
    if text.contains("{{lag_secs}}") {
        text = text.replace("{{lag_secs}}", &rng.int_in(5, 30).to_string());
    }
    if text.contains("{{date}}") {
        let date = (now + Duration::days(3)).format("%Y-%m-%d").to_string();
        text = text.replace("{{date}}", &date);
    }
    text
}

/// 2-4 log lines drawn from the category's pool, newest first.
fn related_logs(rng: &mut FleetRng, category: IssueCategory, now: DateTime<Utc>) -> Vec<LogEntry> {
    let pool = log_pool(category);
    let count = rng.int_in(2, 4);

    let mut logs = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let def = rng.pick(pool);
        logs.push(LogEntry {
            timestamp: now - Duration::minutes(rng.int_in(10, 120)),
            level: def.level,
            message: def.message.to_string(),
            source: def.source.to_string(),
        });
    }
    logs.sort_by_key(|log| Reverse(log.timestamp));
    logs
}

fn log_pool(category: IssueCategory) -> &'static [LogDef] {
    match category {
        IssueCategory::Performance => PERFORMANCE_LOGS,
        IssueCategory::Capacity => CAPACITY_LOGS,
        IssueCategory::Availability => AVAILABILITY_LOGS,
        IssueCategory::Configuration => CONFIGURATION_LOGS,
        IssueCategory::Cost => COST_LOGS,
    }
}

/// At most one recent change, present half the time.
fn related_changes(rng: &mut FleetRng, now: DateTime<Utc>) -> Vec<ChangeEvent> {
    if !rng.chance(0.5) {
        return Vec::new();
    }
    let def = rng.pick(CHANGE_TEMPLATES);
    vec![ChangeEvent {
        timestamp: now - Duration::minutes(rng.int_in(60, 240)),
        change_type: def.change_type,
        description: def.description.to_string(),
        author: Some((*rng.pick(&CHANGE_AUTHORS)).to_string()),
    }]
}
