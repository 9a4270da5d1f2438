use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::FleetError;

/// Cloud provider hosting a database instance.
///
/// # Examples
///
/// ```rust
/// use fleetmon_common::types::CloudProvider;
///
/// let cloud: CloudProvider = "GCP".parse().unwrap();
/// assert_eq!(cloud, CloudProvider::Gcp);
/// assert_eq!(cloud.to_string(), "gcp");
/// assert_eq!(cloud.label(), "GCP");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    Aws,
    Gcp,
    Azure,
}

impl CloudProvider {
    /// All providers, in canonical order.
    pub const ALL: [CloudProvider; 3] = [
        CloudProvider::Aws,
        CloudProvider::Gcp,
        CloudProvider::Azure,
    ];

    /// Uppercase label used in navigation headers.
    pub fn label(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "AWS",
            CloudProvider::Gcp => "GCP",
            CloudProvider::Azure => "AZURE",
        }
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudProvider::Aws => write!(f, "aws"),
            CloudProvider::Gcp => write!(f, "gcp"),
            CloudProvider::Azure => write!(f, "azure"),
        }
    }
}

impl FromStr for CloudProvider {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aws" => Ok(CloudProvider::Aws),
            "gcp" => Ok(CloudProvider::Gcp),
            "azure" => Ok(CloudProvider::Azure),
            _ => Err(FleetError::UnknownCloud(s.to_string())),
        }
    }
}

/// Database engine family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbEngine {
    Postgres,
    Mysql,
    Mongodb,
    Redis,
    Dynamodb,
    Aurora,
    Elasticsearch,
}

impl DbEngine {
    /// All engines, in canonical order.
    pub const ALL: [DbEngine; 7] = [
        DbEngine::Postgres,
        DbEngine::Mysql,
        DbEngine::Mongodb,
        DbEngine::Redis,
        DbEngine::Dynamodb,
        DbEngine::Aurora,
        DbEngine::Elasticsearch,
    ];
}

impl fmt::Display for DbEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DbEngine::Postgres => "postgres",
            DbEngine::Mysql => "mysql",
            DbEngine::Mongodb => "mongodb",
            DbEngine::Redis => "redis",
            DbEngine::Dynamodb => "dynamodb",
            DbEngine::Aurora => "aurora",
            DbEngine::Elasticsearch => "elasticsearch",
        };
        write!(f, "{name}")
    }
}

impl FromStr for DbEngine {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" => Ok(DbEngine::Postgres),
            "mysql" => Ok(DbEngine::Mysql),
            "mongodb" => Ok(DbEngine::Mongodb),
            "redis" => Ok(DbEngine::Redis),
            "dynamodb" => Ok(DbEngine::Dynamodb),
            "aurora" => Ok(DbEngine::Aurora),
            "elasticsearch" => Ok(DbEngine::Elasticsearch),
            _ => Err(FleetError::UnknownEngine(s.to_string())),
        }
    }
}

/// Deployment tier of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Staging,
    Development,
}

impl Environment {
    /// All tiers, in canonical order.
    pub const ALL: [Environment; 3] = [
        Environment::Production,
        Environment::Staging,
        Environment::Development,
    ];
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Development => "development",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Environment {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Environment::Production),
            "staging" => Ok(Environment::Staging),
            "development" => Ok(Environment::Development),
            _ => Err(FleetError::UnknownEnvironment(s.to_string())),
        }
    }
}

/// Health bucket derived from a health score.
///
/// # Examples
///
/// ```rust
/// use fleetmon_common::types::HealthStatus;
///
/// assert!(HealthStatus::Excellent.is_healthy());
/// assert!(!HealthStatus::Warning.is_healthy());
/// assert!(HealthStatus::Critical.sort_rank() < HealthStatus::Unknown.sort_rank());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Excellent,
    Good,
    Warning,
    Critical,
    Unknown,
}

impl HealthStatus {
    /// Excellent and good both count as healthy in rollups.
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Excellent | HealthStatus::Good)
    }

    /// Ordering for navigation lists: worst first, unknown last.
    pub fn sort_rank(&self) -> u8 {
        match self {
            HealthStatus::Critical => 0,
            HealthStatus::Warning => 1,
            HealthStatus::Good => 2,
            HealthStatus::Excellent => 3,
            HealthStatus::Unknown => 4,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HealthStatus::Excellent => "excellent",
            HealthStatus::Good => "good",
            HealthStatus::Warning => "warning",
            HealthStatus::Critical => "critical",
            HealthStatus::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// Direction of a health or cost trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        };
        write!(f, "{name}")
    }
}

/// Severity of an issue or alert.
///
/// Ordered so that `Info < Warning < Critical`, which lets callers sort
/// worst-first with `std::cmp::Reverse`.
///
/// # Examples
///
/// ```rust
/// use fleetmon_common::types::Severity;
///
/// assert!(Severity::Critical > Severity::Warning);
/// assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
/// assert_eq!(Severity::Warning.to_string(), "warning");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Severity {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            _ => Err(FleetError::UnknownSeverity(s.to_string())),
        }
    }
}

/// Functional area an issue belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Performance,
    Capacity,
    Availability,
    Configuration,
    Cost,
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssueCategory::Performance => "performance",
            IssueCategory::Capacity => "capacity",
            IssueCategory::Availability => "availability",
            IssueCategory::Configuration => "configuration",
            IssueCategory::Cost => "cost",
        };
        write!(f, "{name}")
    }
}

/// Lifecycle state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    Active,
    Acknowledged,
    Resolved,
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssueStatus::Active => "active",
            IssueStatus::Acknowledged => "acknowledged",
            IssueStatus::Resolved => "resolved",
        };
        write!(f, "{name}")
    }
}

/// Subsystem an alert originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Performance,
    Availability,
    Security,
    Cost,
    Capacity,
}

impl AlertType {
    /// All alert types, in canonical order.
    pub const ALL: [AlertType; 5] = [
        AlertType::Performance,
        AlertType::Availability,
        AlertType::Security,
        AlertType::Cost,
        AlertType::Capacity,
    ];
}

/// Read state of an alert in the notification feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Unread,
    Read,
    Dismissed,
}

/// Shape of a cost anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostAnomalyType {
    Spike,
    SustainedIncrease,
    UnexpectedCharge,
}

impl fmt::Display for CostAnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CostAnomalyType::Spike => "spike",
            CostAnomalyType::SustainedIncrease => "sustained_increase",
            CostAnomalyType::UnexpectedCharge => "unexpected_charge",
        };
        write!(f, "{name}")
    }
}

/// Log line severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

/// Kind of infrastructure change recorded against a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Deployment,
    ConfigChange,
    Scaling,
    Migration,
    Maintenance,
}

/// Point-in-time resource readings for one database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceMetrics {
    pub cpu: f64,
    pub memory: f64,
    pub storage: f64,
    pub connections: u32,
    pub max_connections: u32,
    pub latency_ms: f64,
    pub throughput_qps: f64,
}

/// 数据库实例完整记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    /// 唯一标识（db-1, db-2, ...）
    pub id: String,
    /// 实例名称（如 prod-main-2）
    pub name: String,
    /// 数据库引擎
    pub engine: DbEngine,
    /// 云厂商
    pub cloud: CloudProvider,
    /// 区域
    pub region: String,
    /// 环境层级
    pub environment: Environment,
    /// 健康评分（0-100，-1 表示未知）
    pub health_score: i32,
    /// 健康状态（由评分推导）
    pub health_status: HealthStatus,
    /// 健康趋势
    pub health_trend: Trend,
    /// 当前指标快照
    pub metrics: ResourceMetrics,
    /// 活跃问题数
    pub active_issues: u32,
    /// 近期变更数
    pub recent_changes: u32,
    /// 月度成本（美元）
    pub monthly_cost: f64,
    /// 成本趋势
    pub cost_trend: Trend,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 最后检查时间
    pub last_checked: DateTime<Utc>,
    /// 标签
    pub tags: BTreeMap<String, String>,
}

/// One log line attached to an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub source: String,
}

/// One infrastructure change attached to an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub timestamp: DateTime<Utc>,
    pub change_type: ChangeType,
    pub description: String,
    pub author: Option<String>,
}

/// Diagnosed problem on one database, with supporting evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub database_id: String,
    pub database_name: String,
    pub severity: Severity,
    pub category: IssueCategory,
    pub status: IssueStatus,
    pub title: String,
    pub description: String,
    /// What the condition means for the database.
    pub explanation: String,
    /// Suggested remediation.
    pub recommendation: String,
    pub detected_at: DateTime<Utc>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub occurrences: u32,
    pub related_metrics: Vec<String>,
    pub related_logs: Vec<LogEntry>,
    pub related_changes: Vec<ChangeEvent>,
}

/// Notification feed entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub database_id: String,
    pub database_name: String,
    pub severity: Severity,
    pub alert_type: AlertType,
    pub status: AlertStatus,
    pub title: String,
    pub message: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub action_url: String,
    pub action_label: String,
    pub tags: Vec<String>,
}

/// Monthly spend split into service categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub compute: f64,
    pub storage: f64,
    pub backup: f64,
    pub data_transfer: f64,
    pub other: f64,
}

impl CostBreakdown {
    /// Sum of all five components.
    pub fn total(&self) -> f64 {
        self.compute + self.storage + self.backup + self.data_transfer + self.other
    }
}

/// Month-over-month cost movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostTrend {
    /// Percent change, one decimal place.
    pub change_percent: f64,
    pub direction: Trend,
}

/// Projected spend for the coming month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostForecast {
    pub next_month: f64,
    /// Confidence percentage, 75-95.
    pub confidence: u32,
}

/// 单个数据库的账单记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseCost {
    pub database_id: String,
    pub database_name: String,
    /// 月度总成本（等于各分项之和）
    pub total_cost: f64,
    pub breakdown: CostBreakdown,
    pub trend: CostTrend,
    pub forecast: CostForecast,
}

/// Unusual spend flagged on one database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostAnomaly {
    pub id: String,
    pub database_id: String,
    pub database_name: String,
    pub detected_at: DateTime<Utc>,
    pub anomaly_type: CostAnomalyType,
    /// Current monthly spend.
    pub amount: f64,
    /// Spend implied by backing out the trend change.
    pub baseline: f64,
    pub explanation: String,
    pub possible_causes: Vec<String>,
}

/// One day of fleet spend, broken down by cloud, engine and region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostTimeSeriesPoint {
    pub date: DateTime<Utc>,
    pub total: f64,
    pub by_cloud: BTreeMap<CloudProvider, f64>,
    pub by_type: BTreeMap<DbEngine, f64>,
    pub by_region: BTreeMap<String, f64>,
}

/// One sample in a metric history series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Full metric history for one database over a time range, oldest
/// sample first in every series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseMetricSeries {
    pub cpu: Vec<MetricPoint>,
    pub memory: Vec<MetricPoint>,
    pub storage: Vec<MetricPoint>,
    pub connections: Vec<MetricPoint>,
    pub latency: Vec<MetricPoint>,
    pub throughput: Vec<MetricPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_serialize_to_lowercase_names() {
        assert_eq!(serde_json::to_string(&CloudProvider::Aws).unwrap(), "\"aws\"");
        assert_eq!(serde_json::to_string(&DbEngine::Postgres).unwrap(), "\"postgres\"");
        assert_eq!(serde_json::to_string(&HealthStatus::Excellent).unwrap(), "\"excellent\"");
        assert_eq!(
            serde_json::to_string(&CostAnomalyType::SustainedIncrease).unwrap(),
            "\"sustained_increase\""
        );
        assert_eq!(serde_json::to_string(&ChangeType::ConfigChange).unwrap(), "\"config_change\"");
    }

    #[test]
    fn cost_maps_use_enum_names_as_keys() {
        let mut by_cloud = BTreeMap::new();
        by_cloud.insert(CloudProvider::Gcp, 12.5f64);
        let json = serde_json::to_string(&by_cloud).unwrap();
        assert_eq!(json, "{\"gcp\":12.5}");
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert!("oracle".parse::<DbEngine>().is_err());
        assert!("qa".parse::<Environment>().is_err());
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn breakdown_total_sums_components() {
        let breakdown = CostBreakdown {
            compute: 40.0,
            storage: 25.0,
            backup: 5.0,
            data_transfer: 10.0,
            other: 20.0,
        };
        assert!((breakdown.total() - 100.0).abs() < f64::EPSILON);
    }
}
