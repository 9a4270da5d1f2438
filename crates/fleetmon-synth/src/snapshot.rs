use chrono::{DateTime, Utc};
use fleetmon_common::timerange::TimeRange;
use fleetmon_common::types::{
    Alert, CostAnomaly, CostTimeSeriesPoint, Database, DatabaseCost, DatabaseMetricSeries, Issue,
};
use serde::{Deserialize, Serialize};

use crate::rng::FleetRng;
use crate::{alert, billing, database, issue, metrics};

/// Knobs for snapshot generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Fleet size.
    pub databases: usize,
    /// Days of cost history.
    pub billing_days: usize,
    /// Fixed seed; `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            databases: 50,
            billing_days: 30,
            seed: None,
        }
    }
}

/// One fully generated fleet: the databases plus everything derived
/// from them.
///
/// Construct a snapshot once and pass it down. Independent snapshots
/// can coexist, and the same seed and timestamp always reproduce the
/// same data.
///
/// # Examples
///
/// ```rust
/// use fleetmon_synth::{FleetSnapshot, SnapshotConfig};
///
/// let config = SnapshotConfig {
///     databases: 10,
///     billing_days: 7,
///     seed: Some(42),
/// };
/// let snapshot = FleetSnapshot::generate(&config);
/// assert_eq!(snapshot.databases.len(), 10);
/// assert_eq!(snapshot.seed, 42);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub seed: u64,
    pub generated_at: DateTime<Utc>,
    pub databases: Vec<Database>,
    pub issues: Vec<Issue>,
    pub alerts: Vec<Alert>,
    pub costs: Vec<DatabaseCost>,
    pub anomalies: Vec<CostAnomaly>,
    pub cost_time_series: Vec<CostTimeSeriesPoint>,
}

impl FleetSnapshot {
    /// Generates a snapshot as of the current wall clock.
    pub fn generate(config: &SnapshotConfig) -> Self {
        Self::generate_at(config, Utc::now())
    }

    /// Generates a snapshot pinned to `now`. Identical config seed and
    /// `now` produce identical output.
    pub fn generate_at(config: &SnapshotConfig, now: DateTime<Utc>) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = FleetRng::seeded(seed);

        let databases = database::generate_databases(&mut rng, config.databases, now);
        let issues = issue::generate_issues(&mut rng, &databases, now);
        let alerts = alert::generate_alerts(&mut rng, &databases, now);
        let costs = billing::generate_database_costs(&mut rng, &databases);
        let anomalies = billing::generate_cost_anomalies(&mut rng, &databases, &costs, now);
        let cost_time_series =
            billing::generate_cost_time_series(&mut rng, &databases, config.billing_days, now);

        tracing::debug!(
            seed,
            databases = databases.len(),
            issues = issues.len(),
            alerts = alerts.len(),
            anomalies = anomalies.len(),
            "Generated fleet snapshot"
        );

        Self {
            seed,
            generated_at: now,
            databases,
            issues,
            alerts,
            costs,
            anomalies,
            cost_time_series,
        }
    }

    pub fn database_by_id(&self, id: &str) -> Option<&Database> {
        self.databases.iter().find(|db| db.id == id)
    }

    /// Issues attached to one database, keeping the fleet-wide order.
    pub fn issues_for(&self, database_id: &str) -> Vec<&Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.database_id == database_id)
            .collect()
    }

    pub fn cost_for(&self, database_id: &str) -> Option<&DatabaseCost> {
        self.costs.iter().find(|cost| cost.database_id == database_id)
    }

    pub fn anomalies_for(&self, database_id: &str) -> Vec<&CostAnomaly> {
        self.anomalies
            .iter()
            .filter(|anomaly| anomaly.database_id == database_id)
            .collect()
    }

    /// Metric history for one database, derived on demand. The walk is
    /// seeded from the snapshot seed and the database id, so repeated
    /// calls return identical series.
    pub fn metric_series(
        &self,
        database_id: &str,
        range: TimeRange,
    ) -> Option<DatabaseMetricSeries> {
        let db = self.database_by_id(database_id)?;
        let mut rng = FleetRng::seeded(self.seed.wrapping_add(fingerprint(database_id)));
        Some(metrics::generate_metric_series(&mut rng, db, range, self.generated_at))
    }
}

/// FNV-1a over the id bytes; the std hasher is not stable across
/// releases.
fn fingerprint(id: &str) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for byte in id.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
