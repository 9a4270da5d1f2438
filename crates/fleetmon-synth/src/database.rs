use chrono::{DateTime, Duration, Utc};
use fleetmon_common::health::status_for_score;
use fleetmon_common::types::{
    CloudProvider, Database, DbEngine, Environment, ResourceMetrics, Trend,
};
use std::collections::BTreeMap;

use crate::rng::FleetRng;
use crate::util::round_cents;

/// Engines the generator hands out. Elasticsearch stays in the domain
/// enum (cost dimensions cover it) but is never synthesized.
const GENERATED_ENGINES: [DbEngine; 6] = [
    DbEngine::Postgres,
    DbEngine::Mysql,
    DbEngine::Mongodb,
    DbEngine::Redis,
    DbEngine::Dynamodb,
    DbEngine::Aurora,
];

const AWS_REGIONS: [&str; 4] = ["us-east-1", "us-west-2", "eu-west-1", "ap-southeast-1"];
const GCP_REGIONS: [&str; 3] = ["us-central1", "europe-west1", "asia-east1"];
const AZURE_REGIONS: [&str; 3] = ["eastus", "westeurope", "southeastasia"];

const NAME_PREFIXES: [&str; 5] = ["prod", "stage", "dev", "test", "demo"];
const NAME_SUFFIXES: [&str; 6] = ["main", "cache", "analytics", "replica", "primary", "backup"];

const TEAMS: [&str; 4] = ["platform", "data", "backend", "analytics"];

/// production / staging / development draw weights.
const ENVIRONMENT_WEIGHTS: [f64; 3] = [0.4, 0.3, 0.3];

const TRENDS: [Trend; 3] = [Trend::Up, Trend::Down, Trend::Stable];

/// Synthesizes `count` database records as of `now`.
///
/// Sampling is health-score driven: the score ladder picks a bucket
/// first, and metric ranges, trend weights and issue counts all follow
/// from it, so critical instances consistently look worse than healthy
/// ones. A score of -1 marks an unreachable instance; its metrics are
/// drawn from the critical ranges.
pub fn generate_databases(rng: &mut FleetRng, count: usize, now: DateTime<Utc>) -> Vec<Database> {
    let mut fleet = Vec::with_capacity(count);

    for index in 0..count {
        let cloud = *rng.pick(&CloudProvider::ALL);
        let engine = *rng.pick(&GENERATED_ENGINES);
        let environment = *rng.pick_weighted(&Environment::ALL, &ENVIRONMENT_WEIGHTS);
        let score = health_score(rng);

        fleet.push(Database {
            id: format!("db-{}", index + 1),
            name: database_name(rng),
            engine,
            cloud,
            region: region_for(rng, cloud).to_string(),
            environment,
            health_score: score,
            health_status: status_for_score(score),
            health_trend: health_trend(rng, score),
            metrics: metrics_snapshot(rng, score),
            active_issues: issue_count(rng, score),
            recent_changes: rng.int_in(0, 5) as u32,
            monthly_cost: monthly_cost(rng, engine, cloud, environment),
            cost_trend: *rng.pick(&TRENDS),
            created_at: now - Duration::days(rng.int_in(30, 365)),
            last_checked: now - Duration::minutes(rng.int_in(1, 5)),
            tags: tags(rng, environment, engine),
        });
    }

    tracing::debug!(count = fleet.len(), "Generated synthetic database fleet");
    fleet
}

/// Score ladder: 60% healthy (85-100), 25% degraded (70-84), 10% poor
/// (40-69), 5% unknown (-1).
fn health_score(rng: &mut FleetRng) -> i32 {
    let roll = rng.unit();
    if roll < 0.6 {
        rng.int_in(85, 100) as i32
    } else if roll < 0.85 {
        rng.int_in(70, 84) as i32
    } else if roll < 0.95 {
        rng.int_in(40, 69) as i32
    } else {
        -1
    }
}

fn health_trend(rng: &mut FleetRng, score: i32) -> Trend {
    if score >= 90 {
        *rng.pick_weighted(&TRENDS, &[0.2, 0.1, 0.7])
    } else if score >= 70 {
        *rng.pick_weighted(&TRENDS, &[0.3, 0.3, 0.4])
    } else {
        // The -1 sentinel lands here too: degraded instances skew down.
        *rng.pick_weighted(&TRENDS, &[0.2, 0.5, 0.3])
    }
}

/// Metric ranges per health bucket. Scores below 70 (including the -1
/// sentinel) read from the critical column, 70-84 from warning,
/// everything else from healthy.
fn metrics_snapshot(rng: &mut FleetRng, score: i32) -> ResourceMetrics {
    let is_critical = score < 70;
    let is_warning = (70..85).contains(&score);

    let mut sample = |critical: (i64, i64), warning: (i64, i64), healthy: (i64, i64)| -> i64 {
        let (lo, hi) = if is_critical {
            critical
        } else if is_warning {
            warning
        } else {
            healthy
        };
        rng.int_in(lo, hi)
    };

    ResourceMetrics {
        cpu: sample((80, 98), (60, 79), (20, 59)) as f64,
        memory: sample((85, 98), (65, 84), (30, 64)) as f64,
        storage: sample((80, 95), (65, 79), (40, 64)) as f64,
        connections: sample((90, 100), (60, 89), (20, 59)) as u32,
        max_connections: 100,
        latency_ms: sample((100, 500), (50, 99), (10, 49)) as f64,
        throughput_qps: sample((50, 200), (200, 500), (500, 2000)) as f64,
    }
}

fn issue_count(rng: &mut FleetRng, score: i32) -> u32 {
    if score < 70 {
        rng.int_in(3, 8) as u32
    } else if score < 85 {
        rng.int_in(1, 3) as u32
    } else if score < 95 {
        u32::from(rng.chance(0.5))
    } else {
        0
    }
}

fn engine_cost_multiplier(engine: DbEngine) -> f64 {
    match engine {
        DbEngine::Postgres => 1.2,
        DbEngine::Mysql => 1.0,
        DbEngine::Mongodb => 1.3,
        DbEngine::Redis => 0.8,
        DbEngine::Dynamodb => 0.9,
        DbEngine::Aurora => 1.5,
        // Not generated today; priced like a heavy search workload.
        DbEngine::Elasticsearch => 1.4,
    }
}

fn cloud_cost_multiplier(cloud: CloudProvider) -> f64 {
    match cloud {
        CloudProvider::Aws => 1.0,
        CloudProvider::Gcp => 0.95,
        CloudProvider::Azure => 1.05,
    }
}

fn environment_cost_multiplier(environment: Environment) -> f64 {
    match environment {
        Environment::Production => 3.0,
        Environment::Staging => 1.5,
        Environment::Development => 0.5,
    }
}

/// Base rate of $100 scaled by engine, cloud and environment, with a
/// +/-20% jitter, rounded to cents.
fn monthly_cost(
    rng: &mut FleetRng,
    engine: DbEngine,
    cloud: CloudProvider,
    environment: Environment,
) -> f64 {
    let base = 100.0
        * engine_cost_multiplier(engine)
        * cloud_cost_multiplier(cloud)
        * environment_cost_multiplier(environment);
    let jitter = base * (rng.unit() * 0.4 - 0.2);
    round_cents(base + jitter)
}

fn region_for(rng: &mut FleetRng, cloud: CloudProvider) -> &'static str {
    match cloud {
        CloudProvider::Aws => *rng.pick(&AWS_REGIONS),
        CloudProvider::Gcp => *rng.pick(&GCP_REGIONS),
        CloudProvider::Azure => *rng.pick(&AZURE_REGIONS),
    }
}

/// `{prefix}-{suffix}` with a numeric tail half the time.
fn database_name(rng: &mut FleetRng) -> String {
    let prefix = *rng.pick(&NAME_PREFIXES);
    let suffix = *rng.pick(&NAME_SUFFIXES);
    if rng.chance(0.5) {
        format!("{prefix}-{suffix}-{}", rng.int_in(1, 5))
    } else {
        format!("{prefix}-{suffix}")
    }
}

fn tags(
    rng: &mut FleetRng,
    environment: Environment,
    engine: DbEngine,
) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    tags.insert("environment".to_string(), environment.to_string());
    tags.insert("type".to_string(), engine.to_string());
    tags.insert("team".to_string(), (*rng.pick(&TEAMS)).to_string());
    tags.insert("managed_by".to_string(), "terraform".to_string());
    tags
}
