use chrono::{DateTime, Duration, Utc};
use fleetmon_common::types::{
    CloudProvider, CostAnomaly, CostAnomalyType, CostBreakdown, CostForecast, CostTimeSeriesPoint,
    CostTrend, Database, DatabaseCost, DbEngine, Trend,
};
use std::collections::BTreeMap;

use crate::rng::FleetRng;
use crate::util::{from_cents, round_cents, to_cents};

const ANOMALY_TYPES: [CostAnomalyType; 3] = [
    CostAnomalyType::Spike,
    CostAnomalyType::SustainedIncrease,
    CostAnomalyType::UnexpectedCharge,
];

const SPIKE_CAUSES: [&str; 4] = [
    "Large data export or backup operation",
    "Traffic spike from new feature launch",
    "Inefficient query causing excessive reads",
    "Automated batch job running during peak hours",
];

const SUSTAINED_CAUSES: [&str; 4] = [
    "Growing dataset without storage optimization",
    "Increasing user base and query volume",
    "Data retention policy not being applied",
    "Lack of query result caching",
];

const UNEXPECTED_CAUSES: [&str; 4] = [
    "Backup retention period too long",
    "Cross-region data transfer",
    "Snapshot costs accumulating",
    "Development databases not shut down",
];

/// One cost record per database: cent-exact breakdown, month-over-month
/// trend and a next-month forecast.
pub fn generate_database_costs(rng: &mut FleetRng, databases: &[Database]) -> Vec<DatabaseCost> {
    databases
        .iter()
        .map(|db| {
            let trend = cost_trend(rng);
            let breakdown = cost_breakdown(rng, db.monthly_cost);
            let forecast = cost_forecast(rng, db.monthly_cost, trend.change_percent);
            DatabaseCost {
                database_id: db.id.clone(),
                database_name: db.name.clone(),
                total_cost: db.monthly_cost,
                breakdown,
                trend,
                forecast,
            }
        })
        .collect()
}

/// Percent change drawn from [-10, +30] at one decimal place. Changes
/// above +5 count as up, below -5 as down, the rest as stable.
fn cost_trend(rng: &mut FleetRng) -> CostTrend {
    let change = ((rng.unit() * 40.0 - 10.0) * 10.0).round() / 10.0;
    let direction = if change > 5.0 {
        Trend::Up
    } else if change < -5.0 {
        Trend::Down
    } else {
        Trend::Stable
    };
    CostTrend {
        change_percent: change,
        direction,
    }
}

/// Splits a monthly total into compute, storage, backup, data transfer
/// and other.
///
/// Allocation happens in whole cents and `other` takes the exact
/// remainder, so the five parts always sum back to the total. When the
/// drawn fractions overshoot 1.0 the four named components are scaled
/// down before the remainder is assigned.
fn cost_breakdown(rng: &mut FleetRng, total_cost: f64) -> CostBreakdown {
    let total = to_cents(total_cost);

    let fractions = [
        0.40 + rng.unit() * 0.20, // compute 40-60%
        0.20 + rng.unit() * 0.15, // storage 20-35%
        0.05 + rng.unit() * 0.05, // backup 5-10%
        0.05 + rng.unit() * 0.10, // data transfer 5-15%
    ];

    let mut parts = [0i64; 4];
    for (part, fraction) in parts.iter_mut().zip(&fractions) {
        *part = (total as f64 * fraction).round() as i64;
    }

    let drawn: i64 = parts.iter().sum();
    if drawn > total {
        let scale = total as f64 / drawn as f64;
        for part in &mut parts {
            *part = (*part as f64 * scale).floor() as i64;
        }
    }

    let other = total - parts.iter().sum::<i64>();

    CostBreakdown {
        compute: from_cents(parts[0]),
        storage: from_cents(parts[1]),
        backup: from_cents(parts[2]),
        data_transfer: from_cents(parts[3]),
        other: from_cents(other),
    }
}

/// Projects the trend forward one month with +/-10% variability.
fn cost_forecast(rng: &mut FleetRng, current_cost: f64, change_percent: f64) -> CostForecast {
    let trend_factor = 1.0 + change_percent / 100.0;
    let variability = 0.9 + rng.unit() * 0.2;
    CostForecast {
        next_month: round_cents(current_cost * trend_factor * variability),
        confidence: rng.int_in(75, 95) as u32,
    }
}

/// Flags up to five databases whose trend exceeds +20% or whose spend
/// exceeds $500, attaching a typed explanation and its likely causes.
pub fn generate_cost_anomalies(
    rng: &mut FleetRng,
    databases: &[Database],
    costs: &[DatabaseCost],
    now: DateTime<Utc>,
) -> Vec<CostAnomaly> {
    let candidates: Vec<(&Database, &DatabaseCost)> = databases
        .iter()
        .zip(costs)
        .filter(|(_, cost)| cost.trend.change_percent > 20.0 || cost.total_cost > 500.0)
        .take(5)
        .collect();

    let anomalies: Vec<CostAnomaly> = candidates
        .into_iter()
        .enumerate()
        .map(|(index, (db, cost))| {
            let anomaly_type = *rng.pick(&ANOMALY_TYPES);
            let baseline = cost.total_cost / (1.0 + cost.trend.change_percent / 100.0);

            CostAnomaly {
                id: format!("anomaly-{}-{index}", db.id),
                database_id: db.id.clone(),
                database_name: db.name.clone(),
                detected_at: now - Duration::days(rng.int_in(1, 10)),
                anomaly_type,
                amount: cost.total_cost,
                baseline: round_cents(baseline),
                explanation: anomaly_explanation(rng, anomaly_type, now),
                possible_causes: anomaly_causes(anomaly_type),
            }
        })
        .collect();

    tracing::debug!(count = anomalies.len(), "Flagged cost anomalies");
    anomalies
}

fn anomaly_explanation(
    rng: &mut FleetRng,
    anomaly_type: CostAnomalyType,
    now: DateTime<Utc>,
) -> String {
    match anomaly_type {
        CostAnomalyType::Spike => {
            let date = (now - Duration::days(rng.int_in(1, 7))).format("%Y-%m-%d");
            let pct = rng.int_in(200, 500);
            format!(
                "Sudden cost spike detected on {date}. Analysis shows {pct}% increase in data transfer costs, likely caused by increased query volume or a data export operation."
            )
        }
        CostAnomalyType::SustainedIncrease => {
            let days = rng.int_in(7, 14);
            let driver = *rng.pick(&["compute", "storage", "IOPS"]);
            let rate = rng.int_in(15, 30);
            format!(
                "Cost has been steadily increasing over the past {days} days. Primary driver is {driver} usage growing at {rate}% week-over-week."
            )
        }
        CostAnomalyType::UnexpectedCharge => {
            let what = *rng.pick(&["backup storage", "data transfer", "compute hours"]);
            format!(
                "Unexpected charges detected for {what}. This may be due to misconfigured retention policies or unoptimized queries."
            )
        }
    }
}

fn anomaly_causes(anomaly_type: CostAnomalyType) -> Vec<String> {
    let causes: &[&str] = match anomaly_type {
        CostAnomalyType::Spike => &SPIKE_CAUSES,
        CostAnomalyType::SustainedIncrease => &SUSTAINED_CAUSES,
        CostAnomalyType::UnexpectedCharge => &UNEXPECTED_CAUSES,
    };
    causes.iter().take(3).map(|cause| (*cause).to_string()).collect()
}

/// Builds `days` daily fleet cost points, oldest first.
///
/// Each database contributes one cent-rounded daily amount per point,
/// and the same amount feeds the total and every dimension, so
/// `by_cloud`, `by_type` and `by_region` each sum back to `total`
/// exactly. Clouds and engines are zero-filled; regions only appear
/// when present in the fleet.
pub fn generate_cost_time_series(
    rng: &mut FleetRng,
    databases: &[Database],
    days: usize,
    now: DateTime<Utc>,
) -> Vec<CostTimeSeriesPoint> {
    let mut series = Vec::with_capacity(days);

    for day_offset in (0..days).rev() {
        let date = now - Duration::days(day_offset as i64);

        let mut total = 0i64;
        let mut by_cloud: BTreeMap<CloudProvider, i64> =
            CloudProvider::ALL.iter().map(|cloud| (*cloud, 0)).collect();
        let mut by_type: BTreeMap<DbEngine, i64> =
            DbEngine::ALL.iter().map(|engine| (*engine, 0)).collect();
        let mut by_region: BTreeMap<String, i64> = BTreeMap::new();

        for db in databases {
            let daily_variation = 0.9 + rng.unit() * 0.2;
            let daily_cents = to_cents(db.monthly_cost / 30.0 * daily_variation);

            total += daily_cents;
            *by_cloud.entry(db.cloud).or_insert(0) += daily_cents;
            *by_type.entry(db.engine).or_insert(0) += daily_cents;
            *by_region.entry(db.region.clone()).or_insert(0) += daily_cents;
        }

        series.push(CostTimeSeriesPoint {
            date,
            total: from_cents(total),
            by_cloud: by_cloud.into_iter().map(|(k, v)| (k, from_cents(v))).collect(),
            by_type: by_type.into_iter().map(|(k, v)| (k, from_cents(v))).collect(),
            by_region: by_region.into_iter().map(|(k, v)| (k, from_cents(v))).collect(),
        });
    }

    series
}
