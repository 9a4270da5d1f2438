use chrono::{DateTime, Duration, Utc};
use fleetmon_common::timerange::TimeRange;
use fleetmon_common::types::{Database, DatabaseMetricSeries, MetricPoint};

use crate::rng::FleetRng;

/// Tuning for one backward metric walk.
struct WalkParams<'a> {
    min: f64,
    max: f64,
    variation_percent: f64,
    /// Chronologically non-decreasing series (storage).
    only_increase: bool,
    /// Finished chronological series this walk partially follows,
    /// indexed by walk step.
    correlate_with: Option<&'a [MetricPoint]>,
    correlation_factor: f64,
}

/// Builds the six metric series for one database over `range`, each
/// ending at `now` with the snapshot value and walking backwards from
/// there.
///
/// Latency partially tracks CPU and throughput inversely tracks latency
/// through the correlation factor. Storage only ever shrinks going back
/// in time, which makes it non-decreasing chronologically. Databases
/// with a score under 70 or any active issue get a CPU and latency
/// spike injected at the midpoint.
pub fn generate_metric_series(
    rng: &mut FleetRng,
    db: &Database,
    range: TimeRange,
    now: DateTime<Utc>,
) -> DatabaseMetricSeries {
    let count = range.point_count();
    let step = range.step_minutes();

    let mut cpu = walk(
        rng,
        db.metrics.cpu,
        count,
        step,
        now,
        &WalkParams {
            min: 10.0,
            max: 100.0,
            variation_percent: 20.0,
            only_increase: false,
            correlate_with: None,
            correlation_factor: 0.0,
        },
    );
    let memory = walk(
        rng,
        db.metrics.memory,
        count,
        step,
        now,
        &WalkParams {
            min: 20.0,
            max: 100.0,
            variation_percent: 15.0,
            only_increase: false,
            correlate_with: None,
            correlation_factor: 0.0,
        },
    );
    let storage = walk(
        rng,
        db.metrics.storage,
        count,
        step,
        now,
        &WalkParams {
            min: db.metrics.storage * 0.9,
            max: db.metrics.storage,
            variation_percent: 2.0,
            only_increase: true,
            correlate_with: None,
            correlation_factor: 0.0,
        },
    );
    let connections = walk(
        rng,
        f64::from(db.metrics.connections),
        count,
        step,
        now,
        &WalkParams {
            min: 10.0,
            max: f64::from(db.metrics.max_connections),
            variation_percent: 25.0,
            only_increase: false,
            correlate_with: None,
            correlation_factor: 0.0,
        },
    );
    let mut latency = walk(
        rng,
        db.metrics.latency_ms,
        count,
        step,
        now,
        &WalkParams {
            min: 5.0,
            max: 500.0,
            variation_percent: 30.0,
            only_increase: false,
            correlate_with: Some(&cpu),
            correlation_factor: 0.4,
        },
    );
    let throughput = walk(
        rng,
        db.metrics.throughput_qps,
        count,
        step,
        now,
        &WalkParams {
            min: 100.0,
            max: 2000.0,
            variation_percent: 25.0,
            only_increase: false,
            correlate_with: Some(&latency),
            correlation_factor: -0.3,
        },
    );

    if db.health_score < 70 || db.active_issues > 0 {
        let spike_index = count / 2;
        if let Some(point) = cpu.get_mut(spike_index) {
            point.value = (point.value * 1.5).min(95.0);
        }
        if let Some(point) = latency.get_mut(spike_index) {
            point.value = (point.value * 1.8).min(400.0);
        }
    }

    DatabaseMetricSeries {
        cpu,
        memory,
        storage,
        connections,
        latency,
        throughput,
    }
}

/// Walks `count` steps back from `current_value`, one sample per
/// `step_minutes`, and returns the series in chronological order.
fn walk(
    rng: &mut FleetRng,
    current_value: f64,
    count: usize,
    step_minutes: i64,
    end: DateTime<Utc>,
    params: &WalkParams<'_>,
) -> Vec<MetricPoint> {
    let mut points = Vec::with_capacity(count);
    let mut value = current_value;

    for i in 0..count {
        let timestamp = end - Duration::minutes(i as i64 * step_minutes);

        let mut variation = (rng.unit() - 0.5) * 2.0 * (params.variation_percent / 100.0);

        if let Some(driver) = params.correlate_with {
            if i > 0 {
                let previous = driver[i - 1].value;
                let correlated_change = (driver[i].value - previous) / previous;
                variation += correlated_change * params.correlation_factor;
            }
        }

        if params.only_increase {
            // Stepping back in time, a monotonic metric can only shrink.
            value -= (variation * value).abs();
        } else {
            value -= variation * value;
        }
        value = value.clamp(params.min, params.max);

        // Monotonic series skip the additive noise.
        if !params.only_increase {
            let noise = (rng.unit() - 0.5) * 2.0;
            value = (value + noise).clamp(params.min, params.max);
        }

        points.push(MetricPoint {
            timestamp,
            value: (value * 100.0).round() / 100.0,
        });
    }

    points.reverse();
    points
}
