use fleetmon_common::types::{CloudProvider, Database, HealthStatus};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::group::{count_healthy, count_status};

/// Fallback position for regions missing from the table (map center).
const DEFAULT_COORDINATE: (f64, f64) = (50.0, 50.0);

/// Approximate positions of well-known regions on a flattened world
/// map, as percentages of the viewport (x and y both 0-100). Lookup is
/// case-insensitive.
const REGION_COORDINATES: &[(&str, f64, f64)] = &[
    // US
    ("us-east-1", 22.0, 35.0),
    ("us-east-2", 23.0, 37.0),
    ("us-west-1", 15.0, 36.0),
    ("us-west-2", 14.0, 33.0),
    ("us-central-1", 20.0, 38.0),
    ("us-central1", 20.0, 38.0),
    ("us-south-1", 21.0, 42.0),
    ("centralus", 20.0, 37.0),
    ("eastus", 22.0, 36.0),
    ("eastus2", 23.0, 37.0),
    ("westus", 15.0, 35.0),
    ("westus2", 14.0, 34.0),
    ("southcentralus", 21.0, 41.0),
    // Europe
    ("eu-west-1", 48.0, 28.0),
    ("eu-west-2", 48.0, 27.0),
    ("eu-west-3", 50.0, 30.0),
    ("eu-central-1", 52.0, 27.0),
    ("eu-north-1", 53.0, 20.0),
    ("europe-west1", 50.0, 29.0),
    ("europe-west2", 48.0, 27.0),
    ("europe-west3", 52.0, 27.0),
    ("northeurope", 53.0, 24.0),
    ("westeurope", 51.0, 28.0),
    // Asia Pacific
    ("ap-south-1", 68.0, 45.0),
    ("ap-southeast-1", 73.0, 48.0),
    ("ap-southeast-2", 85.0, 62.0),
    ("ap-northeast-1", 80.0, 35.0),
    ("ap-northeast-2", 79.0, 36.0),
    ("ap-east-1", 76.0, 42.0),
    ("asia-east1", 77.0, 43.0),
    ("asia-northeast1", 80.0, 35.0),
    ("asia-south1", 68.0, 45.0),
    ("asia-southeast1", 73.0, 48.0),
    ("eastasia", 77.0, 42.0),
    ("southeastasia", 73.0, 48.0),
    ("japaneast", 80.0, 35.0),
    // South America
    ("sa-east-1", 32.0, 60.0),
    ("southamerica-east1", 32.0, 60.0),
    ("brazilsouth", 32.0, 60.0),
    // Canada
    ("ca-central-1", 20.0, 30.0),
    ("canadacentral", 20.0, 30.0),
    // Middle East
    ("me-south-1", 60.0, 42.0),
    ("uaenorth", 62.0, 43.0),
    // Africa
    ("af-south-1", 54.0, 62.0),
    ("southafricanorth", 54.0, 60.0),
];

/// Map marker clustering every database of one cloud+region pair.
#[derive(Debug, Clone, Serialize)]
pub struct RegionMarker<'a> {
    pub region: String,
    pub cloud: CloudProvider,
    pub databases: Vec<&'a Database>,
    pub x: f64,
    pub y: f64,
    pub critical_count: usize,
    pub warning_count: usize,
    pub healthy_count: usize,
}

/// One marker per cloud+region pair present in the fleet. Regions the
/// coordinate table does not know land at the map center.
pub fn region_markers(databases: &[Database]) -> Vec<RegionMarker<'_>> {
    let mut clusters: BTreeMap<(CloudProvider, String), Vec<&Database>> = BTreeMap::new();
    for db in databases {
        clusters
            .entry((db.cloud, db.region.clone()))
            .or_default()
            .push(db);
    }

    clusters
        .into_iter()
        .map(|((cloud, region), dbs)| {
            let (x, y) = region_coordinate(&region);
            RegionMarker {
                cloud,
                x,
                y,
                critical_count: count_status(&dbs, HealthStatus::Critical),
                warning_count: count_status(&dbs, HealthStatus::Warning),
                healthy_count: count_healthy(&dbs),
                region,
                databases: dbs,
            }
        })
        .collect()
}

/// Worst state wins: red with any critical, yellow with any warning,
/// green otherwise.
pub fn marker_color(marker: &RegionMarker<'_>) -> &'static str {
    if marker.critical_count > 0 {
        "#ef4444"
    } else if marker.warning_count > 0 {
        "#eab308"
    } else {
        "#22c55e"
    }
}

/// Marker diameter in pixels, stepped by cluster size.
pub fn marker_size(marker: &RegionMarker<'_>) -> u32 {
    match marker.databases.len() {
        0..=2 => 16,
        3..=5 => 20,
        6..=10 => 24,
        _ => 28,
    }
}

fn region_coordinate(region: &str) -> (f64, f64) {
    let lookup = region.to_lowercase();
    REGION_COORDINATES
        .iter()
        .find(|(name, _, _)| *name == lookup)
        .map(|(_, x, y)| (*x, *y))
        .unwrap_or(DEFAULT_COORDINATE)
}
