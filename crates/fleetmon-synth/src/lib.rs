//! Seedable synthetic data engine for a multi-cloud database fleet.
//!
//! Generators derive issues, alerts, billing records and metric history
//! from a base fleet of [`Database`](fleetmon_common::types::Database)
//! records. All randomness flows through an injected [`FleetRng`], so a
//! fixed seed reproduces the exact same snapshot.

pub mod alert;
pub mod billing;
pub mod database;
pub mod issue;
pub mod metrics;
pub mod rng;
pub mod snapshot;

mod util;


pub use rng::FleetRng;
pub use snapshot::{FleetSnapshot, SnapshotConfig};
