//! Health score thresholds and bucket mapping.

use crate::types::HealthStatus;

/// Scores at or above this are excellent.
pub const EXCELLENT_THRESHOLD: i32 = 95;
/// Scores at or above this (and below excellent) are good.
pub const GOOD_THRESHOLD: i32 = 85;
/// Scores at or above this (and below good) are warning.
pub const WARNING_THRESHOLD: i32 = 70;

/// Maps a health score to its status bucket. Negative scores are the
/// unknown sentinel.
///
/// # Examples
///
/// ```rust
/// use fleetmon_common::health::status_for_score;
/// use fleetmon_common::types::HealthStatus;
///
/// assert_eq!(status_for_score(97), HealthStatus::Excellent);
/// assert_eq!(status_for_score(85), HealthStatus::Good);
/// assert_eq!(status_for_score(72), HealthStatus::Warning);
/// assert_eq!(status_for_score(40), HealthStatus::Critical);
/// assert_eq!(status_for_score(-1), HealthStatus::Unknown);
/// ```
pub fn status_for_score(score: i32) -> HealthStatus {
    if score < 0 {
        return HealthStatus::Unknown;
    }
    if score >= EXCELLENT_THRESHOLD {
        HealthStatus::Excellent
    } else if score >= GOOD_THRESHOLD {
        HealthStatus::Good
    } else if score >= WARNING_THRESHOLD {
        HealthStatus::Warning
    } else {
        HealthStatus::Critical
    }
}
