use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FleetError;

/// Time window selector for metric history queries.
///
/// Each range fixes both the number of samples and the spacing between
/// them, so a series always spans exactly the window it names.
///
/// # Examples
///
/// ```rust
/// use fleetmon_common::timerange::TimeRange;
///
/// let range: TimeRange = "7d".parse().unwrap();
/// assert_eq!(range, TimeRange::LastWeek);
/// assert_eq!(range.point_count(), 168);
/// assert_eq!(range.step_minutes(), 60);
/// assert_eq!(TimeRange::default(), TimeRange::LastDay);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1h")]
    LastHour,
    #[default]
    #[serde(rename = "24h")]
    LastDay,
    #[serde(rename = "7d")]
    LastWeek,
    #[serde(rename = "30d")]
    LastMonth,
}

impl TimeRange {
    /// All ranges, shortest first.
    pub const ALL: [TimeRange; 4] = [
        TimeRange::LastHour,
        TimeRange::LastDay,
        TimeRange::LastWeek,
        TimeRange::LastMonth,
    ];

    /// Number of samples a series over this range holds.
    pub fn point_count(&self) -> usize {
        match self {
            TimeRange::LastHour => 12,
            TimeRange::LastDay => 48,
            TimeRange::LastWeek => 168,
            TimeRange::LastMonth => 360,
        }
    }

    /// Minutes between consecutive samples.
    pub fn step_minutes(&self) -> i64 {
        match self {
            TimeRange::LastHour => 5,
            TimeRange::LastDay => 30,
            TimeRange::LastWeek => 60,
            TimeRange::LastMonth => 120,
        }
    }

    /// Total duration the range covers.
    pub fn span(&self) -> Duration {
        Duration::minutes(self.point_count() as i64 * self.step_minutes())
    }

    /// Short form used on the wire and in CLI flags.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::LastHour => "1h",
            TimeRange::LastDay => "24h",
            TimeRange::LastWeek => "7d",
            TimeRange::LastMonth => "30d",
        }
    }

    /// Human label for range pickers.
    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::LastHour => "Last hour",
            TimeRange::LastDay => "Last 24 hours",
            TimeRange::LastWeek => "Last 7 days",
            TimeRange::LastMonth => "Last 30 days",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1h" => Ok(TimeRange::LastHour),
            "24h" => Ok(TimeRange::LastDay),
            "7d" => Ok(TimeRange::LastWeek),
            "30d" => Ok(TimeRange::LastMonth),
            _ => Err(FleetError::UnknownTimeRange(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_range_spans_exactly_its_window() {
        assert_eq!(TimeRange::LastHour.span(), Duration::hours(1));
        assert_eq!(TimeRange::LastDay.span(), Duration::hours(24));
        assert_eq!(TimeRange::LastWeek.span(), Duration::days(7));
        assert_eq!(TimeRange::LastMonth.span(), Duration::days(30));
    }

    #[test]
    fn short_forms_round_trip() {
        for range in TimeRange::ALL {
            assert_eq!(range.as_str().parse::<TimeRange>().unwrap(), range);
        }
        assert!("2w".parse::<TimeRange>().is_err());
    }

    #[test]
    fn labels_are_distinct() {
        let labels: Vec<&str> = TimeRange::ALL.iter().map(|r| r.label()).collect();
        for (i, label) in labels.iter().enumerate() {
            for other in &labels[i + 1..] {
                assert_ne!(label, other);
            }
        }
    }
}
