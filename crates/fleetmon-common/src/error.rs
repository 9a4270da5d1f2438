/// Errors produced when parsing fleet domain values from their string
/// forms.
///
/// # Examples
///
/// ```rust
/// use fleetmon_common::error::FleetError;
///
/// let err = FleetError::UnknownTimeRange("90m".to_string());
/// assert!(err.to_string().contains("90m"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    /// The cloud provider name is not aws, gcp or azure.
    #[error("unknown cloud provider: {0}")]
    UnknownCloud(String),

    /// The database engine name is not part of the supported set.
    #[error("unknown database engine: {0}")]
    UnknownEngine(String),

    /// The environment tier is not production, staging or development.
    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),

    /// The severity name is not info, warning or critical.
    #[error("unknown severity: {0}")]
    UnknownSeverity(String),

    /// The time range value is not one of 1h, 24h, 7d or 30d.
    #[error("unknown time range: {0}")]
    UnknownTimeRange(String),
}

/// Convenience `Result` alias for fleet domain operations.
pub type Result<T> = std::result::Result<T, FleetError>;
