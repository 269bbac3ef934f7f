use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum ClimboxError {
    #[error("sorted lookup failed: no coordinate value on the requested side of {target}")]
    TargetOutOfRange { target: String },
    #[error("unsorted lookup failed: no coordinate value within {tolerance} of {target}")]
    NoMatch { target: String, tolerance: String },
    #[error("unsorted lookup is ambiguous: {count} coordinate values near {target}, at most two allowed")]
    AmbiguousMatch { target: String, count: usize },
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("invalid season: {0}")]
    InvalidSeason(String),
    #[error("calendar error: {0}")]
    Calendar(String),
    #[error("region table error: {0}")]
    Config(#[from] toml::de::Error),
}

/// Convenience type for `Result<T, ClimboxError>`.
pub type ClimboxResult<T> = Result<T, ClimboxError>;
