use thiserror::Error;

/// Problems found while building or validating a [`crate::RevealConfig`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("duration must be finite and positive, got {0} ms")]
    NonPositiveDuration(f64),
    #[error("{name} must be finite and non-negative, got {value} ms")]
    InvalidFade { name: &'static str, value: f64 },
    #[error("star palette has no usable bands")]
    EmptyPalette,
    #[error("star band {index} has an invalid range")]
    InvalidBand { index: usize },
    #[error("particle count {0} is outside 1..={max}", max = crate::constants::MAX_STAR_COUNT)]
    ParticleCount(usize),
    #[error("field radii must satisfy 0 <= inner < outer (got {inner}..{outer})")]
    FieldRadii { inner: f32, outer: f32 },
    #[error("constellation '{0}' needs at least two points")]
    ShortConstellation(String),
    #[error("jitter amplitude must be finite and non-negative")]
    InvalidJitter,
    #[error("smoothing must be in (0, 1], got {0}")]
    InvalidSmoothing(f32),
    #[error("malformed config json: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e.to_string())
    }
}
