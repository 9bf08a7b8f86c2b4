use thiserror::Error;

/// Default number of node closings before a search gives up.
pub const DEFAULT_ITERATION_LIMIT: usize = 1000;

/// Errors from [`SearchConfig::validate`] and config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("iteration limit must be at least 1")]
    ZeroIterationLimit,
    #[error("{name} must be finite and at least {min}, got {value}")]
    OutOfRange {
        name: &'static str,
        min: f32,
        value: f32,
    },
    #[error("simplify ratio must be in (0, 1], got {0}")]
    InvalidSimplifyRatio(f32),
    #[cfg(feature = "serde")]
    #[error("failed to parse search config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables of a path search.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Maximum number of closed nodes per search.
    pub iteration_limit: usize,
    /// Extra cost for changing direction, in multiples of the cell size.
    pub turn_penalty: f32,
    /// Cost factor for leaving the start cell through a rejected edge.
    pub root_penalty: f32,
    /// A turn point is dropped when the direct segment costs at most this
    /// fraction of the two segments it replaces.
    pub simplify_ratio: f32,
    /// Fail fast with `GROUND_NOT_FOUND` when the target has no ground.
    pub precheck_target: bool,
    /// Run path simplification on found paths.
    pub simplify: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iteration_limit: DEFAULT_ITERATION_LIMIT,
            turn_penalty: 2.0,
            root_penalty: 10.0,
            simplify_ratio: 0.9,
            precheck_target: true,
            simplify: true,
        }
    }
}

impl SearchConfig {
    /// Check that every tunable is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iteration_limit == 0 {
            return Err(ConfigError::ZeroIterationLimit);
        }
        check_min("turn_penalty", self.turn_penalty, 0.0)?;
        check_min("root_penalty", self.root_penalty, 1.0)?;
        if !(self.simplify_ratio > 0.0 && self.simplify_ratio <= 1.0) {
            return Err(ConfigError::InvalidSimplifyRatio(self.simplify_ratio));
        }
        Ok(())
    }

    /// Parse a JSON config. Missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

fn check_min(name: &'static str, value: f32, min: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, min, value })
    }
}
