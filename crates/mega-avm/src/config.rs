//! Engine configuration.
//!
//! All fields have defaults taken from [`constants`](crate::constants), so a configuration file
//! only needs to mention what it overrides.

use serde::{Deserialize, Serialize};

use crate::{constants, CostSchedule, Opcode, WatchdogPolicy};

/// Errors raised while loading the engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration is not valid JSON or does not match the expected shape.
    #[error("malformed engine configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// The cost schedule prices the same opcode twice.
    #[error("opcode {0} is priced more than once in the cost schedule")]
    DuplicateCostEntry(Opcode),
    /// The static fee of an opcode does not fit in a `u64`.
    #[error("static fee of opcode {0} overflows")]
    CostOverflow(Opcode),
    /// The accepted energy limit range is empty.
    #[error("invalid energy limit bounds: min {min} > max {max}")]
    InvalidEnergyBounds {
        /// The configured minimum.
        min: u64,
        /// The configured maximum.
        max: u64,
    },
}

/// Limits enforced by the call-stack watchdog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Which checks are enabled.
    pub policy: WatchdogPolicy,
    /// Maximum number of nested method activations.
    pub max_depth: u64,
    /// Maximum cumulative frame size in words.
    pub max_size: u64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            policy: WatchdogPolicy::all(),
            max_depth: constants::watchdog::MAX_DEPTH,
            max_size: constants::watchdog::MAX_SIZE,
        }
    }
}

/// Bounds on the energy limit a transaction may request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// The smallest accepted energy limit.
    pub min_energy_limit: u64,
    /// The largest accepted energy limit.
    pub max_energy_limit: u64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            min_energy_limit: constants::energy::MIN_ENERGY_LIMIT,
            max_energy_limit: constants::energy::MAX_ENERGY_LIMIT,
        }
    }
}

impl EnergyConfig {
    /// Whether `energy_limit` is within the accepted range.
    pub const fn accepts(&self, energy_limit: u64) -> bool {
        energy_limit >= self.min_energy_limit && energy_limit <= self.max_energy_limit
    }
}

/// Configuration of an [`AvmEngine`](crate::AvmEngine).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Call-stack watchdog limits.
    pub watchdog: WatchdogConfig,
    /// Accepted energy limits.
    pub energy: EnergyConfig,
    /// The opcode prices. The built-in schedule is used when absent.
    pub cost_schedule: Option<CostSchedule>,
}

impl EngineConfig {
    /// Parses a configuration from JSON and validates it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants serde cannot express.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.energy.min_energy_limit > self.energy.max_energy_limit {
            return Err(ConfigError::InvalidEnergyBounds {
                min: self.energy.min_energy_limit,
                max: self.energy.max_energy_limit,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_yields_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.watchdog.max_depth, constants::watchdog::MAX_DEPTH);
        assert!(config.cost_schedule.is_none());
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_json(
            r#"{"watchdog":{"policy":"CHECK_DEPTH","max_depth":3},"energy":{"max_energy_limit":500000}}"#,
        )
        .unwrap();
        assert_eq!(config.watchdog.policy, WatchdogPolicy::CHECK_DEPTH);
        assert_eq!(config.watchdog.max_depth, 3);
        assert_eq!(config.watchdog.max_size, constants::watchdog::MAX_SIZE);
        assert_eq!(config.energy.max_energy_limit, 500_000);
        assert_eq!(config.energy.min_energy_limit, constants::energy::MIN_ENERGY_LIMIT);
    }

    #[test]
    fn test_inverted_energy_bounds_are_rejected() {
        let err = EngineConfig::from_json(
            r#"{"energy":{"min_energy_limit":10,"max_energy_limit":5}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnergyBounds { min: 10, max: 5 }));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(EngineConfig::from_json("{"), Err(ConfigError::Json(_))));
    }
}
