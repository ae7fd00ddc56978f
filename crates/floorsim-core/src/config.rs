//! Simulation settings.

use serde::{Deserialize, Serialize};

use crate::components::VEHICLE_BUFFER;
use crate::systems::CollisionStrategy;

/// Knobs a host can set once per warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// How many collisions one sweep reports.
    pub collision_strategy: CollisionStrategy,
    /// Buffer margin given to vehicles created through the warehouse.
    pub vehicle_buffer: f64,
    /// Battery for vehicles created without one.
    pub default_battery: i64,
    /// Roll back a whole load batch when one entry fails.
    pub abort_on_error: bool,
    /// Removing an unknown id is an error instead of a no-op.
    pub strict_removal: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            collision_strategy: CollisionStrategy::FirstOnly,
            vehicle_buffer: VEHICLE_BUFFER,
            default_battery: 100,
            abort_on_error: true,
            strict_removal: false,
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Buffer is negative or not a number.
    InvalidBuffer(f64),
    /// Battery outside 0..=100.
    BatteryOutOfRange(i64),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidBuffer(b) => write!(f, "vehicle_buffer must be >= 0 (got {})", b),
            ConfigError::BatteryOutOfRange(b) => {
                write!(f, "default_battery must be within 0..=100 (got {})", b)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &SimConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if !(config.vehicle_buffer >= 0.0) || !config.vehicle_buffer.is_finite() {
        errors.push(ConfigError::InvalidBuffer(config.vehicle_buffer));
    }
    if !(0..=100).contains(&config.default_battery) {
        errors.push(ConfigError::BatteryOutOfRange(config.default_battery));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SimConfig::default();
        assert!(validate_config(&config).is_empty());
        assert_eq!(config.collision_strategy, CollisionStrategy::FirstOnly);
        assert_eq!(config.vehicle_buffer, 0.5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"collision_strategy":"All","strict_removal":true}"#;
        let config = SimConfig::from_json_str(json).unwrap();
        assert_eq!(config.collision_strategy, CollisionStrategy::All);
        assert!(config.strict_removal);
        assert!(config.abort_on_error);
        assert_eq!(config.default_battery, 100);
    }

    #[test]
    fn test_validate_collects_all() {
        let config = SimConfig {
            vehicle_buffer: -1.0,
            default_battery: 140,
            ..SimConfig::default()
        };
        let errors = validate_config(&config);
        assert_eq!(
            errors,
            vec![
                ConfigError::InvalidBuffer(-1.0),
                ConfigError::BatteryOutOfRange(140)
            ]
        );
    }
}
