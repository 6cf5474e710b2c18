//! Tuning constants for the simulation.
//!
//! Geometry that the map format depends on (tile size, player body) is fixed
//! at compile time. Movement feel lives in [`PhysicsConfig`], which has
//! sensible defaults and can be overridden from a JSON document.

use serde::{Deserialize, Serialize};

/// Edge length of one map cell in pixels.
pub const TILE_SIZE: f64 = 64.0;

/// Width of the player's collision box in pixels.
pub const PLAYER_WIDTH: f64 = 96.0;

/// Height of the player's collision box in pixels.
pub const PLAYER_HEIGHT: f64 = 96.0;

/// Default viewport size in pixels.
pub const VIEWPORT_WIDTH: f64 = 1280.0;
pub const VIEWPORT_HEIGHT: f64 = 720.0;

/// Errors produced when a tuning document is rejected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid JSON for [`PhysicsConfig`].
    #[error("failed to parse physics config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the simulation cannot run with.
    #[error("invalid physics config: {field} {reason}")]
    Invalid {
        /// Offending field name.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// Movement, damage and timing constants.
///
/// All speeds are pixels per frame; negative vertical values point up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f64,
    pub walk_speed: f64,
    pub run_speed: f64,
    pub jump_strength: f64,
    pub water_speed: f64,
    pub water_gravity: f64,
    pub water_jump: f64,
    pub climb_speed: f64,
    /// Vertical velocity applied when the player takes damage.
    pub knockback: f64,
    /// Downward speed above which the player counts as falling.
    pub fall_threshold: f64,
    pub enemy_speed: f64,
    /// Horizontal distance within which a follower tracks the player.
    pub follow_range: f64,
    /// Half-width of the band where a follower keeps its heading.
    pub follow_dead_zone: f64,
    pub start_health: u32,
    pub hurt_cooldown_ms: u64,
    pub ladder_cooldown_ms: u64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.8,
            walk_speed: 5.0,
            run_speed: 8.0,
            jump_strength: -22.0,
            water_speed: 2.0,
            water_gravity: 0.2,
            water_jump: -12.0,
            climb_speed: 4.0,
            knockback: -10.0,
            fall_threshold: 1.0,
            enemy_speed: 2.0,
            follow_range: 400.0,
            follow_dead_zone: 10.0,
            start_health: 5,
            hurt_cooldown_ms: 1000,
            ladder_cooldown_ms: 200,
        }
    }
}

impl PhysicsConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] if a value fails [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break the simulation's assumptions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("gravity", self.gravity),
            ("walk_speed", self.walk_speed),
            ("run_speed", self.run_speed),
            ("jump_strength", self.jump_strength),
            ("water_speed", self.water_speed),
            ("water_gravity", self.water_gravity),
            ("water_jump", self.water_jump),
            ("climb_speed", self.climb_speed),
            ("knockback", self.knockback),
            ("fall_threshold", self.fall_threshold),
            ("enemy_speed", self.enemy_speed),
            ("follow_range", self.follow_range),
            ("follow_dead_zone", self.follow_dead_zone),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be finite",
                });
            }
        }
        if self.gravity <= 0.0 || self.water_gravity <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "gravity",
                reason: "must pull downwards",
            });
        }
        if self.jump_strength >= 0.0 || self.water_jump >= 0.0 {
            return Err(ConfigError::Invalid {
                field: "jump_strength",
                reason: "must point upwards",
            });
        }
        if self.start_health == 0 {
            return Err(ConfigError::Invalid {
                field: "start_health",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}
