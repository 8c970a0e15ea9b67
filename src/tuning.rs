//! Data-driven game balance
//!
//! Every knob here is an empirically tuned gameplay constant. Defaults are
//! the shipped balance; a JSON file can override any subset for playtesting.
//! Structural constants (projectile type set, milestone table, collision
//! precedence) are not tunable and live next to the code that owns them.

use serde::{Deserialize, Serialize};

/// Tunable gameplay constants (tick units at the 60 Hz baseline)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    // === Boss rhythm ===
    /// Base assault duration; scales up with level
    pub assault_base: f32,
    /// Assault duration gained per level
    pub assault_per_level: f32,
    /// Base recovery duration; scales down with level
    pub recovery_base: f32,
    /// Recovery duration lost per level
    pub recovery_per_level: f32,
    /// Recovery never drops below this
    pub recovery_floor: f32,
    /// Shoot-timer advance multiplier during assault
    pub assault_speed_multiplier: f32,
    /// Assault multiplier for mega bosses
    pub assault_speed_multiplier_mega: f32,
    /// Shoot-timer advance multiplier during recovery
    pub recovery_speed_multiplier: f32,
    /// Movement and shooting freeze for this long on each phase change
    pub phase_transition_duration: f32,

    // === Vulnerability windows ===
    /// Per-tick chance that a window opens (halved at level <= 3)
    pub vulnerability_chance: f32,
    /// Window duration before it closes on its own
    pub vulnerability_duration: f32,
    /// Lockout after a boss hit before the next window may open
    pub vulnerability_lockout: f32,
    /// Lockout at level start
    pub vulnerability_start_lockout: f32,

    // === Graze tiers ===
    /// Normal graze radius
    pub graze_radius: f32,
    /// Close-call radius
    pub close_call_radius: f32,
    /// Frame-perfect dodge radius
    pub perfect_dodge_radius: f32,
    /// I-frame ticks granted by a perfect dodge
    pub perfect_dodge_iframes: f32,

    // === Combo ===
    /// Ticks before an untouched combo decays
    pub combo_timeout: f32,
    /// Milestone announcement display time
    pub announcement_duration: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            assault_base: 300.0,
            assault_per_level: 8.0,
            recovery_base: 210.0,
            recovery_per_level: 4.0,
            recovery_floor: 150.0,
            assault_speed_multiplier: 1.8,
            assault_speed_multiplier_mega: 1.95,
            recovery_speed_multiplier: 0.4,
            phase_transition_duration: 90.0,

            vulnerability_chance: 0.01,
            vulnerability_duration: 1200.0,
            vulnerability_lockout: 90.0,
            vulnerability_start_lockout: 180.0,

            graze_radius: 25.0,
            close_call_radius: 15.0,
            perfect_dodge_radius: 8.0,
            perfect_dodge_iframes: 8.0,

            combo_timeout: 180.0,
            announcement_duration: 90.0,
        }
    }
}

impl Tuning {
    /// Parse a JSON override set; unknown fields are rejected loudly,
    /// missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load overrides from a file, falling back to defaults on any error.
    pub fn load_or_default(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(tuning) => {
                    log::info!("Loaded tuning overrides from {path}");
                    tuning
                }
                Err(err) => {
                    log::warn!("Ignoring malformed tuning file {path}: {err}");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default tuning");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "graze_radius": 30.0 }"#).unwrap();
        assert_eq!(tuning.graze_radius, 30.0);
        assert_eq!(tuning.close_call_radius, Tuning::default().close_call_radius);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let tuning = Tuning::load_or_default("/nonexistent/tuning.json");
        assert_eq!(tuning.combo_timeout, Tuning::default().combo_timeout);
    }
}
