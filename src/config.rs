//! Runtime flight configuration loaded from `assets/flight.toml`.
//!
//! [`FlightConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_flight_config`] reads
//! `assets/flight.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the constants you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<FlightConfig>` to any system parameter list and read values
//! with `config.max_safe_speed`, `config.confirmation_window`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `FlightConfig::default()`.

use crate::constants::*;
use crate::error::{
    validate_jitter_range, validate_non_negative, validate_positive, FlightError, FlightResult,
};
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable flight and gameplay configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    // ── Landing & Crash ───────────────────────────────────────────────────────
    pub max_safe_speed: f32,
    pub takeoff_speed_threshold: f32,
    pub stopped_threshold: f32,
    pub confirmation_window: f32,

    // ── Explosion ─────────────────────────────────────────────────────────────
    pub explosion_force_multiplier: f32,
    pub explosion_torque_multiplier: f32,
    pub explosion_jitter_min: f32,
    pub explosion_jitter_max: f32,
    pub degenerate_direction_epsilon: f32,
    /// Restrict random explosion directions to the XY plane and torque to Z.
    pub planar_explosions: bool,
    /// Fixed seed for explosion randomness; `None` seeds from OS entropy.
    pub rng_seed: Option<u64>,
    pub debris_mass: f32,
    pub debris_linear_damping: f32,
    pub debris_angular_damping: f32,

    // ── Contact Identification ────────────────────────────────────────────────
    pub launch_pad_name: String,
    pub landing_pad_name: String,
    pub goal_tag: String,
    pub terrain_tag: String,

    // ── Player: Movement ──────────────────────────────────────────────────────
    pub main_thrust: f32,
    pub rotation_thrust: f32,
    pub gravity: f32,

    // ── Result Flow ───────────────────────────────────────────────────────────
    pub result_delay_secs: f32,
    pub failure_comments_path: String,

    // ── Rendering ─────────────────────────────────────────────────────────────
    pub result_font_size: f32,
    pub comment_font_size: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            // Landing & Crash
            max_safe_speed: MAX_SAFE_SPEED,
            takeoff_speed_threshold: TAKEOFF_SPEED_THRESHOLD,
            stopped_threshold: STOPPED_THRESHOLD,
            confirmation_window: CONFIRMATION_WINDOW_SECS,
            // Explosion
            explosion_force_multiplier: EXPLOSION_FORCE_MULTIPLIER,
            explosion_torque_multiplier: EXPLOSION_TORQUE_MULTIPLIER,
            explosion_jitter_min: EXPLOSION_JITTER_MIN,
            explosion_jitter_max: EXPLOSION_JITTER_MAX,
            degenerate_direction_epsilon: DEGENERATE_DIRECTION_EPSILON,
            planar_explosions: true,
            rng_seed: None,
            debris_mass: DEBRIS_MASS,
            debris_linear_damping: DEBRIS_LINEAR_DAMPING,
            debris_angular_damping: DEBRIS_ANGULAR_DAMPING,
            // Contact Identification
            launch_pad_name: LAUNCH_PAD_NAME.to_string(),
            landing_pad_name: LANDING_PAD_NAME.to_string(),
            goal_tag: GOAL_TAG.to_string(),
            terrain_tag: TERRAIN_TAG.to_string(),
            // Player: Movement
            main_thrust: MAIN_THRUST,
            rotation_thrust: ROTATION_THRUST,
            gravity: GRAVITY,
            // Result Flow
            result_delay_secs: RESULT_DELAY_SECS,
            failure_comments_path: FAILURE_COMMENTS_PATH.to_string(),
            // Rendering
            result_font_size: RESULT_FONT_SIZE,
            comment_font_size: COMMENT_FONT_SIZE,
        }
    }
}

impl FlightConfig {
    /// Parse a TOML document; keys absent from `contents` keep their defaults.
    pub fn from_toml_str(path: &str, contents: &str) -> FlightResult<Self> {
        let config: FlightConfig =
            toml::from_str(contents).map_err(|e| FlightError::ConfigParse {
                path: path.to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every threshold the flight rules depend on.
    ///
    /// The stopped threshold must sit below the takeoff threshold, which in
    /// turn may not exceed the crash threshold; otherwise a resting rocket
    /// could count as airborne, or a takeoff could never be told apart from
    /// a crash.
    pub fn validate(&self) -> FlightResult<()> {
        validate_positive("max_safe_speed", self.max_safe_speed)?;
        validate_positive("takeoff_speed_threshold", self.takeoff_speed_threshold)?;
        validate_non_negative("stopped_threshold", self.stopped_threshold)?;
        validate_positive("confirmation_window", self.confirmation_window)?;
        validate_non_negative("explosion_force_multiplier", self.explosion_force_multiplier)?;
        validate_non_negative(
            "explosion_torque_multiplier",
            self.explosion_torque_multiplier,
        )?;
        validate_jitter_range(self.explosion_jitter_min, self.explosion_jitter_max)?;
        validate_positive(
            "degenerate_direction_epsilon",
            self.degenerate_direction_epsilon,
        )?;
        validate_positive("debris_mass", self.debris_mass)?;
        validate_non_negative("result_delay_secs", self.result_delay_secs)?;

        if self.stopped_threshold >= self.takeoff_speed_threshold {
            return Err(FlightError::UnsafeConstant {
                name: "stopped_threshold",
                value: self.stopped_threshold,
                safe_range: "[0.0, takeoff_speed_threshold)",
            });
        }
        if self.takeoff_speed_threshold > self.max_safe_speed {
            return Err(FlightError::UnsafeConstant {
                name: "takeoff_speed_threshold",
                value: self.takeoff_speed_threshold,
                safe_range: "(stopped_threshold, max_safe_speed]",
            });
        }
        Ok(())
    }
}

/// Startup system: attempt to load `assets/flight.toml` and overwrite the
/// `FlightConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  Parse or validation errors
/// are printed to stderr but do not abort the game.  A missing file is
/// silently ignored (defaults are already in place from `insert_resource`).
pub fn load_flight_config(mut config: ResMut<FlightConfig>) {
    let path = FLIGHT_CONFIG_PATH;
    match std::fs::read_to_string(path) {
        Ok(contents) => match FlightConfig::from_toml_str(path, &contents) {
            Ok(loaded) => {
                *config = loaded;
                println!("✓ Loaded flight config from {path}");
            }
            Err(e) => {
                eprintln!("⚠ {e}; using defaults");
            }
        },
        Err(_) => {
            // File not present: defaults are already in place.
            println!("ℹ No {path} found; using compiled defaults");
        }
    }
}
