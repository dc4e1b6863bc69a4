//! Flight-outcome error types.
//!
//! Only setup faults are errors.  Gameplay situations (unknown contact names,
//! unmapped tags, duplicate triggers) resolve to default categories or
//! no-ops and never surface here.
//!
//! ## Usage
//!
//! ```rust
//! use landfall::error::{validate_positive, FlightResult};
//!
//! fn check(speed: f32) -> FlightResult<()> {
//!     validate_positive("max_safe_speed", speed)?;
//!     Ok(())
//! }
//! # check(5.0).unwrap();
//! ```

use std::fmt;

use crate::flight::body::{BodyId, FragmentId};

/// Top-level error enum for the landing game.
#[derive(Debug, Clone, PartialEq)]
pub enum FlightError {
    /// The rocket body was handed to the controller without a physics driver.
    /// Raised at construction so it can never be mistaken for a defeat.
    MissingPhysicsDriver {
        /// Body that lacked the driver.
        body: BodyId,
    },

    /// Configuration constant is outside its safe operating range.
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },

    /// A configuration file existed but could not be parsed.
    ConfigParse {
        /// Path of the offending file.
        path: String,
        /// Parser message.
        message: String,
    },

    /// The physics bridge received a command for a fragment it never mapped
    /// to an engine entity.
    UnknownFragment {
        /// Fragment referenced by the command.
        fragment: FragmentId,
    },
}

impl fmt::Display for FlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightError::MissingPhysicsDriver { body } => write!(
                f,
                "body {} has no physics driver attached; attach one before \
                 creating the flight controller",
                body.0
            ),
            FlightError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
            FlightError::ConfigParse { path, message } => {
                write!(f, "failed to parse '{}': {}", path, message)
            }
            FlightError::UnknownFragment { fragment } => {
                write!(f, "no engine entity registered for fragment {}", fragment.0)
            }
        }
    }
}

impl std::error::Error for FlightError {}

/// Convenience alias: a `Result` using `FlightError` as the error type.
pub type FlightResult<T> = Result<T, FlightError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is strictly positive and finite.
pub fn validate_positive(name: &'static str, value: f32) -> FlightResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FlightError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error unless `value` is finite and not negative.
pub fn validate_non_negative(name: &'static str, value: f32) -> FlightResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FlightError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, ∞)",
        })
    }
}

/// Returns an error unless `min <= max` and both bounds are positive.
///
/// The error names the upper bound, since that is the value usually mistyped.
pub fn validate_jitter_range(min: f32, max: f32) -> FlightResult<()> {
    validate_positive("explosion_jitter_min", min)?;
    if max.is_finite() && max >= min {
        Ok(())
    } else {
        Err(FlightError::UnsafeConstant {
            name: "explosion_jitter_max",
            value: max,
            safe_range: "[explosion_jitter_min, ∞)",
        })
    }
}
