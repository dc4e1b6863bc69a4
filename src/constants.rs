//! Centralised flight-outcome and gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::FlightConfig::default`] is built from these values, and
//! `assets/flight.toml` may override any subset of them at startup.
//!
//! ## Tuning guidance
//!
//! Each constant includes the tested range and the observable consequence of
//! changing it.  Speeds are world units per second (1 u = 1 m at
//! `pixels_per_meter(1.0)`).

// ── Landing & Crash Thresholds ────────────────────────────────────────────────

/// Highest relative contact speed that still counts as a soft touch.
///
/// Any new contact faster than this explodes the rocket immediately.
/// Tested range: 3.0–8.0.  Below 3.0 even careful landings on a sloped pad
/// register as crashes.
pub const MAX_SAFE_SPEED: f32 = 5.0;

/// Speed above which a rocket with no active contacts is considered airborne
/// again, clearing the contact history and starting a new flight segment.
pub const TAKEOFF_SPEED_THRESHOLD: f32 = 1.0;

/// Speed at or below which the rocket counts as stopped for settle detection.
pub const STOPPED_THRESHOLD: f32 = 0.1;

/// Continuous time (seconds) the rocket must stay at or below
/// [`STOPPED_THRESHOLD`] before the landing is evaluated.
///
/// Shorter windows judge a bouncing landing mid-bounce; longer windows make
/// the result feel sluggish.  Tested range: 0.5–1.5.
pub const CONFIRMATION_WINDOW_SECS: f32 = 0.8;

// ── Explosion ─────────────────────────────────────────────────────────────────

/// Impulse per unit of impact speed applied to each detached fragment.
///
/// `impulse = impact_speed × EXPLOSION_FORCE_MULTIPLIER × jitter`.
/// With debris mass 10 an 8 u/s crash scatters fragments at roughly 40 u/s.
pub const EXPLOSION_FORCE_MULTIPLIER: f32 = 50.0;

/// Torque impulse bound per unit of impact speed (per axis, symmetric).
pub const EXPLOSION_TORQUE_MULTIPLIER: f32 = 10.0;

/// Lower bound of the per-fragment random force multiplier.
pub const EXPLOSION_JITTER_MIN: f32 = 0.8;

/// Upper bound of the per-fragment random force multiplier.
pub const EXPLOSION_JITTER_MAX: f32 = 1.2;

/// Offsets shorter than this are treated as "fragment sits on the body
/// centre" and receive a random explosion direction instead.
pub const DEGENERATE_DIRECTION_EPSILON: f32 = 1.0e-4;

/// Mass assigned to every detached fragment.
pub const DEBRIS_MASS: f32 = 10.0;

/// Linear damping of detached fragments.
pub const DEBRIS_LINEAR_DAMPING: f32 = 0.1;

/// Angular damping of detached fragments.
pub const DEBRIS_ANGULAR_DAMPING: f32 = 0.3;

// ── Contact Identification ────────────────────────────────────────────────────

/// Scene name of the pad the rocket launches from.
pub const LAUNCH_PAD_NAME: &str = "LaunchingPad";

/// Scene name of the pad the rocket must land on.
pub const LANDING_PAD_NAME: &str = "LandingPad";

/// Tag marking a landing pad as the level goal.
pub const GOAL_TAG: &str = "Finish";

/// Tag carried by ground and cliff geometry.
pub const TERRAIN_TAG: &str = "Terrain";

/// Tag reported for objects that carry no explicit tag.
pub const UNTAGGED: &str = "Untagged";

// ── Player: Movement ──────────────────────────────────────────────────────────

/// Main engine force applied along the rocket's local +Y while Space is held.
pub const MAIN_THRUST: f32 = 100.0;

/// Torque applied while A or D is held.
pub const ROTATION_THRUST: f32 = 10.0;

/// World gravity (u/s²) along −Y.
pub const GRAVITY: f32 = 9.81;

// ── Result Flow ───────────────────────────────────────────────────────────────

/// Seconds between an outcome and the next level load / level reload.
pub const RESULT_DELAY_SECS: f32 = 3.0;

/// Fallback line shown when no failure commentary is available.
pub const DEFAULT_FAILURE_COMMENT: &str = "Mission Failed.";

/// Category code used when a specific failure code has no commentary.
pub const DEFAULT_FAILURE_CODE: &str = "00";

// ── Assets ────────────────────────────────────────────────────────────────────

/// Optional TOML file overriding [`crate::config::FlightConfig`] defaults.
pub const FLIGHT_CONFIG_PATH: &str = "assets/flight.toml";

/// Failure commentary text file.
pub const FAILURE_COMMENTS_PATH: &str = "assets/failure_comments.txt";

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Font size of the result headline.
pub const RESULT_FONT_SIZE: f32 = 46.0;

/// Font size of the failure commentary line.
pub const COMMENT_FONT_SIZE: f32 = 18.0;

/// Orthographic projection scale; world units are metres, so this sets how
/// many metres one screen pixel covers.
pub const CAMERA_SCALE: f32 = 0.035;
