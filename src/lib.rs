//! Landfall: a planar rocket-landing game.
//!
//! The rules of a flight live in [`flight`], free of any ECS types beyond
//! math.  [`rocket`] bridges them to Bevy and Rapier; [`level`] and [`hud`]
//! carry the game around them.

pub mod comments;
pub mod config;
pub mod constants;
pub mod error;
pub mod flight;
pub mod graphics;
pub mod hud;
pub mod level;
pub mod rocket;
