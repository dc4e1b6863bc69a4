//! Rocket input and thrust.
//!
//! ## Pipeline (runs in order every `Update` frame)
//!
//! 1. [`rocket_intent_clear_system`]: resets `RocketIntent` and the carrier's `ExternalForce`.
//! 2. [`keyboard_to_intent_system`]: Space / A / D into `RocketIntent`.
//! 3. [`apply_rocket_intent_system`]: `RocketIntent` into `ExternalForce`; notes control input.
//!
//! Tests populate `RocketIntent` directly and run only the apply step.

use super::{Rocket, RocketFlight};
use crate::config::FlightConfig;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// What the player asked for this frame.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default)]
pub struct RocketIntent {
    pub thrust: bool,
    /// +1 counter-clockwise, −1 clockwise, 0 none.
    pub rotate: f32,
}

impl RocketIntent {
    pub fn is_idle(&self) -> bool {
        !self.thrust && self.rotate == 0.0
    }
}

pub fn rocket_intent_clear_system(
    mut q: Query<&mut ExternalForce, With<Rocket>>,
    mut intent: ResMut<RocketIntent>,
) {
    for mut force in q.iter_mut() {
        force.force = Vec2::ZERO;
        force.torque = 0.0;
    }
    *intent = RocketIntent::default();
}

/// - **Space** → main engine
/// - **A** → rotate counter-clockwise
/// - **D** → rotate clockwise
pub fn keyboard_to_intent_system(keys: Res<ButtonInput<KeyCode>>, mut intent: ResMut<RocketIntent>) {
    if keys.pressed(KeyCode::Space) {
        intent.thrust = true;
    }
    if keys.pressed(KeyCode::KeyA) {
        intent.rotate = 1.0;
    } else if keys.pressed(KeyCode::KeyD) {
        intent.rotate = -1.0;
    }
}

/// Push the carrier along its nose and spin it about +Z.
///
/// Ignored once the segment has an outcome or the rocket has broken apart.
pub fn apply_rocket_intent_system(
    mut q: Query<(&Transform, &mut ExternalForce), With<Rocket>>,
    intent: Res<RocketIntent>,
    config: Res<FlightConfig>,
    mut flight: ResMut<RocketFlight>,
) {
    if intent.is_idle() {
        return;
    }
    let Some(controller) = flight.controller.as_mut() else {
        return;
    };
    if controller.result().is_some() || controller.body().dynamic {
        return;
    }
    let Ok((transform, mut force)) = q.single_mut() else {
        return;
    };

    controller.note_control_input();

    if intent.thrust {
        let forward = transform.rotation.mul_vec3(Vec3::Y).truncate();
        force.force += forward * config.main_thrust;
    }
    force.torque += intent.rotate * config.rotation_thrust;
}
