//! The rocket in the ECS: spawn, input, and the bridge to the flight core.
//!
//! The rocket is one Rapier rigid body (the carrier, tagged [`Rocket`]) with a
//! collider child per fragment (tagged [`RocketFragment`]).  Collisions of any
//! part are routed straight to the single [`FlightOutcomeController`] held in
//! [`RocketFlight`].
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`control`] | `RocketIntent`: Space thrust, A/D rotation → `ExternalForce`; marks control input |
//! | [`bridge`] | Collision routing, the fixed-tick flight update, applying buffered physics commands |
//!
//! ## Systems (registered by `RocketPlugin`)
//!
//! | System                            | Schedule       |
//! |-----------------------------------|----------------|
//! | `rocket_intent_clear_system`      | `Update`       |
//! | `keyboard_to_intent_system`       | `Update`       |
//! | `apply_rocket_intent_system`      | `Update`       |
//! | `flight_tick_system`              | `FixedUpdate`  |
//! | `route_collisions_system`         | `PostUpdate`   |
//! | `apply_physics_commands_system`   | `PostUpdate`   |

pub mod bridge;
pub mod control;

pub use bridge::{apply_physics_commands_system, flight_tick_system, route_collisions_system};
pub use control::{
    apply_rocket_intent_system, keyboard_to_intent_system, rocket_intent_clear_system,
    RocketIntent,
};

use crate::config::FlightConfig;
use crate::error::{FlightError, FlightResult};
use crate::flight::{Body, BodyId, FlightOutcome, FlightOutcomeController, FragmentId};
use crate::graphics::Outline;
use crate::level::LevelEntity;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use std::collections::HashMap;

// ── Components ────────────────────────────────────────────────────────────────

/// Marker for the carrier rigid body.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Rocket;

/// A collider belonging to the rocket.  Child of the carrier until detachment.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RocketFragment(pub FragmentId);

/// Classification tag of a scenery object.  Untagged objects omit it.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct ContactTag(pub String);

// ── Layout ────────────────────────────────────────────────────────────────────

pub struct FragmentSpec {
    pub name: &'static str,
    pub offset: Vec2,
    pub half_extents: Vec2,
}

/// Hull pieces, listed in fragment-id order.
pub const ROCKET_FRAGMENTS: [FragmentSpec; 5] = [
    FragmentSpec {
        name: "Nose",
        offset: Vec2::new(0.0, 1.2),
        half_extents: Vec2::new(0.3, 0.3),
    },
    FragmentSpec {
        name: "Hull",
        offset: Vec2::new(0.0, 0.0),
        half_extents: Vec2::new(0.5, 0.9),
    },
    FragmentSpec {
        name: "LeftFin",
        offset: Vec2::new(-0.75, -0.7),
        half_extents: Vec2::new(0.25, 0.35),
    },
    FragmentSpec {
        name: "RightFin",
        offset: Vec2::new(0.75, -0.7),
        half_extents: Vec2::new(0.25, 0.35),
    },
    FragmentSpec {
        name: "Engine",
        offset: Vec2::new(0.0, -1.1),
        half_extents: Vec2::new(0.35, 0.2),
    },
];

/// Distance from the carrier origin to the lowest hull point.
pub const ROCKET_HALF_HEIGHT: f32 = 1.3;

/// Mass of one bonded hull piece.
pub const FRAGMENT_MASS: f32 = 1.0;

// ── Flight resource ───────────────────────────────────────────────────────────

/// One scenery object the rocket is touching, with how many rocket parts
/// touch it.  The core only hears about the first begin and the last end.
#[derive(Debug, Clone, PartialEq)]
pub struct Touch {
    pub parts: u32,
    pub name: String,
    pub tag: String,
}

/// ECS-side owner of the flight controller and its entity bookkeeping.
#[derive(Resource, Default)]
pub struct RocketFlight {
    pub controller: Option<FlightOutcomeController>,
    pub carrier: Option<Entity>,
    pub fragments: HashMap<FragmentId, Entity>,
    pub touching: HashMap<Entity, Touch>,
    /// Carrier velocity sampled at the last fixed tick, before the physics
    /// step resolves any new contact.
    pub last_velocity: Vec2,
    next_body_id: u32,
}

impl RocketFlight {
    pub fn next_body_id(&mut self) -> BodyId {
        let id = BodyId(self.next_body_id);
        self.next_body_id += 1;
        id
    }

    /// Install a freshly spawned rocket: builds the controller on first use,
    /// resets it for every later level load.
    pub fn begin_session(
        &mut self,
        config: &FlightConfig,
        body: Body,
        carrier: Entity,
        fragments: HashMap<FragmentId, Entity>,
    ) -> FlightResult<()> {
        match self.controller.as_mut() {
            Some(controller) => controller.reset_session(body)?,
            None => self.controller = Some(FlightOutcomeController::from_config(config, body)?),
        }
        self.carrier = Some(carrier);
        self.fragments = fragments;
        self.touching.clear();
        self.last_velocity = Vec2::ZERO;
        Ok(())
    }

    pub fn fragment_entity(&self, fragment: FragmentId) -> FlightResult<Entity> {
        self.fragments
            .get(&fragment)
            .copied()
            .ok_or(FlightError::UnknownFragment { fragment })
    }

    /// Outcome of the current segment, if resolved.
    pub fn outcome(&self) -> Option<FlightOutcome> {
        self.controller.as_ref().and_then(|c| c.result())
    }
}

impl std::fmt::Debug for RocketFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocketFlight")
            .field("controller", &self.controller)
            .field("carrier", &self.carrier)
            .field("fragments", &self.fragments.len())
            .field("touching", &self.touching.len())
            .field("last_velocity", &self.last_velocity)
            .finish()
    }
}

// ── Spawn ─────────────────────────────────────────────────────────────────────

/// Spawn the carrier and its fragment colliders at `position` and hand the
/// matching [`Body`] to `flight`.  Returns the carrier entity.
pub fn spawn_rocket(
    commands: &mut Commands,
    position: Vec2,
    flight: &mut RocketFlight,
    config: &FlightConfig,
) -> FlightResult<Entity> {
    let mut body = Body::new(
        flight.next_body_id(),
        FRAGMENT_MASS * ROCKET_FRAGMENTS.len() as f32,
    );
    body.position = position.extend(0.0);
    for spec in &ROCKET_FRAGMENTS {
        body = body.with_fragment(spec.offset.extend(0.0));
    }

    let carrier = commands
        .spawn((
            Rocket,
            LevelEntity,
            Name::new("Rocket"),
            RigidBody::Dynamic,
            Velocity::zero(),
            ExternalForce::default(),
            ExternalImpulse::default(),
            GravityScale(1.0),
            Transform::from_translation(position.extend(1.0)),
            Visibility::default(),
        ))
        .id();

    let mut fragments = HashMap::new();
    for (fragment, spec) in body.fragments.iter().zip(ROCKET_FRAGMENTS.iter()) {
        let entity = commands
            .spawn((
                RocketFragment(fragment.id),
                LevelEntity,
                Name::new(spec.name),
                Collider::cuboid(spec.half_extents.x, spec.half_extents.y),
                ColliderMassProperties::Mass(FRAGMENT_MASS),
                ActiveEvents::COLLISION_EVENTS,
                Transform::from_translation(spec.offset.extend(0.0)),
                Outline {
                    half_extents: spec.half_extents,
                    color: Color::srgb(0.95, 0.95, 1.0),
                },
                ChildOf(carrier),
            ))
            .id();
        fragments.insert(fragment.id, entity);
    }

    flight.begin_session(config, body, carrier, fragments)?;
    Ok(carrier)
}

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct RocketPlugin;

impl Plugin for RocketPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RocketFlight>()
            .init_resource::<RocketIntent>()
            .add_message::<FlightOutcome>()
            .add_systems(
                Update,
                (
                    rocket_intent_clear_system,
                    keyboard_to_intent_system,
                    apply_rocket_intent_system,
                )
                    .chain(),
            )
            .add_systems(FixedUpdate, flight_tick_system)
            .add_systems(
                PostUpdate,
                (route_collisions_system, apply_physics_commands_system)
                    .chain()
                    .after(PhysicsSet::Writeback),
            );
    }
}
