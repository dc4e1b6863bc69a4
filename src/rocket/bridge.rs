//! Bridge between Rapier and the flight core.
//!
//! - [`route_collisions_system`] turns `CollisionEvent`s touching any rocket
//!   part into ledger begin/end calls on the one controller.  Several parts
//!   touching the same object count as one contact.
//! - [`flight_tick_system`] feeds the carrier's kinematics to the controller
//!   every fixed step.
//! - [`apply_physics_commands_system`] turns buffered detachment commands into
//!   Rapier component changes.

use super::{Rocket, RocketFlight, RocketFragment, Touch};
use crate::constants::UNTAGGED;
use crate::flight::{BodySnapshot, ContactEvent, ContactId, FlightOutcome, PhysicsCommand};
use crate::rocket::ContactTag;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use std::collections::HashMap;

/// Name reported for scenery without a `Name` component.
const UNNAMED: &str = "Unnamed";

fn contact_id(entity: Entity) -> ContactId {
    ContactId(entity.to_bits())
}

// ── Collisions ────────────────────────────────────────────────────────────────

pub fn route_collisions_system(
    mut collision_events: MessageReader<CollisionEvent>,
    mut flight: ResMut<RocketFlight>,
    q_parts: Query<(), Or<(With<Rocket>, With<RocketFragment>)>>,
    q_other: Query<(Option<&Name>, Option<&ContactTag>, Option<&Velocity>)>,
    mut outcomes: MessageWriter<FlightOutcome>,
) {
    let flight = &mut *flight;

    for event in collision_events.read() {
        let (e1, e2, started) = match event {
            CollisionEvent::Started(e1, e2, _) => (*e1, *e2, true),
            CollisionEvent::Stopped(e1, e2, _) => (*e1, *e2, false),
        };
        let other = match (q_parts.contains(e1), q_parts.contains(e2)) {
            (true, false) => e2,
            (false, true) => e1,
            _ => continue,
        };

        if !started {
            let Some(touch) = flight.touching.get_mut(&other) else {
                continue;
            };
            touch.parts = touch.parts.saturating_sub(1);
            if touch.parts == 0 {
                flight.touching.remove(&other);
                if let Some(controller) = flight.controller.as_mut() {
                    controller.on_contact_end(contact_id(other));
                }
            }
            continue;
        }

        let (name, tag, other_velocity) = match q_other.get(other) {
            Ok((name, tag, velocity)) => (
                name.map_or_else(|| UNNAMED.to_string(), |n| n.as_str().to_string()),
                tag.map_or_else(|| UNTAGGED.to_string(), |t| t.0.clone()),
                velocity.map_or(Vec2::ZERO, |v| v.linvel),
            ),
            Err(_) => (UNNAMED.to_string(), UNTAGGED.to_string(), Vec2::ZERO),
        };

        let touch = flight.touching.entry(other).or_insert_with(|| Touch {
            parts: 0,
            name: name.clone(),
            tag: tag.clone(),
        });
        touch.parts += 1;
        if touch.parts > 1 {
            continue;
        }

        let relative_speed = (flight.last_velocity - other_velocity).length();
        let Some(controller) = flight.controller.as_mut() else {
            continue;
        };
        let contact = ContactEvent::new(contact_id(other), name, tag, relative_speed);
        if let Some(outcome) = controller.on_contact_begin(&contact) {
            outcomes.write(outcome);
        }
    }
}

// ── Fixed tick ────────────────────────────────────────────────────────────────

pub fn flight_tick_system(
    time: Res<Time>,
    mut flight: ResMut<RocketFlight>,
    q_carrier: Query<(&Transform, &Velocity), With<Rocket>>,
    mut outcomes: MessageWriter<FlightOutcome>,
) {
    let flight = &mut *flight;
    let Some(carrier) = flight.carrier else {
        return;
    };
    let Ok((transform, velocity)) = q_carrier.get(carrier) else {
        return;
    };
    let Some(controller) = flight.controller.as_mut() else {
        return;
    };

    for (entity, touch) in &flight.touching {
        controller.on_contact_stay(contact_id(*entity), &touch.name, &touch.tag);
    }

    let snapshot = BodySnapshot {
        position: transform.translation.truncate().extend(0.0),
        rotation: transform.rotation,
        velocity: velocity.linvel.extend(0.0),
        angular_velocity: Vec3::Z * velocity.angvel,
    };
    flight.last_velocity = velocity.linvel;

    if let Some(outcome) = controller.fixed_tick(time.delta_secs(), &snapshot) {
        outcomes.write(outcome);
    }
}

// ── Physics commands ──────────────────────────────────────────────────────────

pub fn apply_physics_commands_system(
    mut commands: Commands,
    mut flight: ResMut<RocketFlight>,
    q_carrier: Query<&Transform, With<Rocket>>,
) {
    let pending = match flight.controller.as_mut() {
        Some(controller) => controller.drain_physics_commands(),
        None => return,
    };
    if pending.is_empty() {
        return;
    }

    let carrier_rotation = flight
        .carrier
        .and_then(|c| q_carrier.get(c).ok())
        .map_or(Quat::IDENTITY, |t| t.rotation);
    let mut impulses: HashMap<Entity, ExternalImpulse> = HashMap::new();

    for command in pending {
        match command {
            PhysicsCommand::FreezeCompositeDriver(body) => {
                let Some(carrier) = flight.carrier else {
                    continue;
                };
                commands.entity(carrier).insert((
                    RigidBody::KinematicVelocityBased,
                    Velocity::zero(),
                    GravityScale(0.0),
                    ExternalForce::default(),
                ));
                debug!("[rocket] carrier of body {} frozen", body.0);
            }
            PhysicsCommand::SpawnDynamicFragment {
                fragment,
                position,
                initial_velocity,
                initial_angular_velocity,
                debris,
            } => match flight.fragment_entity(fragment) {
                Ok(entity) => {
                    commands.entity(entity).remove::<ChildOf>().insert((
                        Transform::from_translation(position.truncate().extend(1.0))
                            .with_rotation(carrier_rotation),
                        RigidBody::Dynamic,
                        Velocity {
                            linvel: initial_velocity.truncate(),
                            angvel: initial_angular_velocity.z,
                        },
                        ColliderMassProperties::Mass(debris.mass),
                        Damping {
                            linear_damping: debris.linear_damping,
                            angular_damping: debris.angular_damping,
                        },
                        GravityScale(1.0),
                    ));
                }
                Err(e) => warn!("[rocket] {e}"),
            },
            PhysicsCommand::ApplyImpulse(fragment, impulse) => match flight.fragment_entity(fragment) {
                Ok(entity) => impulses.entry(entity).or_default().impulse += impulse.truncate(),
                Err(e) => warn!("[rocket] {e}"),
            },
            PhysicsCommand::ApplyTorqueImpulse(fragment, torque) => {
                match flight.fragment_entity(fragment) {
                    Ok(entity) => impulses.entry(entity).or_default().torque_impulse += torque.z,
                    Err(e) => warn!("[rocket] {e}"),
                }
            }
        }
    }

    for (entity, impulse) in impulses {
        commands.entity(entity).insert(impulse);
    }
}
