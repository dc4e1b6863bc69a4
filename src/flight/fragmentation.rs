//! Crash explosion: turn the bonded rocket into free-flying debris.
//!
//! ## Per-fragment recipe
//!
//! 1. Spawn an independent dynamic actor that inherits the carrier's velocity
//!    and angular velocity.
//! 2. `force = impact_speed × force_multiplier × jitter`, `jitter ~ U(min, max)`.
//! 3. `direction = normalize(fragment_world − body_centre)`, or a random unit
//!    vector when the fragment sits on the centre.
//! 4. Impulse `direction × force`.
//! 5. Torque impulse with each axis `~ U(−impact_speed × torque_multiplier, +…)`.
//!
//! Random draws happen in a fixed order (jitter, fallback direction, torque
//! axes) per fragment, in fragment order, so a seeded generator replays the
//! same explosion exactly.

use super::body::{Body, BodyId, DetachedState, FragmentId, FragmentState};
use crate::config::FlightConfig;
use bevy::prelude::*;
use rand::Rng;

/// Physical properties handed to every spawned fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebrisProperties {
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

/// One instruction for the host physics engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhysicsCommand {
    FreezeCompositeDriver(BodyId),
    SpawnDynamicFragment {
        fragment: FragmentId,
        position: Vec3,
        initial_velocity: Vec3,
        initial_angular_velocity: Vec3,
        debris: DebrisProperties,
    },
    ApplyImpulse(FragmentId, Vec3),
    ApplyTorqueImpulse(FragmentId, Vec3),
}

/// Command sink implemented by whatever drives the physics engine.
pub trait PhysicsCommands {
    fn issue(&mut self, command: PhysicsCommand);

    fn freeze_composite_driver(&mut self, body: BodyId) {
        self.issue(PhysicsCommand::FreezeCompositeDriver(body));
    }

    fn spawn_dynamic_fragment(
        &mut self,
        fragment: FragmentId,
        position: Vec3,
        initial_velocity: Vec3,
        initial_angular_velocity: Vec3,
        debris: DebrisProperties,
    ) {
        self.issue(PhysicsCommand::SpawnDynamicFragment {
            fragment,
            position,
            initial_velocity,
            initial_angular_velocity,
            debris,
        });
    }

    fn apply_impulse(&mut self, fragment: FragmentId, impulse: Vec3) {
        self.issue(PhysicsCommand::ApplyImpulse(fragment, impulse));
    }

    fn apply_torque_impulse(&mut self, fragment: FragmentId, torque: Vec3) {
        self.issue(PhysicsCommand::ApplyTorqueImpulse(fragment, torque));
    }
}

/// Ordered buffer of commands awaiting the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhysicsCommandQueue(pub Vec<PhysicsCommand>);

impl PhysicsCommands for PhysicsCommandQueue {
    fn issue(&mut self, command: PhysicsCommand) {
        self.0.push(command);
    }
}

impl PhysicsCommandQueue {
    pub fn drain(&mut self) -> Vec<PhysicsCommand> {
        std::mem::take(&mut self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a call to [`FragmentationEngine::detach`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachReport {
    Detached { fragments: usize },
    AlreadyDetached,
}

/// Detaches the composite body and applies explosion impulses.
///
/// Generic over the random source so tests and replays can inject a seeded
/// generator.
#[derive(Debug, Clone)]
pub struct FragmentationEngine<R: Rng> {
    force_multiplier: f32,
    torque_multiplier: f32,
    jitter_min: f32,
    jitter_max: f32,
    degenerate_epsilon: f32,
    planar: bool,
    debris: DebrisProperties,
    rng: R,
}

impl<R: Rng> FragmentationEngine<R> {
    pub fn new(config: &FlightConfig, rng: R) -> Self {
        Self {
            force_multiplier: config.explosion_force_multiplier,
            torque_multiplier: config.explosion_torque_multiplier,
            jitter_min: config.explosion_jitter_min,
            jitter_max: config.explosion_jitter_max,
            degenerate_epsilon: config.degenerate_direction_epsilon,
            planar: config.planar_explosions,
            debris: DebrisProperties {
                mass: config.debris_mass,
                linear_damping: config.debris_linear_damping,
                angular_damping: config.debris_angular_damping,
            },
            rng,
        }
    }

    /// Explode `body`.  A no-op on an already-dynamic body.
    pub fn detach(
        &mut self,
        body: &mut Body,
        impact_speed: f32,
        sink: &mut impl PhysicsCommands,
    ) -> DetachReport {
        if body.dynamic {
            debug!(
                "[fragmentation] detach({:.2}) on body {} ignored: already fragmented",
                impact_speed, body.id.0
            );
            return DetachReport::AlreadyDetached;
        }

        body.dynamic = true;
        if let Some(driver) = body.driver.as_mut() {
            driver.frozen = true;
            driver.gravity_enabled = false;
        }
        sink.freeze_composite_driver(body.id);

        let impact_speed = impact_speed.max(0.0);
        let base_force = impact_speed * self.force_multiplier;
        let torque_bound = impact_speed * self.torque_multiplier;
        let centre = body.position;
        let inherited_velocity = body.velocity;
        let inherited_spin = body.angular_velocity;

        for idx in 0..body.fragments.len() {
            let world = body.fragment_world_position(&body.fragments[idx]);
            let fragment = &mut body.fragments[idx];

            let jitter = self.rng.gen_range(self.jitter_min..=self.jitter_max);
            let force = base_force * jitter;
            let direction = self.explosion_direction(world - centre);
            let impulse = direction * force;
            let torque_impulse = self.random_torque(torque_bound);

            sink.spawn_dynamic_fragment(
                fragment.id,
                world,
                inherited_velocity,
                inherited_spin,
                self.debris,
            );
            sink.apply_impulse(fragment.id, impulse);
            sink.apply_torque_impulse(fragment.id, torque_impulse);

            fragment.state = FragmentState::Detached(DetachedState {
                position: world,
                velocity: inherited_velocity,
                angular_velocity: inherited_spin,
                impulse,
                torque_impulse,
            });
        }

        info!(
            "[fragmentation] body {} exploded into {} fragments at {:.2} u/s",
            body.id.0,
            body.fragments.len(),
            impact_speed
        );
        DetachReport::Detached {
            fragments: body.fragments.len(),
        }
    }

    /// Unit vector along `offset`, or a random one when `offset` is degenerate.
    fn explosion_direction(&mut self, offset: Vec3) -> Vec3 {
        let offset = if self.planar {
            offset.with_z(0.0)
        } else {
            offset
        };
        if offset.length() >= self.degenerate_epsilon {
            return offset.normalize();
        }
        self.random_unit_vector()
    }

    fn random_unit_vector(&mut self) -> Vec3 {
        loop {
            let candidate = Vec3::new(
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
                if self.planar {
                    0.0
                } else {
                    self.rng.gen_range(-1.0..=1.0)
                },
            );
            let len = candidate.length();
            // Rejecting the corners keeps the distribution uniform on the sphere.
            if len > 1.0e-3 && len <= 1.0 {
                return candidate / len;
            }
        }
    }

    fn random_torque(&mut self, bound: f32) -> Vec3 {
        let z = self.rng.gen_range(-bound..=bound);
        if self.planar {
            return Vec3::new(0.0, 0.0, z);
        }
        let x = self.rng.gen_range(-bound..=bound);
        let y = self.rng.gen_range(-bound..=bound);
        Vec3::new(x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::body::BodySnapshot;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn config(planar: bool) -> FlightConfig {
        FlightConfig {
            planar_explosions: planar,
            ..FlightConfig::default()
        }
    }

    fn rocket() -> Body {
        let mut body = Body::new(BodyId(1), 40.0)
            .with_fragment(Vec3::new(0.0, 1.0, 0.0))
            .with_fragment(Vec3::new(1.0, 0.0, 0.0))
            .with_fragment(Vec3::ZERO);
        body.sync(&BodySnapshot {
            position: Vec3::new(5.0, 5.0, 0.0),
            rotation: Quat::IDENTITY,
            velocity: Vec3::new(0.0, -8.0, 0.0),
            angular_velocity: Vec3::new(0.0, 0.0, 0.5),
        });
        body
    }

    fn engine(seed: u64, planar: bool) -> FragmentationEngine<ChaCha8Rng> {
        FragmentationEngine::new(&config(planar), ChaCha8Rng::seed_from_u64(seed))
    }

    #[test]
    fn detach_emits_freeze_then_per_fragment_commands() {
        let mut body = rocket();
        let mut queue = PhysicsCommandQueue::default();
        let report = engine(7, true).detach(&mut body, 8.0, &mut queue);

        assert_eq!(report, DetachReport::Detached { fragments: 3 });
        assert!(body.dynamic);
        assert!(body.driver.unwrap().frozen);
        assert!(!body.driver.unwrap().gravity_enabled);
        assert_eq!(queue.0.len(), 1 + 3 * 3);
        assert_eq!(queue.0[0], PhysicsCommand::FreezeCompositeDriver(BodyId(1)));
        assert!(body.fragments.iter().all(|f| f.is_detached()));
    }

    #[test]
    fn second_detach_is_a_no_op() {
        let mut body = rocket();
        let mut queue = PhysicsCommandQueue::default();
        let mut eng = engine(7, true);
        eng.detach(&mut body, 8.0, &mut queue);
        let after_first = body.clone();
        let commands_after_first = queue.0.len();

        assert_eq!(
            eng.detach(&mut body, 20.0, &mut queue),
            DetachReport::AlreadyDetached
        );
        assert_eq!(body, after_first);
        assert_eq!(queue.0.len(), commands_after_first);
    }

    #[test]
    fn fragments_inherit_carrier_motion() {
        let mut body = rocket();
        let mut queue = PhysicsCommandQueue::default();
        engine(1, true).detach(&mut body, 8.0, &mut queue);
        for cmd in &queue.0 {
            if let PhysicsCommand::SpawnDynamicFragment {
                initial_velocity,
                initial_angular_velocity,
                debris,
                ..
            } = cmd
            {
                assert_eq!(*initial_velocity, Vec3::new(0.0, -8.0, 0.0));
                assert_eq!(*initial_angular_velocity, Vec3::new(0.0, 0.0, 0.5));
                assert_eq!(debris.mass, crate::constants::DEBRIS_MASS);
            }
        }
    }

    #[test]
    fn impulse_points_away_from_centre_with_jittered_magnitude() {
        let mut body = rocket();
        let mut queue = PhysicsCommandQueue::default();
        engine(3, true).detach(&mut body, 8.0, &mut queue);

        let base = 8.0 * crate::constants::EXPLOSION_FORCE_MULTIPLIER;
        let FragmentState::Detached(top) = body.fragments[0].state else {
            panic!("fragment 0 not detached");
        };
        assert!(top.impulse.normalize().dot(Vec3::Y) > 0.999);
        assert!(top.impulse.length() >= base * 0.8 - 1e-3);
        assert!(top.impulse.length() <= base * 1.2 + 1e-3);

        let FragmentState::Detached(side) = body.fragments[1].state else {
            panic!("fragment 1 not detached");
        };
        assert!(side.impulse.normalize().dot(Vec3::X) > 0.999);
    }

    #[test]
    fn centred_fragment_gets_finite_random_direction() {
        for seed in 0..32 {
            let mut body = rocket();
            let mut queue = PhysicsCommandQueue::default();
            engine(seed, false).detach(&mut body, 8.0, &mut queue);
            let FragmentState::Detached(centre) = body.fragments[2].state else {
                panic!("fragment 2 not detached");
            };
            assert!(centre.impulse.is_finite());
            assert!(centre.impulse.length() > 0.0);
        }
    }

    #[test]
    fn torque_stays_within_bounds() {
        let bound = 8.0 * crate::constants::EXPLOSION_TORQUE_MULTIPLIER;
        let mut body = rocket();
        let mut queue = PhysicsCommandQueue::default();
        engine(11, false).detach(&mut body, 8.0, &mut queue);
        for fragment in &body.fragments {
            let FragmentState::Detached(state) = fragment.state else {
                panic!("not detached");
            };
            let t = state.torque_impulse;
            assert!(t.x.abs() <= bound && t.y.abs() <= bound && t.z.abs() <= bound);
        }
    }

    #[test]
    fn planar_mode_keeps_motion_in_plane() {
        let mut body = rocket();
        let mut queue = PhysicsCommandQueue::default();
        engine(5, true).detach(&mut body, 8.0, &mut queue);
        for fragment in &body.fragments {
            let FragmentState::Detached(state) = fragment.state else {
                panic!("not detached");
            };
            assert_eq!(state.impulse.z, 0.0);
            assert_eq!(state.torque_impulse.x, 0.0);
            assert_eq!(state.torque_impulse.y, 0.0);
        }
    }

    #[test]
    fn same_seed_replays_identical_explosion() {
        let mut a = rocket();
        let mut b = rocket();
        let mut qa = PhysicsCommandQueue::default();
        let mut qb = PhysicsCommandQueue::default();
        engine(99, false).detach(&mut a, 6.5, &mut qa);
        engine(99, false).detach(&mut b, 6.5, &mut qb);
        assert_eq!(qa, qb);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_impact_speed_does_not_panic() {
        let mut body = rocket();
        let mut queue = PhysicsCommandQueue::default();
        engine(0, false).detach(&mut body, 0.0, &mut queue);
        let FragmentState::Detached(state) = body.fragments[0].state else {
            panic!("not detached");
        };
        assert_eq!(state.impulse, Vec3::ZERO);
        assert_eq!(state.torque_impulse, Vec3::ZERO);
    }
}
