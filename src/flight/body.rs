//! The rocket as one aggregate: carrier kinematics plus indexed fragments.
//!
//! Fragments never own physics state while bonded; their pose is derived from
//! the carrier every tick.  Detachment hands each fragment its own kinematic
//! state, after which the carrier no longer drives it.

use bevy::prelude::*;

/// Identifier of the composite body, as known to the physics host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

/// Index of a fragment within its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentId(pub u32);

/// The host engine's integrator for the carrier.
///
/// Present on every playable body.  `frozen` is set once the body explodes;
/// from then on no composite forces or gravity reach the carrier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsDriver {
    pub frozen: bool,
    pub gravity_enabled: bool,
}

impl Default for PhysicsDriver {
    fn default() -> Self {
        Self {
            frozen: false,
            gravity_enabled: true,
        }
    }
}

/// Per-tick point-in-time kinematics reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodySnapshot {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
}

/// Independent state handed to a fragment at detachment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetachedState {
    /// World position at the moment of detachment.
    pub position: Vec3,
    /// Velocity inherited from the carrier.
    pub velocity: Vec3,
    /// Angular velocity inherited from the carrier.
    pub angular_velocity: Vec3,
    /// Explosion impulse applied on detachment.
    pub impulse: Vec3,
    /// Explosion torque impulse applied on detachment.
    pub torque_impulse: Vec3,
}

/// Bonding state of one fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FragmentState {
    Bonded,
    Detached(DetachedState),
}

/// A sub-part of the rocket.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub id: FragmentId,
    /// Fixed offset from the carrier origin, in carrier-local space.
    pub local_offset: Vec3,
    pub state: FragmentState,
}

impl Fragment {
    pub fn new(id: FragmentId, local_offset: Vec3) -> Self {
        Self {
            id,
            local_offset,
            state: FragmentState::Bonded,
        }
    }

    #[inline]
    pub fn is_detached(&self) -> bool {
        matches!(self.state, FragmentState::Detached(_))
    }
}

/// The player-controlled composite.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub driver: Option<PhysicsDriver>,
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f32,
    pub fragments: Vec<Fragment>,
    /// `false` while fragments are bonded, `true` after detachment.
    pub dynamic: bool,
}

impl Body {
    /// A resting body at the origin with a default driver and no fragments.
    pub fn new(id: BodyId, mass: f32) -> Self {
        Self {
            id,
            driver: Some(PhysicsDriver::default()),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass,
            fragments: Vec::new(),
            dynamic: false,
        }
    }

    /// Builder: add a bonded fragment at `local_offset`; ids follow insertion order.
    pub fn with_fragment(mut self, local_offset: Vec3) -> Self {
        let id = FragmentId(self.fragments.len() as u32);
        self.fragments.push(Fragment::new(id, local_offset));
        self
    }

    /// Builder: remove the physics driver (used to model a misconfigured body).
    pub fn without_driver(mut self) -> Self {
        self.driver = None;
        self
    }

    /// Current linear speed of the carrier.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Copy a host snapshot into the carrier.  Ignored once the body is
    /// fragmented, because the carrier is frozen and no longer meaningful.
    pub fn sync(&mut self, snapshot: &BodySnapshot) {
        if self.dynamic {
            return;
        }
        self.position = snapshot.position;
        self.rotation = snapshot.rotation;
        self.velocity = snapshot.velocity;
        self.angular_velocity = snapshot.angular_velocity;
    }

    /// World position of `fragment`.
    ///
    /// Bonded fragments mirror their local offset through the carrier pose;
    /// detached fragments report the position they were released at.
    pub fn fragment_world_position(&self, fragment: &Fragment) -> Vec3 {
        match fragment.state {
            FragmentState::Bonded => self.position + self.rotation * fragment.local_offset,
            FragmentState::Detached(state) => state.position,
        }
    }

    pub fn fragment(&self, id: FragmentId) -> Option<&Fragment> {
        self.fragments.iter().find(|f| f.id == id)
    }
}
