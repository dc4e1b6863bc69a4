//! Flight-outcome state machine.
//!
//! ```text
//!   Airborne ──safe contact──▶ Landed ──last contact ends──▶ Airborne
//!   Landed   ──Settled──▶ Resolved(Victory | Defeat)
//!   Airborne | Landed ──overspeed contact──▶ Resolved(Crash) + explosion
//! ```
//!
//! `Resolved` is terminal for the segment: no classification, settle timing,
//! or evaluation runs until the ledger reports a takeoff (history cleared).
//! Contact membership keeps being tracked while resolved so that takeoff is
//! detected exactly.  A crashed rocket never leaves `Resolved`.
//!
//! The controller owns the [`Body`] exclusively.  Physics side effects are
//! buffered as [`PhysicsCommand`]s for the host to drain each frame.

use super::body::{Body, BodySnapshot};
use super::channel::{OutcomeChannel, SubscriptionId};
use super::contact::{ContactEvent, ContactId, ContactLedger};
use super::fragmentation::{
    DetachReport, FragmentationEngine, PhysicsCommand, PhysicsCommandQueue,
};
use super::impact::{Impact, ImpactClassifier};
use super::outcome::{FlightOutcome, OutcomeEvaluator};
use super::stability::{Settled, StabilityTimer};
use crate::config::FlightConfig;
use crate::error::{FlightError, FlightResult};
use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlightState {
    #[default]
    Airborne,
    Landed,
    Resolved,
}

pub struct FlightOutcomeController<R: Rng = ChaCha8Rng> {
    body: Body,
    ledger: ContactLedger,
    classifier: ImpactClassifier,
    stability: StabilityTimer,
    evaluator: OutcomeEvaluator,
    fragmentation: FragmentationEngine<R>,
    state: FlightState,
    result: Option<FlightOutcome>,
    last_speed: f32,
    commands: PhysicsCommandQueue,
    channel: OutcomeChannel,
}

impl FlightOutcomeController<ChaCha8Rng> {
    /// Build with the generator described by `config.rng_seed`.
    pub fn from_config(config: &FlightConfig, body: Body) -> FlightResult<Self> {
        let rng = match config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::new(config, body, rng)
    }
}

impl<R: Rng> FlightOutcomeController<R> {
    /// Fails fast when `body` has no physics driver.
    pub fn new(config: &FlightConfig, body: Body, rng: R) -> FlightResult<Self> {
        if body.driver.is_none() {
            return Err(FlightError::MissingPhysicsDriver { body: body.id });
        }
        if body.fragments.is_empty() {
            warn!(
                "[flight] body {} has no fragments; a crash will leave no debris",
                body.id.0
            );
        }
        Ok(Self {
            body,
            ledger: ContactLedger::new(config.takeoff_speed_threshold),
            classifier: ImpactClassifier::new(config),
            stability: StabilityTimer::new(config.stopped_threshold, config.confirmation_window),
            evaluator: OutcomeEvaluator::new(config),
            fragmentation: FragmentationEngine::new(config, rng),
            state: FlightState::Airborne,
            result: None,
            last_speed: 0.0,
            commands: PhysicsCommandQueue::default(),
            channel: OutcomeChannel::default(),
        })
    }

    // ── Host → controller ────────────────────────────────────────────────────

    /// The player pressed thrust or rotation.  Opens the settle timer's
    /// control gate for the rest of the session.
    pub fn note_control_input(&mut self) {
        self.stability.note_control_input();
    }

    /// First touch of another object.  Returns the outcome if this contact
    /// resolved the segment (a crash).
    pub fn on_contact_begin(&mut self, contact: &ContactEvent) -> Option<FlightOutcome> {
        self.ledger
            .on_contact_begin(contact.other, &contact.name, &contact.tag);

        if self.state == FlightState::Resolved {
            debug!(
                "[flight] contact with {} after resolution ignored",
                contact.name
            );
            return None;
        }

        match self
            .classifier
            .classify(&contact.name, &contact.tag, contact.relative_speed)
        {
            Impact::Crash {
                category,
                impact_speed,
            } => {
                if let DetachReport::Detached { fragments } =
                    self.fragmentation
                        .detach(&mut self.body, impact_speed, &mut self.commands)
                {
                    debug!("[flight] {fragments} fragments released");
                }
                self.stability.disarm();
                self.resolve(FlightOutcome::Crash(category))
            }
            Impact::Touchdown => {
                if self.state == FlightState::Airborne {
                    self.state = FlightState::Landed;
                    info!(
                        "[flight] landed on {} at {:.2} u/s",
                        contact.name, contact.relative_speed
                    );
                }
                self.stability.arm();
                None
            }
        }
    }

    /// Ongoing touch; keeps history complete even if `begin` was missed.
    pub fn on_contact_stay(&mut self, other: ContactId, name: &str, tag: &str) {
        self.ledger.on_contact_stay(other, name, tag);
        if self.state == FlightState::Airborne && self.ledger.active_count() > 0 {
            self.state = FlightState::Landed;
            self.stability.arm();
        }
    }

    /// Touch ended.  Losing the last contact returns a landed rocket to the air.
    pub fn on_contact_end(&mut self, other: ContactId) {
        self.ledger.on_contact_end(other);
        if self.state == FlightState::Landed && self.ledger.active_count() == 0 {
            self.state = FlightState::Airborne;
            self.stability.disarm();
            info!("[flight] took off: no active contacts");
        }
    }

    /// Fixed-timestep update with the host's current kinematics.  Returns the
    /// outcome if the rocket settled this tick.
    pub fn fixed_tick(&mut self, dt: f32, snapshot: &BodySnapshot) -> Option<FlightOutcome> {
        self.body.sync(snapshot);
        let speed = if self.body.dynamic {
            0.0
        } else {
            snapshot.velocity.length()
        };
        self.last_speed = speed;

        if self.ledger.on_tick(speed) {
            info!(
                "[flight] contact history cleared at {:.2} u/s; new flight segment",
                speed
            );
            self.stability.forget_motion();
            if self.state == FlightState::Resolved && !self.body.dynamic {
                self.state = FlightState::Airborne;
                self.result = None;
            }
        }
        if !self.ledger.history_view().is_empty() {
            self.stability.note_speed(speed);
        }

        if self.state != FlightState::Landed {
            return None;
        }
        let Some(Settled) = self.stability.on_tick(speed, dt) else {
            return None;
        };
        debug!("[flight] settled at {:.3} u/s", speed);
        let outcome = self
            .evaluator
            .evaluate(self.ledger.history_view(), self.last_speed);
        self.resolve(outcome)
    }

    /// Level reload: forget contacts, result, and control; swap in a fresh body.
    /// Subscribers stay registered.
    pub fn reset_session(&mut self, body: Body) -> FlightResult<()> {
        if body.driver.is_none() {
            return Err(FlightError::MissingPhysicsDriver { body: body.id });
        }
        self.body = body;
        self.ledger.reset();
        self.stability.reset();
        self.state = FlightState::Airborne;
        self.result = None;
        self.last_speed = 0.0;
        self.commands.drain();
        Ok(())
    }

    // ── Controller → host / presentation ─────────────────────────────────────

    pub fn drain_physics_commands(&mut self) -> Vec<PhysicsCommand> {
        self.commands.drain()
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(FlightOutcome) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.channel.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.channel.unsubscribe(id)
    }

    /// Drop every subscriber (teardown).
    pub fn unsubscribe_all(&mut self) {
        self.channel.clear();
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    #[inline]
    pub fn flight_state(&self) -> FlightState {
        self.state
    }

    #[inline]
    pub fn result(&self) -> Option<FlightOutcome> {
        self.result
    }

    #[inline]
    pub fn body(&self) -> &Body {
        &self.body
    }

    #[inline]
    pub fn ledger(&self) -> &ContactLedger {
        &self.ledger
    }

    #[inline]
    pub fn stability(&self) -> &StabilityTimer {
        &self.stability
    }

    #[inline]
    pub fn last_speed(&self) -> f32 {
        self.last_speed
    }

    fn resolve(&mut self, outcome: FlightOutcome) -> Option<FlightOutcome> {
        if let Some(existing) = self.result {
            debug!(
                "[flight] duplicate resolution {:?} ignored; already {:?}",
                outcome, existing
            );
            return None;
        }
        self.state = FlightState::Resolved;
        self.result = Some(outcome);
        info!("[flight] segment resolved: {:?}", outcome);
        self.channel.publish(outcome);
        Some(outcome)
    }
}

impl<R: Rng> std::fmt::Debug for FlightOutcomeController<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlightOutcomeController")
            .field("state", &self.state)
            .field("result", &self.result)
            .field("active_contacts", &self.ledger.active_count())
            .field("last_speed", &self.last_speed)
            .field("dynamic", &self.body.dynamic)
            .finish()
    }
}
