//! Flight core: contact bookkeeping, landing judgement, and detachment.
//!
//! Engine-agnostic.  Nothing here touches the ECS world; the Bevy bridge in
//! [`crate::rocket`] feeds it contacts and snapshots and applies the physics
//! commands it buffers.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`body`] | `Body` aggregate: carrier kinematics, fragments, physics driver |
//! | [`contact`] | `ContactLedger`: active contacts plus the per-segment name → tag history |
//! | [`impact`] | `ImpactClassifier`: touchdown vs. crash on first contact |
//! | [`stability`] | `StabilityTimer`: rest confirmation gated on control input and touchdown |
//! | [`outcome`] | `OutcomeEvaluator`: victory or categorised defeat from the history |
//! | [`fragmentation`] | `FragmentationEngine`: one-shot explosion into dynamic fragments |
//! | [`channel`] | `OutcomeChannel`: explicit subscribe / unsubscribe for presentation |
//! | [`controller`] | `FlightOutcomeController`: the state machine tying the above together |

pub mod body;
pub mod channel;
pub mod contact;
pub mod controller;
pub mod fragmentation;
pub mod impact;
pub mod outcome;
pub mod stability;

// ── Flat re-exports ───────────────────────────────────────────────────────────

pub use body::{Body, BodyId, BodySnapshot, Fragment, FragmentId, FragmentState, PhysicsDriver};
pub use channel::{OutcomeChannel, SubscriptionId};
pub use contact::{ContactEvent, ContactId, ContactLedger};
pub use controller::{FlightOutcomeController, FlightState};
pub use fragmentation::{
    DebrisProperties, DetachReport, FragmentationEngine, PhysicsCommand, PhysicsCommandQueue,
    PhysicsCommands,
};
pub use impact::{CrashCategory, Impact, ImpactClassifier};
pub use outcome::{ContactSummary, DefeatCategory, FlightOutcome, OutcomeEvaluator};
pub use stability::{Settled, StabilityTimer};
