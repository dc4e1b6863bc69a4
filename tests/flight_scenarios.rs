//! End-to-end flight scenarios driven through the public controller API.
//!
//! No ECS, no physics: contacts and kinematic snapshots are fed by hand with a
//! 50 Hz fixed step and a seeded generator, so every run is identical.
//!
//! Covered scenarios:
//! 1. Gentle touchdown on the goal pad, settles → victory.
//! 2. Touchdown on the launch pad only, settles → defeat E.
//! 3. Fast hit on terrain → immediate crash C with an explosion.
//! 4. Goal pad plus a rock, settles → defeat F.
//! 5. All contacts end and speed rises above the takeoff threshold → history cleared.
//!
//! Plus order-independence of the verdict, detachment idempotency, and a
//! parked rocket that is never judged.

use bevy::prelude::*;
use landfall::config::FlightConfig;
use landfall::flight::{
    Body, BodyId, BodySnapshot, ContactEvent, ContactId, CrashCategory, DefeatCategory,
    FlightOutcome, FlightOutcomeController, FlightState, PhysicsCommand,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex};

const DT: f32 = 0.02;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn rocket_body() -> Body {
    Body::new(BodyId(7), 5.0)
        .with_fragment(Vec3::new(0.0, 1.2, 0.0))
        .with_fragment(Vec3::ZERO)
        .with_fragment(Vec3::new(-0.75, -0.7, 0.0))
        .with_fragment(Vec3::new(0.75, -0.7, 0.0))
}

/// Controller whose player has already pressed a key, recording every
/// published outcome.
fn flying_controller() -> (FlightOutcomeController, Arc<Mutex<Vec<FlightOutcome>>>) {
    let mut controller = FlightOutcomeController::new(
        &FlightConfig::default(),
        rocket_body(),
        ChaCha8Rng::seed_from_u64(2024),
    )
    .unwrap();
    controller.note_control_input();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    controller.subscribe(move |o| sink.lock().unwrap().push(o));
    (controller, seen)
}

fn snapshot(speed: f32) -> BodySnapshot {
    BodySnapshot {
        velocity: Vec3::new(0.0, -speed, 0.0),
        ..default()
    }
}

fn touch(id: u64, name: &str, tag: &str, speed: f32) -> ContactEvent {
    ContactEvent::new(ContactId(id), name, tag, speed)
}

/// Decay from `from` to rest over a few ticks, then hold still for `rest_secs`.
fn settle(controller: &mut FlightOutcomeController, from: f32, rest_secs: f32) {
    let mut speed = from;
    while speed > 0.0 {
        controller.fixed_tick(DT, &snapshot(speed));
        speed = (speed - 0.5).max(0.0);
    }
    let ticks = (rest_secs / DT).ceil() as usize;
    for _ in 0..ticks {
        controller.fixed_tick(DT, &snapshot(0.0));
    }
}

fn outcomes(seen: &Arc<Mutex<Vec<FlightOutcome>>>) -> Vec<FlightOutcome> {
    seen.lock().unwrap().clone()
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[test]
fn scenario_gentle_goal_landing_is_victory() {
    let (mut c, seen) = flying_controller();
    assert_eq!(c.on_contact_begin(&touch(1, "LandingPad", "Finish", 2.0)), None);
    assert_eq!(c.flight_state(), FlightState::Landed);

    settle(&mut c, 2.0, 1.0);

    assert_eq!(outcomes(&seen), vec![FlightOutcome::Victory]);
    assert_eq!(c.flight_state(), FlightState::Resolved);
    assert!(c.drain_physics_commands().is_empty());
}

#[test]
fn scenario_launch_pad_only_is_defeat_e() {
    let (mut c, seen) = flying_controller();
    c.on_contact_begin(&touch(1, "LaunchingPad", "Untagged", 2.0));
    settle(&mut c, 2.0, 1.0);
    assert_eq!(
        outcomes(&seen),
        vec![FlightOutcome::Defeat(DefeatCategory::NeverLeftLaunchPad)]
    );
}

#[test]
fn scenario_fast_terrain_hit_crashes_immediately() {
    let (mut c, seen) = flying_controller();
    c.fixed_tick(DT, &snapshot(8.0));

    let outcome = c.on_contact_begin(&touch(1, "Mesa", "Terrain", 8.0));

    assert_eq!(outcome, Some(FlightOutcome::Crash(CrashCategory::Terrain)));
    assert_eq!(outcomes(&seen), vec![FlightOutcome::Crash(CrashCategory::Terrain)]);
    assert!(c.body().dynamic);
    assert!(c.body().fragments.iter().all(|f| f.is_detached()));

    let commands = c.drain_physics_commands();
    assert!(matches!(
        commands.first(),
        Some(PhysicsCommand::FreezeCompositeDriver(BodyId(7)))
    ));
    let spawns = commands
        .iter()
        .filter(|cmd| matches!(cmd, PhysicsCommand::SpawnDynamicFragment { .. }))
        .count();
    assert_eq!(spawns, c.body().fragments.len());

    // Force scales with impact speed: 8 * 50 * jitter in [0.8, 1.2].
    for cmd in &commands {
        if let PhysicsCommand::ApplyImpulse(_, impulse) = cmd {
            let magnitude = impulse.length();
            assert!((320.0 - 1e-2..=480.0 + 1e-2).contains(&magnitude), "{magnitude}");
        }
    }

    // Settling afterwards must not produce a second verdict.
    settle(&mut c, 0.0, 2.0);
    assert_eq!(outcomes(&seen).len(), 1);
}

#[test]
fn scenario_goal_pad_with_rock_is_defeat_f() {
    let (mut c, seen) = flying_controller();
    c.on_contact_begin(&touch(1, "LandingPad", "Finish", 1.0));
    c.on_contact_begin(&touch(2, "Rock", "Untagged", 1.0));
    settle(&mut c, 1.0, 1.0);
    assert_eq!(
        outcomes(&seen),
        vec![FlightOutcome::Defeat(DefeatCategory::MixedContacts)]
    );
}

#[test]
fn scenario_takeoff_clears_history() {
    let (mut c, _seen) = flying_controller();
    c.on_contact_begin(&touch(1, "LaunchingPad", "Untagged", 0.5));
    c.on_contact_begin(&touch(2, "Rock", "Untagged", 0.5));

    c.on_contact_end(ContactId(1));
    c.fixed_tick(DT, &snapshot(1.5));
    assert_eq!(c.ledger().history().len(), 2, "one contact still active");

    c.on_contact_end(ContactId(2));
    c.fixed_tick(DT, &snapshot(0.9));
    assert_eq!(c.ledger().history().len(), 2, "too slow to count as takeoff");

    c.fixed_tick(DT, &snapshot(1.5));
    assert!(c.ledger().history().is_empty());
    assert_eq!(c.flight_state(), FlightState::Airborne);
    assert_eq!(c.result(), None);
}

// ── Properties ────────────────────────────────────────────────────────────────

#[test]
fn verdict_is_independent_of_contact_order() {
    let contacts = [
        ("LandingPad", "Finish"),
        ("LaunchingPad", "Untagged"),
        ("Rock", "Untagged"),
    ];
    let orders: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    let mut verdicts = Vec::new();
    for order in orders {
        let (mut c, seen) = flying_controller();
        for (id, &i) in order.iter().enumerate() {
            let (name, tag) = contacts[i];
            c.on_contact_begin(&touch(id as u64, name, tag, 0.5));
        }
        settle(&mut c, 0.5, 1.0);
        verdicts.push(outcomes(&seen));
    }
    assert!(verdicts.windows(2).all(|w| w[0] == w[1]), "{verdicts:?}");
    assert_eq!(
        verdicts[0],
        vec![FlightOutcome::Defeat(DefeatCategory::MixedContacts)]
    );
}

#[test]
fn seeded_explosions_replay_identically() {
    let run = || {
        let (mut c, _) = flying_controller();
        c.on_contact_begin(&touch(1, "LandingPad", "Finish", 12.0));
        c.drain_physics_commands()
    };
    assert_eq!(run(), run());
}

#[test]
fn second_crash_does_not_explode_again() {
    let (mut c, seen) = flying_controller();
    c.on_contact_begin(&touch(1, "LaunchingPad", "Untagged", 6.0));
    let first = c.drain_physics_commands();
    let states: Vec<_> = c.body().fragments.iter().map(|f| f.state).collect();

    c.on_contact_begin(&touch(2, "Rock", "Untagged", 30.0));

    assert!(!first.is_empty());
    assert!(c.drain_physics_commands().is_empty());
    let after: Vec<_> = c.body().fragments.iter().map(|f| f.state).collect();
    assert_eq!(states, after);
    assert_eq!(
        outcomes(&seen),
        vec![FlightOutcome::Crash(CrashCategory::LaunchPad)]
    );
}

#[test]
fn settle_waits_for_a_full_quiet_window() {
    let (mut c, seen) = flying_controller();
    c.on_contact_begin(&touch(1, "LandingPad", "Finish", 0.5));
    c.fixed_tick(DT, &snapshot(0.5));

    // 0.6s quiet, one wobble, then 0.6s quiet again: never 0.8s in a row.
    for _ in 0..30 {
        c.fixed_tick(DT, &snapshot(0.0));
    }
    c.fixed_tick(DT, &snapshot(0.3));
    for _ in 0..30 {
        c.fixed_tick(DT, &snapshot(0.0));
    }
    assert!(outcomes(&seen).is_empty());

    for _ in 0..15 {
        c.fixed_tick(DT, &snapshot(0.0));
    }
    assert_eq!(outcomes(&seen), vec![FlightOutcome::Victory]);
}

#[test]
fn rocket_that_never_moved_is_never_judged() {
    let (mut c, seen) = flying_controller();
    c.on_contact_begin(&touch(1, "LaunchingPad", "Untagged", 0.0));
    for _ in 0..200 {
        c.fixed_tick(DT, &snapshot(0.0));
    }
    assert!(outcomes(&seen).is_empty());
    assert_eq!(c.flight_state(), FlightState::Landed);

    // A short hop on the pad is enough motion to be judged.
    c.fixed_tick(DT, &snapshot(0.4));
    settle(&mut c, 0.0, 1.0);
    assert_eq!(
        outcomes(&seen),
        vec![FlightOutcome::Defeat(DefeatCategory::NeverLeftLaunchPad)]
    );
}
