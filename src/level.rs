//! Level catalog, level sequencing, and the post-outcome countdown.
//!
//! ## Systems (registered by `LevelPlugin`)
//!
//! | System                             | Schedule  | Purpose                                        |
//! |------------------------------------|-----------|------------------------------------------------|
//! | `start_first_level`                | `Startup` | Request level 0                                |
//! | `queue_result_transition_system`   | `Update`  | Start the countdown on the first outcome       |
//! | `result_countdown_system`          | `Update`  | Tick the countdown; advance or reload on expiry|
//! | `load_level_system`                | `Update`  | Despawn the old level, spawn scenery + rocket  |
//!
//! Victory advances to the next level, wrapping to the first after the last.
//! Defeat and crash reload the current level.

use crate::config::FlightConfig;
use crate::constants::{GOAL_TAG, LANDING_PAD_NAME, LAUNCH_PAD_NAME, TERRAIN_TAG, UNTAGGED};
use crate::flight::FlightOutcome;
use crate::graphics::Outline;
use crate::rocket::{spawn_rocket, ContactTag, RocketFlight};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

// ── Layout data ───────────────────────────────────────────────────────────────

/// One static collider in a level.  `name` and `tag` are what the flight core
/// sees when the rocket touches it.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneryPiece {
    pub name: String,
    pub tag: String,
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl SceneryPiece {
    pub fn new(name: &str, tag: &str, center: Vec2, half_extents: Vec2) -> Self {
        Self {
            name: name.to_string(),
            tag: tag.to_string(),
            center,
            half_extents,
        }
    }

    fn color(&self) -> Color {
        if self.tag == GOAL_TAG {
            Color::srgb(0.2, 0.9, 0.3)
        } else if self.name == LAUNCH_PAD_NAME {
            Color::srgb(0.3, 0.6, 1.0)
        } else if self.tag == TERRAIN_TAG {
            Color::srgb(0.6, 0.45, 0.3)
        } else {
            Color::srgb(0.7, 0.7, 0.7)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelLayout {
    pub title: String,
    /// Carrier position when the level starts, resting just above the launch pad.
    pub rocket_start: Vec2,
    pub pieces: Vec<SceneryPiece>,
}

/// All playable levels in order.
#[derive(Resource, Debug, Clone)]
pub struct LevelCatalog {
    pub levels: Vec<LevelLayout>,
}

impl LevelCatalog {
    pub fn get(&self, index: usize) -> Option<&LevelLayout> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

fn pads_and_ground(launch_x: f32, landing_x: f32) -> Vec<SceneryPiece> {
    vec![
        SceneryPiece::new(
            "Ground",
            TERRAIN_TAG,
            Vec2::new(0.0, -12.0),
            Vec2::new(24.0, 1.5),
        ),
        SceneryPiece::new(
            LAUNCH_PAD_NAME,
            UNTAGGED,
            Vec2::new(launch_x, -10.0),
            Vec2::new(2.5, 0.5),
        ),
        SceneryPiece::new(
            LANDING_PAD_NAME,
            GOAL_TAG,
            Vec2::new(landing_x, -10.0),
            Vec2::new(2.5, 0.5),
        ),
    ]
}

/// Rocket start above a pad whose top surface is at y = -9.5.
fn start_above(x: f32) -> Vec2 {
    Vec2::new(x, -9.5 + crate::rocket::ROCKET_HALF_HEIGHT + 0.05)
}

impl Default for LevelCatalog {
    fn default() -> Self {
        let first_hop = LevelLayout {
            title: "First Hop".into(),
            rocket_start: start_above(-12.0),
            pieces: pads_and_ground(-12.0, 12.0),
        };

        let mut ridge = pads_and_ground(-14.0, 14.0);
        ridge.push(SceneryPiece::new(
            "Ridge",
            TERRAIN_TAG,
            Vec2::new(0.0, -5.0),
            Vec2::new(2.0, 5.5),
        ));
        let over_the_ridge = LevelLayout {
            title: "Over the Ridge".into(),
            rocket_start: start_above(-14.0),
            pieces: ridge,
        };

        let mut boulders = pads_and_ground(-15.0, 15.0);
        boulders.extend([
            SceneryPiece::new("Rock", UNTAGGED, Vec2::new(-5.0, -9.5), Vec2::new(1.0, 1.0)),
            SceneryPiece::new("Rock", UNTAGGED, Vec2::new(3.0, -9.0), Vec2::new(1.5, 1.5)),
            SceneryPiece::new("Overhang", TERRAIN_TAG, Vec2::new(9.0, 4.0), Vec2::new(4.0, 0.75)),
        ]);
        let boulder_field = LevelLayout {
            title: "Boulder Field".into(),
            rocket_start: start_above(-15.0),
            pieces: boulders,
        };

        Self {
            levels: vec![first_hop, over_the_ridge, boulder_field],
        }
    }
}

// ── Sequencing ────────────────────────────────────────────────────────────────

/// What happens when the result countdown expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelTransition {
    Advance,
    Reload,
}

impl From<FlightOutcome> for LevelTransition {
    fn from(outcome: FlightOutcome) -> Self {
        if outcome.is_victory() {
            LevelTransition::Advance
        } else {
            LevelTransition::Reload
        }
    }
}

/// Index of the level being played.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelSequence {
    pub current: usize,
}

impl LevelSequence {
    /// Index the sequence moves to for `transition`, given `count` levels.
    pub fn target(&self, transition: LevelTransition, count: usize) -> usize {
        match transition {
            LevelTransition::Reload => self.current,
            LevelTransition::Advance if count == 0 => 0,
            LevelTransition::Advance => (self.current + 1) % count,
        }
    }

    pub fn apply(&mut self, transition: LevelTransition, count: usize) -> usize {
        self.current = self.target(transition, count);
        self.current
    }
}

/// Pending level change after an outcome.  Only the first outcome of a level
/// starts the countdown.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct ResultCountdown {
    pending: Option<(LevelTransition, f32)>,
}

impl ResultCountdown {
    /// Returns `false` if a countdown is already running.
    pub fn start(&mut self, transition: LevelTransition, delay_secs: f32) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some((transition, delay_secs));
        true
    }

    /// Advance by `dt`; yields the transition on the tick the delay runs out.
    pub fn tick(&mut self, dt: f32) -> Option<LevelTransition> {
        let (transition, remaining) = self.pending.as_mut()?;
        *remaining -= dt;
        if *remaining > 0.0 {
            return None;
        }
        let transition = *transition;
        self.pending = None;
        Some(transition)
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Request to (re)build level `index`.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadLevel {
    pub index: usize,
}

/// Everything spawned for a level; despawned on the next load.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct LevelEntity;

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LevelCatalog>()
            .init_resource::<LevelSequence>()
            .init_resource::<ResultCountdown>()
            .add_message::<LoadLevel>()
            .add_systems(Startup, start_first_level)
            .add_systems(
                Update,
                (
                    queue_result_transition_system,
                    result_countdown_system,
                    load_level_system,
                )
                    .chain(),
            );
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

pub fn start_first_level(mut loads: MessageWriter<LoadLevel>) {
    loads.write(LoadLevel { index: 0 });
}

pub fn queue_result_transition_system(
    mut outcomes: MessageReader<FlightOutcome>,
    config: Res<FlightConfig>,
    mut countdown: ResMut<ResultCountdown>,
) {
    for outcome in outcomes.read() {
        if countdown.start(LevelTransition::from(*outcome), config.result_delay_secs) {
            info!(
                "[level] {:?}; next level load in {:.1}s",
                outcome, config.result_delay_secs
            );
        }
    }
}

pub fn result_countdown_system(
    time: Res<Time>,
    catalog: Res<LevelCatalog>,
    mut countdown: ResMut<ResultCountdown>,
    mut sequence: ResMut<LevelSequence>,
    mut loads: MessageWriter<LoadLevel>,
) {
    let Some(transition) = countdown.tick(time.delta_secs()) else {
        return;
    };
    let index = sequence.apply(transition, catalog.len());
    loads.write(LoadLevel { index });
}

/// Rebuild the world for each `LoadLevel` request (the last one wins).
pub fn load_level_system(
    mut commands: Commands,
    mut loads: MessageReader<LoadLevel>,
    catalog: Res<LevelCatalog>,
    config: Res<FlightConfig>,
    mut sequence: ResMut<LevelSequence>,
    mut countdown: ResMut<ResultCountdown>,
    mut flight: ResMut<RocketFlight>,
    q_existing: Query<Entity, With<LevelEntity>>,
) {
    let Some(request) = loads.read().last().copied() else {
        return;
    };
    let Some(layout) = catalog.get(request.index) else {
        warn!("[level] level {} does not exist", request.index);
        return;
    };

    // Fragment children carry the marker too; try_despawn tolerates the
    // second visit after their parent took them down.
    for entity in q_existing.iter() {
        commands.entity(entity).try_despawn();
    }
    countdown.cancel();
    sequence.current = request.index;

    for piece in &layout.pieces {
        commands.spawn((
            LevelEntity,
            Name::new(piece.name.clone()),
            ContactTag(piece.tag.clone()),
            RigidBody::Fixed,
            Collider::cuboid(piece.half_extents.x, piece.half_extents.y),
            Transform::from_translation(piece.center.extend(0.0)),
            Outline {
                half_extents: piece.half_extents,
                color: piece.color(),
            },
        ));
    }

    match spawn_rocket(&mut commands, layout.rocket_start, &mut flight, &config) {
        Ok(_) => info!(
            "[level] loaded level {} \"{}\" ({} scenery pieces)",
            request.index,
            layout.title,
            layout.pieces.len()
        ),
        Err(e) => error!("[level] could not spawn rocket: {e}"),
    }
}
