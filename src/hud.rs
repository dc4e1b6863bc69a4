//! Result overlay and level label.
//!
//! The overlay stays hidden until a [`FlightOutcome`] arrives, shows the
//! headline (and a failure comment for defeats and crashes), and hides again
//! when the next level loads.

use crate::comments::FailureComments;
use crate::config::FlightConfig;
use crate::flight::FlightOutcome;
use crate::level::{LevelCatalog, LoadLevel};
use bevy::prelude::*;
use rand::Rng;

// ── Components ────────────────────────────────────────────────────────────────

#[derive(Component)]
pub struct ResultOverlay;

#[derive(Component)]
pub struct ResultHeadline;

#[derive(Component)]
pub struct ResultComment;

#[derive(Component)]
pub struct LevelLabel;

// ── Text ──────────────────────────────────────────────────────────────────────

/// Headline and colour for `outcome`.
pub fn headline(outcome: FlightOutcome) -> (&'static str, Color) {
    match outcome {
        FlightOutcome::Victory => ("MISSION COMPLETE", Color::srgb(0.3, 1.0, 0.4)),
        FlightOutcome::Defeat(_) => ("MISSION FAILED", Color::srgb(1.0, 0.55, 0.2)),
        FlightOutcome::Crash(_) => ("CRASHED", Color::srgb(1.0, 0.22, 0.22)),
    }
}

/// Commentary line for `outcome`; empty on victory.
pub fn comment_line(outcome: FlightOutcome, comments: &FailureComments, rng: &mut impl Rng) -> String {
    outcome
        .failure_code()
        .map(|code| comments.pick(code, rng).to_string())
        .unwrap_or_default()
}

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FailureComments>()
            .add_systems(Startup, setup_result_overlay)
            .add_systems(Update, (show_result_system, reset_overlay_on_load_system));
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

pub fn setup_result_overlay(mut commands: Commands, config: Res<FlightConfig>) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(12.0),
                position_type: PositionType::Absolute,
                ..default()
            },
            ResultOverlay,
            Visibility::Hidden,
        ))
        .with_children(|overlay| {
            overlay.spawn((
                Text::new(""),
                TextFont {
                    font_size: config.result_font_size,
                    ..default()
                },
                TextColor(Color::WHITE),
                ResultHeadline,
            ));
            overlay.spawn((
                Text::new(""),
                TextFont {
                    font_size: config.comment_font_size,
                    ..default()
                },
                TextColor(Color::srgb(0.85, 0.85, 0.85)),
                ResultComment,
            ));
        });

    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: config.comment_font_size,
                    ..default()
                },
                TextColor(Color::srgb(0.95, 0.88, 0.45)),
                LevelLabel,
            ));
        });
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Show the first outcome of the level; later ones are ignored while the
/// overlay is up.
pub fn show_result_system(
    mut outcomes: MessageReader<FlightOutcome>,
    comments: Res<FailureComments>,
    mut q_overlay: Query<&mut Visibility, With<ResultOverlay>>,
    mut q_headline: Query<(&mut Text, &mut TextColor), With<ResultHeadline>>,
    mut q_comment: Query<&mut Text, (With<ResultComment>, Without<ResultHeadline>)>,
) {
    let Some(outcome) = outcomes.read().next().copied() else {
        return;
    };
    let Ok(mut visibility) = q_overlay.single_mut() else {
        return;
    };
    if *visibility == Visibility::Visible {
        return;
    }
    *visibility = Visibility::Visible;

    let (title, color) = headline(outcome);
    if let Ok((mut text, mut text_color)) = q_headline.single_mut() {
        text.0 = title.to_string();
        text_color.0 = color;
    }
    let line = comment_line(outcome, &comments, &mut rand::thread_rng());
    if !line.is_empty() {
        info!("[hud] {title}: {line}");
    }
    if let Ok(mut text) = q_comment.single_mut() {
        text.0 = line;
    }
}

pub fn reset_overlay_on_load_system(
    mut loads: MessageReader<LoadLevel>,
    catalog: Res<LevelCatalog>,
    mut q_overlay: Query<&mut Visibility, With<ResultOverlay>>,
    mut q_label: Query<&mut Text, With<LevelLabel>>,
) {
    let Some(request) = loads.read().last().copied() else {
        return;
    };
    if let Ok(mut visibility) = q_overlay.single_mut() {
        *visibility = Visibility::Hidden;
    }
    if let (Ok(mut text), Some(layout)) = (q_label.single_mut(), catalog.get(request.index)) {
        text.0 = format!("Level {}: {}", request.index + 1, layout.title);
    }
}
