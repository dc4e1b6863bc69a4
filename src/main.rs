use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;

use landfall::comments::load_failure_comments;
use landfall::config::{load_flight_config, FlightConfig};
use landfall::graphics::{outline_gizmo_system, setup_camera};
use landfall::hud::{setup_result_overlay, HudPlugin};
use landfall::level::LevelPlugin;
use landfall::rocket::RocketPlugin;

/// Point Rapier's gravity down with the configured magnitude.
fn setup_physics_config(mut rapier: Query<&mut RapierConfiguration>, config: Res<FlightConfig>) {
    for mut cfg in rapier.iter_mut() {
        cfg.gravity = Vec2::new(0.0, -config.gravity);
    }
}

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Landfall".into(),
            resolution: WindowResolution::new(1200, 680),
            ..Default::default()
        }),
        ..Default::default()
    }))
    .insert_resource(ClearColor(Color::srgb(0.02, 0.02, 0.06)))
    // Compiled defaults; load_flight_config overwrites them from
    // assets/flight.toml (if present) in the Startup schedule.
    .insert_resource(FlightConfig::default())
    // World units are metres: speeds and thresholds read directly in m/s.
    .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
    .add_plugins((RocketPlugin, LevelPlugin, HudPlugin))
    .add_systems(
        Startup,
        (
            // Load config first so every other startup system sees the final values.
            load_flight_config.before(setup_result_overlay),
            load_failure_comments.after(load_flight_config),
            setup_physics_config.after(load_flight_config),
            setup_camera,
        ),
    )
    .add_systems(Update, outline_gizmo_system);

    app.run();
}
