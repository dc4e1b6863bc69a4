use crate::constants::CAMERA_SCALE;
use bevy::prelude::*;

/// Rectangle drawn around a collider each frame.
///
/// Attached to scenery and to every rocket fragment; follows the entity's
/// `GlobalTransform`, so detached fragments tumble with their bodies.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    pub half_extents: Vec2,
    pub color: Color,
}

impl Outline {
    /// Corners in world space, counter-clockwise from bottom-left.
    pub fn corners(&self, transform: &GlobalTransform) -> [Vec2; 4] {
        let h = self.half_extents;
        [
            Vec2::new(-h.x, -h.y),
            Vec2::new(h.x, -h.y),
            Vec2::new(h.x, h.y),
            Vec2::new(-h.x, h.y),
        ]
        .map(|c| transform.transform_point(c.extend(0.0)).truncate())
    }
}

/// Setup camera for 2D rendering.  World units are metres.
pub fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scale: CAMERA_SCALE,
            ..OrthographicProjection::default_2d()
        }),
    ));
    eprintln!("[SETUP] Camera spawned");
}

pub fn outline_gizmo_system(mut gizmos: Gizmos, q: Query<(&GlobalTransform, &Outline)>) {
    for (transform, outline) in q.iter() {
        let corners = outline.corners(transform);
        for i in 0..corners.len() {
            gizmos.line_2d(corners[i], corners[(i + 1) % corners.len()], outline.color);
        }
    }
}
