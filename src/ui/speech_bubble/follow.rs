// src/ui/speech_bubble/follow.rs
//
// World-to-screen placement of the speech bubble.
//
// Screen coordinates here are logical pixels with the origin at the
// bottom-left of the window and y pointing up, matching the `left`/`bottom`
// offsets the bubble node is positioned with.

use bevy::prelude::*;

/// Projects a world point to screen space.
///
/// Without a camera the point passes through unchanged. Returns `None` when
/// the camera cannot see the point.
pub fn project_to_screen(
    camera: Option<(&Camera, &GlobalTransform)>,
    window_height: f32,
    world: Vec3,
) -> Option<Vec2> {
    let Some((camera, camera_transform)) = camera else {
        return Some(world.truncate());
    };

    camera
        .world_to_viewport(camera_transform, world)
        .ok()
        .map(|viewport| Vec2::new(viewport.x, window_height - viewport.y))
}

/// Bottom-left corner that puts the bubble's pivot on `anchor`.
pub fn bubble_origin(anchor: Vec2, size: Vec2, pivot: Vec2) -> Vec2 {
    anchor - size * pivot
}

/// Keeps a bubble of `size` inside a canvas of `canvas` size. A bubble larger
/// than the canvas is pinned to the bottom-left corner.
pub fn clamp_to_canvas(origin: Vec2, size: Vec2, canvas: Vec2) -> Vec2 {
    origin.clamp(Vec2::ZERO, (canvas - size).max(Vec2::ZERO))
}
