//! Components used by the world module.
use bevy::prelude::*;

/// Marker component for the camera the UI projects world points through.
#[derive(Component, Debug, Default)]
pub struct MainCamera;

/// Marker component for the static ground strip.
#[derive(Component, Debug, Default)]
pub struct Ground;
