//! WorldPlugin sets up the camera and static scenery.
use bevy::prelude::*;

use crate::world::systems::spawn_world_environment;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_world_environment);
    }
}
