use bevy::prelude::*;

mod core;
mod dialogue;
mod interaction;
mod npc;
mod player;
mod ui;
mod world;

use crate::{
    core::CorePlugin,
    dialogue::{DialogueConfig, DialoguePlugin},
    interaction::InteractionPlugin,
    npc::NpcPlugin,
    player::PlayerPlugin,
    ui::UiPlugin,
    world::WorldPlugin,
};

fn main() {
    let config = DialogueConfig::load_or_default();

    App::new()
        .add_plugins((
            DefaultPlugins,
            CorePlugin::default(),
            DialoguePlugin::new(config),
            InteractionPlugin,
            WorldPlugin,
            PlayerPlugin,
            NpcPlugin,
            UiPlugin, // After DialoguePlugin to pick up SpeechBubbleSettings
        ))
        .run();
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::{time::TimeUpdateStrategy, transform::TransformPlugin};

    use super::*;
    use crate::{
        dialogue::{
            hub::DialogueNotice, runtime::DialogueRuntime, session::DialogueSession,
            telemetry::DialogueTelemetry,
        },
        interaction::{coordinator::InteractionCoordinator, events::ChatPressed},
        npc::components::NpcId,
        player::components::Player,
    };

    const INK_MASTER: &str = r#"
        [telemetry]
        persist = false

        [[npc]]
        name = "Ink Master"
        position = [0.0, 0.0]
        radius = 96.0
        lines = ["Welcome.", "Where am I?", "On the island."]
        speakers = ["npc", "player"]
    "#;

    fn demo_app() -> App {
        demo_app_with(INK_MASTER)
    }

    fn demo_app_with(raw_config: &str) -> App {
        let mut config = DialogueConfig::parse(raw_config).expect("test config parses");
        config.typewriter.enabled = false;

        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            TransformPlugin,
            CorePlugin::default(),
            DialoguePlugin::new(config),
            InteractionPlugin,
            PlayerPlugin,
            NpcPlugin,
            UiPlugin,
        ))
        .init_resource::<ButtonInput<KeyCode>>();
        app
    }

    fn move_player_to(app: &mut App, x: f32) {
        let world = app.world_mut();
        let mut players = world.query_filtered::<&mut Transform, With<Player>>();
        for mut transform in players.iter_mut(world) {
            transform.translation.x = x;
        }
        // One frame to propagate the transform, one for the detectors to see it.
        app.update();
        app.update();
    }

    fn any_session_active(app: &mut App) -> bool {
        let world = app.world_mut();
        let mut sessions = world.query::<&DialogueSession>();
        sessions.iter(world).any(DialogueSession::is_active)
    }

    #[test]
    fn walking_up_and_pressing_chat_runs_the_conversation() {
        let mut app = demo_app();
        app.update();
        assert!(!app.world().resource::<InteractionCoordinator>().is_button_visible());

        move_player_to(&mut app, 10.0);
        assert!(app.world().resource::<InteractionCoordinator>().is_button_visible());

        app.world_mut().write_message(ChatPressed);
        app.update();
        assert!(any_session_active(&mut app));
        let runtime = app.world().resource::<DialogueRuntime>();
        assert_eq!(runtime.displayed_text(), "Welcome.");
        assert!(runtime.is_bubble_visible());

        move_player_to(&mut app, -400.0);
        assert!(!any_session_active(&mut app));
        assert!(!app.world().resource::<DialogueRuntime>().is_bubble_visible());
        assert!(!app.world().resource::<InteractionCoordinator>().is_button_visible());
    }

    #[test]
    fn walking_away_as_auto_advance_comes_due_ends_without_the_next_line() {
        let raw = format!(
            "{}\nauto_advance_seconds = 0.3\n\n[[npc.line_hooks]]\nline = 1\nhook = \"give_brush\"\n",
            INK_MASTER.trim_end()
        );
        let mut app = demo_app_with(&raw);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(200)));
        app.update();

        move_player_to(&mut app, 10.0);
        app.world_mut().write_message(ChatPressed);
        app.update();
        assert!(any_session_active(&mut app));

        // The exit is resolved two frames later, when 0.4s have passed.
        move_player_to(&mut app, -400.0);
        assert!(!any_session_active(&mut app));

        let telemetry = app.world().resource::<DialogueTelemetry>();
        assert!(!telemetry.records().any(|record| matches!(
            record.event,
            DialogueNotice::LineShown { line_index: 1, .. }
        )));
        assert!(telemetry.records().any(|record| matches!(
            record.event,
            DialogueNotice::SessionEnded {
                line_index: 0,
                forced: true,
                ..
            }
        )));
    }

    #[test]
    fn despawning_the_npc_mid_conversation_clears_bubble_and_button() {
        let mut app = demo_app();
        app.update();
        move_player_to(&mut app, 10.0);
        app.world_mut().write_message(ChatPressed);
        app.update();
        assert!(app.world().resource::<DialogueRuntime>().is_bubble_visible());

        let world = app.world_mut();
        let npcs = world
            .query_filtered::<Entity, With<NpcId>>()
            .iter(world)
            .collect::<Vec<_>>();
        for npc in npcs {
            world.despawn(npc);
        }
        app.update();

        assert!(!app.world().resource::<DialogueRuntime>().is_bubble_visible());
        let coordinator = app.world().resource::<InteractionCoordinator>();
        assert_eq!(coordinator.current(), None);
        assert!(!coordinator.is_button_visible());
    }
}
