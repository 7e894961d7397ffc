//! Dialogue plugin wiring the runtime, settings, and telemetry.
use bevy::prelude::*;

use crate::core::FrameStage;

use super::{
    config::DialogueConfig,
    events::DialogueNoticeEvent,
    runtime::DialogueRuntime,
    systems::{forward_dialogue_notices, register_roster_hooks, run_deferred_dialogue_actions},
    telemetry::{
        flush_dialogue_telemetry_log, record_dialogue_telemetry, DialogueTelemetry,
        DialogueTelemetryLog,
    },
};

pub struct DialoguePlugin {
    config: DialogueConfig,
}

impl DialoguePlugin {
    pub fn new(config: DialogueConfig) -> Self {
        Self { config }
    }
}

impl Default for DialoguePlugin {
    fn default() -> Self {
        Self::new(DialogueConfig::default())
    }
}

impl Plugin for DialoguePlugin {
    fn build(&self, app: &mut App) {
        let config = &self.config;
        let telemetry_log = if config.telemetry.persist {
            DialogueTelemetryLog::new(config.telemetry.log_path.clone())
        } else {
            DialogueTelemetryLog::disabled()
        };

        app.insert_resource(DialogueRuntime::new(
            config.typewriter.seconds_per_char,
            config.typewriter.enabled,
        ))
        .insert_resource(config.bubble)
        .insert_resource(config.interaction)
        .insert_resource(config.roster.clone())
        .insert_resource(DialogueTelemetry::new(config.telemetry.capacity))
        .insert_resource(telemetry_log)
        .add_message::<DialogueNoticeEvent>()
        .add_systems(Startup, (register_roster_hooks, log_dialogue_settings))
        .add_systems(
            Update,
            run_deferred_dialogue_actions.in_set(FrameStage::Session),
        )
        .add_systems(
            Update,
            (forward_dialogue_notices, record_dialogue_telemetry)
                .chain()
                .in_set(FrameStage::Layout),
        )
        .add_systems(Last, flush_dialogue_telemetry_log);
    }
}

fn log_dialogue_settings(runtime: Res<DialogueRuntime>, telemetry: Res<DialogueTelemetryLog>) {
    info!(
        "DialoguePlugin initialised: typewriter {} ({:?} per char), telemetry log {}",
        if runtime.typewriter().is_enabled() {
            "on"
        } else {
            "off"
        },
        runtime.typewriter().seconds_per_char(),
        if telemetry.is_enabled() {
            telemetry.path().display().to_string()
        } else {
            "off".to_string()
        }
    );
}
