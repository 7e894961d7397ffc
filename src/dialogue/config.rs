//! Settings read from `config/dialogue.toml`.
use std::{fs, path::Path, time::Duration};

use bevy::prelude::*;
use serde::Deserialize;

use crate::{
    interaction::{overlap::TriggerShape, proximity::DetectionMode, registry::AgentTag},
    ui::speech_bubble::layout::BubbleLayoutConfig,
};

use super::{
    errors::DialogueConfigError,
    script::{default_greeting, DialogueScript, HookId, Speaker},
};

const CONFIG_PATH: &str = "config/dialogue.toml";
const DEFAULT_TELEMETRY_LOG_PATH: &str = "logs/dialogue_history.jsonl";

#[derive(Debug, Clone, Deserialize)]
struct RawDialogueConfig {
    #[serde(default)]
    typewriter: RawTypewriter,
    #[serde(default)]
    bubble: RawBubble,
    #[serde(default)]
    interaction: RawInteraction,
    #[serde(default)]
    telemetry: RawTelemetry,
    #[serde(default = "default_npcs")]
    npc: Vec<RawNpc>,
}

impl Default for RawDialogueConfig {
    fn default() -> Self {
        Self {
            typewriter: RawTypewriter::default(),
            bubble: RawBubble::default(),
            interaction: RawInteraction::default(),
            telemetry: RawTelemetry::default(),
            npc: default_npcs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawTypewriter {
    enabled: bool,
    seconds_per_char: f32,
}

impl Default for RawTypewriter {
    fn default() -> Self {
        Self {
            enabled: true,
            seconds_per_char: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawBubble {
    padding: [f32; 2],
    min_width: f32,
    max_width: f32,
    pivot: [f32; 2],
    vertical_offset: f32,
    font_size: f32,
    clamp_to_canvas: bool,
}

impl Default for RawBubble {
    fn default() -> Self {
        Self {
            padding: [12.0, 8.0],
            min_width: 80.0,
            max_width: 320.0,
            pivot: [0.5, 0.0],
            vertical_offset: 24.0,
            font_size: 18.0,
            clamp_to_canvas: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawInteraction {
    chat_button_offset: [f32; 2],
    chat_button_size: [f32; 2],
}

impl Default for RawInteraction {
    fn default() -> Self {
        Self {
            chat_button_offset: [0.0, 64.0],
            chat_button_size: [72.0, 32.0],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawTelemetry {
    capacity: usize,
    log_path: String,
    persist: bool,
}

impl Default for RawTelemetry {
    fn default() -> Self {
        Self {
            capacity: 64,
            log_path: DEFAULT_TELEMETRY_LOG_PATH.to_string(),
            persist: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum RawDetection {
    #[default]
    ShapeOverlap,
    PolledDistance,
}

#[derive(Debug, Clone, Deserialize)]
struct RawLineHook {
    line: usize,
    hook: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawNpc {
    name: String,
    position: [f32; 2],
    anchor_offset: [f32; 2],
    detection: RawDetection,
    radius: f32,
    trigger_half_extents: Option<[f32; 2]>,
    tracked_tag: String,
    lines: Vec<String>,
    speakers: Vec<Speaker>,
    repeatable: bool,
    auto_advance_seconds: Option<f32>,
    on_completed: Option<String>,
    line_hooks: Vec<RawLineHook>,
}

impl Default for RawNpc {
    fn default() -> Self {
        Self {
            name: "Villager".to_string(),
            position: [160.0, 0.0],
            anchor_offset: [0.0, 40.0],
            detection: RawDetection::default(),
            radius: 96.0,
            trigger_half_extents: None,
            tracked_tag: AgentTag::PLAYER.to_string(),
            lines: Vec::new(),
            speakers: Vec::new(),
            repeatable: true,
            auto_advance_seconds: None,
            on_completed: None,
            line_hooks: Vec::new(),
        }
    }
}

fn default_npcs() -> Vec<RawNpc> {
    vec![RawNpc::default()]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypewriterSettings {
    pub enabled: bool,
    pub seconds_per_char: Duration,
}

/// Visual settings of the single speech bubble.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SpeechBubbleSettings {
    pub layout: BubbleLayoutConfig,
    pub vertical_offset: f32,
    pub font_size: f32,
    pub clamp_to_canvas: bool,
}

impl Default for SpeechBubbleSettings {
    fn default() -> Self {
        RawBubble::default().into()
    }
}

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct InteractionSettings {
    pub chat_button_offset: Vec2,
    pub chat_button_size: Vec2,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        RawInteraction::default().into()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySettings {
    pub capacity: usize,
    pub log_path: String,
    pub persist: bool,
}

/// Everything needed to spawn one conversational NPC.
#[derive(Debug, Clone)]
pub struct NpcDefinition {
    pub name: String,
    pub position: Vec2,
    pub anchor_offset: Vec2,
    pub detection: DetectionMode,
    pub radius: f32,
    pub trigger: TriggerShape,
    pub tracked_tag: AgentTag,
    /// `None` when the script could not be built; the NPC then refuses to talk.
    pub script: Option<DialogueScript>,
}

/// NPCs declared in configuration, spawned at startup.
#[derive(Resource, Debug, Clone, Default)]
pub struct NpcRoster {
    pub npcs: Vec<NpcDefinition>,
}

/// Runtime configuration derived from `config/dialogue.toml`.
#[derive(Debug, Clone)]
pub struct DialogueConfig {
    pub typewriter: TypewriterSettings,
    pub bubble: SpeechBubbleSettings,
    pub interaction: InteractionSettings,
    pub telemetry: TelemetrySettings,
    pub roster: NpcRoster,
}

impl DialogueConfig {
    pub fn load_or_default() -> Self {
        match Self::load(Path::new(CONFIG_PATH)) {
            Ok(config) => config,
            Err(err) => {
                warn!("{}. Falling back to defaults.", err);
                RawDialogueConfig::default().into()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, DialogueConfigError> {
        let raw = fs::read_to_string(path).map_err(|err| DialogueConfigError::Read {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::parse(&raw).map_err(|err| match err {
            DialogueConfigError::Parse { message, .. } => DialogueConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, DialogueConfigError> {
        toml::from_str::<RawDialogueConfig>(raw)
            .map(Self::from)
            .map_err(|err| DialogueConfigError::Parse {
                path: CONFIG_PATH.to_string(),
                message: err.to_string(),
            })
    }
}

impl Default for DialogueConfig {
    fn default() -> Self {
        RawDialogueConfig::default().into()
    }
}

impl From<RawDialogueConfig> for DialogueConfig {
    fn from(value: RawDialogueConfig) -> Self {
        let typewriter = TypewriterSettings {
            enabled: value.typewriter.enabled,
            seconds_per_char: seconds_or(value.typewriter.seconds_per_char, 0.05),
        };

        let telemetry = TelemetrySettings {
            capacity: value.telemetry.capacity.max(1),
            log_path: if value.telemetry.log_path.trim().is_empty() {
                DEFAULT_TELEMETRY_LOG_PATH.to_string()
            } else {
                value.telemetry.log_path
            },
            persist: value.telemetry.persist,
        };

        let roster = NpcRoster {
            npcs: value.npc.into_iter().map(NpcDefinition::from).collect(),
        };

        Self {
            typewriter,
            bubble: value.bubble.into(),
            interaction: value.interaction.into(),
            telemetry,
            roster,
        }
    }
}

impl From<RawBubble> for SpeechBubbleSettings {
    fn from(value: RawBubble) -> Self {
        let padding = Vec2::from(value.padding).max(Vec2::ZERO);
        let max_width = value.max_width.max(0.0);
        let layout = BubbleLayoutConfig {
            padding,
            min_width: value.min_width.clamp(0.0, max_width),
            max_width,
            pivot: Vec2::from(value.pivot).clamp(Vec2::ZERO, Vec2::ONE),
        };

        Self {
            layout,
            vertical_offset: value.vertical_offset,
            font_size: value.font_size.max(1.0),
            clamp_to_canvas: value.clamp_to_canvas,
        }
    }
}

impl From<RawInteraction> for InteractionSettings {
    fn from(value: RawInteraction) -> Self {
        Self {
            chat_button_offset: Vec2::from(value.chat_button_offset),
            chat_button_size: Vec2::from(value.chat_button_size).max(Vec2::splat(1.0)),
        }
    }
}

impl From<RawNpc> for NpcDefinition {
    fn from(value: RawNpc) -> Self {
        let radius = value.radius.max(0.0);
        let trigger = match value.trigger_half_extents {
            Some(half_extents) => TriggerShape::Rect {
                half_extents: Vec2::from(half_extents).max(Vec2::ZERO),
            },
            None => TriggerShape::Circle { radius },
        };
        let detection = match value.detection {
            RawDetection::ShapeOverlap => DetectionMode::ShapeOverlap,
            RawDetection::PolledDistance => DetectionMode::PolledDistance,
        };
        let tracked_tag = if value.tracked_tag.trim().is_empty() {
            AgentTag::player()
        } else {
            AgentTag::new(value.tracked_tag.trim())
        };
        let script = build_script(&value);

        Self {
            name: value.name,
            position: Vec2::from(value.position),
            anchor_offset: Vec2::from(value.anchor_offset),
            detection,
            radius,
            trigger,
            tracked_tag,
            script,
        }
    }
}

fn build_script(value: &RawNpc) -> Option<DialogueScript> {
    // Blank lines are dropped; `positions` keeps each kept line's configured
    // index so speakers and hooks stay attached to the line they were written for.
    let (positions, lines): (Vec<usize>, Vec<String>) = value
        .lines
        .iter()
        .enumerate()
        .map(|(index, line)| (index, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(index, line)| (index, line.to_string()))
        .unzip();

    let (lines, speakers, positions) = if lines.is_empty() {
        warn!(
            "NPC '{}' has no dialogue lines in {}. Using the default greeting.",
            value.name, CONFIG_PATH
        );
        let greeting = default_greeting(&value.name);
        let positions = (0..greeting.len()).collect::<Vec<_>>();
        (greeting, Vec::new(), positions)
    } else {
        let speakers = positions
            .iter()
            .map(|index| value.speakers.get(*index).copied().unwrap_or_default())
            .collect::<Vec<_>>();
        (lines, speakers, positions)
    };

    let script = match DialogueScript::from_texts(value.name.clone(), lines, &speakers) {
        Ok(script) => script,
        Err(err) => {
            warn!("{}", err);
            return None;
        }
    };

    let mut script = script
        .repeatable(value.repeatable)
        .with_auto_advance(
            value
                .auto_advance_seconds
                .filter(|seconds| *seconds > 0.0)
                .map(|seconds| seconds_or(seconds, 3.0)),
        )
        .with_completion_hook(
            value
                .on_completed
                .as_deref()
                .map(str::trim)
                .filter(|hook| !hook.is_empty())
                .map(HookId::new),
        );

    for line_hook in &value.line_hooks {
        let Some(index) = positions.iter().position(|line| *line == line_hook.line) else {
            warn!(
                "NPC '{}' hook '{}' points at line {} which is blank or missing",
                value.name, line_hook.hook, line_hook.line
            );
            continue;
        };
        script = script.with_line_hook(index, HookId::new(&line_hook.hook));
    }

    Some(script)
}

fn seconds_or(seconds: f32, fallback: f32) -> Duration {
    Duration::try_from_secs_f32(seconds.max(0.0))
        .unwrap_or_else(|_| Duration::from_secs_f32(fallback))
}
