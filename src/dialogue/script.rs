//! Immutable dialogue scripts: ordered lines with speaker attribution.
use std::{fmt, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

use super::errors::DialogueConfigError;

/// Which on-screen agent a line belongs to. Unknown tags fall back to the NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Player,
    #[default]
    #[serde(other)]
    Npc,
}

/// Opaque name of a gameplay hook registered on the event hub.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HookId(Arc<str>);

impl HookId {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineEntry {
    pub text: String,
    pub speaker: Speaker,
    pub on_shown: Option<HookId>,
}

impl LineEntry {
    pub fn npc(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speaker: Speaker::Npc,
            on_shown: None,
        }
    }

    pub fn player(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Player,
            ..Self::npc(text)
        }
    }
}

/// Lines an NPC speaks, in playback order. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueScript {
    speaker_label: String,
    lines: Vec<LineEntry>,
    repeatable: bool,
    auto_advance: Option<Duration>,
    on_completed: Option<HookId>,
}

impl DialogueScript {
    pub fn new(
        speaker_label: impl Into<String>,
        lines: Vec<LineEntry>,
    ) -> Result<Self, DialogueConfigError> {
        let speaker_label = speaker_label.into();
        if lines.is_empty() {
            return Err(DialogueConfigError::EmptyScript { speaker_label });
        }

        Ok(Self {
            speaker_label,
            lines,
            repeatable: true,
            auto_advance: None,
            on_completed: None,
        })
    }

    /// Pairs texts with speakers positionally; missing speakers default to the NPC.
    pub fn from_texts(
        speaker_label: impl Into<String>,
        texts: Vec<String>,
        speakers: &[Speaker],
    ) -> Result<Self, DialogueConfigError> {
        let lines = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| LineEntry {
                text,
                speaker: speakers.get(index).copied().unwrap_or_default(),
                on_shown: None,
            })
            .collect();
        Self::new(speaker_label, lines)
    }

    pub fn repeatable(mut self, repeatable: bool) -> Self {
        self.repeatable = repeatable;
        self
    }

    pub fn with_auto_advance(mut self, delay: Option<Duration>) -> Self {
        self.auto_advance = delay;
        self
    }

    pub fn with_completion_hook(mut self, hook: Option<HookId>) -> Self {
        self.on_completed = hook;
        self
    }

    /// Attaches a hook to the line at `index`; out-of-range indices are ignored.
    pub fn with_line_hook(mut self, index: usize, hook: HookId) -> Self {
        if let Some(line) = self.lines.get_mut(index) {
            line.on_shown = Some(hook);
        }
        self
    }

    pub fn speaker_label(&self) -> &str {
        &self.speaker_label
    }

    pub fn line(&self, index: usize) -> Option<&LineEntry> {
        self.lines.get(index)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_repeatable(&self) -> bool {
        self.repeatable
    }

    pub fn auto_advance(&self) -> Option<Duration> {
        self.auto_advance
    }

    pub fn completion_hook(&self) -> Option<&HookId> {
        self.on_completed.as_ref()
    }
}

/// Greeting used for NPCs configured without any lines.
pub fn default_greeting(speaker_label: &str) -> Vec<String> {
    vec![
        format!("Hello! I'm {}.", speaker_label),
        "Is there anything I can help you with?".to_string(),
        "Have fun exploring the island!".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scripts_are_rejected() {
        let err = DialogueScript::new("Mo", Vec::new()).unwrap_err();
        assert_eq!(
            err,
            DialogueConfigError::EmptyScript {
                speaker_label: "Mo".into()
            }
        );
    }

    #[test]
    fn short_speaker_lists_default_to_npc() {
        let script = DialogueScript::from_texts(
            "Mo",
            vec!["a".into(), "b".into(), "c".into()],
            &[Speaker::Player],
        )
        .expect("non-empty script");

        assert_eq!(script.line(0).map(|l| l.speaker), Some(Speaker::Player));
        assert_eq!(script.line(1).map(|l| l.speaker), Some(Speaker::Npc));
        assert_eq!(script.line(2).map(|l| l.speaker), Some(Speaker::Npc));
        assert!(script.line(3).is_none());
    }

    #[test]
    fn unknown_speaker_tags_deserialize_as_npc() {
        #[derive(Deserialize)]
        struct Row {
            speakers: Vec<Speaker>,
        }

        let row: Row = toml::from_str(r#"speakers = ["player", "npc", "narrator"]"#)
            .expect("speaker tags should parse");
        assert_eq!(row.speakers, vec![Speaker::Player, Speaker::Npc, Speaker::Npc]);
    }

    #[test]
    fn line_hooks_ignore_out_of_range_indices() {
        let script = DialogueScript::new("Mo", vec![LineEntry::npc("hi")])
            .unwrap()
            .with_line_hook(0, HookId::new("wave"))
            .with_line_hook(5, HookId::new("ignored"));
        assert_eq!(
            script.line(0).and_then(|l| l.on_shown.clone()),
            Some(HookId::new("wave"))
        );
    }
}
