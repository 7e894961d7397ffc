//! Telemetry storage for dialogue session notices.
use std::{
    collections::VecDeque,
    fs::{create_dir_all, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use bevy::{log::warn, prelude::*};
use serde::Serialize;

use crate::core::SimulationClock;

use super::{events::DialogueNoticeEvent, hub::DialogueNotice};

const DEFAULT_DIALOGUE_TELEMETRY_LOG_PATH: &str = "logs/dialogue_history.jsonl";

const DEFAULT_DIALOGUE_TELEMETRY_CAPACITY: usize = 64;

/// Rolling log of recent dialogue notices.
#[derive(Resource, Debug)]
pub struct DialogueTelemetry {
    capacity: usize,
    records: VecDeque<DialogueTelemetryRecord>,
}

impl DialogueTelemetry {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: VecDeque::new(),
        }
    }

    pub fn push(&mut self, record: DialogueTelemetryRecord) {
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn records(&self) -> impl Iterator<Item = &DialogueTelemetryRecord> {
        self.records.iter()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for DialogueTelemetry {
    fn default() -> Self {
        Self::new(DEFAULT_DIALOGUE_TELEMETRY_CAPACITY)
    }
}

/// Single telemetry entry, stamped with scaled simulation time.
#[derive(Debug, Clone, Serialize)]
pub struct DialogueTelemetryRecord {
    pub occurred_at_seconds: f64,
    pub event: DialogueNotice,
}

/// System that records every mirrored dialogue notice.
pub fn record_dialogue_telemetry(
    clock: Res<SimulationClock>,
    mut telemetry: ResMut<DialogueTelemetry>,
    mut notices: MessageReader<DialogueNoticeEvent>,
    mut log: ResMut<DialogueTelemetryLog>,
) {
    let now = clock.elapsed().as_secs_f64();

    for event in notices.read() {
        let record = DialogueTelemetryRecord {
            occurred_at_seconds: now,
            event: event.notice.clone(),
        };
        log.push(&record);
        telemetry.push(record);
    }
}

/// Append-only JSON lines log of dialogue notices for offline inspection.
#[derive(Resource, Debug)]
pub struct DialogueTelemetryLog {
    output_path: PathBuf,
    enabled: bool,
    pending: Vec<DialogueTelemetryRecord>,
}

impl DialogueTelemetryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: path.into(),
            enabled: true,
            pending: Vec::new(),
        }
    }

    /// A log that discards everything pushed to it.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Stops persisting and drops anything not yet written.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.pending.clear();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn push(&mut self, record: &DialogueTelemetryRecord) {
        if self.enabled {
            self.pending.push(record.clone());
        }
    }

    fn ensure_directory(&self) -> std::io::Result<()> {
        if let Some(parent) = self.output_path.parent() {
            create_dir_all(parent)?;
        }
        Ok(())
    }

    fn drain_pending(&mut self) -> Vec<DialogueTelemetryRecord> {
        std::mem::take(&mut self.pending)
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        self.ensure_directory()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.output_path)?;

        for record in self.drain_pending() {
            serde_json::to_writer(&mut file, &record)?;
            file.write_all(b"\n")?;
        }

        file.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.output_path
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for DialogueTelemetryLog {
    fn default() -> Self {
        Self::new(DEFAULT_DIALOGUE_TELEMETRY_LOG_PATH)
    }
}

/// Flushes pending telemetry log entries to disk. The first failure turns
/// persistence off for the rest of the run.
pub fn flush_dialogue_telemetry_log(mut log: ResMut<DialogueTelemetryLog>) {
    if let Err(err) = log.flush() {
        warn!(
            "Failed to persist dialogue telemetry to {:?}: {}. Disabling the telemetry log.",
            log.path(),
            err
        );
        log.disable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dialogue::script::Speaker, npc::components::NpcId};
    use serde_json::Value;
    use std::{env, fs, time::SystemTime};

    fn started(at: f64, npc: u64) -> DialogueTelemetryRecord {
        DialogueTelemetryRecord {
            occurred_at_seconds: at,
            event: DialogueNotice::SessionStarted {
                npc: NpcId::new(npc),
            },
        }
    }

    #[test]
    fn telemetry_drops_old_records_when_full() {
        let mut telemetry = DialogueTelemetry::new(2);
        telemetry.push(started(1.0, 1));
        telemetry.push(started(2.0, 2));
        telemetry.push(started(3.0, 3));

        assert_eq!(telemetry.len(), 2);
        assert!(telemetry
            .records()
            .all(|record| record.occurred_at_seconds >= 2.0));
    }

    #[test]
    fn telemetry_log_writes_json_lines() {
        let temp_dir = env::temp_dir();
        let unique_suffix = SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = temp_dir.join(format!("dialogue_log_test_{}.jsonl", unique_suffix));
        if path.exists() {
            let _ = fs::remove_file(&path);
        }

        let mut log = DialogueTelemetryLog::new(&path);
        log.push(&DialogueTelemetryRecord {
            occurred_at_seconds: 12.5,
            event: DialogueNotice::LineShown {
                npc: NpcId::new(42),
                line_index: 1,
                text: "Greetings".into(),
                speaker: Speaker::Player,
            },
        });
        log.flush().expect("telemetry log should flush");
        assert!(log.is_empty());

        let raw = fs::read_to_string(&path).expect("log file should exist");
        let lines: Vec<_> = raw.lines().collect();
        assert_eq!(lines.len(), 1);

        let value: Value = serde_json::from_str(lines[0]).expect("json line should parse");
        assert_eq!(value["occurred_at_seconds"], 12.5);
        assert_eq!(value["event"]["notice"], "line_shown");
        assert_eq!(value["event"]["npc"], 42);
        assert_eq!(value["event"]["speaker"], "player");
        assert_eq!(value["event"]["text"], "Greetings");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn failing_log_disables_itself() {
        let unique_suffix = SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let blocker = env::temp_dir().join(format!("dialogue_log_blocker_{}", unique_suffix));
        fs::write(&blocker, b"not a directory").expect("blocker file should be written");

        let mut log = DialogueTelemetryLog::new(blocker.join("nested").join("history.jsonl"));
        log.push(&started(1.0, 1));

        let mut app = App::new();
        app.insert_resource(log)
            .add_systems(Update, flush_dialogue_telemetry_log);
        app.update();

        let log = app.world_mut().resource_mut::<DialogueTelemetryLog>().into_inner();
        assert!(!log.is_enabled());
        assert!(log.is_empty());
        log.push(&started(2.0, 2));
        assert!(log.is_empty());

        let _ = fs::remove_file(&blocker);
    }

    #[test]
    fn disabled_log_keeps_nothing() {
        let mut log = DialogueTelemetryLog::disabled();
        log.push(&started(0.0, 1));
        assert!(log.is_empty());
        assert!(log.flush().is_ok());
    }
}
