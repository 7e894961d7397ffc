// src/ui/speech_bubble/layout.rs
//
// Bubble sizing from text, padding and width clamps, with vertical
// compensation so a resize does not make the bubble jump on screen.

use bevy::prelude::*;

use super::measure::TextMeasure;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleLayoutConfig {
    /// Horizontal (x) and vertical (y) padding on each side.
    pub padding: Vec2,
    pub min_width: f32,
    pub max_width: f32,
    /// Point of the bubble pinned to the follow anchor; (0, 0) is bottom-left.
    pub pivot: Vec2,
}

impl Default for BubbleLayoutConfig {
    fn default() -> Self {
        Self {
            padding: Vec2::new(12.0, 8.0),
            min_width: 80.0,
            max_width: 320.0,
            pivot: Vec2::new(0.5, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BubbleLayoutState {
    pub size: Vec2,
    pub previous_height: f32,
    pub vertical_compensation: f32,
}

/// Lays out `text` and carries the compensation forward from `previous`.
pub fn compute_layout(
    config: &BubbleLayoutConfig,
    previous: BubbleLayoutState,
    text: &str,
    measure: &dyn TextMeasure,
) -> BubbleLayoutState {
    let horizontal_padding = 2.0 * config.padding.x;
    let available = (config.max_width - horizontal_padding).max(0.0);
    let min_text_width = (config.min_width - horizontal_padding)
        .max(0.0)
        .min(available);

    let preferred = measure.measure(text, available);
    let text_width = preferred.x.clamp(min_text_width, available);
    // Height depends on where the clamped width wraps.
    let text_height = measure.measure(text, text_width).y.max(1.0);

    let size = Vec2::new(text_width, text_height) + 2.0 * config.padding;

    let delta_height = size.y - previous.previous_height;
    let mut vertical_compensation = previous.vertical_compensation;
    if delta_height.abs() > f32::EPSILON {
        vertical_compensation += delta_height * config.pivot.y;
    }

    BubbleLayoutState {
        size,
        previous_height: size.y,
        vertical_compensation,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPhase {
    Idle,
    /// A pass is running; `follow_up` records a request that arrived meanwhile.
    Computing { follow_up: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutRequest {
    Accepted,
    /// Will run once the current pass finishes.
    Queued,
}

#[derive(Resource, Debug)]
pub struct BubbleLayoutEngine {
    config: BubbleLayoutConfig,
    state: BubbleLayoutState,
    phase: LayoutPhase,
    dirty: bool,
}

impl BubbleLayoutEngine {
    pub fn new(config: BubbleLayoutConfig) -> Self {
        Self {
            config,
            state: BubbleLayoutState::default(),
            phase: LayoutPhase::Idle,
            dirty: false,
        }
    }

    pub fn config(&self) -> &BubbleLayoutConfig {
        &self.config
    }

    pub fn state(&self) -> BubbleLayoutState {
        self.state
    }

    pub fn phase(&self) -> LayoutPhase {
        self.phase
    }

    pub fn request(&mut self) -> LayoutRequest {
        match self.phase {
            LayoutPhase::Idle => {
                self.dirty = true;
                LayoutRequest::Accepted
            }
            LayoutPhase::Computing { .. } => {
                self.phase = LayoutPhase::Computing { follow_up: true };
                LayoutRequest::Queued
            }
        }
    }

    /// Runs every pending pass, including follow-ups queued during a pass.
    /// Returns the number of passes run.
    pub fn run_pending(&mut self, text: &str, measure: &dyn TextMeasure) -> u32 {
        let mut passes = 0;
        while self.begin() {
            self.state = compute_layout(&self.config, self.state, text, measure);
            passes += 1;
            self.finish();
        }
        passes
    }

    /// Forgets the previous size; the next layout starts from zero.
    pub fn reset(&mut self) {
        self.state = BubbleLayoutState::default();
        self.phase = LayoutPhase::Idle;
        self.dirty = false;
    }

    fn begin(&mut self) -> bool {
        if self.phase != LayoutPhase::Idle || !self.dirty {
            return false;
        }
        self.dirty = false;
        self.phase = LayoutPhase::Computing { follow_up: false };
        true
    }

    fn finish(&mut self) {
        if let LayoutPhase::Computing { follow_up: true } = self.phase {
            self.dirty = true;
        }
        self.phase = LayoutPhase::Idle;
    }
}

impl Default for BubbleLayoutEngine {
    fn default() -> Self {
        Self::new(BubbleLayoutConfig::default())
    }
}
