//! Phase engine.
//!
//! A tick-counted state machine over a [`SessionPlan`]. It has no clock of its
//! own: the caller drives it with one `tick()` per second while
//! [`PhaseEngine::tick_source`] is `Some`.
//!
//! ## State Transitions
//!
//! ```text
//! Setting -> Running (running <-> paused) -> Finished
//!    ^__________________ reset() ____________|
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = PhaseEngine::new(PlanConfig::default(), Pattern::pair());
//! engine.start();
//! // Once per second:
//! for event in engine.tick() { /* render / route to cues */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::plan::{Pattern, PlanConfig, Segment, SegmentKind, SessionPlan, MAX_SETS};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Setting,
    Running,
    Finished,
}

/// Why the engine moved between segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvanceCause {
    Started,
    Elapsed,
    Skipped,
}

/// Live display tuple handed to front ends after every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Display {
    pub lifecycle: Lifecycle,
    pub running: bool,
    pub remaining_secs: u32,
    pub segment_index: usize,
    pub segment_kind: SegmentKind,
    pub segment_label: String,
    pub segment_total_secs: u32,
    pub set_index: u32,
    pub set_count: u32,
}

/// Core phase engine.
#[derive(Debug, Clone)]
pub struct PhaseEngine {
    /// Live configuration. Only read by `start()` and the Setting preview.
    config: PlanConfig,
    pattern: Pattern,
    /// Plan frozen at `start()`; `None` while Setting.
    plan: Option<SessionPlan>,
    lifecycle: Lifecycle,
    running: bool,
    segment_index: usize,
    set_index: u32,
    remaining_secs: u32,
    /// Bumped whenever the tick source has to be rebuilt.
    epoch: u64,
}

impl PhaseEngine {
    /// Create an engine in `Setting`, showing the first segment's duration.
    pub fn new(config: PlanConfig, pattern: Pattern) -> Self {
        let mut engine = Self {
            config,
            pattern,
            plan: None,
            lifecycle: Lifecycle::Setting,
            running: false,
            segment_index: 0,
            set_index: 1,
            remaining_secs: 0,
            epoch: 0,
        };
        engine.remaining_secs = engine.preview_segment().duration_secs;
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    pub fn set_index(&self) -> u32 {
        self.set_index
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The frozen plan of the current run, if one was started.
    pub fn plan(&self) -> Option<&SessionPlan> {
        self.plan.as_ref()
    }

    pub fn set_count(&self) -> u32 {
        match &self.plan {
            Some(plan) => plan.set_count(),
            None => self.config.set_count.clamp(1, MAX_SETS),
        }
    }

    /// Segment under the cursor. In Setting this is the first segment the
    /// live configuration would produce.
    pub fn current_segment(&self) -> Segment {
        self.plan
            .as_ref()
            .and_then(|p| p.get(self.segment_index))
            .cloned()
            .unwrap_or_else(|| self.preview_segment())
    }

    /// Identity of the tick source the caller should be running.
    ///
    /// `None` means no tick source may exist. A changed value means the
    /// existing one must be torn down and recreated.
    pub fn tick_source(&self) -> Option<u64> {
        self.is_ticking().then_some(self.epoch)
    }

    pub fn display(&self) -> Display {
        let segment = self.current_segment();
        Display {
            lifecycle: self.lifecycle,
            running: self.running,
            remaining_secs: self.remaining_secs,
            segment_index: self.segment_index,
            segment_kind: segment.kind,
            segment_label: segment.label,
            segment_total_secs: segment.duration_secs,
            set_index: self.set_index,
            set_count: self.set_count(),
        }
    }

    /// 0.0 .. 1.0 progress within the current segment.
    pub fn segment_progress(&self) -> f64 {
        let total = self.current_segment().duration_secs;
        if total == 0 {
            return if self.lifecycle == Lifecycle::Finished { 1.0 } else { 0.0 };
        }
        1.0 - (f64::from(self.remaining_secs) / f64::from(total))
    }

    /// 0.0 .. 100.0 progress across the whole session.
    pub fn session_progress_pct(&self) -> f64 {
        let Some(plan) = &self.plan else {
            return 0.0;
        };
        if self.lifecycle == Lifecycle::Finished {
            return 100.0;
        }
        let total = plan.total_duration_secs() as f64;
        if total == 0.0 {
            return 0.0;
        }
        let done = plan.cumulative_secs(self.segment_index) as f64;
        let current = f64::from(self.current_segment().duration_secs) * self.segment_progress();
        ((done + current) / total * 100.0).min(100.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let display = self.display();
        Event::StateSnapshot {
            lifecycle: display.lifecycle,
            running: display.running,
            segment_index: display.segment_index,
            segment_kind: display.segment_kind,
            segment_label: display.segment_label,
            set_index: display.set_index,
            set_count: display.set_count,
            remaining_secs: display.remaining_secs,
            total_secs: display.segment_total_secs,
            session_progress_pct: self.session_progress_pct(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the live configuration. A running plan is left untouched;
    /// in Setting the displayed countdown follows the new values.
    pub fn set_config(&mut self, config: PlanConfig) {
        self.config = config;
        self.refresh_preview();
    }

    pub fn set_pattern(&mut self, pattern: Pattern) {
        self.pattern = pattern;
        self.refresh_preview();
    }

    pub fn start(&mut self) -> Vec<Event> {
        if self.lifecycle != Lifecycle::Setting {
            return Vec::new();
        }
        let plan = SessionPlan::from_config(&self.config, &self.pattern);
        let Some(first) = plan.first().cloned() else {
            return Vec::new();
        };
        let started = Event::SessionStarted {
            set_count: plan.set_count(),
            segment_count: plan.len(),
            total_secs: plan.total_duration_secs(),
            at: Utc::now(),
        };
        tracing::debug!(
            segments = plan.len(),
            sets = plan.set_count(),
            "drill session started"
        );

        self.plan = Some(plan);
        self.segment_index = 0;
        self.set_index = first.set_index;
        self.remaining_secs = first.duration_secs;
        self.running = true;
        self.lifecycle = Lifecycle::Running;
        self.bump_epoch();

        vec![started, Self::entered(0, &first, AdvanceCause::Started)]
    }

    /// One second elapsed. Reaching zero advances on this same tick.
    pub fn tick(&mut self) -> Vec<Event> {
        if !self.is_ticking() {
            return Vec::new();
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            return self.advance(AdvanceCause::Elapsed);
        }
        Vec::new()
    }

    pub fn toggle_pause(&mut self) -> Vec<Event> {
        if self.lifecycle != Lifecycle::Running {
            return Vec::new();
        }
        self.running = !self.running;
        self.bump_epoch();
        let event = if self.running {
            Event::TimerResumed {
                remaining_secs: self.remaining_secs,
                at: Utc::now(),
            }
        } else {
            Event::TimerPaused {
                remaining_secs: self.remaining_secs,
                at: Utc::now(),
            }
        };
        vec![event]
    }

    /// Jump to the next segment regardless of remaining time. The paused
    /// flag is kept as is.
    pub fn skip(&mut self) -> Vec<Event> {
        if self.lifecycle != Lifecycle::Running {
            return Vec::new();
        }
        self.advance(AdvanceCause::Skipped)
    }

    /// Back to Setting from any state, discarding the plan.
    pub fn reset(&mut self) -> Vec<Event> {
        self.plan = None;
        self.lifecycle = Lifecycle::Setting;
        self.running = false;
        self.segment_index = 0;
        self.set_index = 1;
        self.remaining_secs = self.preview_segment().duration_secs;
        self.bump_epoch();
        vec![Event::TimerReset { at: Utc::now() }]
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn is_ticking(&self) -> bool {
        self.lifecycle == Lifecycle::Running && self.running
    }

    fn bump_epoch(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }

    fn refresh_preview(&mut self) {
        if self.lifecycle == Lifecycle::Setting {
            self.remaining_secs = self.preview_segment().duration_secs;
        }
    }

    fn preview_segment(&self) -> Segment {
        // Pattern is never empty, so slot 0 always exists.
        let slot = &self.pattern.slots()[0];
        Segment {
            kind: slot.kind,
            duration_secs: self.config.duration_for(slot),
            label: slot.label.clone(),
            set_index: 1,
            position: 0,
            chime: slot.chime,
        }
    }

    fn entered(index: usize, segment: &Segment, cause: AdvanceCause) -> Event {
        Event::SegmentEntered {
            segment_index: index,
            set_index: segment.set_index,
            kind: segment.kind,
            label: segment.label.clone(),
            duration_secs: segment.duration_secs,
            cause,
            at: Utc::now(),
        }
    }

    fn advance(&mut self, cause: AdvanceCause) -> Vec<Event> {
        let Some(plan) = &self.plan else {
            return Vec::new();
        };
        let from = self.segment_index;
        let Some(ended_kind) = plan.get(from).map(|s| s.kind) else {
            return Vec::new();
        };
        let next = plan.get(from + 1).cloned();
        let segment_count = plan.len();

        let mut events = vec![Event::SegmentCompleted {
            segment_index: from,
            kind: ended_kind,
            cause,
            at: Utc::now(),
        }];

        match next {
            Some(segment) => {
                self.segment_index = from + 1;
                if segment.set_index != self.set_index {
                    tracing::debug!(set = segment.set_index, "set advanced");
                }
                self.set_index = segment.set_index;
                self.remaining_secs = segment.duration_secs;
                events.push(Self::entered(self.segment_index, &segment, cause));
            }
            None => {
                self.lifecycle = Lifecycle::Finished;
                self.running = false;
                self.remaining_secs = 0;
                tracing::debug!(segments = segment_count, "drill session finished");
                events.push(Event::SessionFinished {
                    segment_count,
                    at: Utc::now(),
                });
            }
        }
        self.bump_epoch();
        events
    }
}

impl Default for PhaseEngine {
    fn default() -> Self {
        Self::new(PlanConfig::default(), Pattern::default())
    }
}
