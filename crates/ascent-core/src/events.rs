use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::summary::SessionSummary;
use crate::timer::{AdvanceCause, CueName, Lifecycle, SegmentKind};

/// Every state change in a drill session produces an Event.
/// Front ends render them; the journal consumes the summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        set_count: u32,
        segment_count: usize,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    SegmentEntered {
        segment_index: usize,
        set_index: u32,
        kind: SegmentKind,
        label: String,
        duration_secs: u32,
        cause: AdvanceCause,
        at: DateTime<Utc>,
    },
    SegmentCompleted {
        segment_index: usize,
        kind: SegmentKind,
        cause: AdvanceCause,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    SessionFinished {
        segment_count: usize,
        at: DateTime<Utc>,
    },
    CueStarted {
        cue: CueName,
        at: DateTime<Utc>,
    },
    CueStopped {
        cue: CueName,
        at: DateTime<Utc>,
    },
    SessionSummarized {
        summary: SessionSummary,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        lifecycle: Lifecycle,
        running: bool,
        segment_index: usize,
        segment_kind: SegmentKind,
        segment_label: String,
        set_index: u32,
        set_count: u32,
        remaining_secs: u32,
        total_secs: u32,
        session_progress_pct: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine name, matching the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Event::SessionStarted { .. } => "SessionStarted",
            Event::SegmentEntered { .. } => "SegmentEntered",
            Event::SegmentCompleted { .. } => "SegmentCompleted",
            Event::TimerPaused { .. } => "TimerPaused",
            Event::TimerResumed { .. } => "TimerResumed",
            Event::TimerReset { .. } => "TimerReset",
            Event::SessionFinished { .. } => "SessionFinished",
            Event::CueStarted { .. } => "CueStarted",
            Event::CueStopped { .. } => "CueStopped",
            Event::SessionSummarized { .. } => "SessionSummarized",
            Event::StateSnapshot { .. } => "StateSnapshot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::TimerReset { at: Utc::now() };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "TimerReset");
        assert_eq!(event.name(), "TimerReset");
    }

    #[test]
    fn cue_names_use_kebab_case() {
        let event = Event::CueStarted {
            cue: CueName::PhaseStart,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["cue"], "phase-start");
    }
}
