//! Drill session facade.
//!
//! Wires one [`PhaseEngine`] to one [`CueDispatcher`] and produces the
//! [`SessionSummary`] when the run finishes. Every control method takes
//! `&mut self`, so a tick and a user action can never interleave; callers that
//! share a session across tasks put it behind a single owner loop rather than
//! a lock.

use crate::events::Event;
use crate::summary::{summarize, SessionDetails, SessionSummary};
use crate::timer::{
    CueDispatcher, CuePlayer, CueSettings, Display, Lifecycle, Pattern, PhaseEngine, PlanConfig,
};

pub struct DrillSession<P: CuePlayer> {
    engine: PhaseEngine,
    cues: CueDispatcher<P>,
    details: SessionDetails,
    summary: Option<SessionSummary>,
}

impl<P: CuePlayer> DrillSession<P> {
    pub fn new(config: PlanConfig, pattern: Pattern, cue_settings: CueSettings, player: P) -> Self {
        Self {
            engine: PhaseEngine::new(config, pattern),
            cues: CueDispatcher::new(player, cue_settings),
            details: SessionDetails::default(),
            summary: None,
        }
    }

    pub fn with_details(mut self, details: SessionDetails) -> Self {
        self.details = details;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &PhaseEngine {
        &self.engine
    }

    pub fn cues(&self) -> &CueDispatcher<P> {
        &self.cues
    }

    pub fn details(&self) -> &SessionDetails {
        &self.details
    }

    pub fn display(&self) -> Display {
        self.engine.display()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.engine.lifecycle()
    }

    /// See [`PhaseEngine::tick_source`].
    pub fn tick_source(&self) -> Option<u64> {
        self.engine.tick_source()
    }

    /// See [`CueDispatcher::timer_source`].
    pub fn cue_timer_source(&self) -> Option<u64> {
        self.cues.timer_source()
    }

    /// Summary of the finished run, if the current run has finished.
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn take_summary(&mut self) -> Option<SessionSummary> {
        self.summary.take()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn set_details(&mut self, details: SessionDetails) {
        self.details = details;
    }

    pub fn set_config(&mut self, config: PlanConfig) {
        self.engine.set_config(config);
    }

    pub fn set_pattern(&mut self, pattern: Pattern) {
        self.engine.set_pattern(pattern);
    }

    pub fn start(&mut self) -> Vec<Event> {
        let events = self.engine.start();
        if !events.is_empty() {
            self.summary = None;
        }
        self.route(events)
    }

    /// One second on the session clock.
    pub fn tick(&mut self) -> Vec<Event> {
        let events = self.engine.tick();
        self.route(events)
    }

    /// One second on the cue clock (auto-stop timers).
    pub fn cue_tick(&mut self) -> Vec<Event> {
        let events = self.cues.tick();
        self.after_cue_stop(events)
    }

    pub fn toggle_pause(&mut self) -> Vec<Event> {
        let events = self.engine.toggle_pause();
        self.route(events)
    }

    pub fn skip(&mut self) -> Vec<Event> {
        let events = self.engine.skip();
        self.route(events)
    }

    pub fn stop_alarm(&mut self) -> Vec<Event> {
        let events = self.cues.stop_alarm();
        self.after_cue_stop(events)
    }

    pub fn reset(&mut self) -> Vec<Event> {
        let mut events = self.engine.reset();
        events.extend(self.cues.release());
        self.summary = None;
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Forward engine events to the cue dispatcher, then re-evaluate the
    /// countdown cue against the resulting state.
    fn route(&mut self, events: Vec<Event>) -> Vec<Event> {
        let mut out = Vec::with_capacity(events.len());
        for event in events {
            let follow_up = match &event {
                Event::SegmentCompleted { kind, cause, .. } => {
                    self.cues.on_segment_end(*kind, *cause)
                }
                Event::SegmentEntered { segment_index, .. } => {
                    match self.engine.plan().and_then(|p| p.get(*segment_index)).cloned() {
                        Some(segment) => self.cues.on_segment_enter(&segment),
                        None => Vec::new(),
                    }
                }
                Event::SessionFinished { .. } => {
                    let mut follow_up = self.cues.on_session_finished();
                    follow_up.extend(self.finish());
                    follow_up
                }
                _ => Vec::new(),
            };
            out.push(event);
            out.extend(follow_up);
        }
        let display = self.engine.display();
        out.extend(self.cues.on_countdown_threshold(&display));
        out
    }

    /// A cue went quiet; a countdown held back by it may start now.
    fn after_cue_stop(&mut self, mut events: Vec<Event>) -> Vec<Event> {
        if !events.is_empty() {
            let display = self.engine.display();
            events.extend(self.cues.on_countdown_threshold(&display));
        }
        events
    }

    fn finish(&mut self) -> Option<Event> {
        let plan = self.engine.plan()?;
        let summary = summarize(plan, &self.details);
        tracing::info!(
            minutes = summary.total_practice_minutes,
            title = %summary.title,
            "drill session summarized"
        );
        self.summary = Some(summary.clone());
        Some(Event::SessionSummarized {
            summary,
            at: chrono::Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{CueName, SilentCuePlayer};

    fn session(practice: u32, rest: u32, sets: u32) -> DrillSession<SilentCuePlayer> {
        DrillSession::new(
            PlanConfig::new(practice, rest, sets),
            Pattern::pair(),
            CueSettings::default(),
            SilentCuePlayer,
        )
        .with_details(SessionDetails::new("Serve drills", "short"))
    }

    #[test]
    fn summary_produced_once_on_finish() {
        let mut s = session(120, 30, 2);
        s.start();
        let mut summaries = 0;
        for _ in 0..10 {
            summaries += s
                .skip()
                .iter()
                .filter(|e| matches!(e, Event::SessionSummarized { .. }))
                .count();
        }
        assert_eq!(summaries, 1);
        let summary = s.take_summary().unwrap();
        assert_eq!(summary.total_practice_minutes, 4);
        assert_eq!(summary.title, "Serve drills");
    }

    #[test]
    fn countdown_cue_tracks_remaining() {
        let mut s = session(12, 30, 1);
        s.start();
        s.tick();
        assert!(!s.cues().is_active(CueName::Countdown));
        s.tick();
        assert!(s.cues().is_active(CueName::Countdown));
        s.toggle_pause();
        assert!(!s.cues().is_active(CueName::Countdown));
    }

    #[test]
    fn short_rest_keeps_practice_alarm() {
        let mut s = session(3, 5, 1);
        s.start();
        let mut events = Vec::new();
        for _ in 0..3 {
            events.extend(s.tick());
        }
        assert!(s.cues().is_active(CueName::Alarm));
        assert!(!events.iter().any(|e| matches!(
            e,
            Event::CueStopped {
                cue: CueName::Alarm,
                ..
            }
        )));

        // Stopping the alarm hands over to the countdown still in its window.
        let events = s.stop_alarm();
        assert!(matches!(
            events[..],
            [Event::CueStopped { cue: CueName::Alarm, .. },
             Event::CueStarted { cue: CueName::Countdown, .. }]
        ));
    }

    #[test]
    fn alarm_timeout_hands_over_to_countdown() {
        let settings = CueSettings {
            alarm_timeout_secs: 2,
            ..CueSettings::default()
        };
        let mut s = DrillSession::new(
            PlanConfig::new(1, 8, 1),
            Pattern::pair(),
            settings,
            SilentCuePlayer,
        );
        s.start();
        s.tick();
        assert!(s.cues().is_active(CueName::Alarm));
        s.tick();
        s.cue_tick();
        assert!(s.cues().is_active(CueName::Alarm));
        s.tick();
        s.cue_tick();
        assert!(s.cues().is_active(CueName::Countdown));
    }

    #[test]
    fn reset_releases_cues_and_summary() {
        let mut s = session(1, 1, 1);
        s.start();
        s.tick();
        assert!(s.cues().is_active(CueName::Alarm) || s.cues().is_active(CueName::Countdown));
        s.reset();
        assert_eq!(s.cues().active(), None);
        assert_eq!(s.lifecycle(), Lifecycle::Setting);
        assert!(s.summary().is_none());
    }
}
