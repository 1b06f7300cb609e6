//! Cue dispatch.
//!
//! Translates engine transitions into named cues on an injected
//! [`CuePlayer`]. Playback is exclusive: starting any cue silences whatever
//! was sounding. One-shot cues (alarm, phase-start chime) carry their own
//! auto-stop countdown, advanced by [`CueDispatcher::tick`] from a clock that
//! is independent of the engine's, so a paused session still silences its
//! alarm on time.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::engine::{AdvanceCause, Display, Lifecycle};
use super::plan::{Segment, SegmentKind};
use crate::error::CueError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CueName {
    Alarm,
    Countdown,
    PhaseStart,
}

impl CueName {
    pub const ALL: [CueName; 3] = [CueName::Alarm, CueName::Countdown, CueName::PhaseStart];

    pub fn as_str(self) -> &'static str {
        match self {
            CueName::Alarm => "alarm",
            CueName::Countdown => "countdown",
            CueName::PhaseStart => "phase-start",
        }
    }
}

impl std::fmt::Display for CueName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output capability for cues. Implementations know nothing about the
/// engine; they only play and stop named sounds (or vibrations).
pub trait CuePlayer {
    fn play(&mut self, cue: CueName) -> Result<(), CueError>;

    fn stop(&mut self, cue: CueName) -> Result<(), CueError>;

    fn stop_all(&mut self) -> Result<(), CueError> {
        for cue in CueName::ALL {
            self.stop(cue)?;
        }
        Ok(())
    }
}

impl<P: CuePlayer + ?Sized> CuePlayer for Box<P> {
    fn play(&mut self, cue: CueName) -> Result<(), CueError> {
        (**self).play(cue)
    }

    fn stop(&mut self, cue: CueName) -> Result<(), CueError> {
        (**self).stop(cue)
    }

    fn stop_all(&mut self) -> Result<(), CueError> {
        (**self).stop_all()
    }
}

/// Player that plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCuePlayer;

impl CuePlayer for SilentCuePlayer {
    fn play(&mut self, _cue: CueName) -> Result<(), CueError> {
        Ok(())
    }

    fn stop(&mut self, _cue: CueName) -> Result<(), CueError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Alarm auto-stop, in seconds.
    #[serde(default = "default_alarm_timeout")]
    pub alarm_timeout_secs: u32,
    /// Phase-start chime auto-stop, in seconds.
    #[serde(default = "default_phase_start_timeout")]
    pub phase_start_timeout_secs: u32,
    /// Countdown warning sounds while remaining time is at or below this.
    #[serde(default = "default_countdown_threshold")]
    pub countdown_threshold_secs: u32,
}

fn default_true() -> bool {
    true
}
fn default_alarm_timeout() -> u32 {
    15
}
fn default_phase_start_timeout() -> u32 {
    5
}
fn default_countdown_threshold() -> u32 {
    10
}

impl Default for CueSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            alarm_timeout_secs: default_alarm_timeout(),
            phase_start_timeout_secs: default_phase_start_timeout(),
            countdown_threshold_secs: default_countdown_threshold(),
        }
    }
}

/// Whether the countdown warning should be sounding for this display state.
///
/// Pure function of engine state: remaining time in `[1, threshold]` while
/// the session is Running and not paused.
pub fn countdown_wanted(display: &Display, threshold_secs: u32) -> bool {
    display.lifecycle == Lifecycle::Running
        && display.running
        && display.remaining_secs >= 1
        && display.remaining_secs <= threshold_secs
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveCue {
    name: CueName,
    /// Seconds until auto-stop; `None` for cues stopped by state.
    stop_in: Option<u32>,
}

pub struct CueDispatcher<P: CuePlayer> {
    player: P,
    settings: CueSettings,
    active: Option<ActiveCue>,
    /// Bumped whenever the auto-stop timer is armed or cancelled.
    generation: u64,
}

impl<P: CuePlayer> CueDispatcher<P> {
    pub fn new(player: P, settings: CueSettings) -> Self {
        Self {
            player,
            settings,
            active: None,
            generation: 0,
        }
    }

    pub fn settings(&self) -> &CueSettings {
        &self.settings
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn active(&self) -> Option<CueName> {
        self.active.map(|a| a.name)
    }

    pub fn is_active(&self, cue: CueName) -> bool {
        self.active() == Some(cue)
    }

    /// Identity of the pending auto-stop timer, `None` when nothing is armed.
    pub fn timer_source(&self) -> Option<u64> {
        self.active
            .and_then(|a| a.stop_in)
            .map(|_| self.generation)
    }

    /// Seconds until the active one-shot cue auto-stops.
    pub fn stop_in(&self) -> Option<u32> {
        self.active.and_then(|a| a.stop_in)
    }

    // ── Engine hooks ─────────────────────────────────────────────────

    /// A segment ran out or was skipped. Natural practice endings sound the
    /// alarm; a manual skip silences it instead.
    pub fn on_segment_end(&mut self, kind: SegmentKind, cause: AdvanceCause) -> Vec<Event> {
        match (kind, cause) {
            (SegmentKind::Practice, AdvanceCause::Elapsed) => {
                self.play(CueName::Alarm, Some(self.settings.alarm_timeout_secs))
            }
            (_, AdvanceCause::Skipped) => self.stop_alarm(),
            _ => Vec::new(),
        }
    }

    pub fn on_segment_enter(&mut self, segment: &Segment) -> Vec<Event> {
        if !segment.chime {
            return Vec::new();
        }
        self.play(
            CueName::PhaseStart,
            Some(self.settings.phase_start_timeout_secs),
        )
    }

    /// Re-evaluate the countdown warning against the current display.
    ///
    /// A sounding alarm outranks the countdown: the warning waits until the
    /// alarm stops and is picked up on the next evaluation.
    pub fn on_countdown_threshold(&mut self, display: &Display) -> Vec<Event> {
        let wanted = self.settings.enabled
            && countdown_wanted(display, self.settings.countdown_threshold_secs);
        match (wanted, self.active()) {
            (true, Some(CueName::Countdown | CueName::Alarm)) => Vec::new(),
            (true, _) => self.play(CueName::Countdown, None),
            (false, Some(CueName::Countdown)) => self.stop_active(),
            _ => Vec::new(),
        }
    }

    /// The owning session left Running: silence everything.
    pub fn on_session_finished(&mut self) -> Vec<Event> {
        self.release()
    }

    /// One second of cue time passed.
    pub fn tick(&mut self) -> Vec<Event> {
        let Some(active) = self.active.as_mut() else {
            return Vec::new();
        };
        let Some(left) = active.stop_in.as_mut() else {
            return Vec::new();
        };
        *left = left.saturating_sub(1);
        if *left == 0 {
            tracing::debug!(cue = %active.name, "cue auto-stopped");
            return self.stop_active();
        }
        Vec::new()
    }

    pub fn stop_alarm(&mut self) -> Vec<Event> {
        if self.is_active(CueName::Alarm) {
            self.stop_active()
        } else {
            Vec::new()
        }
    }

    /// Stop every cue and cancel pending timers.
    pub fn release(&mut self) -> Vec<Event> {
        let events = self.stop_active();
        if let Err(e) = self.player.stop_all() {
            tracing::debug!(error = %e, "cue stop_all failed");
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn play(&mut self, cue: CueName, stop_in: Option<u32>) -> Vec<Event> {
        if !self.settings.enabled {
            return Vec::new();
        }
        let mut events = self.stop_active();
        match self.player.play(cue) {
            Ok(()) => {
                self.active = Some(ActiveCue {
                    name: cue,
                    stop_in: stop_in.filter(|secs| *secs > 0),
                });
                self.generation = self.generation.wrapping_add(1);
                events.push(Event::CueStarted { cue, at: Utc::now() });
            }
            Err(e) => {
                tracing::debug!(cue = %cue, error = %e, "cue playback failed; ignoring");
            }
        }
        events
    }

    fn stop_active(&mut self) -> Vec<Event> {
        let Some(active) = self.active.take() else {
            return Vec::new();
        };
        self.generation = self.generation.wrapping_add(1);
        if let Err(e) = self.player.stop(active.name) {
            tracing::debug!(cue = %active.name, error = %e, "cue stop failed; ignoring");
        }
        vec![Event::CueStopped {
            cue: active.name,
            at: Utc::now(),
        }]
    }
}
