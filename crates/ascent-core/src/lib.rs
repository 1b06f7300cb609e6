//! # Ascent Core Library
//!
//! Core logic for the Ascent practice log's drill interval timer. All
//! behaviour lives here; the `ascent` CLI (and any GUI) is a thin front end
//! that feeds configuration in, drives the clock, and stores the summary.
//!
//! ## Architecture
//!
//! - **Duration model**: minute/second input snapped and clamped to seconds
//! - **Plan builder**: a per-set pattern repeated into a fixed segment list
//! - **Phase engine**: tick-counted state machine; the caller owns the clock
//! - **Cue dispatcher**: exclusive, auto-stopping cues on an injected player
//! - **Summary**: practice minutes + title/note for the journal
//! - **Storage**: TOML configuration and a JSON practice journal
//!
//! ## Key Components
//!
//! - [`PhaseEngine`]: Core timer state machine
//! - [`DrillSession`]: Engine + cues + summary behind one `&mut` owner
//! - [`Config`]: Application configuration management
//! - [`EntryLog`]: Practice journal persistence

pub mod duration;
pub mod error;
pub mod events;
pub mod session;
pub mod storage;
pub mod summary;
pub mod timer;

pub use error::{ConfigError, CoreError, CueError, ValidationError};
pub use events::Event;
pub use session::DrillSession;
pub use storage::{Config, EntryLog, PracticeEntry};
pub use summary::{summarize, SessionDetails, SessionSummary};
pub use timer::{
    CueName, CuePlayer, CueSettings, Lifecycle, Pattern, PatternKind, PhaseEngine, PlanConfig,
    SegmentKind, SessionPlan,
};
