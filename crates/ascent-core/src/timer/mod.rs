mod cue;
mod engine;
mod plan;

pub use cue::{countdown_wanted, CueDispatcher, CueName, CuePlayer, CueSettings, SilentCuePlayer};
pub use engine::{AdvanceCause, Display, Lifecycle, PhaseEngine};
pub use plan::{
    Pattern, PatternKind, PatternSlot, PlanConfig, Segment, SegmentKind, SessionPlan, MAX_SETS,
};
