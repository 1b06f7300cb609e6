use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Most sets a single session can hold.
pub const MAX_SETS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Practice,
    Rest,
}

/// One entry of the per-set pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSlot {
    pub kind: SegmentKind,
    pub label: String,
    /// Practice slot that takes the alternate ("B side") duration when one is
    /// configured.
    #[serde(default)]
    pub alternate: bool,
    /// Entering this slot sounds the phase-start chime.
    #[serde(default)]
    pub chime: bool,
}

impl PatternSlot {
    pub fn practice(label: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Practice,
            label: label.into(),
            alternate: false,
            chime: false,
        }
    }

    pub fn rest(label: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Rest,
            label: label.into(),
            alternate: false,
            chime: false,
        }
    }

    pub fn with_alternate(mut self) -> Self {
        self.alternate = true;
        self
    }

    pub fn with_chime(mut self) -> Self {
        self.chime = true;
        self
    }
}

/// Named pattern presets selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// `[Practice, Rest]`
    Pair,
    /// `[Practice, Rest, Practice, Rest]`, chime on the second practice.
    Ring,
    /// `[A, Rest, B, Rest]`, B may carry its own duration.
    #[default]
    Alternating,
}

impl PatternKind {
    pub fn pattern(self) -> Pattern {
        match self {
            PatternKind::Pair => Pattern::pair(),
            PatternKind::Ring => Pattern::ring(),
            PatternKind::Alternating => Pattern::alternating(),
        }
    }
}

impl std::str::FromStr for PatternKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pair" => Ok(PatternKind::Pair),
            "ring" => Ok(PatternKind::Ring),
            "alternating" => Ok(PatternKind::Alternating),
            other => Err(ValidationError::InvalidValue {
                field: "pattern".into(),
                message: format!("expected pair, ring or alternating, got '{other}'"),
            }),
        }
    }
}

/// The ordered slot list repeated for every set. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PatternSlot>", into = "Vec<PatternSlot>")]
pub struct Pattern {
    slots: Vec<PatternSlot>,
}

impl Pattern {
    pub fn new(slots: Vec<PatternSlot>) -> Result<Self, ValidationError> {
        if slots.is_empty() {
            return Err(ValidationError::EmptyPattern);
        }
        Ok(Self { slots })
    }

    pub fn pair() -> Self {
        Self {
            slots: vec![PatternSlot::practice("Practice"), PatternSlot::rest("Rest")],
        }
    }

    pub fn ring() -> Self {
        Self {
            slots: vec![
                PatternSlot::practice("Practice"),
                PatternSlot::rest("Interval"),
                PatternSlot::practice("Practice").with_chime(),
                PatternSlot::rest("Interval"),
            ],
        }
    }

    pub fn alternating() -> Self {
        Self {
            slots: vec![
                PatternSlot::practice("A side practice"),
                PatternSlot::rest("Rest"),
                PatternSlot::practice("B side practice")
                    .with_alternate()
                    .with_chime(),
                PatternSlot::rest("Rest"),
            ],
        }
    }

    pub fn slots(&self) -> &[PatternSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn kinds(&self) -> Vec<SegmentKind> {
        self.slots.iter().map(|s| s.kind).collect()
    }
}

impl Default for Pattern {
    fn default() -> Self {
        PatternKind::default().pattern()
    }
}

impl TryFrom<Vec<PatternSlot>> for Pattern {
    type Error = ValidationError;

    fn try_from(slots: Vec<PatternSlot>) -> Result<Self, Self::Error> {
        Pattern::new(slots)
    }
}

impl From<Pattern> for Vec<PatternSlot> {
    fn from(pattern: Pattern) -> Self {
        pattern.slots
    }
}

/// Normalized inputs for building a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanConfig {
    pub practice_secs: u32,
    pub rest_secs: u32,
    /// Override for practice slots flagged `alternate`; `None` means B = A.
    #[serde(default)]
    pub alternate_practice_secs: Option<u32>,
    pub set_count: u32,
}

impl PlanConfig {
    pub fn new(practice_secs: u32, rest_secs: u32, set_count: u32) -> Self {
        Self {
            practice_secs,
            rest_secs,
            alternate_practice_secs: None,
            set_count,
        }
    }

    pub fn with_alternate(mut self, secs: Option<u32>) -> Self {
        self.alternate_practice_secs = secs;
        self
    }

    pub(crate) fn duration_for(&self, slot: &PatternSlot) -> u32 {
        match slot.kind {
            SegmentKind::Rest => self.rest_secs,
            SegmentKind::Practice if slot.alternate => self
                .alternate_practice_secs
                .unwrap_or(self.practice_secs),
            SegmentKind::Practice => self.practice_secs,
        }
    }
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self::new(5 * 60, 2 * 60, 3)
    }
}

/// One timed phase of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub duration_secs: u32,
    pub label: String,
    /// 1-based set this segment belongs to.
    pub set_index: u32,
    /// 0-based slot within the set.
    pub position: usize,
    #[serde(default)]
    pub chime: bool,
}

/// Flattened, immutable segment sequence for one timer run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPlan {
    segments: Vec<Segment>,
    set_count: u32,
    pattern_len: usize,
}

impl SessionPlan {
    /// Build a plan with symmetric practice slots.
    pub fn build(practice_secs: u32, rest_secs: u32, set_count: u32, pattern: &Pattern) -> Self {
        Self::from_config(&PlanConfig::new(practice_secs, rest_secs, set_count), pattern)
    }

    /// Build a plan from a full config. `set_count` is clamped to
    /// `[1, MAX_SETS]`.
    pub fn from_config(config: &PlanConfig, pattern: &Pattern) -> Self {
        let set_count = config.set_count.clamp(1, MAX_SETS);
        let mut segments = Vec::with_capacity(set_count as usize * pattern.len());
        for set_index in 1..=set_count {
            for (position, slot) in pattern.slots().iter().enumerate() {
                segments.push(Segment {
                    kind: slot.kind,
                    duration_secs: config.duration_for(slot),
                    label: slot.label.clone(),
                    set_index,
                    position,
                    chime: slot.chime,
                });
            }
        }
        Self {
            segments,
            set_count,
            pattern_len: pattern.len(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn first(&self) -> Option<&Segment> {
        self.segments.first()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn set_count(&self) -> u32 {
        self.set_count
    }

    pub fn pattern_len(&self) -> usize {
        self.pattern_len
    }

    pub fn total_duration_secs(&self) -> u64 {
        self.segments.iter().map(|s| u64::from(s.duration_secs)).sum()
    }

    pub fn practice_duration_secs(&self) -> u64 {
        self.segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Practice)
            .map(|s| u64::from(s.duration_secs))
            .sum()
    }

    /// Seconds contained in segments before `index`.
    pub fn cumulative_secs(&self, index: usize) -> u64 {
        self.segments
            .iter()
            .take(index)
            .map(|s| u64::from(s.duration_secs))
            .sum()
    }

    /// Whether `index` is the first segment of a set.
    pub fn starts_set(&self, index: usize) -> bool {
        self.pattern_len > 0 && index % self.pattern_len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_count_is_sets_times_pattern() {
        let plan = SessionPlan::build(300, 60, 3, &Pattern::pair());
        assert_eq!(plan.len(), 6);
        let plan = SessionPlan::build(300, 60, 3, &Pattern::alternating());
        assert_eq!(plan.len(), 12);
    }

    #[test]
    fn set_count_is_clamped() {
        assert_eq!(SessionPlan::build(30, 30, 0, &Pattern::pair()).set_count(), 1);
        assert_eq!(SessionPlan::build(30, 30, 40, &Pattern::pair()).set_count(), MAX_SETS);
    }

    #[test]
    fn segments_are_tagged_with_set_and_position() {
        let plan = SessionPlan::build(300, 60, 2, &Pattern::ring());
        let tags: Vec<(u32, usize)> = plan
            .segments()
            .iter()
            .map(|s| (s.set_index, s.position))
            .collect();
        assert_eq!(
            tags,
            vec![(1, 0), (1, 1), (1, 2), (1, 3), (2, 0), (2, 1), (2, 2), (2, 3)]
        );
        assert!(plan.starts_set(4));
        assert!(!plan.starts_set(5));
    }

    #[test]
    fn alternate_duration_only_hits_flagged_slot() {
        let config = PlanConfig::new(420, 60, 1).with_alternate(Some(180));
        let plan = SessionPlan::from_config(&config, &Pattern::alternating());
        let durations: Vec<u32> = plan.segments().iter().map(|s| s.duration_secs).collect();
        assert_eq!(durations, vec![420, 60, 180, 60]);

        // The ring preset has no alternate slot, so the override is ignored.
        let plan = SessionPlan::from_config(&config, &Pattern::ring());
        let durations: Vec<u32> = plan.segments().iter().map(|s| s.duration_secs).collect();
        assert_eq!(durations, vec![420, 60, 420, 60]);
    }

    #[test]
    fn without_override_b_equals_a() {
        let plan = SessionPlan::build(420, 60, 1, &Pattern::alternating());
        assert_eq!(plan.get(2).map(|s| s.duration_secs), Some(420));
    }

    #[test]
    fn empty_pattern_rejected() {
        assert_eq!(Pattern::new(vec![]), Err(ValidationError::EmptyPattern));
        assert!(serde_json::from_str::<Pattern>("[]").is_err());
    }

    #[test]
    fn pattern_kind_parses() {
        assert_eq!("Ring".parse::<PatternKind>(), Ok(PatternKind::Ring));
        assert!("triple".parse::<PatternKind>().is_err());
    }

    #[test]
    fn practice_total_ignores_rest() {
        let plan = SessionPlan::build(300, 60, 3, &Pattern::pair());
        assert_eq!(plan.practice_duration_secs(), 900);
        assert_eq!(plan.total_duration_secs(), 1080);
        assert_eq!(plan.cumulative_secs(2), 360);
    }
}
