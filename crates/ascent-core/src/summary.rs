//! Session summary: the record handed to storage when a run finishes.

use serde::{Deserialize, Serialize};

use crate::timer::SessionPlan;

/// Title used when the user leaves it blank.
pub const DEFAULT_TITLE: &str = "Practice (A/B rotation)";

/// User-supplied labels attached to a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDetails {
    pub title: String,
    pub note: String,
}

impl SessionDetails {
    pub fn new(title: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            note: note.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_practice_minutes: u32,
    pub title: String,
    pub note: String,
}

/// Sum every practice segment across all sets of `plan`, floored to whole
/// minutes. Rest time never counts.
pub fn summarize(plan: &SessionPlan, details: &SessionDetails) -> SessionSummary {
    let minutes = plan.practice_duration_secs() / 60;
    let title = details.title.trim();
    SessionSummary {
        total_practice_minutes: u32::try_from(minutes).unwrap_or(u32::MAX),
        title: if title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            title.to_string()
        },
        note: details.note.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{Pattern, PlanConfig};

    #[test]
    fn practice_minutes_ignore_rest() {
        let plan = SessionPlan::build(300, 60, 3, &Pattern::pair());
        let summary = summarize(&plan, &SessionDetails::new("Footwork", ""));
        assert_eq!(summary.total_practice_minutes, 15);

        let plan = SessionPlan::build(300, 600, 3, &Pattern::pair());
        assert_eq!(summarize(&plan, &SessionDetails::default()).total_practice_minutes, 15);
    }

    #[test]
    fn minutes_are_floored() {
        // Ring pattern: two 90s practice slots per set.
        let plan = SessionPlan::build(90, 30, 1, &Pattern::ring());
        assert_eq!(summarize(&plan, &SessionDetails::default()).total_practice_minutes, 3);
        let plan = SessionPlan::build(150, 30, 1, &Pattern::pair());
        assert_eq!(summarize(&plan, &SessionDetails::default()).total_practice_minutes, 2);
    }

    #[test]
    fn alternate_duration_counts() {
        let config = PlanConfig::new(420, 60, 3).with_alternate(Some(180));
        let plan = SessionPlan::from_config(&config, &Pattern::alternating());
        assert_eq!(summarize(&plan, &SessionDetails::default()).total_practice_minutes, 30);
    }

    #[test]
    fn blank_title_falls_back_and_text_is_trimmed() {
        let plan = SessionPlan::build(60, 60, 1, &Pattern::pair());
        let summary = summarize(&plan, &SessionDetails::new("   ", "  felt good \n"));
        assert_eq!(summary.title, DEFAULT_TITLE);
        assert_eq!(summary.note, "felt good");
    }
}
