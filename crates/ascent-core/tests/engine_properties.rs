//! Walk-throughs of the phase engine and property tests for the duration
//! model and plan builder.

use ascent_core::duration::{normalize, MAX_PHASE_SECS, STEP_SECS};
use ascent_core::timer::{countdown_wanted, Pattern, PatternSlot, PlanConfig, MAX_SETS};
use ascent_core::{Event, Lifecycle, PhaseEngine, SegmentKind, SessionPlan};
use proptest::prelude::*;

fn practice_alarms(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|e| {
            matches!(
                e,
                Event::SegmentCompleted {
                    kind: SegmentKind::Practice,
                    ..
                }
            )
        })
        .count()
}

#[test]
fn natural_countdown_takes_exactly_total_ticks() {
    let mut engine = PhaseEngine::new(PlanConfig::new(300, 60, 3), Pattern::pair());
    engine.start();

    let mut practice_endings = 0;
    for tick in 1..=1080 {
        assert_eq!(
            engine.lifecycle(),
            Lifecycle::Running,
            "finished early, before tick {tick}"
        );
        let events = engine.tick();
        practice_endings += practice_alarms(&events);
    }
    assert_eq!(engine.lifecycle(), Lifecycle::Finished);
    assert_eq!(practice_endings, 3);
    assert_eq!(engine.set_index(), 3);
}

#[test]
fn skipping_reaches_same_terminal_state() {
    let config = PlanConfig::new(300, 60, 3);
    let pattern = Pattern::pair();

    let mut ticked = PhaseEngine::new(config, pattern.clone());
    ticked.start();
    while ticked.lifecycle() == Lifecycle::Running {
        ticked.tick();
    }

    let mut skipped = PhaseEngine::new(config, pattern.clone());
    skipped.start();
    for _ in 0..2 * pattern.len() * 3 {
        skipped.skip();
    }

    assert_eq!(skipped.lifecycle(), Lifecycle::Finished);
    assert_eq!(skipped.segment_index(), ticked.segment_index());
    assert_eq!(skipped.set_index(), ticked.set_index());
    assert_eq!(skipped.remaining_secs(), ticked.remaining_secs());
}

#[test]
fn each_skip_advances_exactly_once() {
    let mut engine = PhaseEngine::new(PlanConfig::new(300, 60, 2), Pattern::alternating());
    engine.start();
    for expected in 1..8 {
        engine.skip();
        assert_eq!(engine.segment_index(), expected);
    }
    engine.skip();
    assert_eq!(engine.lifecycle(), Lifecycle::Finished);
}

#[test]
fn pausing_never_loses_or_double_counts_time() {
    let mut engine = PhaseEngine::new(PlanConfig::new(30, 30, 1), Pattern::pair());
    engine.start();
    for _ in 0..25 {
        engine.tick();
    }
    assert_eq!(engine.remaining_secs(), 5);

    engine.toggle_pause();
    for _ in 0..10 {
        assert!(engine.tick().is_empty());
    }
    assert_eq!(engine.remaining_secs(), 5);

    engine.toggle_pause();
    for _ in 0..4 {
        assert!(engine.tick().is_empty());
    }
    let events = engine.tick();
    assert!(matches!(
        events.first(),
        Some(Event::SegmentCompleted { segment_index: 0, .. })
    ));
    assert_eq!(engine.segment_index(), 1);
    assert_eq!(engine.remaining_secs(), 30);
}

#[test]
fn reset_from_every_lifecycle_restarts_cleanly() {
    let config = PlanConfig::new(60, 30, 2);
    let pattern = Pattern::ring();
    let direct = SessionPlan::from_config(&config, &pattern);

    let mut engine = PhaseEngine::new(config, pattern);
    let drive: [fn(&mut PhaseEngine); 3] = [
        |_| {},
        |e| {
            e.start();
            e.skip();
            e.tick();
        },
        |e| {
            e.start();
            while e.lifecycle() != Lifecycle::Finished {
                e.skip();
            }
        },
    ];

    for step in drive {
        step(&mut engine);
        engine.reset();
        assert_eq!(engine.segment_index(), 0);
        assert_eq!(engine.set_index(), 1);
        assert_eq!(engine.lifecycle(), Lifecycle::Setting);

        engine.start();
        assert_eq!(engine.plan(), Some(&direct));
        engine.reset();
    }
}

#[test]
fn countdown_window_holds_over_a_whole_run() {
    let mut engine = PhaseEngine::new(PlanConfig::new(30, 12, 2), Pattern::pair());
    engine.start();
    let mut step = 0u32;
    while engine.lifecycle() == Lifecycle::Running {
        let d = engine.display();
        let expected = d.running && (1..=10).contains(&d.remaining_secs);
        assert_eq!(countdown_wanted(&d, 10), expected);
        if step % 7 == 3 {
            engine.toggle_pause();
            assert!(!countdown_wanted(&engine.display(), 10));
            engine.toggle_pause();
        }
        engine.tick();
        step += 1;
    }
    assert!(!countdown_wanted(&engine.display(), 10));
}

#[test]
fn custom_pattern_runs_in_order() {
    let pattern = Pattern::new(vec![
        PatternSlot::practice("Forehand"),
        PatternSlot::practice("Backhand"),
        PatternSlot::rest("Water"),
    ])
    .unwrap();
    let mut engine = PhaseEngine::new(PlanConfig::new(2, 1, 1), pattern);
    engine.start();
    let mut labels = vec![engine.display().segment_label];
    while engine.lifecycle() == Lifecycle::Running {
        for event in engine.tick() {
            if let Event::SegmentEntered { label, .. } = event {
                labels.push(label);
            }
        }
    }
    assert_eq!(labels, vec!["Forehand", "Backhand", "Water"]);
}

proptest! {
    #[test]
    fn normalize_is_stepped_clamped_and_close(raw in 0i64..=(MAX_PHASE_SECS as i64)) {
        let out = normalize(raw, STEP_SECS, MAX_PHASE_SECS);
        prop_assert_eq!(out % STEP_SECS, 0);
        prop_assert!(out <= MAX_PHASE_SECS);
        prop_assert!((i64::from(out) - raw).abs() <= i64::from(STEP_SECS / 2));
    }

    #[test]
    fn normalize_never_escapes_range(raw in any::<i64>(), step in 1u32..120, max in 0u32..4000) {
        let out = normalize(raw, step, max);
        prop_assert!(out <= max);
    }

    #[test]
    fn plan_repeats_pattern_per_set(
        practice in 0u32..=600,
        rest in 0u32..=600,
        sets in 1u32..=MAX_SETS,
        kinds in proptest::collection::vec(any::<bool>(), 1..6),
    ) {
        let slots: Vec<PatternSlot> = kinds
            .iter()
            .map(|&p| if p { PatternSlot::practice("P") } else { PatternSlot::rest("R") })
            .collect();
        let pattern = Pattern::new(slots).unwrap();
        let plan = SessionPlan::build(practice, rest, sets, &pattern);

        prop_assert_eq!(plan.len(), sets as usize * pattern.len());
        for (i, segment) in plan.segments().iter().enumerate() {
            let slot = &pattern.slots()[i % pattern.len()];
            prop_assert_eq!(segment.kind, slot.kind);
            prop_assert_eq!(segment.set_index as usize, i / pattern.len() + 1);
            prop_assert_eq!(segment.position, i % pattern.len());
            let want = if slot.kind == SegmentKind::Practice { practice } else { rest };
            prop_assert_eq!(segment.duration_secs, want);
        }
    }

    #[test]
    fn run_length_equals_plan_length(
        practice in 0u32..40,
        rest in 0u32..40,
        sets in 1u32..4,
    ) {
        let mut engine = PhaseEngine::new(PlanConfig::new(practice, rest, sets), Pattern::ring());
        engine.start();
        let plan_total: u64 = engine
            .plan()
            .map(|p| p.segments().iter().map(|s| u64::from(s.duration_secs.max(1))).sum())
            .unwrap_or(0);
        let mut ticks = 0u64;
        while engine.lifecycle() == Lifecycle::Running {
            engine.tick();
            ticks += 1;
        }
        // Zero-length segments still take the one tick that passes them.
        prop_assert_eq!(ticks, plan_total);
    }
}
