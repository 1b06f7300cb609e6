use std::time::Duration;

use clap::{Args, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, Interval, MissedTickBehavior};

use ascent_core::duration::format_mmss;
use ascent_core::timer::{Display, SilentCuePlayer};
use ascent_core::{
    Config, CuePlayer, DrillSession, EntryLog, Event, Lifecycle, PatternKind, SessionPlan,
};

use crate::cue::TerminalCuePlayer;

const TICK: Duration = Duration::from_secs(1);

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a drill session in real time (reads controls from stdin)
    Run {
        #[command(flatten)]
        plan: PlanArgs,
        #[command(flatten)]
        labels: LabelArgs,
        /// Do not record the finished session in the journal
        #[arg(long)]
        no_save: bool,
        /// Emit events as JSON lines
        #[arg(long)]
        json: bool,
        /// Suppress terminal cues
        #[arg(long)]
        quiet: bool,
    },
    /// Run a whole session instantly with synthetic ticks
    Simulate {
        #[command(flatten)]
        plan: PlanArgs,
        #[command(flatten)]
        labels: LabelArgs,
        /// Emit events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Print the segment plan as JSON
    Plan {
        #[command(flatten)]
        plan: PlanArgs,
    },
}

/// One-off overrides on top of the `[timer]` config section.
#[derive(Args, Debug, Default, Clone)]
pub struct PlanArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub practice_min: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub practice_sec: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub rest_min: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub rest_sec: Option<i64>,
    /// Number of sets (clamped to 1..=12)
    #[arg(long, allow_negative_numbers = true)]
    pub sets: Option<i64>,
    /// B side minutes; implies a separate B duration
    #[arg(long)]
    pub b_min: Option<i64>,
    /// B side seconds; implies a separate B duration
    #[arg(long)]
    pub b_sec: Option<i64>,
    /// pair, ring or alternating
    #[arg(long)]
    pub pattern: Option<PatternKind>,
}

impl PlanArgs {
    pub fn apply(&self, config: &mut Config) {
        let timer = &mut config.timer;
        if let Some(v) = self.practice_min {
            timer.practice_min = v;
        }
        if let Some(v) = self.practice_sec {
            timer.practice_sec = v;
        }
        if let Some(v) = self.rest_min {
            timer.rest_min = v;
        }
        if let Some(v) = self.rest_sec {
            timer.rest_sec = v;
        }
        if let Some(v) = self.sets {
            timer.sets = v;
        }
        if self.b_min.is_some() || self.b_sec.is_some() {
            timer.separate_b = true;
            timer.b_min = self.b_min.unwrap_or(0);
            timer.b_sec = self.b_sec.unwrap_or(0);
        }
        if let Some(kind) = self.pattern {
            timer.pattern = kind;
            config.custom_pattern = None;
        }
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct LabelArgs {
    /// Practice menu preset id or name
    #[arg(long)]
    pub menu: Option<String>,
    /// Session title (overrides the menu)
    #[arg(long)]
    pub title: Option<String>,
    /// Session note (overrides the menu)
    #[arg(long)]
    pub note: Option<String>,
}

/// Stdin controls for `timer run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Start,
    Pause,
    Next,
    Reset,
    StopAlarm,
    Status,
    Quit,
}

impl Control {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "s" | "start" => Some(Control::Start),
            "p" | "pause" | "resume" | "" => Some(Control::Pause),
            "n" | "next" | "skip" => Some(Control::Next),
            "r" | "reset" => Some(Control::Reset),
            "a" | "alarm" | "stop" => Some(Control::StopAlarm),
            "?" | "status" => Some(Control::Status),
            "q" | "quit" | "exit" => Some(Control::Quit),
            _ => None,
        }
    }
}

fn build_session<P: CuePlayer>(
    plan: &PlanArgs,
    labels: &LabelArgs,
    player: P,
) -> Result<DrillSession<P>, Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    plan.apply(&mut config);
    let mut details = config.session_details(labels.menu.as_deref());
    if let Some(title) = &labels.title {
        details.title = title.clone();
    }
    if let Some(note) = &labels.note {
        details.note = note.clone();
    }
    Ok(DrillSession::new(
        config.plan_config(),
        config.pattern(),
        config.cue_settings(),
        player,
    )
    .with_details(details))
}

/// `Set 1/3  Practice  4:59` style status line.
pub fn render_display(display: &Display) -> String {
    let state = match (display.lifecycle, display.running) {
        (Lifecycle::Setting, _) => " (ready)",
        (Lifecycle::Running, false) => " (paused)",
        (Lifecycle::Finished, _) => " (finished)",
        (Lifecycle::Running, true) => "",
    };
    format!(
        "Set {}/{}  {}  {}{}",
        display.set_index,
        display.set_count,
        display.segment_label,
        format_mmss(display.remaining_secs),
        state
    )
}

fn emit(events: &[Event], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    for event in events {
        if json {
            println!("{}", serde_json::to_string(event)?);
            continue;
        }
        match event {
            Event::SegmentEntered {
                set_index,
                label,
                duration_secs,
                ..
            } => println!("-> set {set_index}: {label} ({})", format_mmss(*duration_secs)),
            Event::TimerPaused { .. } => println!("paused"),
            Event::TimerResumed { .. } => println!("resumed"),
            Event::TimerReset { .. } => println!("reset"),
            Event::SessionFinished { .. } => println!("session finished"),
            Event::SessionSummarized { summary, .. } => println!(
                "{}: {} min practice",
                summary.title, summary.total_practice_minutes
            ),
            _ => {}
        }
    }
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Plan { plan } => {
            let mut config = Config::load()?;
            plan.apply(&mut config);
            let session_plan = SessionPlan::from_config(&config.plan_config(), &config.pattern());
            println!("{}", serde_json::to_string_pretty(&session_plan)?);
        }
        TimerAction::Simulate { plan, labels, json } => {
            let mut session = build_session(&plan, &labels, SilentCuePlayer)?;
            simulate(&mut session, json)?;
        }
        TimerAction::Run {
            plan,
            labels,
            no_save,
            json,
            quiet,
        } => {
            let session = build_session(&plan, &labels, TerminalCuePlayer::new(quiet))?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()?;
            runtime.block_on(drive(session, !no_save, json))?;
        }
    }
    Ok(())
}

/// Drive a session to completion without a wall clock. The cue clock runs in
/// lockstep with the session clock.
fn simulate<P: CuePlayer>(
    session: &mut DrillSession<P>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    emit(&session.start(), json)?;
    let mut ticks: u64 = 0;
    while session.lifecycle() == Lifecycle::Running {
        let mut events = session.tick();
        events.extend(session.cue_tick());
        emit(&events, json)?;
        ticks += 1;
    }
    if !json {
        println!("{ticks} ticks");
    }
    Ok(())
}

fn make_interval(source: Option<u64>) -> Option<Interval> {
    source.map(|_| {
        let mut interval = tokio::time::interval_at(Instant::now() + TICK, TICK);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    })
}

/// A 1 s clock bound to the source identity it was built for.
struct Clock {
    source: Option<u64>,
    interval: Option<Interval>,
}

impl Clock {
    fn new(source: Option<u64>) -> Self {
        Self {
            source,
            interval: make_interval(source),
        }
    }

    /// Rebuild the interval if the identity moved. Returns whether it did.
    fn follow(&mut self, source: Option<u64>) -> bool {
        if source == self.source {
            return false;
        }
        self.source = source;
        self.interval = make_interval(source);
        true
    }

    fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    async fn tick(&mut self) {
        match &mut self.interval {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

/// Owner loop: the session clock, the cue clock and stdin controls are
/// multiplexed onto one task, so every call into the session is serialized.
async fn drive<P: CuePlayer>(
    mut session: DrillSession<P>,
    save: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let start_events = session.start();
    emit(&start_events, json)?;

    let mut ticker = Clock::new(session.tick_source());
    let mut cue_clock = Clock::new(session.cue_timer_source());

    loop {
        let events = tokio::select! {
            _ = ticker.tick() => {
                let events = session.tick();
                if !json {
                    println!("{}", render_display(&session.display()));
                }
                events
            }
            _ = cue_clock.tick() => session.cue_tick(),
            line = lines.next_line(), if stdin_open => {
                match line? {
                    None => {
                        stdin_open = false;
                        Vec::new()
                    }
                    Some(line) => match Control::parse(&line) {
                        Some(Control::Start) => session.start(),
                        Some(Control::Pause) => session.toggle_pause(),
                        Some(Control::Next) => session.skip(),
                        Some(Control::Reset) => session.reset(),
                        Some(Control::StopAlarm) => session.stop_alarm(),
                        Some(Control::Status) => {
                            if json {
                                vec![session.engine().snapshot()]
                            } else {
                                println!("{}", render_display(&session.display()));
                                Vec::new()
                            }
                        }
                        Some(Control::Quit) => {
                            session.reset();
                            break;
                        }
                        None => {
                            eprintln!(
                                "controls: s(tart) p(ause) n(ext) r(eset) a(larm off) ? q(uit)"
                            );
                            Vec::new()
                        }
                    },
                }
            }
        };
        emit(&events, json)?;

        ticker.follow(session.tick_source());
        cue_clock.follow(session.cue_timer_source());

        if let Some(summary) = session.take_summary() {
            if save {
                let entry = EntryLog::open()?.record(&summary)?;
                if json {
                    println!("{}", serde_json::to_string(&entry)?);
                } else {
                    println!("saved entry {}", entry.id);
                }
            }
            break;
        }

        if !stdin_open && !ticker.is_armed() {
            // Paused or reset with no controls left.
            break;
        }
    }
    Ok(())
}
