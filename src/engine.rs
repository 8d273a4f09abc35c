//! Timer engine: the interval state machine and session accounting.

use crate::clock::Clock;
use crate::cycle;
use crate::goals::GoalLedger;
use crate::models::{
    DailyStats, IntervalKind, Settings, TimerStatus, BREAK_LABEL, STUDY_LABEL,
};
use crate::notifications::{LiveStatus, StatusSink};
use crate::persistence::{self, KeyValueStore};
use crate::sessions::SessionLog;
use crate::timer::{TickSource, TickToken};
use chrono::{DateTime, Duration, Local};
use std::rc::Rc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Focus intervals abandoned before this many seconds are not logged.
pub const MIN_LOGGED_SECS: u32 = 15;

/// Recorded when the host suspends while the timer runs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Suspension {
    pub(crate) at: DateTime<Local>,
    /// Strict mode was on and a focus interval was running.
    pub(crate) strict: bool,
}

/// Owns the countdown, the goal ledger and the session log.
///
/// All calls are expected from a single thread, in event order. The tick
/// source and the host lifecycle hooks are the only drivers besides user
/// actions.
pub struct TimerEngine {
    settings: Settings,
    goals: GoalLedger,
    sessions: SessionLog,
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    pub(crate) ticker: Box<dyn TickSource>,
    pub(crate) sink: Box<dyn StatusSink>,

    kind: IntervalKind,
    total_secs: u32,
    remaining_secs: u32,
    running: bool,
    selected_goal: Option<Uuid>,
    cycle_count: u32,
    active_tick: Option<TickToken>,
    live_status: bool,
    pub(crate) suspension: Option<Suspension>,
}

impl TimerEngine {
    /// Loads settings, ledgers and the cycle counter from `store` and
    /// prepares an idle focus interval.
    pub fn new(
        store: Rc<dyn KeyValueStore>,
        clock: Rc<dyn Clock>,
        ticker: Box<dyn TickSource>,
        sink: Box<dyn StatusSink>,
    ) -> Self {
        let settings = persistence::load_settings(store.as_ref());
        let goals = GoalLedger::load(Rc::clone(&store));
        let sessions = SessionLog::load(Rc::clone(&store));
        let mut cycle_count = persistence::load_cycle_count(store.as_ref());
        if cycle_count >= settings.pomodoros_before_long_break {
            warn!(cycle_count, "stored cycle count out of range, clamping");
            cycle_count = settings.pomodoros_before_long_break.saturating_sub(1);
        }
        let total_secs = settings.seconds_for(IntervalKind::Focus);

        Self {
            settings,
            goals,
            sessions,
            store,
            clock,
            ticker,
            sink,
            kind: IntervalKind::Focus,
            total_secs,
            remaining_secs: total_secs,
            running: false,
            selected_goal: None,
            cycle_count,
            active_tick: None,
            live_status: false,
            suspension: None,
        }
    }

    pub fn kind(&self) -> IntervalKind {
        self.kind
    }

    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.total_secs.saturating_sub(self.remaining_secs)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn status(&self) -> TimerStatus {
        if self.running {
            TimerStatus::Running
        } else if self.remaining_secs == self.total_secs {
            TimerStatus::Idle
        } else {
            TimerStatus::Paused
        }
    }

    /// Fraction of the interval already elapsed, in [0, 1].
    pub fn progress(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        (f64::from(self.elapsed_secs()) / f64::from(self.total_secs)).clamp(0.0, 1.0)
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    pub fn selected_goal(&self) -> Option<Uuid> {
        self.selected_goal
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn goals(&self) -> &GoalLedger {
        &self.goals
    }

    pub fn goals_mut(&mut self) -> &mut GoalLedger {
        &mut self.goals
    }

    pub fn sessions(&self) -> &SessionLog {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut SessionLog {
        &mut self.sessions
    }

    pub(crate) fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    /// Statistics for the clock's current day.
    pub fn today_stats(&self) -> DailyStats {
        let focus_secs = self.settings.seconds_for(IntervalKind::Focus);
        self.sessions
            .daily_stats(self.now().date_naive(), focus_secs)
    }

    /// Updates settings and saves every value. An interval that has not been
    /// started picks up its new duration straight away.
    pub fn update_settings<F>(&mut self, updater: F)
    where
        F: FnOnce(&mut Settings),
    {
        updater(&mut self.settings);
        self.settings = self.settings.clone().sanitized();
        if let Err(e) = persistence::save_settings(self.store.as_ref(), &self.settings) {
            warn!(error = %e, "failed to save settings");
        }
        if self.status() == TimerStatus::Idle {
            self.total_secs = self.settings.seconds_for(self.kind);
            self.remaining_secs = self.total_secs;
        }
    }

    /// Attributes the current focus interval to a goal. Only existing goals
    /// whose target is not yet met can be picked, and only while in focus.
    /// `None` clears the selection.
    pub fn select_goal(&mut self, goal: Option<Uuid>) -> bool {
        match goal {
            None => {
                self.selected_goal = None;
                true
            }
            Some(id)
                if self.kind.is_focus()
                    && self.goals.get(id).is_some_and(|g| !g.is_pomodoros_met()) =>
            {
                self.selected_goal = Some(id);
                true
            }
            Some(_) => false,
        }
    }

    /// Switches to a fresh interval of `kind`. A focus interval in progress is
    /// logged first when `log_interrupted` is set.
    pub fn select_mode(&mut self, kind: IntervalKind, log_interrupted: bool) {
        if log_interrupted {
            self.log_interrupted();
        }
        self.stop_ticking();
        self.end_live_status();

        self.kind = kind;
        self.total_secs = self.settings.seconds_for(kind);
        self.remaining_secs = self.total_secs;
        if !kind.is_focus() {
            self.selected_goal = None;
        }
        info!(interval = kind.display_name(), total_secs = self.total_secs, "mode selected");
    }

    pub fn start(&mut self) {
        if self.remaining_secs == 0 {
            self.select_mode(IntervalKind::Focus, false);
        }
        if self.running {
            return;
        }

        self.running = true;
        self.active_tick = Some(self.ticker.arm());

        let end_time = self.now() + Duration::seconds(i64::from(self.remaining_secs));
        self.sink.on_live_status(Some(LiveStatus {
            timer_name: self.kind.display_name(),
            end_time,
            progress: self.progress(),
        }));
        self.live_status = true;
        info!(
            interval = self.kind.display_name(),
            remaining_secs = self.remaining_secs,
            "timer started"
        );
    }

    /// Stops counting. Nothing is logged.
    pub fn pause(&mut self) {
        if !self.running {
            return;
        }
        self.stop_ticking();
        info!(remaining_secs = self.remaining_secs, "timer paused");
    }

    /// Returns to a fresh focus interval, logging an abandoned focus interval
    /// first when `log_if_interrupted` is set.
    pub fn reset(&mut self, log_if_interrupted: bool) {
        if log_if_interrupted {
            self.log_interrupted();
        }
        self.stop_ticking();
        self.end_live_status();

        self.kind = IntervalKind::Focus;
        self.total_secs = self.settings.seconds_for(IntervalKind::Focus);
        self.remaining_secs = self.total_secs;
        info!("timer reset");
    }

    /// Advances the timer by one second.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.complete_interval();
        } else {
            self.sink.on_tick(self.remaining_secs, self.progress());
        }
    }

    /// Advances the timer for a tick delivered by the tick source. Ticks from
    /// a stream that has since been cancelled are dropped.
    pub fn handle_tick(&mut self, token: TickToken) {
        if self.active_tick == Some(token) {
            self.tick();
        } else {
            debug!(?token, "dropping stale tick");
        }
    }

    pub(crate) fn complete_interval(&mut self) {
        self.stop_ticking();
        self.end_live_status();

        let completed = self.kind;
        let description = self.session_label();
        self.record_session(self.total_secs, &description);

        if completed.is_focus() {
            if let Some(goal) = self.selected_goal {
                self.goals.increment(goal);
            }
        }

        let step = cycle::next_interval(
            completed,
            self.cycle_count,
            self.settings.pomodoros_before_long_break,
        );
        self.set_cycle_count(step.cycle_count);
        info!(
            completed = completed.display_name(),
            next = step.next.display_name(),
            cycle_count = step.cycle_count,
            "interval complete"
        );
        self.select_mode(step.next, false);

        self.sink.on_completed(completed);
    }

    /// Logs the elapsed part of an abandoned focus interval. Goal progress is
    /// only credited for full completions.
    fn log_interrupted(&mut self) {
        if !self.kind.is_focus() {
            return;
        }
        let elapsed = self.elapsed_secs();
        if elapsed < MIN_LOGGED_SECS {
            debug!(elapsed, "interrupted interval too short to log");
            return;
        }
        let description = self.session_label();
        self.record_session(elapsed, &description);
    }

    fn session_label(&self) -> String {
        if let Some(goal) = self.selected_goal.and_then(|id| self.goals.get(id)) {
            return goal.title.clone();
        }
        if self.kind.is_focus() {
            STUDY_LABEL.to_string()
        } else {
            BREAK_LABEL.to_string()
        }
    }

    fn record_session(&mut self, duration_secs: u32, description: &str) {
        let now = self.now();
        if let Err(e) = self.sessions.record(duration_secs, description, now) {
            warn!(error = %e, "session not recorded");
        }
    }

    fn set_cycle_count(&mut self, count: u32) {
        self.cycle_count = count;
        if let Err(e) = persistence::save_cycle_count(self.store.as_ref(), count) {
            warn!(error = %e, "failed to save cycle count");
        }
    }

    pub(crate) fn stop_ticking(&mut self) {
        if self.active_tick.take().is_some() {
            self.ticker.cancel();
        }
        self.running = false;
    }

    /// Disarms the tick stream but leaves the interval marked as running.
    pub(crate) fn suspend_ticking(&mut self) {
        if self.active_tick.take().is_some() {
            self.ticker.cancel();
        }
    }

    pub(crate) fn set_remaining_secs(&mut self, remaining_secs: u32) {
        self.remaining_secs = remaining_secs.min(self.total_secs);
    }

    fn end_live_status(&mut self) {
        if self.live_status {
            self.live_status = false;
            self.sink.on_live_status(None);
        }
    }
}
