//! Shared fixtures for engine tests.

use crate::clock::{Clock, ManualClock};
use crate::engine::TimerEngine;
use crate::models::{IntervalKind, Settings};
use crate::notifications::{ChannelSink, StatusEvent};
use crate::persistence::{self, KeyValueStore, MemoryStore};
use crate::timer::{TickSource, TickToken};
use chrono::{Local, TimeZone};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

/// What the engine asked of its tick source.
#[derive(Debug, Default)]
pub struct TickerLog {
    pub armed: u32,
    pub cancelled: u32,
    pub warnings_scheduled: u32,
    pub warnings_cancelled: u32,
    pub warning_pending: bool,
    pub last_warning_delay: Option<Duration>,
    pub last_token: Option<TickToken>,
}

/// Tick source that never fires on its own; tests call `tick()` directly.
pub struct FakeTicker {
    log: Rc<RefCell<TickerLog>>,
}

impl TickSource for FakeTicker {
    fn arm(&mut self) -> TickToken {
        let mut log = self.log.borrow_mut();
        log.armed += 1;
        let token = TickToken(u64::from(log.armed));
        log.last_token = Some(token);
        token
    }

    fn cancel(&mut self) {
        self.log.borrow_mut().cancelled += 1;
    }

    fn schedule_warning(&mut self, delay: Duration) {
        let mut log = self.log.borrow_mut();
        log.warnings_scheduled += 1;
        log.warning_pending = true;
        log.last_warning_delay = Some(delay);
    }

    fn cancel_warning(&mut self) {
        let mut log = self.log.borrow_mut();
        log.warnings_cancelled += 1;
        log.warning_pending = false;
    }
}

pub struct Harness {
    pub engine: TimerEngine,
    pub clock: Rc<ManualClock>,
    pub store: Rc<MemoryStore>,
    pub ticker: Rc<RefCell<TickerLog>>,
    pub events: Receiver<StatusEvent>,
}

impl Harness {
    fn build(store: Rc<MemoryStore>, clock: Rc<ManualClock>) -> Self {
        let ticker = Rc::new(RefCell::new(TickerLog::default()));
        let (tx, events) = mpsc::channel();
        let engine = TimerEngine::new(
            Rc::clone(&store) as Rc<dyn KeyValueStore>,
            Rc::clone(&clock) as Rc<dyn Clock>,
            Box::new(FakeTicker {
                log: Rc::clone(&ticker),
            }),
            Box::new(ChannelSink::new(tx)),
        );
        Self {
            engine,
            clock,
            store,
            ticker,
            events,
        }
    }

    /// A second engine over the same store, as after a process restart.
    pub fn reopen(other: &Harness) -> Self {
        Self::build(Rc::clone(&other.store), Rc::clone(&other.clock))
    }

    pub fn drain(&self) -> Vec<StatusEvent> {
        self.events.try_iter().collect()
    }
}

/// Engine over an empty goal list and the given settings.
pub fn harness(settings: Settings) -> Harness {
    let store = Rc::new(MemoryStore::new());
    persistence::save_settings(store.as_ref(), &settings).unwrap();
    persistence::save_goals(store.as_ref(), &[]).unwrap();

    let start = Local.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
    Harness::build(store, Rc::new(ManualClock::new(start)))
}

pub fn ticks(engine: &mut TimerEngine, n: u32) {
    for _ in 0..n {
        engine.tick();
    }
}

pub fn completions(events: &[StatusEvent]) -> Vec<IntervalKind> {
    events
        .iter()
        .filter_map(|e| match e {
            StatusEvent::Completed(kind) => Some(*kind),
            _ => None,
        })
        .collect()
}
