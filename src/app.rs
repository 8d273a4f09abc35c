//! Composition root: wires storage, ticker, sink and clock into an engine.

use crate::clock::{Clock, SystemClock};
use crate::engine::TimerEngine;
use crate::event::{handle_event, EventResult, HostEvent};
use crate::notifications::{StatusSink, TracingSink};
use crate::persistence::{Database, DatabaseError, KeyValueStore};
use crate::timer::{ThreadTicker, TimerMessage};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Installs a `tracing` subscriber honouring `RUST_LOG` (default `info`).
/// Safe to call more than once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Engine plus the channel its tick threads post into.
pub struct App {
    pub engine: TimerEngine,
    timer_rx: Receiver<TimerMessage>,
}

impl App {
    /// Opens the on-disk database and logs status events.
    pub fn new() -> Result<Self, AppError> {
        let db = Database::new()?;
        Ok(Self::with_store(Rc::new(db), Box::new(TracingSink)))
    }

    /// Creates a new app over a custom store and sink.
    pub fn with_store(store: Rc<dyn KeyValueStore>, sink: Box<dyn StatusSink>) -> Self {
        let (tx, timer_rx) = mpsc::channel();
        let clock: Rc<dyn Clock> = Rc::new(SystemClock);
        let engine = TimerEngine::new(store, clock, Box::new(ThreadTicker::new(tx)), sink);
        Self { engine, timer_rx }
    }

    pub fn dispatch(&mut self, event: HostEvent) -> EventResult {
        handle_event(&mut self.engine, event)
    }

    /// Processes all pending timer messages.
    pub fn pump(&mut self) -> EventResult {
        let mut result = EventResult::Continue;
        while let Ok(msg) = self.timer_rx.try_recv() {
            if self.dispatch(HostEvent::Timer(msg)) == EventResult::StateChanged {
                result = EventResult::StateChanged;
            }
        }
        result
    }
}
