//! Presentation-facing events: ticks, completions, penalties and warnings.

use crate::models::IntervalKind;
use crate::timer::format_time;
use chrono::{DateTime, Local};
use std::sync::mpsc::Sender;
use tracing::{debug, info, warn};

/// Snapshot for lock-screen style status surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveStatus {
    pub timer_name: &'static str,
    pub end_time: DateTime<Local>,
    pub progress: f64,
}

/// Receives engine events. Calls are fire-and-forget.
pub trait StatusSink {
    fn on_tick(&mut self, remaining_secs: u32, progress: f64);
    fn on_completed(&mut self, kind: IntervalKind);
    fn on_penalty(&mut self);
    fn on_warning(&mut self);

    /// `Some` when a countdown starts, `None` when it stops.
    fn on_live_status(&mut self, _status: Option<LiveStatus>) {}
}

/// Owned form of every sink callback.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    Tick { remaining_secs: u32, progress: f64 },
    Completed(IntervalKind),
    Penalty,
    Warning,
    LiveStatus(Option<LiveStatus>),
}

/// Forwards every event into a channel.
pub struct ChannelSink {
    tx: Sender<StatusEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<StatusEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: StatusEvent) {
        // A closed receiver only means nobody is watching.
        let _ = self.tx.send(event);
    }
}

impl StatusSink for ChannelSink {
    fn on_tick(&mut self, remaining_secs: u32, progress: f64) {
        self.send(StatusEvent::Tick {
            remaining_secs,
            progress,
        });
    }

    fn on_completed(&mut self, kind: IntervalKind) {
        self.send(StatusEvent::Completed(kind));
    }

    fn on_penalty(&mut self) {
        self.send(StatusEvent::Penalty);
    }

    fn on_warning(&mut self) {
        self.send(StatusEvent::Warning);
    }

    fn on_live_status(&mut self, status: Option<LiveStatus>) {
        self.send(StatusEvent::LiveStatus(status));
    }
}

/// Logs events, for hosts without a UI.
#[derive(Debug, Default)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn on_tick(&mut self, remaining_secs: u32, progress: f64) {
        debug!(remaining = %format_time(remaining_secs), progress, "tick");
    }

    fn on_completed(&mut self, kind: IntervalKind) {
        info!(interval = kind.display_name(), "interval complete");
    }

    fn on_penalty(&mut self) {
        warn!("strict mode: away too long, focus interval cancelled");
    }

    fn on_warning(&mut self) {
        warn!("strict mode: return within 10 seconds or the focus interval is cancelled");
    }

    fn on_live_status(&mut self, status: Option<LiveStatus>) {
        match status {
            Some(status) => debug!(
                timer = status.timer_name,
                ends_at = %status.end_time.format("%H:%M:%S"),
                "live status started"
            ),
            None => debug!("live status ended"),
        }
    }
}
