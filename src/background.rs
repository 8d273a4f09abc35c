//! Suspend/resume reconciliation and the strict-mode guard.

use crate::engine::{Suspension, TimerEngine};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Longest absence tolerated in strict mode, in milliseconds.
pub const GRACE_PERIOD_MS: i64 = 10_000;

/// Delay before the strict-mode warning fires after suspension.
pub const WARNING_DELAY: Duration = Duration::from_secs(2);

impl TimerEngine {
    /// Host is going to the background.
    ///
    /// A running interval remembers when it was suspended and stops its
    /// tick stream; the time away is settled in [`TimerEngine::on_resume`].
    /// With strict mode on during focus, a warning is armed as well.
    pub fn on_suspend(&mut self) {
        if !self.is_running() {
            return;
        }

        let strict = self.settings().strict_mode && self.kind().is_focus();
        if self.suspension.is_none() {
            self.suspension = Some(Suspension {
                at: self.now(),
                strict,
            });
            debug!(strict, remaining_secs = self.remaining_secs(), "suspended while running");
        }
        self.suspend_ticking();

        if strict {
            self.ticker.cancel_warning();
            self.ticker.schedule_warning(WARNING_DELAY);
        }
    }

    /// Host is back in the foreground.
    ///
    /// Strict absences longer than the grace period forfeit the interval
    /// without logging it. Otherwise the time away is deducted, which may
    /// complete the interval.
    pub fn on_resume(&mut self) {
        self.ticker.cancel_warning();

        let Some(suspension) = self.suspension.take() else {
            return;
        };

        let away_ms = (self.now() - suspension.at).num_milliseconds().max(0);

        if suspension.strict && away_ms > GRACE_PERIOD_MS {
            warn!(away_ms, "strict mode violated, resetting focus interval");
            self.reset(false);
            self.sink.on_penalty();
            return;
        }

        if !self.is_running() {
            return;
        }

        self.stop_ticking();
        let away_secs = u32::try_from((away_ms + 999) / 1000).unwrap_or(u32::MAX);
        info!(away_secs, remaining_secs = self.remaining_secs(), "resumed, catching up");

        if away_secs >= self.remaining_secs() {
            self.set_remaining_secs(0);
            self.complete_interval();
        } else {
            self.set_remaining_secs(self.remaining_secs() - away_secs);
            self.start();
        }
    }

    /// Delivers the scheduled strict-mode warning, unless the host has come
    /// back in the meantime.
    pub fn handle_warning(&mut self) {
        if matches!(self.suspension, Some(Suspension { strict: true, .. })) {
            self.sink.on_warning();
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspension.is_some()
    }
}
