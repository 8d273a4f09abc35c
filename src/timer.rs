//! Scheduled tick source and time formatting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Identifies one armed tick stream. Ticks carrying an older token are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickToken(pub u64);

/// Message sent from a timer thread to the host's event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMessage {
    /// One second elapsed on the stream identified by the token.
    Tick(TickToken),
    /// The strict-mode warning delay elapsed.
    Warning,
}

/// A cancellable one-second tick stream plus a one-shot warning timer.
///
/// Arming always cancels whatever stream was armed before.
pub trait TickSource {
    fn arm(&mut self) -> TickToken;
    fn cancel(&mut self);
    fn schedule_warning(&mut self, delay: Duration);
    fn cancel_warning(&mut self);
}

/// Tick source backed by sleeper threads that post into a channel.
pub struct ThreadTicker {
    tx: Sender<TimerMessage>,
    tick_generation: Arc<AtomicU64>,
    warning_generation: Arc<AtomicU64>,
    interval: Duration,
}

impl ThreadTicker {
    pub fn new(tx: Sender<TimerMessage>) -> Self {
        Self::with_interval(tx, Duration::from_secs(1))
    }

    /// Ticks every `interval` instead of every second.
    pub fn with_interval(tx: Sender<TimerMessage>, interval: Duration) -> Self {
        Self {
            tx,
            tick_generation: Arc::new(AtomicU64::new(0)),
            warning_generation: Arc::new(AtomicU64::new(0)),
            interval,
        }
    }
}

impl TickSource for ThreadTicker {
    fn arm(&mut self) -> TickToken {
        let generation = self.tick_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.tick_generation);
        let tx = self.tx.clone();
        let interval = self.interval;

        thread::spawn(move || loop {
            thread::sleep(interval);
            if current.load(Ordering::SeqCst) != generation {
                break;
            }
            if tx.send(TimerMessage::Tick(TickToken(generation))).is_err() {
                break;
            }
        });

        TickToken(generation)
    }

    fn cancel(&mut self) {
        self.tick_generation.fetch_add(1, Ordering::SeqCst);
    }

    fn schedule_warning(&mut self, delay: Duration) {
        let generation = self.warning_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.warning_generation);
        let tx = self.tx.clone();

        thread::spawn(move || {
            thread::sleep(delay);
            if current.load(Ordering::SeqCst) == generation {
                let _ = tx.send(TimerMessage::Warning);
            }
        });
    }

    fn cancel_warning(&mut self) {
        self.warning_generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for ThreadTicker {
    fn drop(&mut self) {
        self.cancel();
        self.cancel_warning();
    }
}

/// Formats time in MM:SS format.
pub fn format_time(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Formats a study total as "1h 05m" or "25 min".
pub fn format_study_time(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else {
        format!("{} min", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(59), "00:59");
        assert_eq!(format_time(60), "01:00");
        assert_eq!(format_time(125), "02:05");
        assert_eq!(format_time(1500), "25:00");
        assert_eq!(format_time(3599), "59:59");
    }

    #[test]
    fn test_format_study_time() {
        assert_eq!(format_study_time(0), "0 min");
        assert_eq!(format_study_time(1500), "25 min");
        assert_eq!(format_study_time(3600), "1h 00m");
        assert_eq!(format_study_time(3900), "1h 05m");
        assert_eq!(format_study_time(10 * 3600 + 59 * 60 + 59), "10h 59m");
    }

    #[test]
    fn test_thread_ticker_sends_ticks_with_token() {
        let (tx, rx) = mpsc::channel();
        let mut ticker = ThreadTicker::with_interval(tx, Duration::from_millis(10));
        let token = ticker.arm();

        let msg = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(msg, TimerMessage::Tick(token));
        ticker.cancel();
    }

    #[test]
    fn test_thread_ticker_rearm_changes_token() {
        let (tx, _rx) = mpsc::channel();
        let mut ticker = ThreadTicker::with_interval(tx, Duration::from_millis(10));
        let first = ticker.arm();
        let second = ticker.arm();
        assert_ne!(first, second);
    }

    #[test]
    fn test_cancelled_warning_never_fires() {
        let (tx, rx) = mpsc::channel();
        let mut ticker = ThreadTicker::new(tx);
        ticker.schedule_warning(Duration::from_millis(20));
        ticker.cancel_warning();
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn test_warning_fires_after_delay() {
        let (tx, rx) = mpsc::channel();
        let mut ticker = ThreadTicker::new(tx);
        ticker.schedule_warning(Duration::from_millis(10));
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            TimerMessage::Warning
        );
    }
}
