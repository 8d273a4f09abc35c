//! Host event handling.

use crate::engine::TimerEngine;
use crate::models::IntervalKind;
use crate::timer::TimerMessage;
use uuid::Uuid;

/// Everything a host shell can feed into the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    Start,
    Pause,
    /// Stop button: abandons the interval, logging focus time past the floor.
    Reset,
    /// Mode buttons: switch interval, logging an abandoned focus interval.
    SelectMode(IntervalKind),
    SelectGoal(Option<Uuid>),
    Suspend,
    Resume,
    Timer(TimerMessage),
}

/// Result of handling a host event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Nothing visible changed.
    Continue,
    /// State changed, UI needs update.
    StateChanged,
}

/// Applies a host event to the engine.
pub fn handle_event(engine: &mut TimerEngine, event: HostEvent) -> EventResult {
    match event {
        HostEvent::Start => {
            engine.start();
            EventResult::StateChanged
        }
        HostEvent::Pause => {
            engine.pause();
            EventResult::StateChanged
        }
        HostEvent::Reset => {
            engine.reset(true);
            EventResult::StateChanged
        }
        HostEvent::SelectMode(kind) => {
            engine.select_mode(kind, true);
            EventResult::StateChanged
        }
        HostEvent::SelectGoal(goal) => {
            if engine.select_goal(goal) {
                EventResult::StateChanged
            } else {
                EventResult::Continue
            }
        }
        HostEvent::Suspend => {
            engine.on_suspend();
            EventResult::Continue
        }
        HostEvent::Resume => {
            let before = (engine.kind(), engine.remaining_secs(), engine.is_running());
            engine.on_resume();
            let after = (engine.kind(), engine.remaining_secs(), engine.is_running());
            if before == after {
                EventResult::Continue
            } else {
                EventResult::StateChanged
            }
        }
        HostEvent::Timer(TimerMessage::Tick(token)) => {
            engine.handle_tick(token);
            EventResult::StateChanged
        }
        HostEvent::Timer(TimerMessage::Warning) => {
            engine.handle_warning();
            EventResult::Continue
        }
    }
}
