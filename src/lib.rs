//! Studytimer - the engine behind a Pomodoro study timer.
//!
//! Runs focus and break intervals, credits finished focus intervals to
//! goals, keeps a study history and enforces an optional strict mode that
//! cancels a focus interval when the user leaves the app for too long.
//! Rendering, notifications and storage belong to the host; the engine talks
//! to them through [`notifications::StatusSink`],
//! [`timer::TickSource`] and [`persistence::KeyValueStore`].

pub mod app;
pub mod background;
pub mod clock;
pub mod cycle;
pub mod engine;
pub mod event;
pub mod goals;
pub mod models;
pub mod notifications;
pub mod persistence;
pub mod sessions;
pub mod timer;

#[cfg(test)]
mod test_support;

pub use app::{App, AppError};
pub use engine::TimerEngine;
pub use event::{EventResult, HostEvent};
pub use models::{
    DailyStats, Goal, IntervalKind, Settings, StudySession, TimerStatus, ValidationError,
};
