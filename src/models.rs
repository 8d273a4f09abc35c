//! Data models for the study timer.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Label used for sessions that are not attributed to a goal.
pub const STUDY_LABEL: &str = "Study";
/// Label used for completed breaks.
pub const BREAK_LABEL: &str = "Break";

/// Rejected user input. The operation that returned it had no effect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title must not be empty")]
    EmptyTitle,
    #[error("Pomodoro target must be at least 1 (got {0})")]
    InvalidTarget(u32),
    #[error("Session duration must be at least 1 second (got {0})")]
    InvalidDuration(u32),
}

/// The three kinds of interval the timer cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IntervalKind {
    #[default]
    Focus,
    ShortBreak,
    LongBreak,
}

impl IntervalKind {
    pub fn is_focus(self) -> bool {
        matches!(self, Self::Focus)
    }

    /// Human readable name, as shown on the live status surface.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Focus => "Pomodoro",
            Self::ShortBreak => "Short Break",
            Self::LongBreak => "Long Break",
        }
    }
}

/// Observable state of the timer engine.
///
/// `Completed` never shows up here: completion is handled within the tick
/// that reaches zero and the engine moves straight on to the next interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    /// A fresh interval that has not been started.
    Idle,
    /// Counting down.
    Running,
    /// Stopped part way through an interval.
    Paused,
}

/// User-configurable settings for the timer.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Duration of a focus interval in minutes.
    pub focus_mins: u32,
    /// Duration of a short break in minutes.
    pub short_break_mins: u32,
    /// Duration of a long break in minutes.
    pub long_break_mins: u32,
    /// Number of completed focus intervals before a long break.
    pub pomodoros_before_long_break: u32,
    /// Penalise leaving the app during a running focus interval.
    pub strict_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_mins: 25,
            short_break_mins: 5,
            long_break_mins: 15,
            pomodoros_before_long_break: 4,
            strict_mode: false,
        }
    }
}

impl Settings {
    /// Configured length of an interval in minutes.
    pub fn minutes_for(&self, kind: IntervalKind) -> u32 {
        match kind {
            IntervalKind::Focus => self.focus_mins,
            IntervalKind::ShortBreak => self.short_break_mins,
            IntervalKind::LongBreak => self.long_break_mins,
        }
    }

    /// Configured length of an interval in seconds.
    pub fn seconds_for(&self, kind: IntervalKind) -> u32 {
        self.minutes_for(kind).saturating_mul(60)
    }

    /// Replaces zero values with their defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let or_default = |value: u32, fallback: u32| if value == 0 { fallback } else { value };
        Self {
            focus_mins: or_default(self.focus_mins, defaults.focus_mins),
            short_break_mins: or_default(self.short_break_mins, defaults.short_break_mins),
            long_break_mins: or_default(self.long_break_mins, defaults.long_break_mins),
            pomodoros_before_long_break: or_default(
                self.pomodoros_before_long_break,
                defaults.pomodoros_before_long_break,
            ),
            strict_mode: self.strict_mode,
        }
    }
}

/// A goal measured in completed focus intervals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub title: String,
    pub is_completed: bool,
    pub pomodoros_target: u32,
    pub pomodoros_completed: u32,
}

impl Goal {
    pub fn new(title: &str, target: u32) -> Result<Self, ValidationError> {
        let title = validate_goal(title, target)?;
        Ok(Self {
            id: Uuid::new_v4(),
            title,
            is_completed: false,
            pomodoros_target: target,
            pomodoros_completed: 0,
        })
    }

    /// True once the completed count has reached the target.
    pub fn is_pomodoros_met(&self) -> bool {
        self.pomodoros_completed >= self.pomodoros_target
    }
}

/// Checks goal input and returns the trimmed title.
pub(crate) fn validate_goal(title: &str, target: u32) -> Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if target < 1 {
        return Err(ValidationError::InvalidTarget(target));
    }
    Ok(title.to_string())
}

/// One entry in the study history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: Uuid,
    pub date: DateTime<Local>,
    pub duration_in_seconds: u32,
    pub activity_description: String,
}

impl StudySession {
    pub fn new(
        date: DateTime<Local>,
        duration_in_seconds: u32,
        activity_description: &str,
    ) -> Result<Self, ValidationError> {
        validate_duration(duration_in_seconds)?;
        Ok(Self {
            id: Uuid::new_v4(),
            date,
            duration_in_seconds,
            activity_description: activity_description.to_string(),
        })
    }

    /// Local calendar day the session was logged on.
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

pub(crate) fn validate_duration(duration_in_seconds: u32) -> Result<(), ValidationError> {
    if duration_in_seconds < 1 {
        return Err(ValidationError::InvalidDuration(duration_in_seconds));
    }
    Ok(())
}

/// Aggregated statistics for a single calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyStats {
    pub date: NaiveDate,
    /// Sum of every session duration logged that day.
    pub total_seconds: u64,
    /// Sessions that lasted exactly one full focus interval.
    pub full_focus_sessions: u32,
}

impl DailyStats {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            total_seconds: 0,
            full_focus_sessions: 0,
        }
    }
}
