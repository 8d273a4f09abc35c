//! Session log: study history, most recent first.

use crate::models::{validate_duration, DailyStats, StudySession, ValidationError};
use crate::persistence::{self, KeyValueStore};
use chrono::{DateTime, Local, NaiveDate};
use std::rc::Rc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Owns the study history. The collection is re-sorted descending by date
/// and saved in full after every mutation.
pub struct SessionLog {
    sessions: Vec<StudySession>,
    store: Rc<dyn KeyValueStore>,
}

impl SessionLog {
    pub fn load(store: Rc<dyn KeyValueStore>) -> Self {
        let mut log = Self {
            sessions: persistence::load_sessions(store.as_ref()),
            store,
        };
        log.sort();
        debug!(count = log.sessions.len(), "loaded study sessions");
        log
    }

    pub fn sessions(&self) -> &[StudySession] {
        &self.sessions
    }

    pub fn get(&self, id: Uuid) -> Option<&StudySession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn record(
        &mut self,
        duration_in_seconds: u32,
        description: &str,
        date: DateTime<Local>,
    ) -> Result<Uuid, ValidationError> {
        let session = StudySession::new(date, duration_in_seconds, description)?;
        let id = session.id;
        info!(%id, duration_in_seconds, description, "study session recorded");
        self.sessions.push(session);
        self.commit();
        Ok(id)
    }

    pub fn update(
        &mut self,
        id: Uuid,
        date: DateTime<Local>,
        duration_in_seconds: u32,
        description: &str,
    ) -> Result<bool, ValidationError> {
        validate_duration(duration_in_seconds)?;
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) else {
            return Ok(false);
        };
        session.date = date;
        session.duration_in_seconds = duration_in_seconds;
        session.activity_description = description.to_string();
        self.commit();
        Ok(true)
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        self.delete_many(&[id]) == 1
    }

    /// Removes every listed session, returning how many were found.
    pub fn delete_many(&mut self, ids: &[Uuid]) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|s| !ids.contains(&s.id));
        let removed = before - self.sessions.len();
        if removed > 0 {
            self.commit();
        }
        removed
    }

    pub fn delete_all(&mut self) {
        info!(count = self.sessions.len(), "clearing study history");
        self.sessions.clear();
        self.commit();
    }

    /// Sessions logged on the given local calendar day.
    pub fn sessions_on(&self, day: NaiveDate) -> impl Iterator<Item = &StudySession> {
        self.sessions.iter().filter(move |s| s.day() == day)
    }

    /// Totals for `day`. A session counts as a full pomodoro when it lasted
    /// exactly `focus_secs`.
    pub fn daily_stats(&self, day: NaiveDate, focus_secs: u32) -> DailyStats {
        self.sessions_on(day)
            .fold(DailyStats::new(day), |mut stats, session| {
                stats.total_seconds += u64::from(session.duration_in_seconds);
                if session.duration_in_seconds == focus_secs {
                    stats.full_focus_sessions += 1;
                }
                stats
            })
    }

    fn sort(&mut self) {
        self.sessions.sort_by(|a, b| b.date.cmp(&a.date));
    }

    fn commit(&mut self) {
        self.sort();
        if let Err(e) = persistence::save_sessions(self.store.as_ref(), &self.sessions) {
            warn!(error = %e, "failed to save study sessions");
        }
    }
}
