//! Test doubles shared by unit and integration tests.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use tempfile::TempDir;

use crate::domain::ports::{Notice, NoticeLevel, Notifier};
use crate::outbound::expiry::FileExpirySlot;

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    pub fn advance_millis(&self, millis: i64) {
        self.advance(TimeDelta::milliseconds(millis));
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Fixed starting instant used across tests.
pub fn fixture_now() -> DateTime<Utc> {
    match DateTime::from_timestamp(1_700_000_000, 0) {
        Some(now) => now,
        None => panic!("fixture timestamp out of range"),
    }
}

/// Notifier that keeps every notice for later assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier(Mutex<Vec<Notice>>);

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.lock_notices().clone()
    }

    pub fn messages(&self, level: NoticeLevel) -> Vec<String> {
        self.lock_notices()
            .iter()
            .filter(|notice| notice.level == level)
            .map(|notice| notice.message.clone())
            .collect()
    }

    pub fn last(&self) -> Option<Notice> {
        self.lock_notices().last().cloned()
    }

    fn lock_notices(&self) -> MutexGuard<'_, Vec<Notice>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("notice mutex"),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.lock_notices().push(notice);
    }
}

/// File-backed expiry slot inside a fresh temporary directory.
///
/// Keep the returned directory alive for as long as the slot is used.
pub fn temp_expiry_slot() -> (TempDir, FileExpirySlot) {
    let dir = match TempDir::new() {
        Ok(dir) => dir,
        Err(error) => panic!("create temp dir: {error}"),
    };
    let slot = FileExpirySlot::new(dir.path().join("session").join("expiry.json"));
    (dir, slot)
}
