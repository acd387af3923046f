//! Expiry slot persisted as a JSON number of epoch milliseconds.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{ExpirySlot, ExpirySlotError};

/// Expiry slot stored in a single file.
///
/// A missing file (or directory) means no session is recorded. Writes go
/// through a staging file in the same directory and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileExpirySlot {
    path: PathBuf,
}

impl FileExpirySlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    fn parent(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn file_name(&self) -> Result<&Path, ExpirySlotError> {
        self.path
            .file_name()
            .map(Path::new)
            .ok_or_else(|| ExpirySlotError::io(format!("{} has no file name", self.path.display())))
    }

    fn io_error(&self, error: &io::Error) -> ExpirySlotError {
        ExpirySlotError::io(format!("{}: {error}", self.path.display()))
    }

    /// Open the parent directory, or `None` when it does not exist.
    fn open_parent(&self) -> Result<Option<Dir>, ExpirySlotError> {
        match Dir::open_ambient_dir(self.parent(), ambient_authority()) {
            Ok(dir) => Ok(Some(dir)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(self.io_error(&error)),
        }
    }
}

fn decode(raw: &str) -> Result<DateTime<Utc>, ExpirySlotError> {
    let millis: i64 = serde_json::from_str(raw.trim())
        .map_err(|error| ExpirySlotError::corrupt(error.to_string()))?;
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| ExpirySlotError::corrupt(format!("{millis} is out of range")))
}

impl ExpirySlot for FileExpirySlot {
    fn load(&self) -> Result<Option<DateTime<Utc>>, ExpirySlotError> {
        let Some(dir) = self.open_parent()? else {
            return Ok(None);
        };
        match dir.read_to_string(self.file_name()?) {
            Ok(raw) => decode(&raw).map(Some),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(self.io_error(&error)),
        }
    }

    fn store(&self, expires_at: DateTime<Utc>) -> Result<(), ExpirySlotError> {
        Dir::create_ambient_dir_all(self.parent(), ambient_authority())
            .map_err(|error| self.io_error(&error))?;
        let dir = Dir::open_ambient_dir(self.parent(), ambient_authority())
            .map_err(|error| self.io_error(&error))?;
        let encoded = serde_json::to_string(&expires_at.timestamp_millis())
            .map_err(|error| ExpirySlotError::io(error.to_string()))?;

        let staging = PathBuf::from(format!(".expiry-{}.tmp", Uuid::new_v4().simple()));
        dir.write(&staging, encoded.as_bytes())
            .map_err(|error| self.io_error(&error))?;
        dir.rename(&staging, &dir, self.file_name()?)
            .map_err(|error| self.io_error(&error))?;
        debug!(path = %self.path.display(), "session expiry persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), ExpirySlotError> {
        let Some(dir) = self.open_parent()? else {
            return Ok(());
        };
        match dir.remove_file(self.file_name()?) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(self.io_error(&error)),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::test_support::{fixture_now, temp_expiry_slot};
    use rstest::rstest;

    #[rstest]
    fn missing_file_is_absent() {
        let (_dir, slot) = temp_expiry_slot();
        assert_eq!(slot.load().expect("load"), None);
        slot.clear().expect("clearing a missing file succeeds");
    }

    #[rstest]
    fn round_trips_epoch_millis() {
        let (_dir, slot) = temp_expiry_slot();
        slot.store(fixture_now()).expect("store");

        let raw = std::fs::read_to_string(slot.path()).expect("slot file exists");
        assert_eq!(raw, "1700000000000");
        assert_eq!(slot.load().expect("load"), Some(fixture_now()));

        slot.clear().expect("clear");
        assert_eq!(slot.load().expect("load"), None);
    }

    #[rstest]
    #[case("not json")]
    #[case("\"2024-01-01\"")]
    #[case("9223372036854775807")]
    fn unreadable_content_is_corrupt(#[case] content: &str) {
        let (_dir, slot) = temp_expiry_slot();
        slot.store(fixture_now()).expect("store creates directories");
        std::fs::write(slot.path(), content).expect("overwrite slot");

        let err = slot.load().expect_err("content must be rejected");
        assert!(matches!(err, ExpirySlotError::Corrupt { .. }));
    }
}
