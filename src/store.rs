use std::io;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::ErrorCode;
use thiserror::Error;

pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to create database directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("stored journal date '{0}' is not a valid timestamp")]
    InvalidDate(String),
}

impl StorageError {
    /// Errors worth a reconnect-and-resubmit: the database is busy, locked or
    /// could not be opened right now.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen
            ),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalRef {
    pub id: i64,
    pub date: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityRef {
    pub id: i64,
    pub journal_id: i64,
}

/// Lookups and the single mutation the relocation and range workflows need.
///
/// Dates are local calendar days; a journal matches a day when its timestamp
/// falls on it.
pub trait ActivityStore {
    fn find_journal_by_date(&mut self, date: NaiveDate) -> Result<Option<JournalRef>, StorageError>;

    fn find_activity_by_entertainment_and_journal_date(
        &mut self,
        entertainment_id: i64,
        date: NaiveDate,
    ) -> Result<Option<ActivityRef>, StorageError>;

    /// Most recent activity for the entertainment whose journal is dated
    /// strictly before `before`, newest journal first.
    fn find_latest_activity_by_entertainment(
        &mut self,
        entertainment_id: i64,
        before: NaiveDate,
    ) -> Result<Option<(ActivityRef, NaiveDateTime)>, StorageError>;

    fn reassign_activity_journal(
        &mut self,
        activity_id: i64,
        new_journal_id: i64,
    ) -> Result<(), StorageError>;

    fn find_last_duration_for_entertainment(
        &mut self,
        entertainment_id: i64,
    ) -> Result<Option<String>, StorageError>;
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, StorageError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|_| StorageError::InvalidDate(raw.to_string()))
}

pub(crate) fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn format_date(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_and_locked_are_transient() {
        let busy = StorageError::Sqlite(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        ));
        let locked = StorageError::Sqlite(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            None,
        ));
        assert!(busy.is_transient());
        assert!(locked.is_transient());
    }

    #[test]
    fn constraint_violation_is_not_transient() {
        let err = StorageError::Sqlite(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
            None,
        ));
        assert!(!err.is_transient());
        assert!(!StorageError::InvalidDate("x".to_string()).is_transient());
    }

    #[test]
    fn timestamp_text_round_trips() {
        let raw = "2024-03-09 23:59:59";
        let parsed = parse_timestamp(raw).expect("timestamp should parse");
        assert_eq!(format_timestamp(parsed), raw);
        assert!(parse_timestamp("2024-03-09").is_err());
    }
}
