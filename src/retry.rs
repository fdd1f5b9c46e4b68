use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::db::Database;
use crate::store::{ActivityRef, ActivityStore, JournalRef, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: usize,
    pub delay: Duration,
}

/// Runs `op`, reconnecting and resubmitting on transient failures until
/// `policy.attempts` runs out. Non-transient errors return immediately.
pub fn with_reconnect<C, T, R, F>(
    policy: RetryPolicy,
    conn: &mut C,
    mut reconnect: R,
    mut op: F,
) -> Result<T, StorageError>
where
    R: FnMut() -> Result<C, StorageError>,
    F: FnMut(&mut C) -> Result<T, StorageError>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        let err = match op(conn) {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !err.is_transient() || attempt >= attempts {
            return Err(err);
        }

        warn!(attempt, attempts, error = %err, "transient storage failure, reconnecting");
        thread::sleep(policy.delay);
        match reconnect() {
            Ok(fresh) => *conn = fresh,
            Err(reconnect_err) if reconnect_err.is_transient() => {
                warn!(attempt, error = %reconnect_err, "reconnect failed, retrying");
            }
            Err(reconnect_err) => return Err(reconnect_err),
        }
        attempt += 1;
    }
}

/// A file-backed database that reopens itself on transient failures.
pub struct RetryingStore {
    db: Database,
    path: PathBuf,
    policy: RetryPolicy,
}

impl RetryingStore {
    pub fn open(path: PathBuf, policy: RetryPolicy) -> Result<Self, StorageError> {
        let db = Self::connect(&path)?;
        Ok(Self { db, path, policy })
    }

    fn connect(path: &Path) -> Result<Database, StorageError> {
        let db = Database::open(path)?;
        db.migrate()?;
        Ok(db)
    }

    pub fn run<T, F>(&mut self, mut op: F) -> Result<T, StorageError>
    where
        F: FnMut(&Database) -> Result<T, StorageError>,
    {
        let path = self.path.clone();
        with_reconnect(
            self.policy,
            &mut self.db,
            || Self::connect(&path),
            |db| op(db),
        )
    }
}

impl ActivityStore for RetryingStore {
    fn find_journal_by_date(&mut self, date: NaiveDate) -> Result<Option<JournalRef>, StorageError> {
        self.run(|db| db.journal_on(date))
    }

    fn find_activity_by_entertainment_and_journal_date(
        &mut self,
        entertainment_id: i64,
        date: NaiveDate,
    ) -> Result<Option<ActivityRef>, StorageError> {
        self.run(|db| db.activity_on(entertainment_id, date))
    }

    fn find_latest_activity_by_entertainment(
        &mut self,
        entertainment_id: i64,
        before: NaiveDate,
    ) -> Result<Option<(ActivityRef, NaiveDateTime)>, StorageError> {
        self.run(|db| db.latest_activity_before(entertainment_id, before))
    }

    fn reassign_activity_journal(
        &mut self,
        activity_id: i64,
        new_journal_id: i64,
    ) -> Result<(), StorageError> {
        self.run(|db| db.move_activity(activity_id, new_journal_id))
    }

    fn find_last_duration_for_entertainment(
        &mut self,
        entertainment_id: i64,
    ) -> Result<Option<String>, StorageError> {
        self.run(|db| db.last_duration(entertainment_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn busy() -> StorageError {
        StorageError::Sqlite(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        ))
    }

    fn policy(attempts: usize) -> RetryPolicy {
        RetryPolicy {
            attempts,
            delay: Duration::ZERO,
        }
    }

    #[test]
    fn reconnects_and_resubmits_after_transient_failure() {
        let mut conn = 0_u32;
        let mut reconnects = 0;
        let result = with_reconnect(
            policy(3),
            &mut conn,
            || {
                reconnects += 1;
                Ok(reconnects)
            },
            |conn| if *conn == 0 { Err(busy()) } else { Ok(*conn * 10) },
        );
        assert_eq!(result.ok(), Some(10));
        assert_eq!(reconnects, 1);
    }

    #[test]
    fn gives_up_after_configured_attempts() {
        let mut conn = ();
        let mut calls = 0;
        let mut reconnects = 0;
        let result: Result<(), _> = with_reconnect(
            policy(3),
            &mut conn,
            || {
                reconnects += 1;
                Ok(())
            },
            |_| {
                calls += 1;
                Err(busy())
            },
        );
        assert!(result.is_err());
        assert_eq!(calls, 3);
        assert_eq!(reconnects, 2);
    }

    #[test]
    fn permanent_errors_are_not_retried() {
        let mut conn = ();
        let mut calls = 0;
        let result: Result<(), _> = with_reconnect(
            policy(5),
            &mut conn,
            || Ok(()),
            |_| {
                calls += 1;
                Err(StorageError::InvalidDate("nope".to_string()))
            },
        );
        assert!(matches!(result, Err(StorageError::InvalidDate(_))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn zero_attempts_still_runs_once() {
        let mut conn = ();
        let mut calls = 0;
        let result = with_reconnect(policy(0), &mut conn, || Ok(()), |_| {
            calls += 1;
            Ok(calls)
        });
        assert_eq!(result.ok(), Some(1));
    }

    #[test]
    fn store_reopens_file_database() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("gunluk.db");
        let mut store = RetryingStore::open(path.clone(), policy(2)).expect("store should open");
        let found = store
            .find_journal_by_date(NaiveDate::from_ymd_opt(2024, 1, 1).expect("date"))
            .expect("lookup should succeed");
        assert!(found.is_none());
        assert!(path.exists());
    }
}
