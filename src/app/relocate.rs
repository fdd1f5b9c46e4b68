use chrono::{Days, NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::store::{ActivityStore, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocationDecision {
    MovedFromYesterday,
    MovedFromLatest,
    NoTodayJournal,
    NoSourceFound,
    UserDeclined,
}

impl RelocationDecision {
    pub fn describe(self) -> &'static str {
        match self {
            Self::MovedFromYesterday => "Moved yesterday's entry to today.",
            Self::MovedFromLatest => "Moved the latest entry to today.",
            Self::NoTodayJournal => "Could not find today's journal.",
            Self::NoSourceFound => "Could not find any earlier entry for it.",
            Self::UserDeclined => "Move canceled.",
        }
    }

    pub fn moved(self) -> bool {
        matches!(self, Self::MovedFromYesterday | Self::MovedFromLatest)
    }
}

/// Moves the most relevant earlier activity for `entertainment_id` onto
/// today's journal.
///
/// Yesterday's activity wins outright; otherwise the newest activity dated
/// before today is offered to `confirm_fallback` with its journal date. At
/// most one reassignment happens per call.
pub fn relocate<S, F>(
    store: &mut S,
    entertainment_id: i64,
    now: NaiveDateTime,
    confirm_fallback: F,
) -> Result<RelocationDecision, StorageError>
where
    S: ActivityStore + ?Sized,
    F: FnOnce(NaiveDateTime) -> bool,
{
    let today = now.date();
    let yesterday = previous_day(today);

    let Some(today_journal) = store.find_journal_by_date(today)? else {
        info!(entertainment_id, %today, "no journal for today, nothing moved");
        return Ok(RelocationDecision::NoTodayJournal);
    };

    if let Some(yesterday) = yesterday
        && let Some(activity) =
            store.find_activity_by_entertainment_and_journal_date(entertainment_id, yesterday)?
    {
        store.reassign_activity_journal(activity.id, today_journal.id)?;
        info!(
            entertainment_id,
            activity_id = activity.id,
            from_journal = activity.journal_id,
            to_journal = today_journal.id,
            "moved activity from yesterday"
        );
        return Ok(RelocationDecision::MovedFromYesterday);
    }

    debug!(entertainment_id, "no activity yesterday, looking for the latest one");
    let Some((activity, journal_date)) =
        store.find_latest_activity_by_entertainment(entertainment_id, today)?
    else {
        info!(entertainment_id, "no earlier activity to move");
        return Ok(RelocationDecision::NoSourceFound);
    };

    if !confirm_fallback(journal_date) {
        info!(entertainment_id, activity_id = activity.id, "move declined");
        return Ok(RelocationDecision::UserDeclined);
    }

    store.reassign_activity_journal(activity.id, today_journal.id)?;
    info!(
        entertainment_id,
        activity_id = activity.id,
        from_journal = activity.journal_id,
        to_journal = today_journal.id,
        %journal_date,
        "moved latest activity"
    );
    Ok(RelocationDecision::MovedFromLatest)
}

fn previous_day(day: NaiveDate) -> Option<NaiveDate> {
    day.checked_sub_days(Days::new(1))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::store::{ActivityRef, JournalRef};

    #[derive(Default)]
    struct FakeStore {
        today_journal: Option<JournalRef>,
        yesterday_activity: Option<ActivityRef>,
        latest_activity: Option<(ActivityRef, NaiveDateTime)>,
        looked_up_days: Vec<NaiveDate>,
        latest_before: Option<NaiveDate>,
        reassigned: Vec<(i64, i64)>,
        fail_lookups: bool,
    }

    impl ActivityStore for FakeStore {
        fn find_journal_by_date(
            &mut self,
            date: NaiveDate,
        ) -> Result<Option<JournalRef>, StorageError> {
            if self.fail_lookups {
                return Err(StorageError::Sqlite(rusqlite::Error::InvalidQuery));
            }
            self.looked_up_days.push(date);
            Ok(self.today_journal)
        }

        fn find_activity_by_entertainment_and_journal_date(
            &mut self,
            _entertainment_id: i64,
            date: NaiveDate,
        ) -> Result<Option<ActivityRef>, StorageError> {
            self.looked_up_days.push(date);
            Ok(self.yesterday_activity)
        }

        fn find_latest_activity_by_entertainment(
            &mut self,
            _entertainment_id: i64,
            before: NaiveDate,
        ) -> Result<Option<(ActivityRef, NaiveDateTime)>, StorageError> {
            self.latest_before = Some(before);
            Ok(self.latest_activity)
        }

        fn reassign_activity_journal(
            &mut self,
            activity_id: i64,
            new_journal_id: i64,
        ) -> Result<(), StorageError> {
            self.reassigned.push((activity_id, new_journal_id));
            Ok(())
        }

        fn find_last_duration_for_entertainment(
            &mut self,
            _entertainment_id: i64,
        ) -> Result<Option<String>, StorageError> {
            Ok(None)
        }
    }

    fn at(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").expect("test timestamp")
    }

    fn today_journal() -> JournalRef {
        JournalRef {
            id: 30,
            date: at("2024-03-10 21:00:00"),
        }
    }

    #[test]
    fn moves_yesterdays_activity_without_asking() {
        let mut store = FakeStore {
            today_journal: Some(today_journal()),
            yesterday_activity: Some(ActivityRef {
                id: 7,
                journal_id: 29,
            }),
            ..FakeStore::default()
        };
        let asked = Cell::new(false);

        let decision = relocate(&mut store, 1, at("2024-03-10 22:15:00"), |_| {
            asked.set(true);
            true
        })
        .expect("relocation should succeed");

        assert_eq!(decision, RelocationDecision::MovedFromYesterday);
        assert_eq!(store.reassigned, vec![(7, 30)]);
        assert!(!asked.get());
        assert_eq!(
            store.looked_up_days,
            vec![
                NaiveDate::from_ymd_opt(2024, 3, 10).expect("date"),
                NaiveDate::from_ymd_opt(2024, 3, 9).expect("date"),
            ]
        );
    }

    #[test]
    fn no_today_journal_never_mutates() {
        let mut store = FakeStore {
            yesterday_activity: Some(ActivityRef {
                id: 7,
                journal_id: 29,
            }),
            latest_activity: Some((
                ActivityRef {
                    id: 5,
                    journal_id: 12,
                },
                at("2024-02-28 20:00:00"),
            )),
            ..FakeStore::default()
        };

        let decision = relocate(&mut store, 1, at("2024-03-10 09:00:00"), |_| true)
            .expect("relocation should succeed");

        assert_eq!(decision, RelocationDecision::NoTodayJournal);
        assert!(store.reassigned.is_empty());
        assert!(store.latest_before.is_none());
    }

    #[test]
    fn declined_fallback_leaves_record_alone() {
        let source_date = at("2024-02-29 20:00:00");
        let mut store = FakeStore {
            today_journal: Some(today_journal()),
            latest_activity: Some((
                ActivityRef {
                    id: 5,
                    journal_id: 12,
                },
                source_date,
            )),
            ..FakeStore::default()
        };
        let offered = Cell::new(None);

        let decision = relocate(&mut store, 1, at("2024-03-10 22:15:00"), |date| {
            offered.set(Some(date));
            false
        })
        .expect("relocation should succeed");

        assert_eq!(decision, RelocationDecision::UserDeclined);
        assert!(store.reassigned.is_empty());
        assert_eq!(offered.get(), Some(source_date));
        assert_eq!(
            store.latest_before,
            NaiveDate::from_ymd_opt(2024, 3, 10)
        );
    }

    #[test]
    fn confirmed_fallback_moves_latest_to_today() {
        let mut store = FakeStore {
            today_journal: Some(today_journal()),
            latest_activity: Some((
                ActivityRef {
                    id: 5,
                    journal_id: 12,
                },
                at("2024-02-29 20:00:00"),
            )),
            ..FakeStore::default()
        };

        let decision = relocate(&mut store, 1, at("2024-03-10 22:15:00"), |_| true)
            .expect("relocation should succeed");

        assert_eq!(decision, RelocationDecision::MovedFromLatest);
        assert_eq!(store.reassigned, vec![(5, 30)]);
    }

    #[test]
    fn nothing_to_move_reports_no_source() {
        let mut store = FakeStore {
            today_journal: Some(today_journal()),
            ..FakeStore::default()
        };
        let asked = Cell::new(false);

        let decision = relocate(&mut store, 1, at("2024-03-10 22:15:00"), |_| {
            asked.set(true);
            true
        })
        .expect("relocation should succeed");

        assert_eq!(decision, RelocationDecision::NoSourceFound);
        assert!(!asked.get());
        assert!(store.reassigned.is_empty());
    }

    #[test]
    fn storage_failure_abandons_relocation() {
        let mut store = FakeStore {
            fail_lookups: true,
            ..FakeStore::default()
        };
        let result = relocate(&mut store, 1, at("2024-03-10 22:15:00"), |_| true);
        assert!(result.is_err());
        assert!(store.reassigned.is_empty());
    }
}
