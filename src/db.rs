use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use tracing::debug;

use crate::model::{Entertainment, EntertainmentKind, NewJournal, RecentEntry};
use crate::store::{
    ActivityRef, ActivityStore, JournalRef, StorageError, format_date, format_timestamp,
    parse_timestamp,
};

#[derive(Debug, Clone)]
pub struct ActivityLine {
    pub entertainment: String,
    pub kind: Option<EntertainmentKind>,
    pub duration: String,
}

#[derive(Debug, Clone)]
pub struct JournalSummary {
    pub id: i64,
    pub date: String,
    pub work_happiness: i64,
    pub daily_happiness: i64,
    pub total_happiness: i64,
    pub content: String,
    pub activities: Vec<ActivityLine>,
}

/// Result of an ad-hoc statement: a header plus stringified rows, or the
/// number of rows a non-returning statement touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Rows {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Affected(usize),
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened database");
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.migrate()?;
        Ok(db)
    }

    pub fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS entertainments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind INTEGER NOT NULL,
                name TEXT NOT NULL,
                image_url TEXT
            );
            CREATE TABLE IF NOT EXISTS journals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                work_happiness INTEGER NOT NULL,
                daily_happiness INTEGER NOT NULL,
                total_happiness INTEGER NOT NULL,
                content TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_journals_date ON journals(date DESC);
            CREATE TABLE IF NOT EXISTS daily_entertainments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                journal_id INTEGER NOT NULL REFERENCES journals(id),
                entertainment_id INTEGER NOT NULL REFERENCES entertainments(id),
                duration TEXT NOT NULL,
                date_created TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_daily_entertainments_entertainment
                ON daily_entertainments(entertainment_id, date_created DESC);
            "#,
        )?;
        Ok(())
    }

    pub fn insert_entertainment(
        &self,
        kind: EntertainmentKind,
        name: &str,
        image_url: Option<&str>,
    ) -> Result<i64, StorageError> {
        self.conn.execute(
            "INSERT INTO entertainments (kind, name, image_url) VALUES (?1, ?2, ?3)",
            params![kind.code(), name, image_url],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, name, kind = kind.label(), "inserted entertainment");
        Ok(id)
    }

    /// Substring match on the name under Unicode lowercase folding. The
    /// needle is literal text, `%` and `_` included.
    pub fn find_entertainments(&self, name: &str) -> Result<Vec<Entertainment>, StorageError> {
        let needle = name.to_lowercase();
        let mut stmt = self
            .conn
            .prepare("SELECT id, kind, name FROM entertainments ORDER BY name, id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Entertainment {
                id: row.get(0)?,
                kind: EntertainmentKind::from_code(row.get(1)?),
                name: row.get(2)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            let entertainment = row?;
            if entertainment.name.to_lowercase().contains(&needle) {
                out.push(entertainment);
            }
        }
        Ok(out)
    }

    /// Inserts the journal and its activities in one transaction and returns
    /// the new journal id.
    pub fn insert_journal(&self, journal: &NewJournal) -> Result<i64, StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            r#"
            INSERT INTO journals (date, work_happiness, daily_happiness, total_happiness, content)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                format_timestamp(journal.date),
                journal.work_happiness.value(),
                journal.daily_happiness.value(),
                journal.total_happiness.value(),
                journal.content,
            ],
        )?;
        let journal_id = tx.last_insert_rowid();

        let created = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);
        for activity in &journal.activities {
            tx.execute(
                r#"
                INSERT INTO daily_entertainments (journal_id, entertainment_id, duration, date_created)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    journal_id,
                    activity.entertainment_id,
                    activity.duration,
                    created
                ],
            )?;
        }
        tx.commit()?;
        debug!(
            journal_id,
            activities = journal.activities.len(),
            "inserted journal"
        );
        Ok(journal_id)
    }

    pub fn recent_entries(&self, limit: usize) -> Result<Vec<RecentEntry>, StorageError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT j.date, j.work_happiness, j.daily_happiness, j.total_happiness,
                   j.content, e.name, d.duration, e.kind
            FROM journals AS j
            LEFT JOIN daily_entertainments AS d ON d.journal_id = j.id
            LEFT JOIN entertainments AS e ON e.id = d.entertainment_id
            ORDER BY j.date DESC, j.id DESC, d.id ASC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map([limit as i64], |row| {
            Ok(RecentEntry {
                date: row.get(0)?,
                work_happiness: row.get(1)?,
                daily_happiness: row.get(2)?,
                total_happiness: row.get(3)?,
                content: row.get(4)?,
                entertainment: row.get(5)?,
                duration: row.get(6)?,
                kind: row
                    .get::<_, Option<i64>>(7)?
                    .and_then(EntertainmentKind::from_code),
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn recent_journals(&self, limit: usize) -> Result<Vec<JournalSummary>, StorageError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, date, work_happiness, daily_happiness, total_happiness, content
            FROM journals
            ORDER BY date DESC, id DESC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map([limit as i64], |row| {
            Ok(JournalSummary {
                id: row.get(0)?,
                date: row.get(1)?,
                work_happiness: row.get(2)?,
                daily_happiness: row.get(3)?,
                total_happiness: row.get(4)?,
                content: row.get(5)?,
                activities: Vec::new(),
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }

        let mut activity_stmt = self.conn.prepare(
            r#"
            SELECT e.name, e.kind, d.duration
            FROM daily_entertainments AS d
            INNER JOIN entertainments AS e ON e.id = d.entertainment_id
            WHERE d.journal_id = ?1
            ORDER BY d.id
            "#,
        )?;
        for journal in &mut out {
            let activities = activity_stmt.query_map([journal.id], |row| {
                Ok(ActivityLine {
                    entertainment: row.get(0)?,
                    kind: EntertainmentKind::from_code(row.get(1)?),
                    duration: row.get(2)?,
                })
            })?;
            for activity in activities {
                journal.activities.push(activity?);
            }
        }
        Ok(out)
    }

    /// Runs a user-supplied statement with positional parameters bound.
    pub fn run_query(&self, sql: &str, values: &[Value]) -> Result<QueryOutcome, StorageError> {
        let mut stmt = self.conn.prepare(sql)?;
        if stmt.column_count() == 0 {
            let affected = stmt.execute(params_from_iter(values.iter()))?;
            return Ok(QueryOutcome::Affected(affected));
        }

        let header: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let width = header.len();
        let mut rows = stmt.query(params_from_iter(values.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for idx in 0..width {
                cells.push(value_ref_text(row.get_ref(idx)?));
            }
            out.push(cells);
        }
        Ok(QueryOutcome::Rows { header, rows: out })
    }

    pub fn journal_on(&self, date: NaiveDate) -> Result<Option<JournalRef>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, date FROM journals WHERE date(date) = ?1 ORDER BY date DESC, id DESC LIMIT 1",
                [format_date(date)],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        row.map(|(id, raw)| parse_timestamp(&raw).map(|date| JournalRef { id, date }))
            .transpose()
    }

    pub fn activity_on(
        &self,
        entertainment_id: i64,
        date: NaiveDate,
    ) -> Result<Option<ActivityRef>, StorageError> {
        let found = self
            .conn
            .query_row(
                r#"
                SELECT d.id, d.journal_id
                FROM daily_entertainments AS d
                INNER JOIN journals AS j ON j.id = d.journal_id
                WHERE d.entertainment_id = ?1 AND date(j.date) = ?2
                ORDER BY d.id DESC
                LIMIT 1
                "#,
                params![entertainment_id, format_date(date)],
                |row| {
                    Ok(ActivityRef {
                        id: row.get(0)?,
                        journal_id: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    pub fn latest_activity_before(
        &self,
        entertainment_id: i64,
        before: NaiveDate,
    ) -> Result<Option<(ActivityRef, NaiveDateTime)>, StorageError> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT d.id, d.journal_id, j.date
                FROM daily_entertainments AS d
                INNER JOIN journals AS j ON j.id = d.journal_id
                WHERE d.entertainment_id = ?1 AND date(j.date) < ?2
                ORDER BY j.date DESC, d.id DESC
                LIMIT 1
                "#,
                params![entertainment_id, format_date(before)],
                |row| {
                    Ok((
                        ActivityRef {
                            id: row.get(0)?,
                            journal_id: row.get(1)?,
                        },
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;
        row.map(|(activity, raw)| parse_timestamp(&raw).map(|date| (activity, date)))
            .transpose()
    }

    pub fn move_activity(&self, activity_id: i64, journal_id: i64) -> Result<(), StorageError> {
        let changed = self.conn.execute(
            "UPDATE daily_entertainments SET journal_id = ?1 WHERE id = ?2",
            params![journal_id, activity_id],
        )?;
        if changed == 0 {
            return Err(StorageError::Sqlite(rusqlite::Error::QueryReturnedNoRows));
        }
        debug!(activity_id, journal_id, "reassigned activity");
        Ok(())
    }

    pub fn last_duration(&self, entertainment_id: i64) -> Result<Option<String>, StorageError> {
        let duration = self
            .conn
            .query_row(
                r#"
                SELECT duration FROM daily_entertainments
                WHERE entertainment_id = ?1
                ORDER BY date_created DESC, id DESC
                LIMIT 1
                "#,
                [entertainment_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(duration)
    }
}

impl ActivityStore for Database {
    fn find_journal_by_date(&mut self, date: NaiveDate) -> Result<Option<JournalRef>, StorageError> {
        self.journal_on(date)
    }

    fn find_activity_by_entertainment_and_journal_date(
        &mut self,
        entertainment_id: i64,
        date: NaiveDate,
    ) -> Result<Option<ActivityRef>, StorageError> {
        self.activity_on(entertainment_id, date)
    }

    fn find_latest_activity_by_entertainment(
        &mut self,
        entertainment_id: i64,
        before: NaiveDate,
    ) -> Result<Option<(ActivityRef, NaiveDateTime)>, StorageError> {
        self.latest_activity_before(entertainment_id, before)
    }

    fn reassign_activity_journal(
        &mut self,
        activity_id: i64,
        new_journal_id: i64,
    ) -> Result<(), StorageError> {
        self.move_activity(activity_id, new_journal_id)
    }

    fn find_last_duration_for_entertainment(
        &mut self,
        entertainment_id: i64,
    ) -> Result<Option<String>, StorageError> {
        self.last_duration(entertainment_id)
    }
}

fn value_ref_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(number) => number.to_string(),
        ValueRef::Real(number) => number.to_string(),
        ValueRef::Text(text) => String::from_utf8_lossy(text).into_owned(),
        ValueRef::Blob(bytes) => format!("<{} bytes>", bytes.len()),
    }
}
