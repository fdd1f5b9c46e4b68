mod draft;
mod entry;
mod episode;
mod prompt;
mod relocate;
pub(crate) mod series;
mod table;
mod tui;
mod typed;


use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::types::Value;
use tracing::warn;

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::db::QueryOutcome;
use crate::model::EntertainmentKind;
use crate::paths::draft_file_path;
use crate::retry::RetryingStore;
use crate::store::format_timestamp;

use self::draft::Draft;
use self::entry::{EntryDate, EntrySettings, select_entertainment, write_journal};
use self::prompt::Prompter;
use self::relocate::relocate;
use self::series::SeriesRangeTracker;
use self::table::{recent_table, write_table};
use self::typed::parse_typed;

const BROWSE_LIMIT: usize = 200;

const MENU: [(&str, &str); 9] = [
    ("0", "Exit"),
    ("1", "Insert a gunluk"),
    ("2", "Insert a gunluk with a custom date"),
    ("3", "Insert an entertainment"),
    ("4", "Find an entertainment"),
    ("5", "Show last entries with entertainment"),
    ("6", "Custom query"),
    ("7", "Move last entertainment to today"),
    ("8", "Show journal text"),
];

/// Everything a command needs besides the terminal.
pub(crate) struct Journal {
    store: RetryingStore,
    tracker: SeriesRangeTracker,
    draft: Draft,
    recent_limit: usize,
    late_night_cutoff_hour: u32,
}

pub fn run(cli: Cli, config: &Config) -> Result<()> {
    let db_path = config.database_path()?;
    let store = RetryingStore::open(db_path.clone(), config.retry_policy())
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    let mut journal = Journal {
        store,
        tracker: SeriesRangeTracker::new(config.episode_boundary),
        draft: Draft::new(draft_file_path()?),
        recent_limit: config.recent_limit,
        late_night_cutoff_hour: config.late_night_cutoff_hour,
    };

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    match cli.command {
        Some(Command::Write { date }) => {
            let date = date.map_or(EntryDate::Now, EntryDate::Custom);
            run_write(&mut journal, &mut prompter, date, now())?;
        }
        Some(Command::AddEntertainment) => run_add_entertainment(&mut journal, &mut prompter)?,
        Some(Command::Find { name }) => run_find(&mut journal, &mut prompter, &name)?,
        Some(Command::Recent { limit }) => {
            let limit = limit.unwrap_or(journal.recent_limit);
            run_recent(&mut journal, &mut prompter, limit)?;
        }
        Some(Command::Query { sql, params }) => {
            run_query(&mut journal, &mut prompter, &sql, &params)?;
        }
        Some(Command::Move) => run_move(&mut journal, &mut prompter, now())?,
        Some(Command::Draft) => run_draft(&journal, &mut prompter)?,
        Some(Command::Browse) => {
            drop(prompter);
            tui::run_tui(&mut journal.store, BROWSE_LIMIT)?;
        }
        Some(Command::Menu) | None => run_menu(&mut journal, &mut prompter)?,
    }

    Ok(())
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub(crate) fn run_menu<R: BufRead, W: Write>(
    journal: &mut Journal,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    let header = vec!["option".to_string(), "action".to_string()];
    let rows: Vec<Vec<String>> = MENU
        .iter()
        .map(|(key, label)| vec![key.to_string(), label.to_string()])
        .collect();

    loop {
        write_table(prompter.output(), &header, &rows)?;
        let Some(option) = prompter.read_line("--> ")? else {
            break;
        };

        let result = match option.trim() {
            "0" => break,
            "1" => run_write(journal, prompter, EntryDate::Now, now()),
            "2" => ask_custom_date(prompter)
                .and_then(|date| run_write(journal, prompter, EntryDate::Custom(date), now())),
            "3" => run_add_entertainment(journal, prompter),
            "4" => prompter
                .line("Name of the entertainment: ")
                .and_then(|name| run_find(journal, prompter, &name)),
            "5" => {
                let limit = journal.recent_limit;
                run_recent(journal, prompter, limit)
            }
            "6" => prompter
                .line("Query: ")
                .and_then(|sql| run_query(journal, prompter, &sql, &[])),
            "7" => run_move(journal, prompter, now()),
            "8" => run_draft(journal, prompter),
            _ => prompter.say("ERROR: Invalid input"),
        };

        if let Err(err) = result {
            warn!(error = %format!("{err:#}"), "menu action failed");
            prompter.say(&format!("ERROR: {err:#}"))?;
        }
    }
    Ok(())
}

fn ask_custom_date<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>) -> Result<NaiveDate> {
    loop {
        let raw = prompter.line("Journal date (YYYY-MM-DD): ")?;
        match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => return Ok(date),
            Err(_) => prompter.say("Invalid date!")?,
        }
    }
}

pub(crate) fn run_write<R: BufRead, W: Write>(
    journal: &mut Journal,
    prompter: &mut Prompter<R, W>,
    date: EntryDate,
    now: NaiveDateTime,
) -> Result<()> {
    let settings = EntrySettings {
        tracker: &journal.tracker,
        draft: &journal.draft,
        late_night_cutoff_hour: journal.late_night_cutoff_hour,
    };
    write_journal(prompter, &mut journal.store, &settings, date, now)?;
    let limit = journal.recent_limit;
    run_recent(journal, prompter, limit)
}

pub(crate) fn run_add_entertainment<R: BufRead, W: Write>(
    journal: &mut Journal,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    let header = vec!["type".to_string(), "code".to_string()];
    let rows: Vec<Vec<String>> = EntertainmentKind::ALL
        .iter()
        .map(|kind| vec![kind.label().to_string(), kind.code().to_string()])
        .collect();
    write_table(prompter.output(), &header, &rows)?;

    let code = prompter.number_in("Type: ", 1, EntertainmentKind::ALL.len() as u32, "Invalid type!")?;
    let kind = EntertainmentKind::from_code(i64::from(code))
        .with_context(|| format!("unknown entertainment type {code}"))?;
    let name = loop {
        let name = prompter.line("Name: ")?;
        if !name.trim().is_empty() {
            break name.trim().to_string();
        }
        prompter.say("Name cannot be empty!")?;
    };
    let url = prompter.line("Image URL: ")?;
    let url = Some(url.trim()).filter(|url| !url.is_empty());

    let id = journal
        .store
        .run(|db| db.insert_entertainment(kind, &name, url))?;
    prompter.say(&format!("Added {name} ({}) with id {id}", kind.label()))
}

pub(crate) fn run_find<R: BufRead, W: Write>(
    journal: &mut Journal,
    prompter: &mut Prompter<R, W>,
    name: &str,
) -> Result<()> {
    let found = journal
        .store
        .run(|db| db.find_entertainments(name.trim()))?;
    if found.is_empty() {
        return prompter.say("Could not find any entertainments with that name");
    }

    let header = vec!["id".to_string(), "type".to_string(), "name".to_string()];
    let rows: Vec<Vec<String>> = found
        .iter()
        .map(|item| {
            vec![
                item.id.to_string(),
                item.kind.map(|kind| kind.label()).unwrap_or("?").to_string(),
                item.name.clone(),
            ]
        })
        .collect();
    write_table(prompter.output(), &header, &rows)?;
    Ok(())
}

pub(crate) fn run_recent<R: BufRead, W: Write>(
    journal: &mut Journal,
    prompter: &mut Prompter<R, W>,
    limit: usize,
) -> Result<()> {
    let entries = journal.store.run(|db| db.recent_entries(limit))?;
    if entries.is_empty() {
        return prompter.say("No journal entries yet. Write one first.");
    }
    let (header, rows) = recent_table(&entries);
    write_table(prompter.output(), &header, &rows)?;
    Ok(())
}

pub(crate) fn run_query<R: BufRead, W: Write>(
    journal: &mut Journal,
    prompter: &mut Prompter<R, W>,
    sql: &str,
    params: &[String],
) -> Result<()> {
    let values: Vec<Value> = params.iter().map(|raw| parse_typed(raw).into()).collect();
    let outcome = journal
        .store
        .run(|db| db.run_query(sql, &values))
        .context("query failed")?;
    match outcome {
        QueryOutcome::Rows { header, rows } => {
            write_table(prompter.output(), &header, &rows)?;
            prompter.say(&format!("({} row(s))", rows.len()))
        }
        QueryOutcome::Affected(count) => prompter.say(&format!("{count} row(s) affected")),
    }
}

pub(crate) fn run_move<R: BufRead, W: Write>(
    journal: &mut Journal,
    prompter: &mut Prompter<R, W>,
    now: NaiveDateTime,
) -> Result<()> {
    let Some(entertainment) = select_entertainment(prompter, &mut journal.store)? else {
        return prompter.say("Nothing selected.");
    };

    let mut prompt_error = None;
    let decision = relocate(&mut journal.store, entertainment.id, now, |journal_date| {
        let question = format!(
            "Could not find it on yesterday. The latest date is {}, move it to today?",
            format_timestamp(journal_date)
        );
        prompter.confirm(&question).unwrap_or_else(|err| {
            prompt_error = Some(err);
            false
        })
    })?;
    if let Some(err) = prompt_error {
        return Err(err);
    }

    prompter.say(decision.describe())?;
    if decision.moved() {
        let limit = journal.recent_limit;
        run_recent(journal, prompter, limit)?;
    }
    Ok(())
}

pub(crate) fn run_draft<R: BufRead, W: Write>(
    journal: &Journal,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    match journal.draft.load()? {
        Some(text) if !text.is_empty() => prompter.say(&text),
        _ => prompter.say("No journal text kept."),
    }
}
