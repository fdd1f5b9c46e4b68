use std::io::{BufRead, Write};

use anyhow::{Result, anyhow};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::{info, warn};

use crate::model::{Entertainment, EntertainmentKind, Happiness, NewActivity, NewJournal};
use crate::retry::RetryingStore;
use crate::store::{ActivityStore, format_timestamp};

use super::draft::Draft;
use super::episode::EpisodeRange;
use super::prompt::Prompter;
use super::series::{RangeIntent, SeriesRangeTracker, TrackError};
use super::table::write_table;

const CUSTOM_ONLY: &[RangeIntent] = &[RangeIntent::Custom];

/// How the new entry is dated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryDate {
    Now,
    Custom(NaiveDate),
}

pub struct EntrySettings<'a> {
    pub tracker: &'a SeriesRangeTracker,
    pub draft: &'a Draft,
    pub late_night_cutoff_hour: u32,
}

/// Walks the user through one journal entry and saves it; returns the new
/// journal id.
pub fn write_journal<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    store: &mut RetryingStore,
    settings: &EntrySettings<'_>,
    date: EntryDate,
    now: NaiveDateTime,
) -> Result<i64> {
    print_happiness_scale(prompter)?;
    let work_happiness = ask_happiness(prompter, "Work happiness: ")?;
    let daily_happiness = ask_happiness(prompter, "Daily (outside work) happiness: ")?;
    let total_happiness = ask_happiness(prompter, "Total happiness: ")?;

    let content = compose_text(prompter, settings.draft)?;

    let mut activities = Vec::new();
    while prompter.confirm("Add entertainment?")? {
        let Some(entertainment) = select_entertainment(prompter, store)? else {
            continue;
        };
        let duration = if entertainment.kind == Some(EntertainmentKind::Series) {
            match series_duration(prompter, store, settings.tracker, entertainment.id)? {
                Some(duration) => duration,
                None => continue,
            }
        } else {
            prompter.line("Duration: ")?
        };
        activities.push(NewActivity {
            entertainment_id: entertainment.id,
            duration,
        });
    }

    let date = resolve_entry_date(prompter, date, now, settings.late_night_cutoff_hour)?;
    let journal = NewJournal {
        date,
        work_happiness,
        daily_happiness,
        total_happiness,
        content,
        activities,
    };
    let journal_id = store.run(|db| db.insert_journal(&journal))?;
    info!(journal_id, date = %format_timestamp(date), "journal saved");
    Ok(journal_id)
}

fn print_happiness_scale<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>) -> Result<()> {
    let header = vec!["happiness".to_string(), "value".to_string()];
    let rows: Vec<Vec<String>> = Happiness::all()
        .map(|level| vec![level.label().to_string(), level.value().to_string()])
        .collect();
    write_table(prompter.output(), &header, &rows)?;
    Ok(())
}

fn ask_happiness<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    label: &str,
) -> Result<Happiness> {
    let value = prompter.number_in(label, 0, u32::from(Happiness::MAX), "Invalid happiness!")?;
    u8::try_from(value)
        .ok()
        .and_then(Happiness::new)
        .ok_or_else(|| anyhow!("happiness {value} is outside the scale"))
}

/// Collects journal text in chunks until the user says it is done. Every
/// chunk is written to the draft.
pub(crate) fn compose_text<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    draft: &Draft,
) -> Result<String> {
    let mut text = String::new();
    loop {
        text.push_str(&prompter.line("Journal: ")?);
        draft.save(&text);
        if prompter.confirm("Is it done?")? {
            return Ok(text);
        }
        if prompter.confirm("Reset the written text?")? {
            text.clear();
            draft.save(&text);
        }
    }
}

pub(crate) fn select_entertainment<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    store: &mut RetryingStore,
) -> Result<Option<Entertainment>> {
    let name = prompter.line("Name of the entertainment: ")?;
    let mut found = store.run(|db| db.find_entertainments(name.trim()))?;
    if found.is_empty() {
        prompter.say("Could not find any entertainments with that name")?;
        return Ok(None);
    }

    let labels: Vec<String> = found.iter().map(|item| item.name.clone()).collect();
    Ok(prompter
        .choose(&labels)?
        .map(|idx| found.swap_remove(idx)))
}

/// Proposes the next episode range from the last recorded one. `None` means
/// the activity is skipped: the user backed out or the range did not fit the
/// grammar.
pub(crate) fn series_duration<R: BufRead, W: Write, S: ActivityStore + ?Sized>(
    prompter: &mut Prompter<R, W>,
    store: &mut S,
    tracker: &SeriesRangeTracker,
    entertainment_id: i64,
) -> Result<Option<String>> {
    let last = store.find_last_duration_for_entertainment(entertainment_id)?;
    let (previous, intents): (Option<EpisodeRange>, &[RangeIntent]) = match last.as_deref() {
        Some(raw) => match raw.parse::<EpisodeRange>() {
            Ok(range) => {
                prompter.say(&format!("Last duration: {range}"))?;
                (Some(range), SeriesRangeTracker::available_intents(Some(&range)))
            }
            Err(err) => {
                warn!(entertainment_id, error = %err, "last duration is not an episode range");
                prompter.say(&format!("Last duration: {raw} (not an episode range)"))?;
                (None, CUSTOM_ONLY)
            }
        },
        None => (None, SeriesRangeTracker::available_intents(None)),
    };

    let labels: Vec<String> = intents
        .iter()
        .map(|intent| intent_label(*intent).to_string())
        .collect();
    let Some(choice) = prompter.choose(&labels)? else {
        return Ok(None);
    };
    let intent = intents[choice];

    let result = if intent == RangeIntent::Custom {
        let text = prompter.line("Duration: ")?;
        tracker.next_range(previous.as_ref(), intent, 1, Some(text.trim()))
    } else {
        let count = prompter.number_in(
            "Episodes watched: ",
            1,
            u32::MAX,
            "Invalid episode count, must be a positive number!",
        )?;
        tracker.next_range(previous.as_ref(), intent, count, None)
    };

    match result {
        Ok(range) => {
            prompter.say(&format!("Duration: {range}"))?;
            Ok(Some(range.to_string()))
        }
        Err(err) => {
            if let TrackError::Parse(_) = err {
                warn!(entertainment_id, error = %err, "rejected series duration");
            } else {
                warn!(entertainment_id, error = %err, "series range could not be built");
            }
            prompter.say("Invalid TV series duration, skipping...")?;
            Ok(None)
        }
    }
}

fn intent_label(intent: RangeIntent) -> &'static str {
    match intent {
        RangeIntent::SameSeason => "Same season",
        RangeIntent::NextSeason => "Next season",
        RangeIntent::NewSeries => "New series",
        RangeIntent::Custom => "Custom range",
    }
}

/// Custom dates start at midnight. Before the cutoff hour the user may file
/// the entry under yesterday, at 23:59:59.
pub(crate) fn resolve_entry_date<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    date: EntryDate,
    now: NaiveDateTime,
    late_night_cutoff_hour: u32,
) -> Result<NaiveDateTime> {
    match date {
        EntryDate::Custom(day) => Ok(day.and_time(NaiveTime::MIN)),
        EntryDate::Now => {
            if now.hour() >= late_night_cutoff_hour {
                return Ok(now);
            }
            prompter.say(&format!("Current hour: {}", now.hour()))?;
            let Some(yesterday) = now
                .date()
                .checked_sub_days(Days::new(1))
                .and_then(|day| day.and_hms_opt(23, 59, 59))
            else {
                return Ok(now);
            };
            let question = format!("Use yesterday {} as date?", format_timestamp(yesterday));
            if prompter.confirm(&question)? {
                Ok(yesterday)
            } else {
                Ok(now)
            }
        }
    }
}
