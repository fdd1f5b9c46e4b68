use ratatui::widgets::TableState;

use crate::db::JournalSummary;
use crate::retry::RetryingStore;
use crate::store::StorageError;

/// Reloads the journal list, keeping the selection on `preferred_id` when it
/// is still listed.
pub(super) fn refresh_items(
    store: &mut RetryingStore,
    limit: usize,
    items: &mut Vec<JournalSummary>,
    table_state: &mut TableState,
    preferred_id: Option<i64>,
) -> Result<(), StorageError> {
    *items = store.run(|db| db.recent_journals(limit))?;
    table_state.select(reselect(items, table_state.selected(), preferred_id));
    Ok(())
}

pub(super) fn reselect(
    items: &[JournalSummary],
    selected: Option<usize>,
    preferred_id: Option<i64>,
) -> Option<usize> {
    if items.is_empty() {
        return None;
    }
    if let Some(id) = preferred_id
        && let Some(idx) = items.iter().position(|item| item.id == id)
    {
        return Some(idx);
    }
    Some(selected.map_or(0, |idx| idx.min(items.len() - 1)))
}

pub(super) fn move_selection(selected: Option<usize>, len: usize, delta: isize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = selected.unwrap_or(0);
    let next = current.saturating_add_signed(delta).min(len - 1);
    Some(next)
}

pub(super) fn status_info(msg: &str) -> String {
    format!("INFO: {msg}")
}

pub(super) fn status_error(msg: &str) -> String {
    format!("ERROR: {msg}")
}
