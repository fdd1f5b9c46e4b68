use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Clear, Padding, Paragraph, Row, Table, TableState, Wrap,
};

use crate::db::JournalSummary;

use super::super::table::truncate;
use super::PendingNotice;

pub(super) fn draw_tui(
    frame: &mut Frame,
    items: &[JournalSummary],
    table_state: &mut TableState,
    status: &str,
    pending_notice: Option<&PendingNotice>,
) {
    let bg = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(bg, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected_text = table_state
        .selected()
        .map(|idx| (idx + 1).to_string())
        .unwrap_or_else(|| "-".to_string());
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "GUNLUK",
            Style::default()
                .fg(Color::Rgb(110, 170, 255))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(
            format!("{} journals", items.len()),
            Style::default().fg(Color::Rgb(185, 195, 210)),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(
            format!("selected {selected_text}"),
            Style::default().fg(Color::Rgb(185, 195, 210)),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(panel_block("Journal"));
    frame.render_widget(header, chunks[0]);

    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    let rows: Vec<Row> = items
        .iter()
        .map(|item| {
            Row::new(vec![
                Cell::from(item.date.clone()),
                Cell::from(item.work_happiness.to_string()),
                Cell::from(item.daily_happiness.to_string()),
                Cell::from(item.total_happiness.to_string()),
                Cell::from(activity_summary(item)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(20),
            Constraint::Length(5),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Min(10),
        ],
    )
    .header(
        Row::new(vec!["Date", "Work", "Daily", "Total", "Entertainment"]).style(
            Style::default()
                .fg(Color::Rgb(110, 170, 255))
                .add_modifier(Modifier::BOLD),
        ),
    )
    .block(panel_block("Entries"))
    .row_highlight_style(
        Style::default()
            .bg(Color::Rgb(110, 170, 255))
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("▸ ");
    frame.render_stateful_widget(table, body_chunks[0], table_state);

    let selection_text = match table_state.selected().and_then(|idx| items.get(idx)) {
        Some(item) => detail_text(item),
        None => "No journal entries yet.\n\nRun `gunluk write` to add one.".to_string(),
    };
    let selection = Paragraph::new(selection_text)
        .style(Style::default().fg(Color::Rgb(230, 230, 230)))
        .wrap(Wrap { trim: false })
        .block(panel_block("Selected"))
        .alignment(Alignment::Left);
    frame.render_widget(selection, body_chunks[1]);

    let command_bar = Paragraph::new(Line::from(Span::styled(
        "↑/↓ move  PgUp/PgDn page  Enter read  r refresh  q quit",
        Style::default().fg(Color::Rgb(185, 195, 210)),
    )))
    .alignment(Alignment::Center)
    .block(panel_block("Controls"));
    frame.render_widget(command_bar, chunks[2]);

    let status_widget = Paragraph::new(status.to_string())
        .style(status_style(status))
        .block(panel_block("Status"));
    frame.render_widget(status_widget, chunks[3]);

    if let Some(notice) = pending_notice {
        let popup_area = popup_rect_for_text(frame.area(), &notice.message);
        render_popup_shadow(frame, popup_area);
        frame.render_widget(Clear, popup_area);
        let popup = Paragraph::new(notice.message.clone())
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false })
            .block(modal_block(notice.title.clone()));
        frame.render_widget(popup, popup_area);
    }
}

pub(super) fn activity_summary(item: &JournalSummary) -> String {
    match item.activities.as_slice() {
        [] => "-".to_string(),
        [only] => truncate(&format!("{} {}", only.entertainment, only.duration), 40),
        [first, rest @ ..] => format!("{} +{}", truncate(&first.entertainment, 32), rest.len()),
    }
}

pub(super) fn detail_text(item: &JournalSummary) -> String {
    let mut text = format!(
        "Date\n{}\n\nHappiness\nwork {}  daily {}  total {}\n",
        item.date, item.work_happiness, item.daily_happiness, item.total_happiness
    );
    if !item.activities.is_empty() {
        text.push_str("\nEntertainment\n");
        for activity in &item.activities {
            let kind = activity.kind.map(|kind| kind.label()).unwrap_or("?");
            text.push_str(&format!(
                "{} ({kind}) {}\n",
                truncate(&activity.entertainment, 32),
                activity.duration
            ));
        }
    }
    let preview = item.content.replace(['\n', '\r'], " ");
    text.push_str(&format!("\nText\n{}", truncate(preview.trim(), 160)));
    text
}

fn panel_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(125, 135, 150)))
        .title(title)
}

fn modal_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(
            Style::default()
                .fg(Color::Rgb(160, 190, 235))
                .add_modifier(Modifier::BOLD),
        )
        .title(title)
        .padding(Padding::new(2, 2, 1, 1))
}

fn status_style(status: &str) -> Style {
    if status.starts_with("ERROR:") {
        Style::default()
            .fg(Color::Rgb(255, 145, 120))
            .add_modifier(Modifier::BOLD)
    } else if status.starts_with("INFO:") {
        Style::default().fg(Color::Rgb(205, 165, 255))
    } else {
        Style::default().fg(Color::Rgb(230, 235, 242))
    }
}

fn centered_fixed_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width.max(1));
    let clamped_height = height.min(area.height.max(1));
    let x = area.x + area.width.saturating_sub(clamped_width) / 2;
    let y = area.y + area.height.saturating_sub(clamped_height) / 2;
    Rect::new(x, y, clamped_width, clamped_height)
}

fn render_popup_shadow(frame: &mut Frame, popup_area: Rect) {
    let area = frame.area();
    let shadow = Rect::new(
        (popup_area.x + 1).min(area.x + area.width.saturating_sub(1)),
        (popup_area.y + 1).min(area.y + area.height.saturating_sub(1)),
        popup_area.width.saturating_sub(1),
        popup_area.height.saturating_sub(1),
    );
    if shadow.width == 0 || shadow.height == 0 {
        return;
    }
    let shadow_block = Block::default().style(Style::default().bg(Color::Rgb(14, 16, 24)));
    frame.render_widget(shadow_block, shadow);
}

// Journal text wraps, so the popup grows with the text length rather than
// the longest line.
pub(super) fn popup_rect_for_text(area: Rect, text: &str) -> Rect {
    let available_width = area.width.saturating_sub(2).max(1);
    let width = 80.min(available_width);
    let inner_width = usize::from(width.saturating_sub(6).max(1));
    let wrapped_lines: usize = text
        .lines()
        .map(|line| line.chars().count().div_ceil(inner_width).max(1))
        .sum();

    let available_height = area.height.saturating_sub(2).max(1);
    let min_height = 8.min(available_height);
    let max_height = available_height;
    let desired_height = u16::try_from(wrapped_lines)
        .unwrap_or(u16::MAX)
        .saturating_add(4);
    let height = desired_height.clamp(min_height, max_height);

    centered_fixed_rect(width, height, area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ActivityLine;
    use crate::model::EntertainmentKind;

    fn journal(activities: Vec<ActivityLine>) -> JournalSummary {
        JournalSummary {
            id: 1,
            date: "2024-03-10 21:00:00".to_string(),
            work_happiness: 4,
            daily_happiness: 8,
            total_happiness: 6,
            content: "Long day.\nWatched something.".to_string(),
            activities,
        }
    }

    fn line(name: &str, duration: &str) -> ActivityLine {
        ActivityLine {
            entertainment: name.to_string(),
            kind: Some(EntertainmentKind::Series),
            duration: duration.to_string(),
        }
    }

    #[test]
    fn summarizes_activities() {
        assert_eq!(activity_summary(&journal(Vec::new())), "-");
        assert_eq!(
            activity_summary(&journal(vec![line("Dark", "S1E1-S1E3")])),
            "Dark S1E1-S1E3"
        );
        assert_eq!(
            activity_summary(&journal(vec![line("Dark", "S1E1-S1E3"), line("Lost", "S2E1-S2E2")])),
            "Dark +1"
        );
    }

    #[test]
    fn details_list_every_activity() {
        let text = detail_text(&journal(vec![line("Dark", "S1E1-S1E3")]));
        assert!(text.contains("work 4  daily 8  total 6"));
        assert!(text.contains("Dark (SERIES) S1E1-S1E3"));
        assert!(text.contains("Long day. Watched something."));
    }

    #[test]
    fn popup_fits_inside_the_screen() {
        let area = Rect::new(0, 0, 60, 20);
        let long = "word ".repeat(400);
        let popup = popup_rect_for_text(area, &long);
        assert!(popup.width <= 58);
        assert!(popup.height <= 18);
        assert!(popup.x + popup.width <= area.width);

        let small = popup_rect_for_text(area, "short");
        assert_eq!(small.height, 8);
    }
}
