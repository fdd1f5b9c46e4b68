use std::io::{self, Write};

use crate::model::RecentEntry;

/// Cells longer than this are cut and suffixed with `...`; 36 is a UUID.
pub(crate) const CELL_CUT: usize = 36;

pub(crate) fn truncate(s: &str, max: usize) -> String {
    let mut out = s.to_string();
    if out.chars().count() > max {
        out = out.chars().take(max.saturating_sub(3)).collect::<String>() + "...";
    }
    out
}

fn clip_cell(cell: &str) -> String {
    // Multi-line diary text would break the grid.
    let flat = cell.replace(['\n', '\r'], " ");
    if flat.chars().count() > CELL_CUT {
        flat.chars().take(CELL_CUT).collect::<String>() + "..."
    } else {
        flat
    }
}

/// Writes a column-aligned table, header first.
pub(crate) fn write_table<W: Write>(
    out: &mut W,
    header: &[String],
    rows: &[Vec<String>],
) -> io::Result<()> {
    let header: Vec<String> = header.iter().map(|cell| clip_cell(cell)).collect();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| clip_cell(cell)).collect())
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|cell| cell.chars().count()).collect();
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(idx) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }

    write_row(out, &header, &widths)?;
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    writeln!(out, "{}", rule.join("-+-"))?;
    for row in &rows {
        write_row(out, row, &widths)?;
    }
    Ok(())
}

fn write_row<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(idx, width)| {
            let cell = cells.get(idx).map(String::as_str).unwrap_or("");
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    writeln!(out, "{}", padded.join(" | ").trim_end())
}

pub(crate) fn recent_table(entries: &[RecentEntry]) -> (Vec<String>, Vec<Vec<String>>) {
    let header = [
        "date",
        "work_happiness",
        "daily_happiness",
        "total_happiness",
        "content",
        "name",
        "duration",
        "type",
    ]
    .iter()
    .map(|title| title.to_string())
    .collect();

    let rows = entries
        .iter()
        .map(|entry| {
            vec![
                entry.date.clone(),
                entry.work_happiness.to_string(),
                entry.daily_happiness.to_string(),
                entry.total_happiness.to_string(),
                entry.content.clone(),
                entry.entertainment.clone().unwrap_or_default(),
                entry.duration.clone().unwrap_or_default(),
                entry
                    .kind
                    .map(|kind| kind.label().to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();
    (header, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(header: &[&str], rows: &[&[&str]]) -> String {
        let header: Vec<String> = header.iter().map(|s| s.to_string()).collect();
        let rows: Vec<Vec<String>> = rows
            .iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect();
        let mut out = Vec::new();
        write_table(&mut out, &header, &rows).expect("write table");
        String::from_utf8(out).expect("utf8 table")
    }

    #[test]
    fn aligns_columns() {
        let rendered = render(&["id", "name"], &[&["1", "Dune"], &["12", "It"]]);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "id | name");
        assert_eq!(lines[1], "---+-----");
        assert_eq!(lines[2], "1  | Dune");
        assert_eq!(lines[3], "12 | It");
    }

    #[test]
    fn long_cells_are_cut_after_uuid_length() {
        let long = "x".repeat(50);
        let rendered = render(&["content"], &[&[long.as_str()]]);
        let expected = format!("{}...", "x".repeat(CELL_CUT));
        assert!(rendered.lines().any(|line| line == expected));
    }

    #[test]
    fn cut_starts_one_past_uuid_length() {
        let exact = "u".repeat(CELL_CUT);
        let rendered = render(&["id"], &[&[exact.as_str()]]);
        assert!(rendered.lines().any(|line| line == exact));

        for len in [CELL_CUT + 1, CELL_CUT + 2, CELL_CUT + 3] {
            let cell = "y".repeat(len);
            let rendered = render(&["content"], &[&[cell.as_str()]]);
            let expected = format!("{}...", "y".repeat(CELL_CUT));
            assert!(
                rendered.lines().any(|line| line == expected),
                "{len} chars rendered as {rendered:?}"
            );
        }
    }

    #[test]
    fn newlines_are_flattened() {
        let rendered = render(&["content"], &[&["one\ntwo"]]);
        assert!(rendered.contains("one two"));
    }

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}
