//! Boxed table output for AQI reports.

use aqi_core::{
    AqiLevel, ReportRow,
    report::{TABLE_HEADERS, TABLE_TITLE},
};
use chrono::Local;
use colored::{ColoredString, Colorize};
use std::mem;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Maximum display width per column before wrapping.
const MAX_WIDTHS: [usize; 5] = [32, 5, 20, 40, 40];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Plain,
    Dim,
    Bold,
    Severity(AqiLevel),
}

/// One wrapped cell: its lines share a style, except the timestamp under a location.
#[derive(Debug, Clone, Default)]
struct Cell {
    lines: Vec<(String, Style)>,
}

impl Cell {
    fn wrapped(text: &str, width: usize, style: Style) -> Self {
        Cell {
            lines: wrap(text, width).into_iter().map(|l| (l, style)).collect(),
        }
    }

    fn width(&self) -> usize {
        self.lines.iter().map(|(l, _)| l.width()).max().unwrap_or(0)
    }
}

pub fn render(rows: &[ReportRow]) -> String {
    let header: Vec<Cell> = TABLE_HEADERS
        .iter()
        .zip(MAX_WIDTHS)
        .map(|(h, w)| Cell::wrapped(h, w, Style::Bold))
        .collect();

    let body: Vec<Vec<Cell>> = rows.iter().map(row_cells).collect();

    let widths: Vec<usize> = (0..TABLE_HEADERS.len())
        .map(|col| {
            body.iter()
                .map(|cells| cells[col].width())
                .chain([header[col].width()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let total: usize = widths.iter().map(|w| w + 3).sum::<usize>() + 1;

    let mut out = String::new();
    let title_pad = total.saturating_sub(TABLE_TITLE.width()) / 2;
    out.push_str(&" ".repeat(title_pad));
    out.push_str(&TABLE_TITLE.black().on_white().bold().to_string());
    out.push('\n');

    out.push_str(&border(&widths, '╭', '┬', '╮'));
    push_row(&mut out, &header, &widths);
    out.push_str(&border(&widths, '├', '┼', '┤'));

    for (i, cells) in body.iter().enumerate() {
        if i > 0 {
            out.push_str(&border(&widths, '├', '┼', '┤'));
        }
        push_row(&mut out, cells, &widths);
    }

    out.push_str(&border(&widths, '╰', '┴', '╯'));
    out
}

fn row_cells(row: &ReportRow) -> Vec<Cell> {
    let severity = row.severity.map_or(Style::Plain, Style::Severity);
    let [location, aqi, level, implications, cautionary] = row.cells();

    let mut location = Cell::wrapped(&location, MAX_WIDTHS[0], Style::Plain);
    if let Some(at) = row.observed_at {
        let stamp = format!("updated {}", at.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
        location.lines.push((stamp, Style::Dim));
    }

    vec![
        location,
        Cell::wrapped(&aqi, MAX_WIDTHS[1], severity),
        Cell::wrapped(&level, MAX_WIDTHS[2], severity),
        Cell::wrapped(&implications, MAX_WIDTHS[3], Style::Plain),
        Cell::wrapped(&cautionary, MAX_WIDTHS[4], Style::Plain),
    ]
}

fn push_row(out: &mut String, cells: &[Cell], widths: &[usize]) {
    let height = cells.iter().map(|c| c.lines.len()).max().unwrap_or(1);

    for line in 0..height {
        out.push('│');
        for (cell, &width) in cells.iter().zip(widths) {
            let (text, style) = cell
                .lines
                .get(line)
                .map(|(t, s)| (t.as_str(), *s))
                .unwrap_or(("", Style::Plain));

            out.push(' ');
            out.push_str(&paint(text, style).to_string());
            out.push_str(&" ".repeat(width - text.width()));
            out.push_str(" │");
        }
        out.push('\n');
    }
}

fn border(widths: &[usize], left: char, mid: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}\n", segments.join(&mid.to_string()))
}

fn paint(text: &str, style: Style) -> ColoredString {
    match style {
        Style::Plain => text.normal(),
        Style::Dim => text.dimmed(),
        Style::Bold => text.bold(),
        Style::Severity(level) => {
            let base = text.white().bold();
            match level {
                AqiLevel::Good => base.on_green(),
                AqiLevel::Moderate => base.on_yellow(),
                AqiLevel::UnhealthyForSensitiveGroups => base.on_truecolor(255, 135, 0),
                AqiLevel::Unhealthy => base.on_red(),
                AqiLevel::VeryUnhealthy => base.on_magenta(),
                AqiLevel::Hazardous => base.on_truecolor(128, 64, 0),
            }
        }
    }
}

/// Word-wrap by display width. Words wider than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        for piece in split_word(word, width) {
            let needed = if current.is_empty() {
                piece.width()
            } else {
                current.width() + 1 + piece.width()
            };

            if needed > width && !current.is_empty() {
                lines.push(mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&piece);
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn split_word(word: &str, width: usize) -> Vec<String> {
    if word.width() <= width {
        return vec![word.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for c in word.chars() {
        let w = c.width().unwrap_or(0);
        if current_width + w > width && !current.is_empty() {
            pieces.push(mem::take(&mut current));
            current_width = 0;
        }
        current.push(c);
        current_width += w;
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
