//! Message log widget: the scrollable conversation surface

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use sift_chat::{Cell, EntryBody, MessageEntry, Role, TableView};
use unicode_width::UnicodeWidthStr;

/// Widest a single table column is drawn
const MAX_COLUMN_WIDTH: usize = 30;

/// Widget for displaying the conversation log
pub struct MessageLog<'a> {
    entries: &'a [MessageEntry],
    theme: &'a Theme,
    scroll: usize,
    /// Current spinner frame for loading entries
    spinner: &'static str,
    /// Example questions shown when the log is empty
    examples: &'a [String],
}

impl<'a> MessageLog<'a> {
    /// Create a new message log
    pub fn new(entries: &'a [MessageEntry], theme: &'a Theme) -> Self {
        Self {
            entries,
            theme,
            scroll: 0,
            spinner: "⠋",
            examples: &[],
        }
    }

    /// Set scroll offset
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Set the spinner frame used for loading entries
    pub fn spinner(mut self, frame: &'static str) -> Self {
        self.spinner = frame;
        self
    }

    /// Set the empty-state example questions
    pub fn examples(mut self, examples: &'a [String]) -> Self {
        self.examples = examples;
        self
    }

    /// Total rendered line count at the given width, for scroll clamping
    pub fn line_count(&self, width: usize) -> usize {
        self.lines(width).len()
    }

    /// Render all entries (or the empty state) into styled lines
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        if self.entries.is_empty() {
            return self.empty_state_lines();
        }
        let mut all = Vec::new();
        for entry in self.entries {
            all.extend(self.entry_lines(entry, width));
        }
        all
    }

    fn entry_lines(&self, entry: &MessageEntry, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let (label, style, prefix) = match entry.role {
            Role::User => ("You", self.theme.accent_bold(), "▶ "),
            Role::Assistant => (
                "Assistant",
                self.theme
                    .success_style()
                    .add_modifier(ratatui::style::Modifier::BOLD),
                "◀ ",
            ),
            Role::Error => ("Error", self.theme.error_style(), "✖ "),
        };
        lines.push(Line::from(Span::styled(
            format!("{}{}", prefix, label),
            style,
        )));

        let content_width = width.saturating_sub(2).max(1);
        match &entry.body {
            EntryBody::Text { text } => {
                let content_style = match entry.role {
                    Role::Error => self.theme.error_style(),
                    _ => self.theme.base_style(),
                };
                for wrapped in textwrap::wrap(text, content_width) {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", wrapped),
                        content_style,
                    )));
                }
            }
            EntryBody::Loading { label } => {
                lines.push(Line::from(Span::styled(
                    format!("  {} {}", self.spinner, label),
                    self.theme.warning_style(),
                )));
            }
            EntryBody::Table { table } => {
                lines.extend(self.table_lines(table));
            }
            EntryBody::FollowUps { questions } => {
                for (i, question) in questions.iter().enumerate() {
                    lines.push(Line::from(vec![
                        Span::styled(format!("  [{}] ", i + 1), self.theme.accent_style()),
                        Span::styled(question.clone(), self.theme.base_style()),
                    ]));
                }
                lines.push(Line::from(Span::styled(
                    "  press a number to ask".to_string(),
                    self.theme.dim_style(),
                )));
            }
        }

        lines.push(Line::from(""));
        lines
    }

    fn table_lines(&self, table: &TableView) -> Vec<Line<'static>> {
        let widths = column_widths(table);
        let mut lines = Vec::new();

        // Header row
        let mut spans = vec![Span::raw("  ")];
        for (i, column) in table.columns.iter().enumerate() {
            spans.push(Span::styled(
                fit(column, widths[i]),
                self.theme.accent_bold(),
            ));
            spans.push(Span::raw("  "));
        }
        lines.push(Line::from(spans));

        // Body rows, banded by index parity
        for (row_index, row) in table.rows.iter().enumerate() {
            let banded = row_index % 2 == 1;
            let row_style = if banded {
                self.theme.band_style()
            } else {
                self.theme.base_style()
            };
            let null_style = if banded {
                Style::default().fg(self.theme.dim).bg(self.theme.band_bg)
            } else {
                self.theme.dim_style()
            };

            let mut spans = vec![Span::raw("  ")];
            for (i, cell) in row.iter().enumerate() {
                let width = widths.get(i).copied().unwrap_or(0);
                match cell {
                    Cell::Null => spans.push(Span::styled(fit("–", width), null_style)),
                    Cell::Text { text } => spans.push(Span::styled(fit(text, width), row_style)),
                }
                spans.push(Span::styled("  ".to_string(), row_style));
            }
            lines.push(Line::from(spans));
        }

        lines.push(Line::from(Span::styled(
            format!("  {}", table.footer()),
            self.theme.dim_style(),
        )));
        lines
    }

    fn empty_state_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Ask a question about your data".to_string(),
                self.theme.accent_bold(),
            )),
            Line::from(""),
        ];
        if !self.examples.is_empty() {
            lines.push(Line::from(Span::styled(
                "  Try one of these:".to_string(),
                self.theme.dim_style(),
            )));
            for (i, example) in self.examples.iter().enumerate() {
                lines.push(Line::from(vec![
                    Span::styled(format!("  [{}] ", i + 1), self.theme.accent_style()),
                    Span::styled(example.clone(), self.theme.base_style()),
                ]));
            }
        }
        lines
    }
}

impl Widget for MessageLog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let visible: Vec<Line> = self
            .lines(area.width as usize)
            .into_iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();

        Paragraph::new(visible).render(area, buf);
    }
}

/// Column display widths: widest of header and cells, capped
fn column_widths(table: &TableView) -> Vec<usize> {
    let column_count = table
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(table.columns.len()))
        .max()
        .unwrap_or(0);

    (0..column_count)
        .map(|i| {
            let header = table.columns.get(i).map_or(0, |c| c.width());
            let cells = table
                .rows
                .iter()
                .map(|row| match row.get(i) {
                    Some(Cell::Text { text }) => text.width(),
                    Some(Cell::Null) => 1,
                    None => 0,
                })
                .max()
                .unwrap_or(0);
            header.max(cells).min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Pad or truncate text to an exact display width
fn fit(text: &str, width: usize) -> String {
    let text_width = text.width();
    if text_width <= width {
        let mut out = text.to_string();
        out.push_str(&" ".repeat(width - text_width));
        return out;
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width.saturating_sub(1) {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out.push_str(&" ".repeat(width.saturating_sub(used + 1)));
    out
}
