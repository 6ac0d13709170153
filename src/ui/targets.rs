//! Targets table rendering.
//!
//! One row per monitored target: name, address, last success, latest RTT
//! and the colored history glyphs, newest first.

use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::{classify, RowView, Token};
use crate::source::Rtt;
use crate::ui::Theme;

/// Column to sort by in the targets table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    /// Sort by address, the table's natural order.
    #[default]
    Address,
    /// Sort by target name alphabetically.
    Name,
    /// Sort by latest RTT; unreachable after any RTT, no samples last.
    Latency,
}

impl SortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::Address => SortColumn::Name,
            SortColumn::Name => SortColumn::Latency,
            SortColumn::Latency => SortColumn::Address,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Address => "address",
            SortColumn::Name => "name",
            SortColumn::Latency => "rtt",
        }
    }
}

/// Render the targets table.
///
/// Selection and scroll offset are kept in `app.table_state` so mouse
/// clicks can be mapped back to rows.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let rows_visible = app.visible_rows();
    let visible_count = rows_visible.len();

    let header = Row::new(vec![
        Cell::from(format_header("Name", SortColumn::Name, app)),
        Cell::from(format_header("Address", SortColumn::Address, app)),
        Cell::from("Last Success"),
        Cell::from(format_header("RTT", SortColumn::Latency, app)),
        Cell::from("History"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = rows_visible
        .iter()
        .map(|(_, row)| {
            let latest_style = row
                .latest
                .map(|rtt| app.theme.token_style(classify(rtt).color))
                .unwrap_or_default();

            Row::new(vec![
                Cell::from(row.name.clone()),
                Cell::from(row.address.clone()),
                Cell::from(row.last_success.clone()),
                Cell::from(row.latest_label.clone()).style(latest_style),
                Cell::from(history_line(&row.history_tokens, &app.theme)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),    // Name
        Constraint::Fill(2),    // Address
        Constraint::Length(23), // Last Success
        Constraint::Length(7),  // RTT
        Constraint::Fill(3),    // History
    ];

    let selected_visual_index = app.selected_index.min(visible_count.saturating_sub(1));

    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    // Build title with filter info
    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    // Show scroll position if there are items
    let position_info = if visible_count > 0 {
        format!(" [{}/{}]", selected_visual_index + 1, visible_count)
    } else {
        String::new()
    };

    let title = format!(
        " Targets ({}/{}) [s:sort {}{}]{}{} ",
        visible_count,
        app.rows.len(),
        app.sort_column.label(),
        sort_dir,
        filter_info,
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let selected = (visible_count > 0).then_some(selected_visual_index);
    app.table_state.select(selected);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn format_header(name: &str, col: SortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// History tokens as styled glyphs separated by spaces.
pub fn history_line(tokens: &[Token], theme: &Theme) -> Line<'static> {
    let mut spans = Vec::with_capacity(tokens.len() * 2);
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            token.symbol.as_char().to_string(),
            theme.token_style(token.color),
        ));
    }
    if spans.is_empty() {
        spans.push(Span::styled("-", Style::default().add_modifier(Modifier::DIM)));
    }
    Line::from(spans)
}

/// Sort rows by the given column and direction.
pub fn sort_rows_by(rows: &mut [(usize, &RowView)], column: SortColumn, ascending: bool) {
    rows.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Address => a.1.address.cmp(&b.1.address),
            SortColumn::Name => a.1.name.cmp(&b.1.name),
            SortColumn::Latency => latency_rank(a.1).cmp(&latency_rank(b.1)),
        };

        // Apply direction to primary comparison
        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        // Use secondary sort by address for stability when primary values are equal
        if primary == Ordering::Equal {
            a.1.address.cmp(&b.1.address)
        } else {
            primary
        }
    });
}

fn latency_rank(row: &RowView) -> (u8, u64) {
    match row.latest {
        Some(Rtt::Millis(ms)) => (0, ms),
        Some(Rtt::Unreachable) => (1, 0),
        None => (2, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::render_table;
    use crate::source::decode_snapshot;

    fn rows() -> Vec<RowView> {
        let snapshot = decode_snapshot(
            br#"{
                "b": {"name": "same", "last_success": null, "history": []},
                "a": {"name": "same", "last_success": null, "history": [-1]},
                "c": {"name": "alpha", "last_success": null, "history": [30]}
            }"#,
        )
        .unwrap();
        render_table(&snapshot)
    }

    fn order(rows: &[RowView], column: SortColumn, ascending: bool) -> Vec<String> {
        let mut indexed: Vec<(usize, &RowView)> = rows.iter().enumerate().collect();
        sort_rows_by(&mut indexed, column, ascending);
        indexed.iter().map(|(_, r)| r.address.clone()).collect()
    }

    #[test]
    fn test_sort_column_cycle() {
        assert_eq!(SortColumn::default(), SortColumn::Address);
        assert_eq!(SortColumn::Address.next().next().next(), SortColumn::Address);
    }

    #[test]
    fn test_sort_orders() {
        let rows = rows();
        assert_eq!(order(&rows, SortColumn::Address, true), vec!["a", "b", "c"]);
        assert_eq!(order(&rows, SortColumn::Address, false), vec!["c", "b", "a"]);
        // Ties on name fall back to address
        assert_eq!(order(&rows, SortColumn::Name, true), vec!["c", "a", "b"]);
        assert_eq!(order(&rows, SortColumn::Latency, true), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_history_line_spacing() {
        let rows = render_table(
            &decode_snapshot(br#"{"h": {"name": "n", "last_success": null, "history": [5, -1, 150]}}"#)
                .unwrap(),
        );
        let line = history_line(&rows[0].history_tokens, &Theme::dark());
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "█ × ▁");

        let empty = history_line(&[], &Theme::dark());
        assert_eq!(empty.spans.len(), 1);
    }
}
