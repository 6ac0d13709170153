//! Detail overlay rendering.
//!
//! Displays a modal overlay with the selected target's state, aggregate
//! statistics and its full history, newest sample first.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::table::NO_TIMESTAMP;
use crate::data::{classify, HistoryStats};

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Render the target detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let (Some(row), Some(target)) = (app.selected_row(), app.selected_target()) else {
        return;
    };

    let overlay_width = (area.width * 80 / 100).clamp(MIN_OVERLAY_WIDTH, 90);
    let overlay_height = (area.height * 90 / 100).clamp(MIN_OVERLAY_HEIGHT, 50);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(7), // Target info and stats
        Constraint::Min(5),    // History table
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    // ===== HEADER SECTION =====
    let stats = HistoryStats::from_history(&target.history);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let last_update = target
        .last_update
        .as_ref()
        .map(|ts| ts.display())
        .unwrap_or_else(|| NO_TIMESTAMP.to_string());
    let latest_style = row
        .latest
        .map(|rtt| app.theme.token_style(classify(rtt).color))
        .unwrap_or_default();

    let header_lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", row.name), bold),
            Span::raw(format!(" {}", row.address)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw(" Last success: "),
            Span::styled(row.last_success.clone(), bold),
            Span::raw("    Last update: "),
            Span::styled(last_update, bold),
        ]),
        Line::from(vec![
            Span::raw(" Latest: "),
            Span::styled(row.latest_label.clone(), latest_style.add_modifier(Modifier::BOLD)),
            Span::raw("    Min/Avg/Max: "),
            Span::styled(format_stats(&stats), bold),
            Span::raw("    Loss: "),
            Span::styled(
                format!("{}/{} ({:.0}%)", stats.lost, stats.samples, stats.loss_percent()),
                bold,
            ),
        ]),
        Line::from(vec![Span::raw(" "), Span::raw(row.history_glyphs())]),
    ];

    let header_block = Block::default()
        .title(" Target Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Paragraph::new(header_lines).block(header_block), chunks[0]);

    // ===== HISTORY TABLE =====
    let history_block = Block::default()
        .title(format!(" History ({}) ", target.history.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if target.history.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No samples yet",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .block(history_block);
        frame.render_widget(empty, chunks[1]);
    } else {
        let header = Row::new(vec![
            Cell::from("#"),
            Cell::from(""),
            Cell::from("RTT"),
            Cell::from("Class"),
        ])
        .height(1)
        .style(app.theme.header);

        let rows: Vec<Row> = target
            .history
            .iter()
            .rev()
            .enumerate()
            .map(|(age, &sample)| {
                let token = classify(sample);
                let style = app.theme.token_style(token.color);
                Row::new(vec![
                    Cell::from(age.to_string()),
                    Cell::from(token.symbol.as_char().to_string()).style(style),
                    Cell::from(sample.to_string()).style(style),
                    Cell::from(token.color.label()),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(5),
            Constraint::Length(2),
            Constraint::Length(8),
            Constraint::Fill(1),
        ];

        let table = Table::new(rows, widths).header(header).block(history_block);
        frame.render_widget(table, chunks[1]);
    }

    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " Press Esc to close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[2]);
}

fn format_stats(stats: &HistoryStats) -> String {
    match (stats.min, stats.avg, stats.max) {
        (Some(min), Some(avg), Some(max)) => format!("{}/{:.1}/{}ms", min, avg, max),
        _ => "-".to_string(),
    }
}
