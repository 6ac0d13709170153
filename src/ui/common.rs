//! Common UI components shared across views.
//!
//! This module contains the header bar, status bar, and help overlay.

use std::time::Duration;

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::ColorClass;

/// Data older than this is flagged as stale in the status bar.
const STALE_AFTER: Duration = Duration::from_secs(5);

/// Render the header bar with target counts.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    if app.snapshot.is_none() {
        let line = Line::from(vec![
            Span::styled(" BUTAMAN ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Waiting for first snapshot..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let summary = app.summary();

    let status_style = if summary.down > 0 {
        app.theme.token_style(ColorClass::Slow)
    } else if summary.pending > 0 {
        app.theme.token_style(ColorClass::Medium)
    } else {
        app.theme.token_style(ColorClass::Fast)
    };

    let dim = Style::default().add_modifier(Modifier::DIM);

    let line = Line::from(vec![
        Span::styled(" ● ", status_style),
        Span::styled("BUTAMAN ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(
            summary.up.to_string(),
            Style::default().fg(app.theme.fast),
        ),
        Span::raw(" up "),
        if summary.down > 0 {
            Span::styled(
                summary.down.to_string(),
                Style::default().fg(app.theme.slow).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", dim)
        },
        Span::raw(" down "),
        if summary.pending > 0 {
            Span::styled(summary.pending.to_string(), Style::default().fg(app.theme.neutral))
        } else {
            Span::styled("0", dim)
        },
        Span::raw(" pending │ "),
        Span::styled(
            summary.total.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" targets"),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows the source, time since last update, and available controls.
/// Temporary status messages take precedence; a failing source is shown
/// next to the age of the data still on screen.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = if app.filter_active {
        "Type to search | Enter:apply Esc:cancel"
    } else {
        "/:search s:sort Enter:detail ?:help q:quit"
    };

    let (status, style) = match (app.last_updated, &app.load_error) {
        (Some(updated), Some(err)) => (
            format!(
                " {} | Stale {:.0}s: {} | {}",
                app.source_description(),
                updated.elapsed().as_secs_f64(),
                err,
                controls
            ),
            Style::default().fg(app.theme.medium),
        ),
        (Some(updated), None) => {
            let elapsed = updated.elapsed();
            let style = if elapsed > STALE_AFTER {
                Style::default().fg(app.theme.medium)
            } else {
                Style::default().add_modifier(Modifier::DIM)
            };
            (
                format!(
                    " {} | Updated {:.1}s ago | {}",
                    app.source_description(),
                    elapsed.as_secs_f64(),
                    controls
                ),
                style,
            )
        }
        (None, Some(err)) => (
            format!(" {} | Error: {} | q:quit r:retry", app.source_description(), err),
            Style::default().fg(app.theme.slow),
        ),
        (None, None) => (
            format!(" {} | Waiting for first snapshot... | q:quit", app.source_description()),
            Style::default().add_modifier(Modifier::DIM),
        ),
    };

    frame.render_widget(Paragraph::new(status).style(style), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(" Navigation", bold)]),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Target detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        Line::from(vec![Span::styled(" Table", bold)]),
        Line::from("  /         Start filter/search"),
        Line::from("  c         Clear filter"),
        Line::from("  s         Cycle sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from(""),
        Line::from(vec![Span::styled(" General", bold)]),
        Line::from("  r         Refresh now"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 23u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
