//! Application state and navigation logic.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use ratatui::widgets::TableState;

use crate::data::{render_table, RowView, TableSummary};
use crate::export::write_export;
use crate::source::{DataSource, Snapshot, TargetState};
use crate::ui::targets::{sort_rows_by, SortColumn};
use crate::ui::Theme;

/// How long a status message stays in the status bar.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub snapshot: Option<Arc<Snapshot>>,
    pub rows: Vec<RowView>,
    pub last_updated: Option<Instant>,
    pub load_error: Option<String>,

    // Navigation state
    pub selected_index: usize,
    /// Scroll state of the targets table as of the last draw.
    pub table_state: TableState,

    // Sorting
    pub sort_column: SortColumn,
    pub sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App reading from `source`, with an auto-detected theme.
    pub fn new(source: Box<dyn DataSource>) -> Self {
        Self::with_theme(source, Theme::auto_detect())
    }

    /// Create a new App with an explicit theme.
    pub fn with_theme(source: Box<dyn DataSource>, theme: Theme) -> Self {
        Self {
            running: true,
            show_help: false,
            show_detail_overlay: false,
            source,
            snapshot: None,
            rows: Vec::new(),
            last_updated: None,
            load_error: None,
            selected_index: 0,
            table_state: TableState::default(),
            sort_column: SortColumn::default(),
            sort_ascending: true,
            filter_text: String::new(),
            filter_active: false,
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Poll the data source for new data.
    ///
    /// Returns `true` if a new snapshot was applied. Source errors are kept
    /// for the status bar; the rows on screen stay as they were.
    pub fn reload_data(&mut self) -> bool {
        let polled = self.source.poll();
        self.load_error = self.source.error().map(str::to_string);

        let Some(snapshot) = polled else {
            return false;
        };

        self.rows = render_table(&snapshot);
        self.snapshot = Some(snapshot);
        self.last_updated = Some(Instant::now());

        // Clamp selection to the new row count
        let count = self.visible_rows().len();
        if self.selected_index >= count {
            self.selected_index = count.saturating_sub(1);
        }
        true
    }

    /// Summary counts over all rows.
    pub fn summary(&self) -> TableSummary {
        TableSummary::from_rows(&self.rows)
    }

    /// Rows after filtering and sorting, paired with their index in `rows`.
    pub fn visible_rows(&self) -> Vec<(usize, &RowView)> {
        let mut rows: Vec<(usize, &RowView)> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| self.matches_filter(row))
            .collect();
        sort_rows_by(&mut rows, self.sort_column, self.sort_ascending);
        rows
    }

    /// The row under the cursor.
    pub fn selected_row(&self) -> Option<&RowView> {
        self.visible_rows()
            .get(self.selected_index)
            .map(|(_, row)| *row)
    }

    /// Raw state of the selected target from the current snapshot.
    pub fn selected_target(&self) -> Option<&TargetState> {
        let row = self.selected_row()?;
        self.snapshot.as_ref()?.get(&row.address)
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.visible_rows().len().saturating_sub(1);
        self.selected_index = (self.selected_index + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_index = self.selected_index.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.selected_index = self.visible_rows().len().saturating_sub(1);
    }

    /// Select a row by its position in the visible list, if it exists.
    pub fn select_visual(&mut self, index: usize) {
        if index < self.visible_rows().len() {
            self.selected_index = index;
        }
    }

    /// Open the detail overlay for the selected target.
    pub fn enter_detail(&mut self) {
        if self.selected_row().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close the detail overlay, else clear the filter.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
        } else if !self.filter_text.is_empty() {
            self.clear_filter();
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column.
    pub fn cycle_sort(&mut self) {
        self.sort_column = self.sort_column.next();
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        self.sort_ascending = !self.sort_ascending;
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.selected_index = 0;
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Check if a row matches the current filter (name or address).
    pub fn matches_filter(&self, row: &RowView) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        let search = self.filter_text.to_lowercase();
        row.name.to_lowercase().contains(&search) || row.address.to_lowercase().contains(&search)
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current table to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        if self.snapshot.is_none() {
            bail!("No data to export");
        }
        write_export(path, &self.rows)
    }
}
