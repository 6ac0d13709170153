//! Snapshot processing for display.
//!
//! This module turns a decoded [`Snapshot`](crate::source::Snapshot) into
//! rows the UI and the exporter can render. Nothing here performs I/O or
//! keeps state between calls.
//!
//! ## Submodules
//!
//! - [`rtt`]: Classification of RTT samples into glyph + color tokens
//! - [`table`]: Row rendering ([`RowView`]), table ordering, and summaries
//!
//! ## Data Flow
//!
//! ```text
//! Snapshot (decoded JSON)
//!        │
//!        ▼
//! render_table()
//!        │
//!        └──▶ RowView per target (history → classify() → Token, newest first)
//! ```

pub mod rtt;
pub mod table;

pub use rtt::{classify, ColorClass, Glyph, Token};
pub use table::{render_row, render_table, HistoryStats, RowView, TableSummary};
