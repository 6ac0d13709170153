//! # butaman-dashboard
//!
//! A live terminal dashboard for the Butaman ping monitor.
//!
//! The backend exposes its whole state as one JSON document at
//! `GET <base>/api/state`: a map from target address to the target's name,
//! last successful check and recent RTT history. This crate keeps a local
//! copy of that document fresh and renders it as a colored table.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │ (tokens) │    │(render) │    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐    ┌─────────┐                                 │
//! │  │ source  │◀───│  sync   │◀── GET /api/state every 1s      │
//! │  │ (input) │    │(poller) │                                 │
//! │  └─────────┘    └─────────┘                                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`sync`]**: Background poller holding the latest snapshot behind an
//!   atomic swap
//! - **[`source`]**: Snapshot model and the [`DataSource`] trait, with live
//!   HTTP and saved-file implementations
//! - **[`data`]**: Pure rendering of snapshots into rows of glyph/color tokens
//! - **[`ui`]**: Terminal rendering using ratatui
//! - **[`config`]**: Backend URL from file, environment and CLI
//!
//! ## Usage
//!
//! ```bash
//! # Watch a backend
//! butaman-dashboard --url http://butaman-backend:8080
//!
//! # View a saved state document
//! butaman-dashboard --file state.json
//!
//! # One-shot export
//! butaman-dashboard --export table.json
//! ```
//!
//! ### Rendering a snapshot
//!
//! ```
//! use butaman_dashboard::{decode_snapshot, render_table};
//!
//! let snapshot = decode_snapshot(
//!     br#"{"10.0.0.1": {"name": "router", "last_success": "12:00:01", "history": [5, -1, 12]}}"#,
//! )
//! .unwrap();
//! let rows = render_table(&snapshot);
//! assert_eq!(rows[0].latest_label, "12ms");
//! assert_eq!(rows[0].history_glyphs(), "▁×▁");
//! ```
//!
//! ### Live polling in a TUI app
//!
//! ```no_run
//! use butaman_dashboard::{App, HttpSource, SyncClient};
//!
//! # tokio_test::block_on(async {
//! let handle = SyncClient::http("http://localhost:8080/api/state").unwrap().start();
//! let app = App::new(Box::new(HttpSource::new(handle)));
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod export;
pub mod source;
pub mod sync;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::DashboardConfig;
pub use data::{classify, render_row, render_table, ColorClass, Glyph, RowView, Token};
pub use source::{
    decode_snapshot, DataSource, FileSource, HttpSource, Rtt, Snapshot, TargetState, Timestamp,
};
pub use sync::{FetchError, SyncClient, SyncHandle};
