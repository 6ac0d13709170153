//! Terminal UI rendering using ratatui.
//!
//! ## Submodules
//!
//! - [`targets`]: Main table, one row per monitored target
//! - [`detail`]: Modal overlay with per-target history and statistics
//! - [`common`]: Shared components (header, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ Targets table (targets::render)      │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - detail::render_overlay
//!    - common::render_help
//! ```

pub mod common;
pub mod detail;
pub mod targets;
pub mod theme;

pub use targets::SortColumn;
pub use theme::Theme;
