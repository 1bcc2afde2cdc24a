//! Terminal UI rendering using ratatui.
//!
//! The UI only reads the latest [`RenderState`](crate::view_model::RenderState)
//! held by the [`App`](crate::app::App); it never filters or pages on its own.
//!
//! ## Submodules
//!
//! - [`table`]: Units on the current page with banded battery levels
//! - [`detail`]: Modal overlay showing every field of one unit
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
//! │ Unit table (table::render)           │
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
pub mod table;
pub mod theme;

pub use theme::Theme;
