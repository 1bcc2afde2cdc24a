//! Data models and pure processing for fleet snapshots.
//!
//! This module turns raw wire records into canonical units and derives
//! everything the view needs from them. Nothing here performs I/O.
//!
//! ## Submodules
//!
//! - [`unit`]: Canonical model ([`Unit`], [`Location`], [`Snapshot`])
//! - [`normalize`]: Wire record → [`Unit`] conversion with per-record failures
//! - [`filter`]: [`FilterCriteria`] predicate over units
//! - [`page`]: Deterministic pagination ([`paginate`], [`PageState`])
//! - [`band`]: Battery bands and other display attributes
//! - [`summary`]: Fleet-wide counts ([`FleetSummary`])
//!
//! ## Data Flow
//!
//! ```text
//! Vec<serde_json::Value> (raw batch)
//!        │
//!        ▼
//! normalize_batch()  ──▶ Snapshot (units in endpoint order)
//!        │
//!        ▼
//! filter::apply() ──▶ paginate() ──▶ band::derive()
//! ```

pub mod band;
pub mod filter;
pub mod normalize;
pub mod page;
pub mod summary;
pub mod unit;

pub use band::{derive, BandThresholds, BatteryBand, DisplayAttributes, RowHighlight};
pub use filter::{FilterCriteria, OnlineState};
pub use normalize::{normalize, normalize_batch, MalformedRecord, NormalizedBatch, Rejected};
pub use page::{paginate, Page, PageState, DEFAULT_PAGE_SIZE};
pub use summary::FleetSummary;
pub use unit::{Location, Snapshot, Unit};
