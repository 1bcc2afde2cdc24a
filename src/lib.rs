// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # fleetwatch
//!
//! A terminal dashboard and library for watching a fleet of robots through
//! a telemetry endpoint.
//!
//! The library periodically retrieves unit telemetry, normalizes the wire
//! records into a canonical model, applies user-selected filters, paginates
//! the result and derives presentation attributes such as battery bands.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  ┌─────────┐  PollEvent  ┌────────────┐ RenderState ┌─────────┐  │
//! │  │ poller  │────────────▶│ view_model │────────────▶│ app/ui  │  │
//! │  └────┬────┘   (mpsc)    └─────┬──────┘  (watch)    └─────────┘  │
//! │       │                        │                                 │
//! │       ▼                        ▼                                 │
//! │  ┌─────────┐            ┌────────────┐                           │
//! │  │ source  │            │    data    │ normalize, filter,        │
//! │  │ (input) │            │            │ paginate, derive          │
//! │  └─────────┘            └────────────┘                           │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: Retrieval abstraction ([`TelemetrySource`] trait) with
//!   HTTP and file implementations
//! - **[`data`]**: Pure data layer - normalization, filtering, pagination,
//!   derived display attributes and fleet summary
//! - **[`poller`]**: Fixed-interval retrieval loop with at most one request
//!   in flight and cooperative cancellation
//! - **[`view_model`]**: Owns the snapshot and view settings, publishes
//!   [`RenderState`] on every change
//! - **[`config`]**: Layered [`Settings`]
//! - **[`app`]**, **[`events`]**, **[`ui`]**: The ratatui front end
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the backend at the default address
//! fleetwatch --endpoint http://localhost:8000
//!
//! # Replay a captured response
//! fleetwatch --file robots.json
//!
//! # Write the first page of online units to a file and exit
//! fleetwatch --online online --export page.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use fleetwatch::data::{BandThresholds, OnlineState};
//! use fleetwatch::{snapshot_from_records, ViewModel};
//! use serde_json::json;
//!
//! let records = vec![
//!     json!({
//!         "robot_id": "robot_1",
//!         "online_status": true,
//!         "battery_percentage": 12,
//!         "cpu_usage": 40,
//!         "ram_consumption": 2048,
//!         "last_updated": "2024-12-12T11:00:00",
//!         "location_coordinates": [34.05, -118.24]
//!     }),
//!     json!({ "robot_id": "broken" }),
//! ];
//!
//! let snapshot = snapshot_from_records(&records);
//! assert_eq!(snapshot.len(), 1);
//! assert_eq!(snapshot.dropped, 1);
//!
//! let mut view = ViewModel::new(10, BandThresholds::default());
//! view.apply_snapshot(snapshot);
//! view.set_online_state(OnlineState::Online);
//!
//! let state = view.current();
//! assert_eq!(state.units.len(), 1);
//! assert_eq!(state.units[0].display.battery_band.symbol(), "CRIT");
//! ```
//!
//! ### Polling in the background
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use fleetwatch::data::BandThresholds;
//! use fleetwatch::{HttpSource, Poller, ViewModel};
//! use tokio::sync::mpsc;
//!
//! # tokio_test::block_on(async {
//! let source = HttpSource::builder().endpoint("http://localhost:8000").build().unwrap();
//! let (tx, mut rx) = mpsc::channel(16);
//! let handle = Poller::builder()
//!     .interval(Duration::from_secs(5))
//!     .build(Arc::new(source))
//!     .spawn(tx);
//!
//! let mut view = ViewModel::new(10, BandThresholds::default());
//! if let Some(event) = rx.recv().await {
//!     view.apply_event(event);
//! }
//! handle.stop();
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod poller;
pub mod source;
pub mod ui;
pub mod view_model;

// Re-export main types for convenience
pub use app::App;
pub use config::{Settings, SettingsError};
pub use data::{
    BandThresholds, BatteryBand, DisplayAttributes, FilterCriteria, FleetSummary, OnlineState,
    Snapshot, Unit,
};
pub use poller::{snapshot_from_records, PollEvent, Poller, PollerHandle, PollerState};
pub use source::{FetchError, FileSource, HttpSource, TelemetrySource};
pub use view_model::{RenderState, UnitView, ViewModel};
