//! View state container.
//!
//! The [`ViewModel`] owns the latest snapshot, the filter criteria and the
//! page state. Every change recomputes filter → page → display attributes
//! in one step and publishes an immutable [`RenderState`] to subscribers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use crate::data::{
    derive, filter, paginate, BandThresholds, DisplayAttributes, FilterCriteria, FleetSummary,
    OnlineState, PageState, Snapshot, Unit,
};
use crate::poller::PollEvent;
use crate::source::FetchError;

/// A unit on the current page together with its derived attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitView {
    #[serde(flatten)]
    pub unit: Unit,
    pub display: DisplayAttributes,
}

/// Everything the rendering layer needs, published on each recomputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderState {
    /// Units on the current page, in snapshot order.
    pub units: Vec<UnitView>,
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
    /// Number of units passing the filter.
    pub matching: usize,
    /// Number of units in the snapshot.
    pub total: usize,
    pub summary: FleetSummary,
    pub criteria: FilterCriteria,
    pub fetched_at: Option<DateTime<Utc>>,
    /// Most recent retrieval failure since the last successful snapshot.
    pub last_error: Option<String>,
    /// Incremented on every publication.
    pub revision: u64,
}

impl RenderState {
    fn empty(page_size: usize) -> Self {
        Self {
            units: Vec::new(),
            total_pages: 1,
            current_page: 1,
            page_size,
            matching: 0,
            total: 0,
            summary: FleetSummary::default(),
            criteria: FilterCriteria::default(),
            fetched_at: None,
            last_error: None,
            revision: 0,
        }
    }

    /// Returns true once a snapshot has been applied.
    pub fn has_data(&self) -> bool {
        self.fetched_at.is_some()
    }
}

/// Holds view state and publishes render-ready output.
#[derive(Debug)]
pub struct ViewModel {
    snapshot: Option<Snapshot>,
    criteria: FilterCriteria,
    page: PageState,
    thresholds: BandThresholds,
    last_error: Option<String>,
    revision: u64,
    publisher: watch::Sender<Arc<RenderState>>,
}

impl ViewModel {
    /// Create an empty view model.
    pub fn new(page_size: usize, thresholds: BandThresholds) -> Self {
        let page = PageState::new(page_size);
        let (publisher, _) = watch::channel(Arc::new(RenderState::empty(page.page_size())));
        Self {
            snapshot: None,
            criteria: FilterCriteria::default(),
            page,
            thresholds,
            last_error: None,
            revision: 0,
            publisher,
        }
    }

    /// Subscribe to render state updates.
    pub fn subscribe(&self) -> watch::Receiver<Arc<RenderState>> {
        self.publisher.subscribe()
    }

    /// The most recently published render state.
    pub fn current(&self) -> Arc<RenderState> {
        self.publisher.borrow().clone()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn thresholds(&self) -> &BandThresholds {
        &self.thresholds
    }

    /// Replace the snapshot wholesale.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshot = Some(snapshot);
        self.last_error = None;
        self.recompute();
    }

    /// Record a failed cycle. The current snapshot is kept.
    pub fn record_failure(&mut self, error: &FetchError) {
        self.last_error = Some(error.to_string());
        self.recompute();
    }

    /// Apply an event from the poller.
    pub fn apply_event(&mut self, event: PollEvent) {
        match event {
            PollEvent::Snapshot(snapshot) => self.apply_snapshot(snapshot),
            PollEvent::Failed(error) => self.record_failure(&error),
        }
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.recompute();
    }

    pub fn set_online_state(&mut self, state: OnlineState) {
        self.criteria.online_state = state;
        self.recompute();
    }

    /// Cycle the online filter Any → Online → Offline.
    pub fn cycle_online_state(&mut self) {
        self.set_online_state(self.criteria.online_state.next());
    }

    pub fn set_min_battery(&mut self, min_battery_pct: f64) {
        self.criteria.min_battery_pct = min_battery_pct;
        self.recompute();
    }

    pub fn set_id_substring(&mut self, id_substring: impl Into<String>) {
        self.criteria.id_substring = id_substring.into();
        self.recompute();
    }

    /// Request a page (1-based). Out-of-range values clamp.
    pub fn set_page(&mut self, page: usize) {
        self.page.current_page = page;
        self.recompute();
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page.current_page.saturating_add(1));
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.current_page.saturating_sub(1));
    }

    /// Recompute and publish. Called after every state change.
    fn recompute(&mut self) {
        let state = self.render();
        self.page.current_page = state.current_page;
        debug!(
            revision = state.revision,
            matching = state.matching,
            page = state.current_page,
            "view recomputed"
        );
        self.publisher.send_replace(Arc::new(state));
    }

    fn render(&mut self) -> RenderState {
        self.revision += 1;
        let units: &[Unit] = self.snapshot.as_ref().map_or(&[], |s| s.units.as_slice());

        let matching = filter::apply(units, &self.criteria);
        let page = paginate(&matching, self.page.page_size(), self.page.current_page);

        let page_units = page
            .items
            .iter()
            .map(|unit| UnitView {
                unit: (*unit).clone(),
                display: derive(unit, &self.thresholds),
            })
            .collect();

        RenderState {
            units: page_units,
            total_pages: page.total_pages,
            current_page: page.effective_page,
            page_size: self.page.page_size(),
            matching: matching.len(),
            total: units.len(),
            summary: FleetSummary::from_units(units, &self.thresholds),
            criteria: self.criteria.clone(),
            fetched_at: self.snapshot.as_ref().map(|s| s.fetched_at),
            last_error: self.last_error.clone(),
            revision: self.revision,
        }
    }
}
