//! Application state and interaction logic for the TUI.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tracing::warn;

use crate::poller::PollEvent;
use crate::ui::Theme;
use crate::view_model::{RenderState, UnitView, ViewModel};

/// Step applied by the `+`/`-` keys to the minimum battery filter.
pub const BATTERY_STEP: f64 = 5.0;

/// How long a status message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    view: ViewModel,
    updates: watch::Receiver<Arc<RenderState>>,
    events: Option<mpsc::Receiver<PollEvent>>,
    source_description: String,

    /// Latest render state received from the view model.
    pub state: Arc<RenderState>,

    /// Row selected on the current page.
    pub selected_index: usize,
    /// First page row visible in the table after the last draw.
    pub table_offset: usize,

    // Id filter input
    pub filter_text: String,
    pub filter_active: bool,

    pub theme: Theme,
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App around a view model.
    pub fn new(view: ViewModel, source_description: impl Into<String>) -> Self {
        let updates = view.subscribe();
        let state = view.current();
        let filter_text = view.criteria().id_substring.clone();
        Self {
            running: true,
            show_help: false,
            show_detail_overlay: false,
            view,
            updates,
            events: None,
            source_description: source_description.into(),
            state,
            selected_index: 0,
            table_offset: 0,
            filter_text,
            filter_active: false,
            theme: Theme::dark(),
            status_message: None,
        }
    }

    /// Attach the receiving end of a poller's event channel.
    pub fn with_events(mut self, events: mpsc::Receiver<PollEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Returns a description of the telemetry source.
    pub fn source_description(&self) -> &str {
        &self.source_description
    }

    pub fn view_model(&self) -> &ViewModel {
        &self.view
    }

    /// Apply every poll event received since the last call.
    ///
    /// Returns the number of events applied.
    pub fn drain_events(&mut self) -> usize {
        let Some(events) = self.events.as_mut() else {
            return 0;
        };

        let mut applied = 0;
        loop {
            match events.try_recv() {
                Ok(event) => {
                    self.view.apply_event(event);
                    applied += 1;
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    warn!("poller stopped delivering events");
                    self.events = None;
                    self.set_status_message("Polling stopped".to_string());
                    break;
                }
            }
        }
        if applied > 0 {
            self.refresh();
        }
        applied
    }

    /// Pull the latest render state from the subscription.
    pub fn refresh(&mut self) {
        if self.updates.has_changed().unwrap_or(false) {
            self.state = self.updates.borrow_and_update().clone();
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let max = self.state.units.len().saturating_sub(1);
        self.selected_index = self.selected_index.min(max);
        self.table_offset = self.table_offset.min(self.selected_index);
        if self.state.units.is_empty() {
            self.show_detail_overlay = false;
        }
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_TTL => Some(msg),
            _ => None,
        }
    }

    /// The unit under the selection cursor.
    pub fn selected_unit(&self) -> Option<&UnitView> {
        self.state.units.get(self.selected_index)
    }

    pub fn select_next(&mut self) {
        let max = self.state.units.len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max);
    }

    pub fn select_prev(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.state.units.len().saturating_sub(1);
    }

    pub fn next_page(&mut self) {
        let before = self.state.current_page;
        self.view.next_page();
        self.refresh();
        if self.state.current_page != before {
            self.selected_index = 0;
        }
    }

    pub fn prev_page(&mut self) {
        let before = self.state.current_page;
        self.view.prev_page();
        self.refresh();
        if self.state.current_page != before {
            self.selected_index = 0;
        }
    }

    /// Cycle the online filter Any → Online → Offline.
    pub fn cycle_online_filter(&mut self) {
        self.view.cycle_online_state();
        self.refresh();
    }

    pub fn raise_min_battery(&mut self) {
        let raised = self.view.criteria().min_battery_pct + BATTERY_STEP;
        self.view.set_min_battery(raised.min(100.0));
        self.refresh();
    }

    pub fn lower_min_battery(&mut self) {
        let lowered = self.view.criteria().min_battery_pct - BATTERY_STEP;
        self.view.set_min_battery(lowered.max(0.0));
        self.refresh();
    }

    /// Enter id filter input mode.
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit input mode, keeping the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Append a character to the id filter. Applied as it is typed.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.apply_id_filter();
    }

    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
        self.apply_id_filter();
    }

    fn apply_id_filter(&mut self) {
        self.view.set_id_substring(self.filter_text.clone());
        self.refresh();
    }

    /// Reset every filter to its unrestricted value.
    pub fn clear_filters(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
        self.view.set_criteria(Default::default());
        self.refresh();
    }

    pub fn enter_detail(&mut self) {
        if self.selected_unit().is_some() {
            self.show_detail_overlay = true;
        }
    }

    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Write the current render state as pretty JSON.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        if !self.state.has_data() {
            anyhow::bail!("No data to export");
        }
        write_render_state(&self.state, path)
    }
}

/// Serialize a render state to `path`.
pub fn write_render_state(state: &RenderState, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}
