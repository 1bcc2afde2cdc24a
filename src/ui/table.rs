//! Unit table rendering.
//!
//! Displays the units on the current page with their banded battery level,
//! CPU, RAM, last update and location.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::view_model::UnitView;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render the current page of units.
///
/// Returns the index of the first visible row, which scrolls when the area is
/// shorter than the page.
pub fn render(frame: &mut Frame, app: &App, area: Rect) -> usize {
    let state = &app.state;

    let block = Block::default()
        .title(title(app))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if state.units.is_empty() {
        let message = if !state.has_data() {
            "  Waiting for telemetry..."
        } else if state.total == 0 {
            "  The fleet reported no units"
        } else {
            "  No units match the current filters"
        };
        frame.render_widget(Paragraph::new(message).block(block), area);
        return 0;
    }

    let header = Row::new(vec![
        Cell::from("Unit"),
        Cell::from("Status"),
        Cell::from("Battery"),
        Cell::from("CPU"),
        Cell::from("RAM"),
        Cell::from("Updated"),
        Cell::from("Location"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = state.units.iter().map(|view| unit_row(app, view)).collect();

    let widths = [
        Constraint::Fill(3),    // Unit
        Constraint::Length(8),  // Status
        Constraint::Length(12), // Battery
        Constraint::Length(7),  // CPU
        Constraint::Length(9),  // RAM
        Constraint::Length(20), // Updated
        Constraint::Fill(2),    // Location
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut table_state = TableState::default()
        .with_offset(app.table_offset)
        .with_selected(Some(app.selected_index));

    frame.render_stateful_widget(table, area, &mut table_state);
    table_state.offset()
}

fn unit_row<'a>(app: &App, view: &'a UnitView) -> Row<'a> {
    let unit = &view.unit;
    let display = &view.display;

    let status = if unit.online { "online" } else { "offline" };
    let updated = unit.last_updated_at.format(TIMESTAMP_FORMAT).to_string();

    Row::new(vec![
        Cell::from(unit.id.as_str()),
        Cell::from(status),
        Cell::from(Span::styled(
            format!(
                "{:>5.1}% {}",
                unit.battery_pct,
                display.battery_band.symbol()
            ),
            app.theme.band_style(display.battery_band),
        )),
        Cell::from(format!("{:>5.1}%", unit.cpu_pct)),
        Cell::from(format_ram(unit.ram_usage)),
        Cell::from(updated),
        Cell::from(format!(
            "{:.4}, {:.4}",
            unit.location.latitude, unit.location.longitude
        )),
    ])
    .style(app.theme.row_style(display.highlight))
}

fn title(app: &App) -> String {
    let state = &app.state;

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !state.criteria.id_substring.is_empty() {
        format!(" /{}/ [c:clear]", state.criteria.id_substring)
    } else {
        String::new()
    };

    format!(
        " Units ({}/{}) [{}] page {}/{}{} ",
        state.matching,
        state.total,
        state.criteria.online_state.label(),
        state.current_page,
        state.total_pages,
        filter_info,
    )
}

/// Format RAM consumption given in megabytes (e.g. 2048 -> "2.0G").
pub fn format_ram(mb: f64) -> String {
    if mb >= 1024.0 {
        format!("{:.1}G", mb / 1024.0)
    } else {
        format!("{:.0}M", mb)
    }
}
