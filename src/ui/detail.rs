//! Detail overlay rendering.
//!
//! Displays a modal overlay with every field of the selected unit.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::common::format_age;
use crate::ui::table::format_ram;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 44;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 14;

/// Render the unit detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(view) = app.selected_unit() else {
        return;
    };
    let unit = &view.unit;
    let display = &view.display;

    let overlay_width = (area.width * 80 / 100).clamp(MIN_OVERLAY_WIDTH, 72);
    let overlay_height = MIN_OVERLAY_HEIGHT;
    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(format!(" {} ", unit.id))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(8), // Fields
        Constraint::Length(1), // CPU gauge
        Constraint::Min(1),
        Constraint::Length(1), // Footer
    ])
    .split(inner);

    let label = |s: &'static str| Span::styled(s, Style::default().add_modifier(Modifier::DIM));
    let band_style = app.theme.band_style(display.battery_band);
    let ram = format!("{} ({:.0} MB)", format_ram(unit.ram_usage), unit.ram_usage);

    let lines = vec![
        Line::from(vec![
            label(" Status:   "),
            if unit.online {
                Span::styled("online", Style::default().fg(app.theme.nominal))
            } else {
                Span::styled("offline", Style::default().fg(app.theme.offline))
            },
        ]),
        Line::from(vec![
            label(" Battery:  "),
            Span::styled(
                format!(
                    "{:.1}% ({})",
                    unit.battery_pct,
                    display.battery_band.symbol()
                ),
                band_style.add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            label(" CPU:      "),
            Span::raw(format!("{:.1}%", unit.cpu_pct)),
        ]),
        Line::from(vec![label(" RAM:      "), Span::raw(ram)]),
        Line::from(vec![
            label(" Location: "),
            Span::raw(format!(
                "{:.6}, {:.6}",
                unit.location.latitude, unit.location.longitude
            )),
        ]),
        Line::from(vec![
            label(" Updated:  "),
            Span::raw(format!(
                "{} ({} ago)",
                unit.last_updated_at.to_rfc3339(),
                format_age(unit.last_updated_at)
            )),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), chunks[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(app.theme.highlight))
        .ratio(display.cpu_gauge)
        .label(format!("CPU {:.0}%", display.cpu_gauge * 100.0));
    frame.render_widget(gauge, chunks[1]);

    let footer = Paragraph::new(" ↑/↓:unit  Esc:close")
        .style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(footer, chunks[3]);
}
