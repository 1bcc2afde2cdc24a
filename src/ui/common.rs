//! Common UI components.
//!
//! This module contains the header bar, status bar, and help overlay.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::BatteryBand;

/// Render the header bar with the fleet overview.
///
/// Displays: status indicator, online/offline counts, battery bands, source.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let state = &app.state;
    let bold = Style::default().add_modifier(Modifier::BOLD);
    if !state.has_data() {
        let line = Line::from(vec![
            Span::styled(" FLEETWATCH ", bold),
            Span::raw(format!(
                "| {} | Waiting for first snapshot...",
                app.source_description()
            )),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let summary = &state.summary;
    let status_style = app
        .theme
        .band_style(summary.worst_band().unwrap_or(BatteryBand::Nominal));

    let critical_style = app.theme.band_style(BatteryBand::Critical);
    let count = |n: usize, style: Style| {
        if n > 0 {
            Span::styled(n.to_string(), style)
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        }
    };

    let line = Line::from(vec![
        Span::styled(" ● ", status_style),
        Span::styled("FLEETWATCH ", bold),
        Span::raw("│ "),
        Span::styled(summary.total.to_string(), bold),
        Span::raw(" units "),
        count(summary.online, Style::default().fg(app.theme.nominal)),
        Span::raw(" online "),
        count(summary.offline, Style::default().fg(app.theme.offline)),
        Span::raw(" offline │ battery "),
        count(summary.warning, app.theme.band_style(BatteryBand::Warning)),
        Span::raw(" low "),
        count(summary.critical, critical_style),
        Span::raw(" crit │ "),
        Span::styled(
            app.source_description().to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows: page position, active filters, last fetch age, last error.
/// Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let state = &app.state;

    if let Some(ref err) = state.last_error {
        let age = state
            .fetched_at
            .map(|t| format!(" | data from {} ago", format_age(t)))
            .unwrap_or_default();
        let paragraph = Paragraph::new(format!(" Error: {}{} | q:quit", err, age))
            .style(Style::default().fg(app.theme.critical));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = if app.filter_active {
        "Type id filter | Enter:apply Esc:done"
    } else {
        "←→:page o:online +/-:battery /:id c:clear Enter:detail ?:help q:quit"
    };

    let status = match state.fetched_at {
        Some(fetched_at) => format!(
            " Page {}/{} | {} | Updated {} ago | {}",
            state.current_page,
            state.total_pages,
            filter_summary(app),
            format_age(fetched_at),
            controls,
        ),
        None => " Loading... | q:quit".to_string(),
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Describe the active filters, e.g. `online, ≥20%, id~"A7"`.
pub fn filter_summary(app: &App) -> String {
    let criteria = &app.state.criteria;
    if criteria.is_unrestricted() {
        return "no filters".to_string();
    }

    let mut parts = Vec::new();
    if criteria.online_state != crate::data::OnlineState::Any {
        parts.push(criteria.online_state.label().to_string());
    }
    if criteria.min_battery_pct > 0.0 {
        parts.push(format!("≥{:.0}%", criteria.min_battery_pct));
    }
    if !criteria.id_substring.is_empty() {
        parts.push(format!("id~\"{}\"", criteria.id_substring));
    }
    parts.join(", ")
}

/// Format the time since `t` (e.g. "4s", "2m").
pub fn format_age(t: DateTime<Utc>) -> String {
    let secs = (Utc::now() - t).num_seconds().max(0);
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        format!("{}h", secs / 3600)
    }
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the table.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ←/→ h/l     Previous/next page"),
        Line::from("  PgUp/PgDn   Previous/next page"),
        Line::from("  ↑/↓ j/k     Select unit"),
        Line::from("  Home/End    First/last row"),
        Line::from("  Enter       Unit detail"),
        Line::from(""),
        section(" Filters"),
        Line::from("  o         Cycle any/online/offline"),
        Line::from("  + / -     Min battery ±5%"),
        Line::from("  /         Edit id filter"),
        Line::from("  c         Clear filters"),
        Line::from(""),
        section(" General"),
        Line::from("  e         Export page to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 22u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
