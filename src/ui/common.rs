//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use chrono::Local;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};

/// Render the header bar: title, alarm state, live values, and the clock.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.monitor.state();
    let now = Local::now();

    let front = app
        .monitor
        .front()
        .map_or("---".to_string(), |v| format!("{v:.3}"));
    let rear = app
        .monitor
        .rear()
        .map_or("---".to_string(), |v| format!("{v:.3}"));

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.state_style(state)),
        Span::styled("PRESSWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(state.label(), app.theme.state_style(state)),
        Span::raw(" │ F: "),
        Span::styled(front, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" MPa  R: "),
        Span::styled(rear, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" MPa │ "),
        Span::raw(now.format("%Y-%m-%d %H:%M:%S").to_string()),
        Span::raw(" │ "),
        Span::styled(
            app.source_description().to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![
        Line::from(" 1:Dashboard "),
        Line::from(" 2:History "),
        Line::from(" 3:Logs "),
    ];

    let selected = match app.current_view {
        View::Dashboard => 0,
        View::History => 1,
        View::Logs => 2,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows context-sensitive controls plus temporary status messages and
/// the latest poll error, if any.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Temporary status message wins
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref err) = app.load_error {
        format!(" Poll error: {} (showing last values) | q:quit", err)
    } else {
        let controls = match app.current_view {
            View::Dashboard => "d:dismiss-alarm Tab:switch ?:help q:quit",
            View::History => "[/]:start {/}:end t:today g:refetch e:export-csv ?:help q:quit",
            View::Logs => "c:clear-error-log Tab:switch ?:help q:quit",
        };
        let updated = match app.monitor.last_reading_at() {
            Some(ts) => format!(
                "Updated {}",
                ts.with_timezone(&Local).format("%H:%M:%S")
            ),
            None => "Waiting for data".to_string(),
        };
        format!(" {} | {} | {}", app.current_view.label(), updated, controls)
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  Tab/1/2/3   Switch views"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Dashboard",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  d/Esc/Enter Dismiss visible alarm"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " History",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  [ / ]       Move start date"),
        Line::from("  { / }       Move end date"),
        Line::from("  t           Reset to yesterday..today"),
        Line::from("  g           Refetch range"),
        Line::from("  e           Export range as CSV"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Logs",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  c           Clear error log (display only)"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r           Poll now"),
        Line::from("  q           Quit"),
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
    let help_area = centered_rect(area, 44, 28);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Center a fixed-size rect inside `area`, clamped to fit.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
