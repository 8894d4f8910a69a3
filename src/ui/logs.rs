//! Logs view: recent pressure log entries and the error log.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::source::LogRecord;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_pressure_log(frame, app, chunks[0]);
    render_error_log(frame, app, chunks[1]);
}

fn render_pressure_log(frame: &mut Frame, app: &App, area: Rect) {
    // Only entries with at least one channel at or above the idle
    // threshold are worth listing; the rest is machine-off noise.
    let idle = app.monitor.thresholds().idle;
    let items: Vec<ListItem> = app
        .log_entries
        .iter()
        .rev()
        .filter(|rec| at_least(rec.front_pressure, idle) || at_least(rec.rear_pressure, idle))
        .take(area.height.saturating_sub(2) as usize)
        .map(|rec| log_item(app, rec))
        .collect();

    let block = Block::default()
        .title(format!(" Pressure Log ({}) ", app.log_entries.len()))
        .title_style(app.theme.header)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if items.is_empty() {
        let hint = Paragraph::new("\n  No entries yet")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(hint, area);
    } else {
        frame.render_widget(List::new(items).block(block), area);
    }
}

fn render_error_log(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .error_entries
        .iter()
        .rev()
        .take(area.height.saturating_sub(2) as usize)
        .map(|rec| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {} ", local_time(rec)),
                    Style::default().add_modifier(Modifier::DIM),
                ),
                Span::styled(
                    format!(
                        "F {}  R {}",
                        format_value(rec.front_pressure),
                        format_value(rec.rear_pressure)
                    ),
                    Style::default().fg(app.theme.alarm),
                ),
            ]))
        })
        .collect();

    let block = Block::default()
        .title(format!(" Error Log ({}) ", app.error_entries.len()))
        .title_style(app.theme.header)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if items.is_empty() {
        let hint = Paragraph::new("\n  No errors")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(hint, area);
    } else {
        frame.render_widget(List::new(items).block(block), area);
    }
}

fn log_item<'a>(app: &App, rec: &LogRecord) -> ListItem<'a> {
    ListItem::new(Line::from(vec![
        Span::styled(
            format!(" {} ", local_time(rec)),
            Style::default().add_modifier(Modifier::DIM),
        ),
        Span::raw("F "),
        Span::styled(
            format_value(rec.front_pressure),
            Style::default().fg(app.theme.front_line),
        ),
        Span::raw("  R "),
        Span::styled(
            format_value(rec.rear_pressure),
            Style::default().fg(app.theme.rear_line),
        ),
    ]))
}

fn local_time(rec: &LogRecord) -> String {
    rec.timestamp
        .with_timezone(&Local)
        .format("%m-%d %H:%M:%S")
        .to_string()
}

fn at_least(value: Option<f64>, threshold: f64) -> bool {
    value.is_some_and(|v| v >= threshold)
}

fn format_value(value: Option<f64>) -> String {
    value.map_or("---".to_string(), |v| format!("{v:.3}"))
}
