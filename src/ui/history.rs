//! History view: a date-range chart of archived pressure readings.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::MAX_CHART_POINTS;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(8)])
        .split(area);

    render_range_bar(frame, app, chunks[0]);
    render_range_chart(frame, app, chunks[1]);
}

fn render_range_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if app.history_pending {
        Span::styled("fetching...", Style::default().fg(app.theme.highlight))
    } else if let Some(ref err) = app.history_error {
        Span::styled(
            format!("fetch failed: {err}"),
            Style::default().fg(app.theme.alarm),
        )
    } else {
        match app.history {
            Some(ref data) if data.is_empty() => {
                Span::styled("no data in range", Style::default().add_modifier(Modifier::DIM))
            }
            Some(ref data) => Span::raw(format!("{} readings", data.entries.len())),
            None => Span::styled("no data loaded", Style::default().add_modifier(Modifier::DIM)),
        }
    };

    let line = Line::from(vec![
        Span::raw(" Range "),
        Span::styled(
            app.history_range.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        status,
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_range_chart(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Pressure History (MPa) ")
        .title_style(app.theme.header)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(ref data) = app.history else {
        let hint = Paragraph::new("\n  Press g to fetch the selected range")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(hint, area);
        return;
    };

    let entries = data.thinned(MAX_CHART_POINTS);
    if entries.is_empty() {
        let hint = Paragraph::new("\n  No readings recorded in this range")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(hint, area);
        return;
    }

    let front: Vec<(f64, f64)> = entries
        .iter()
        .enumerate()
        .filter_map(|(i, rec)| rec.front_pressure.map(|v| (i as f64, v)))
        .collect();
    let rear: Vec<(f64, f64)> = entries
        .iter()
        .enumerate()
        .filter_map(|(i, rec)| rec.rear_pressure.map(|v| (i as f64, v)))
        .collect();

    let thresholds = app.monitor.thresholds();
    let x_max = (entries.len().saturating_sub(1)).max(1) as f64;
    let y_max = front
        .iter()
        .chain(rear.iter())
        .map(|&(_, y)| y)
        .fold(thresholds.low, f64::max)
        * 1.25;

    let idle_guide = vec![(0.0, thresholds.idle), (x_max, thresholds.idle)];
    let low_guide = vec![(0.0, thresholds.low), (x_max, thresholds.low)];

    // Multi-day ranges show the date, single days just the time.
    let label_fmt = if app.history_range.spans_multiple_days() {
        "%m-%d %H:%M"
    } else {
        "%H:%M"
    };
    let first_label = entries
        .first()
        .map(|rec| rec.timestamp.with_timezone(&Local).format(label_fmt).to_string());
    let last_label = entries
        .last()
        .map(|rec| rec.timestamp.with_timezone(&Local).format(label_fmt).to_string());
    let x_labels: Vec<Span> = [first_label, last_label]
        .into_iter()
        .flatten()
        .map(Span::raw)
        .collect();

    let datasets = vec![
        Dataset::default()
            .name("idle")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.guide).add_modifier(Modifier::DIM))
            .data(&idle_guide),
        Dataset::default()
            .name("low")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.guide))
            .data(&low_guide),
        Dataset::default()
            .name("front")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.front_line))
            .data(&front),
        Dataset::default()
            .name("rear")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.rear_line))
            .data(&rear),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .labels(x_labels)
                .style(Style::default().fg(app.theme.border)),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::raw("0.000"),
                    Span::raw(format!("{:.3}", y_max / 2.0)),
                    Span::raw(format!("{y_max:.3}")),
                ])
                .style(Style::default().fg(app.theme.border)),
        );

    frame.render_widget(chart, area);
}
