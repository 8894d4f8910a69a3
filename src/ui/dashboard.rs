//! Dashboard view: live value cards, averages, and rolling pressure charts.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::SeriesBuffer;
use crate::ui::common::centered_rect;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(8),
            Constraint::Min(8),
        ])
        .split(area);

    render_cards(frame, app, chunks[0]);
    render_chart(frame, app, chunks[1], "Front Pressure", app.series.front(), app.theme.front_line);
    render_chart(frame, app, chunks[2], "Rear Pressure", app.series.rear(), app.theme.rear_line);

    if app.alarm_overlay_visible() {
        render_alarm_overlay(frame, app, area);
    }
}

fn render_cards(frame: &mut Frame, app: &App, area: Rect) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let front = format_value(app.monitor.front());
    let rear = format_value(app.monitor.rear());
    render_card(frame, app, cards[0], "Front", &front, Style::default().fg(app.theme.front_line));
    render_card(frame, app, cards[1], "Rear", &rear, Style::default().fg(app.theme.rear_line));

    let hourly = app
        .hourly
        .as_ref()
        .map_or("...".to_string(), |avg| {
            format!("F {}  R {}", format_value(avg.front()), format_value(avg.rear()))
        });
    let minute = app
        .minute
        .as_ref()
        .map_or("...".to_string(), |avg| {
            format!("F {}  R {}", format_value(avg.front()), format_value(avg.rear()))
        });
    render_card(frame, app, cards[2], "Hourly Avg", &hourly, Style::default());
    render_card(frame, app, cards[3], "Minute Avg", &minute, Style::default());
}

fn format_value(value: Option<f64>) -> String {
    value.map_or("---".to_string(), |v| format!("{v:.3}"))
}

fn render_card(frame: &mut Frame, app: &App, area: Rect, title: &str, value: &str, style: Style) {
    let block = Block::default()
        .title(format!(" {title} "))
        .title_style(app.theme.header)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let text = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(value.to_string(), style.add_modifier(Modifier::BOLD)),
            Span::styled(" MPa", Style::default().add_modifier(Modifier::DIM)),
        ]),
    ];

    frame.render_widget(Paragraph::new(text).block(block).centered(), area);
}

fn render_chart(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    title: &str,
    series: &SeriesBuffer,
    color: ratatui::style::Color,
) {
    let capacity = series.capacity().max(1);
    let points: Vec<(f64, f64)> = series
        .values()
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
        .collect();

    let thresholds = app.monitor.thresholds();
    let x_max = (capacity - 1).max(1) as f64;
    let idle_guide = vec![(0.0, thresholds.idle), (x_max, thresholds.idle)];
    let low_guide = vec![(0.0, thresholds.low), (x_max, thresholds.low)];

    let y_max = points
        .iter()
        .map(|&(_, y)| y)
        .fold(thresholds.low, f64::max)
        * 1.25;

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
            .name(title)
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(color))
            .data(&points),
    ];

    let labels = series.labels();
    let x_labels: Vec<Span> = match (labels.first(), labels.last()) {
        (Some(first), Some(last)) if !first.is_empty() || !last.is_empty() => vec![
            Span::raw(first.clone()),
            Span::raw(last.clone()),
        ],
        _ => vec![],
    };

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(format!(" {title} (MPa) "))
                .title_style(app.theme.header)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
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

/// Modal shown while an undismissed Idle or LowPressure episode is active.
fn render_alarm_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.monitor.state();

    let mut lines = vec![
        Line::from(vec![Span::styled(
            state.label(),
            app.theme.state_style(state).add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
    ];

    if let Some(detail) = app.monitor.alarm_detail() {
        lines.push(Line::from(format!(
            "  Raised  {}",
            detail
                .raised_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
        )));
        lines.push(Line::from(format!("  Front   {:.3} MPa", detail.front)));
        lines.push(Line::from(format!("  Rear    {:.3} MPa", detail.rear)));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(vec![Span::styled(
        "d/Esc/Enter to dismiss",
        Style::default().add_modifier(Modifier::DIM),
    )]));

    let block = Block::default()
        .title(" Alarm ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(app.theme.state_style(state));

    let overlay = centered_rect(area, 40, (lines.len() + 2) as u16);
    frame.render_widget(Clear, overlay);
    frame.render_widget(Paragraph::new(lines).block(block), overlay);
}
