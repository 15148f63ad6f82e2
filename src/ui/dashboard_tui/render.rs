use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Points},
        Axis, Block, Borders, Chart, Clear, Dataset, GraphType, List, ListItem, Paragraph, Wrap,
    },
};

use super::app::DashboardApp;
use super::widgets::{
    connection_color, pie_points, pie_x_bounds, sentiment_color, truncate_to_width,
};
use crate::core::sentiment::{PieChart, SentimentLabel, TrendSeries};

/// Main render function
pub fn render_ui(frame: &mut Frame, app: &DashboardApp) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // Header
            Constraint::Percentage(40), // Pie + live feed
            Constraint::Percentage(30), // Trend
            Constraint::Length(3),      // Stats
            Constraint::Min(4),         // Alerts
            Constraint::Length(1),      // Footer
        ])
        .split(area);

    render_header(frame, chunks[0], app);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);
    render_distribution(frame, top[0], app);
    render_live_feed(frame, top[1], app);

    render_trend(frame, chunks[2], app);
    render_stats(frame, chunks[3], app);
    render_alerts(frame, chunks[4], app);
    render_footer(frame, chunks[5]);

    if app.show_help {
        render_help_overlay(frame, area);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &DashboardApp) {
    let snapshot = &app.snapshot;
    let title = format!(
        " Sentiment Intelligence Dashboard │ {} │ stream: {} ",
        app.api_base, snapshot.connection
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(connection_color(&snapshot.connection)));

    let last_event = snapshot
        .last_event_at
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut spans = vec![
        Span::raw(format!(
            " events: {} │ dropped: {} │ last event: {} ",
            snapshot.state.sentiment_events, snapshot.dropped_frames, last_event
        )),
    ];

    if app.paused {
        spans.push(Span::styled(
            " PAUSED ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }

    if let Some(error) = snapshot.fetch_error() {
        spans.push(Span::styled(
            format!(" fetch failed: {} ", error),
            Style::default().fg(Color::LightRed),
        ));
    }

    if let Some(message) = &app.status_message {
        spans.push(Span::styled(
            format!(" {} ", message),
            Style::default().fg(Color::Cyan),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_distribution(frame: &mut Frame, area: Rect, app: &DashboardApp) {
    let distribution = &app.snapshot.state.distribution;
    let pie = PieChart::from_distribution(distribution);

    let block = Block::default()
        .title(" Sentiment Distribution ")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 4 || inner.width < 10 {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(inner);

    if pie.is_empty() {
        let waiting = Paragraph::new("No sentiment data yet")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(waiting, chunks[0]);
    } else {
        let pie_area = chunks[0];
        let x_bounds = pie_x_bounds(pie_area.width, pie_area.height);
        // Braille gives 2x4 dots per cell
        let groups = pie_points(
            &pie,
            x_bounds,
            pie_area.width as usize * 2,
            pie_area.height as usize * 4,
        );

        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .x_bounds(x_bounds)
            .y_bounds([-1.0, 1.0])
            .paint(|ctx| {
                for (color, points) in &groups {
                    ctx.draw(&Points {
                        coords: points,
                        color: *color,
                    });
                }
            });
        frame.render_widget(canvas, pie_area);
    }

    let legend: Vec<Line> = pie
        .slices
        .iter()
        .map(|slice| {
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(sentiment_color(&slice.label))),
                Span::raw(format!(
                    "{:<9}{:>6} ({:>5.1}%)",
                    slice.label.as_str(),
                    slice.value,
                    slice.fraction * 100.0
                )),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(legend), chunks[1]);
}

fn render_live_feed(frame: &mut Frame, area: Rect, app: &DashboardApp) {
    let posts = &app.snapshot.state.live_posts;

    let block = Block::default()
        .title(format!(" Recent Posts Feed ({}) ", posts.len()))
        .borders(Borders::ALL);

    if posts.is_empty() {
        let waiting = Paragraph::new("Waiting for live data…")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(waiting, area);
        return;
    }

    let text_width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = posts
        .iter()
        .map(|post| {
            let color = sentiment_color(&post.sentiment);
            let header = Line::from(vec![
                Span::styled(
                    post.received_at.format("%H:%M:%S ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    post.sentiment.to_string(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" — "),
                Span::raw(post.emotion.clone().unwrap_or_else(|| "Analyzing...".to_string())),
            ]);

            let mut lines = vec![header];
            if let Some(content) = &post.content {
                lines.push(Line::from(Span::styled(
                    format!("  {}", truncate_to_width(content, text_width)),
                    Style::default().fg(Color::Gray),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn render_trend(frame: &mut Frame, area: Rect, app: &DashboardApp) {
    let trend = &app.snapshot.state.trend;
    let series = TrendSeries::from_buffer(trend);

    let block = Block::default()
        .title(" Cumulative Sentiment Growth ")
        .borders(Borders::ALL);

    if series.is_empty() {
        let waiting = Paragraph::new("Waiting for live data…")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(waiting, area);
        return;
    }

    let positive = series.positive_points();
    let negative = series.negative_points();

    let x_max = trend.capacity().max(series.len()).max(2) as f64;
    let y_max = series.max_value().max(1);

    let datasets = vec![
        Dataset::default()
            .name("Positive Growth")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&positive),
        Dataset::default()
            .name("Negative Growth")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&negative),
    ];

    let x_axis = Axis::default()
        .style(Style::default().fg(Color::DarkGray))
        .bounds([1.0, x_max])
        .labels(vec![
            Span::raw("1"),
            Span::raw(format!("{}", (x_max / 2.0).round() as u64)),
            Span::raw(format!("{}", x_max as u64)),
        ]);

    let y_axis = Axis::default()
        .style(Style::default().fg(Color::DarkGray))
        .bounds([0.0, y_max as f64])
        .labels(vec![
            Span::raw("0"),
            Span::raw(format!("{}", y_max.div_ceil(2))),
            Span::raw(format!("{}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

fn render_stats(frame: &mut Frame, area: Rect, app: &DashboardApp) {
    let distribution = &app.snapshot.state.distribution;
    let stats = [
        ("Total", distribution.total(), Color::White),
        (
            "Positive",
            distribution.positive,
            sentiment_color(&SentimentLabel::Positive),
        ),
        (
            "Negative",
            distribution.negative,
            sentiment_color(&SentimentLabel::Negative),
        ),
        (
            "Neutral",
            distribution.neutral,
            sentiment_color(&SentimentLabel::Neutral),
        ),
    ];

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for (i, (title, value, color)) in stats.into_iter().enumerate() {
        let block = Block::default()
            .title(format!(" {} ", title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(value.to_string())
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, chunks[i]);
    }
}

fn render_alerts(frame: &mut Frame, area: Rect, app: &DashboardApp) {
    let alerts = &app.snapshot.state.alerts;

    let border_color = if alerts.is_empty() {
        Color::DarkGray
    } else {
        Color::Red
    };
    let block = Block::default()
        .title(format!(" ⚠ Alerts ({}) ", alerts.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    if alerts.is_empty() {
        let empty = Paragraph::new("No alerts")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let width = area.width.saturating_sub(6) as usize;
    let items: Vec<ListItem> = alerts
        .iter()
        .map(|alert| {
            ListItem::new(Line::from(vec![
                Span::styled("● ", Style::default().fg(Color::Red)),
                Span::styled(
                    truncate_to_width(&alert.summary(), width),
                    Style::default().fg(Color::LightRed),
                ),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let help = " q: Quit │ r: Refresh │ p: Pause │ ?: Help ";
    let para = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(para, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_text = r#"
    Sentiment Dashboard - Help

    Keyboard Shortcuts:
    ─────────────────────────────────────
    q / Esc     Quit the application
    ? / h       Toggle this help screen
    r / F5      Refresh alerts and distribution
    p / Space   Pause or resume the view

    The live feed keeps running while paused.

    Press any key to close this help
    "#;

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::DarkGray));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });

    let popup_area = centered_rect(60, 50, area);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
