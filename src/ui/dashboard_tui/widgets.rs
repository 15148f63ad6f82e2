use std::f64::consts::TAU;

use ratatui::prelude::*;
use unicode_width::UnicodeWidthChar;

use crate::core::sentiment::{PieChart, SentimentLabel};
use crate::core::stream::ConnectionStatus;

/// Fixed color per sentiment: green, red, gray
pub fn sentiment_color(label: &SentimentLabel) -> Color {
    match label {
        SentimentLabel::Positive => Color::Green,
        SentimentLabel::Negative => Color::Red,
        SentimentLabel::Neutral => Color::Gray,
        SentimentLabel::Other(_) => Color::DarkGray,
    }
}

/// Header color for the stream state
pub fn connection_color(status: &ConnectionStatus) -> Color {
    match status {
        ConnectionStatus::Connected => Color::Green,
        ConnectionStatus::Connecting | ConnectionStatus::Reconnecting { .. } => Color::Yellow,
        ConnectionStatus::Closed(_) => Color::Red,
    }
}

/// Cut `text` to at most `max_width` terminal columns, adding `…` when cut
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    let text = text.trim();
    let total: usize = text.chars().filter_map(|c| c.width()).sum();
    if total <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

/// Canvas x bounds that keep a unit circle round in a `width` x `height` cell
/// area (terminal cells are about twice as tall as wide).
pub fn pie_x_bounds(width: u16, height: u16) -> [f64; 2] {
    let aspect = if height == 0 {
        1.0
    } else {
        (width as f64 / (height as f64 * 2.0)).max(1.0)
    };
    [-aspect, aspect]
}

/// Points filling the unit disc, grouped by the color of the slice they fall
/// in. `cols` x `rows` is the sampling grid (braille dots of the canvas).
pub fn pie_points(
    pie: &PieChart,
    x_bounds: [f64; 2],
    cols: usize,
    rows: usize,
) -> Vec<(Color, Vec<(f64, f64)>)> {
    let mut groups: Vec<(Color, Vec<(f64, f64)>)> = pie
        .slices
        .iter()
        .map(|s| (sentiment_color(&s.label), Vec::new()))
        .collect();

    if pie.is_empty() || cols == 0 || rows == 0 {
        return groups;
    }

    let x_step = (x_bounds[1] - x_bounds[0]) / cols as f64;
    let y_step = 2.0 / rows as f64;

    for row in 0..rows {
        let y = -1.0 + (row as f64 + 0.5) * y_step;
        for col in 0..cols {
            let x = x_bounds[0] + (col as f64 + 0.5) * x_step;
            if x * x + y * y > 1.0 {
                continue;
            }

            // Clockwise from twelve o'clock
            let turn = (x.atan2(y) / TAU).rem_euclid(1.0);
            if let Some(slice) = pie.slice_at(turn) {
                if let Some(index) = pie.slices.iter().position(|s| s.label == slice.label) {
                    groups[index].1.push((x, y));
                }
            }
        }
    }

    groups
}
