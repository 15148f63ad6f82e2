//! Terminal User Interface for the sentiment dashboard.
//!
//! Provides a real-time dashboard using ratatui.

mod app;
mod event_handler;
mod render;
mod widgets;

pub use app::{run_dashboard_app, DashboardApp};
pub use event_handler::DashboardEvent;
pub use widgets::truncate_to_width;
