//! Live dashboard command handler.
//!
//! Runs the sentiment dashboard TUI against the configured backend.

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::ui::dashboard_tui::run_dashboard_app;

/// Execute the live command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = super::resolve_config(matches)?;

    log::info!(
        "Starting dashboard against {} (tick {}ms)",
        config.api_base,
        config.tick_rate_ms
    );

    run_dashboard_app(&config).context("Failed to run sentiment dashboard")
}
