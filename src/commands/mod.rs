// Command handlers module
pub mod completions;
pub mod config;
pub mod live;
pub mod snapshot;
pub mod tail;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::Config;

/// Load the saved configuration and apply per-run overrides from the
/// `--api`, `--ws` and `--tick` flags present on `matches`.
pub fn resolve_config(matches: &ArgMatches) -> Result<Config> {
    let mut config = Config::load()?;
    apply_overrides(&mut config, matches)?;
    Ok(config)
}

pub fn apply_overrides(config: &mut Config, matches: &ArgMatches) -> Result<()> {
    if let Some(api) = optional_string(matches, "api") {
        config.set_api_base(api).context("Invalid --api value")?;
    }

    if let Some(ws) = optional_string(matches, "ws") {
        config.set_ws_url(ws).context("Invalid --ws value")?;
    }

    if let Ok(Some(tick)) = matches.try_get_one::<u64>("tick") {
        config.tick_rate_ms = *tick;
    }

    Ok(())
}

// Not every subcommand defines every flag
fn optional_string<'a>(matches: &'a ArgMatches, id: &str) -> Option<&'a str> {
    matches
        .try_get_one::<String>(id)
        .ok()
        .flatten()
        .map(String::as_str)
}
