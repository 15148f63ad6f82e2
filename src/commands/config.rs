use crate::core::Config;
use crate::ui::{confirm, dimmed, info, success};
use anyhow::{Context, Result};
use colored::Colorize;

pub fn handle_config(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => show(),
        Some(("set-api", sub_matches)) => set_api(sub_matches),
        Some(("set-ws", sub_matches)) => set_ws(sub_matches),
        Some(("reset", sub_matches)) => reset(sub_matches),
        _ => {
            println!("Use 'sentiment-dash config --help' for more information.");
            Ok(())
        }
    }
}

fn show() -> Result<()> {
    let config = Config::load()?;
    let path = Config::get_config_path()?;

    println!("{}", "Configuration:".white().bold());
    dimmed(&format!("  file: {}", path.display()));
    println!("  {:<16} {}", "api", config.api_base.cyan());

    let live_url = config
        .live_url()
        .unwrap_or_else(|e| format!("invalid ({})", e));
    let source = if config.ws_url.is_some() {
        "explicit"
    } else {
        "derived from api"
    };
    println!("  {:<16} {} {}", "stream", live_url.cyan(), format!("({})", source).dimmed());
    println!("  {:<16} {}ms", "tick", config.tick_rate_ms);
    println!(
        "  {:<16} feed {} · trend {} · alerts {}",
        "capacities", config.feed_capacity, config.trend_capacity, config.alert_capacity
    );
    println!(
        "  {:<16} {} retries, {}ms apart",
        "fetch", config.fetch_retries, config.fetch_retry_delay_ms
    );

    let reconnect = &config.reconnect;
    if reconnect.enabled {
        let attempts = reconnect
            .max_attempts
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unlimited".to_string());
        println!(
            "  {:<16} {}ms → {}ms backoff, {} attempts",
            "reconnect", reconnect.initial_delay_ms, reconnect.max_delay_ms, attempts
        );
    } else {
        println!("  {:<16} {}", "reconnect", "disabled".yellow());
    }

    Ok(())
}

fn set_api(matches: &clap::ArgMatches) -> Result<()> {
    let url = matches
        .get_one::<String>("url")
        .context("URL argument is required")?;

    let mut config = Config::load()?;
    config.set_api_base(url).context("Invalid API URL")?;
    config.save()?;

    success(&format!("API base set to: {}", config.api_base));
    if config.ws_url.is_none() {
        info(&format!("Live stream will use: {}", config.live_url()?));
    }
    Ok(())
}

fn set_ws(matches: &clap::ArgMatches) -> Result<()> {
    let url = matches
        .get_one::<String>("url")
        .context("URL argument is required")?;

    let mut config = Config::load()?;
    config.set_ws_url(url).context("Invalid stream URL")?;
    config.save()?;

    success(&format!("Live stream URL set to: {}", config.live_url()?));
    Ok(())
}

fn reset(matches: &clap::ArgMatches) -> Result<()> {
    if !matches.get_flag("yes") && !confirm("Reset configuration to defaults? [y/N]")? {
        dimmed("Cancelled.");
        return Ok(());
    }

    Config::default().save()?;
    success("Configuration reset to defaults.");
    Ok(())
}
