use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use severn_core::{
    Config, ContentCache, FeedError, ReportAssembler, SystemClock, TtlCache, WeatherFeed,
    provider::{closure_feed_from_config, weather_feed_from_config},
};
use tracing::{debug, warn};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "severn", version, about = "M4/M48 Severn bridges status")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch closures and weather once and print the report (default).
    Status,

    /// Store the National Highways API key.
    Configure,

    /// Print where the config file lives.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Status) {
            Command::Status => status().await,
            Command::Configure => configure(),
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

async fn status() -> anyhow::Result<()> {
    let config = Config::load()?;
    debug!(
        closures_url = %config.closures_url,
        weather_url = %config.weather_url,
        "loaded configuration"
    );

    let weather = usable_weather_feed(weather_feed_from_config(
        &config,
        Arc::new(TtlCache::new(config.weather_cache_ttl())),
    ));
    let closures = closure_feed_from_config(&config, Arc::new(ContentCache::new()))
        .context("Closure feed is not available")?;

    let report = ReportAssembler::default()
        .generate(&closures, weather.as_ref().map(|w| w as &dyn WeatherFeed), &SystemClock)
        .await
        .context("Failed to build bridge report")?;

    print!("{}", render::report(&report));
    Ok(())
}

/// Weather is optional: a feed that cannot be built only costs the weather section.
fn usable_weather_feed<F>(feed: Result<F, FeedError>) -> Option<F> {
    feed.inspect_err(|err| warn!("weather feed disabled: {err}")).ok()
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("National Highways API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Subscription key from the National Highways developer portal")
        .prompt()
        .context("No API key entered")?;

    if key.trim().is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    config.set_api_key(key);
    let path = config.save()?;
    println!("Saved API key to {}", path.display());

    Ok(())
}
