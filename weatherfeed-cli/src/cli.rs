use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use weatherfeed_core::{
    Config, FeedClient, FeedConfig, FeedShape, LocationId, UnitSystem, WeatherReport,
    model::astronomy::format_time,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherfeed", version, about = "Weather feed CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the feed and show current weather and forecast.
    Show {
        #[command(flatten)]
        feed: FeedArgs,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the request URL without fetching it.
    Url {
        #[command(flatten)]
        feed: FeedArgs,
    },
}

/// Feed settings; anything left out comes from the config file.
#[derive(Debug, Args)]
pub struct FeedArgs {
    /// Place name, or a numeric location id when all digits.
    pub location: Option<String>,

    /// Unit system: "c" (international) or "f" (US).
    #[arg(long)]
    pub units: Option<String>,

    /// Feed shape: "json" or "xml".
    #[arg(long)]
    pub shape: Option<String>,

    /// Alternative feed endpoint.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Seconds to wait for the feed.
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl FeedArgs {
    /// Layer the arguments over the file config.
    pub fn merge(&self, file: &Config) -> anyhow::Result<FeedConfig> {
        let mut config = file.to_feed_config().context("Invalid config file")?;

        if let Some(location) = &self.location {
            config.location = Some(LocationId::parse(location));
        }
        if let Some(units) = &self.units {
            config.units = UnitSystem::try_from(units.as_str())?;
        }
        if let Some(shape) = &self.shape {
            config.shape = FeedShape::try_from(shape.as_str())?;
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(secs) = self.timeout {
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let file = Config::load()?;

        match self.command {
            Command::Show { feed, json } => {
                let config = feed.merge(&file)?;
                tracing::debug!(?config, "resolved feed configuration");

                let mut client = FeedClient::http(config);
                let report = client.fetch().await?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&*report)?);
                } else {
                    print!("{}", render(&report));
                }
            }
            Command::Url { feed } => {
                let url = feed.merge(&file)?.request_url()?;
                println!("{url}");
            }
        }

        Ok(())
    }
}

fn render(report: &WeatherReport) -> String {
    let units = &report.units;
    let location = &report.location;
    let condition = &report.condition;
    let mut out = String::new();

    if !report.title.is_empty() {
        out.push_str(&format!("{}\n\n", report.title));
    }

    let place = [location.city(), location.region(), location.country()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    out.push_str(&format!("Location:    {place}\n"));
    out.push_str(&format!(
        "Condition:   {} ({}°{}, code {}) at {} {}\n",
        condition.text(),
        condition.temperature(),
        units.temperature(),
        condition.code(),
        condition.date().format("%a, %d %b %Y %H:%M"),
        condition.zone(),
    ));
    out.push_str(&format!(
        "Wind:        {} {} from {}°, chill {}°{}\n",
        report.wind.speed(),
        units.speed(),
        report.wind.direction(),
        report.wind.chill(),
        units.temperature(),
    ));
    out.push_str(&format!(
        "Atmosphere:  humidity {}%, visibility {} {}, pressure {} {} ({:?})\n",
        report.atmosphere.humidity(),
        report.atmosphere.visibility(),
        units.distance(),
        report.atmosphere.pressure(),
        units.pressure(),
        report.atmosphere.rising(),
    ));
    out.push_str(&format!(
        "Sun:         rises {}, sets {}\n",
        format_time(report.astronomy.sunrise()),
        format_time(report.astronomy.sunset()),
    ));

    if !report.forecast.is_empty() {
        out.push_str("\nForecast:\n");
    }
    for day in &report.forecast {
        out.push_str(&format!(
            "  {}  {:>5} / {:<5} {}\n",
            day.date().format("%a %d %b"),
            day.low(),
            day.high(),
            day.text(),
        ));
    }

    out
}
