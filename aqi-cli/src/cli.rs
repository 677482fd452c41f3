use anyhow::Result;
use aqi_core::{
    AddOutcome, AqiProvider, Config, Station, StationReading, StationRegistry,
    config::{self, TOKEN_HELP_MSG},
    provider::provider_from_config,
    report, show,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::{
    prompt::{InquirePrompter, Prompter},
    table,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "air", version, about = "Get Air Quality Index from your CLI")]
pub struct Cli {
    /// Print debug logs to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API token used for all requests.
    Init,

    /// Save a station found for a location.
    Add {
        /// City, country or station name to search for.
        location: String,
    },

    /// Remove a saved station of a location.
    Remove {
        /// Location the station was saved under.
        location: String,
    },

    /// Search for a city or country and show its AQI.
    Search {
        /// City, country or station name.
        query: String,

        /// Pick a single station from the results.
        #[arg(long)]
        select: bool,
    },

    /// Show AQI for all saved stations.
    Show,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut out = io::stdout();

        match self.command {
            Command::Init => init(&InquirePrompter, &Config::config_file_path()?, &mut out),
            Command::Add { location } => Session::connect()?.add(&location, &mut out).await,
            Command::Remove { location } => Session::connect()?.remove(&location, &mut out).await,
            Command::Search { query, select } => {
                Session::connect()?.search(&query, select, &mut out).await
            }
            Command::Show => Session::connect()?.show(&mut out).await,
        }
    }
}

fn init(prompter: &dyn Prompter, config_file: &Path, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{TOKEN_HELP_MSG}\n")?;

    let Some(token) = prompter.api_token()? else {
        return Ok(());
    };

    let mut cfg = Config::load_from(config_file)?;
    cfg.set_api_token(&token);
    cfg.save_to(config_file)?;

    writeln!(
        out,
        "{} {}",
        "Credentials saved to".green().bold(),
        config_file.display().to_string().blue().bold()
    )?;
    Ok(())
}

/// Everything a command that talks to the API needs.
struct Session {
    provider: Box<dyn AqiProvider>,
    prompter: Box<dyn Prompter>,
    stations_file: PathBuf,
}

impl Session {
    /// Fails without a token, before any saved state is looked at.
    fn connect() -> Result<Self> {
        Self::new(&Config::load()?, config::token_from_env(), Config::stations_file_path()?)
    }

    fn new(cfg: &Config, env_token: Option<String>, stations_file: PathBuf) -> Result<Self> {
        Ok(Self {
            provider: provider_from_config(cfg, env_token)?,
            prompter: Box::new(InquirePrompter),
            stations_file,
        })
    }

    /// A single candidate is taken as-is, without a menu.
    fn choose(&self, message: &str, mut stations: Vec<Station>) -> Result<Option<Station>> {
        if stations.len() <= 1 {
            return Ok(stations.pop());
        }
        self.prompter.pick_station(message, stations)
    }

    async fn add(&self, location: &str, out: &mut dyn Write) -> Result<()> {
        let stations: Vec<Station> = self
            .provider
            .search(location)
            .await?
            .into_iter()
            .map(|r| r.station)
            .collect();

        if stations.is_empty() {
            writeln!(out, "{}", "No stations found in the location.".yellow())?;
            return Ok(());
        }

        let Some(station) = self.choose("Choose a station to add", stations)? else {
            return Ok(());
        };

        let mut registry = StationRegistry::load(&self.stations_file)?;

        match registry.add(location, station.uid) {
            AddOutcome::Added => {
                registry.save(&self.stations_file)?;
                writeln!(out, "{}", format!("Successfully added {}!", station.name).green())?;
            }
            AddOutcome::AlreadySaved => {
                writeln!(out, "Station: {} already exists.", station.name)?;
            }
        }

        Ok(())
    }

    async fn remove(&self, location: &str, out: &mut dyn Write) -> Result<()> {
        let mut registry = StationRegistry::load(&self.stations_file)?;

        let uids = registry.uids_for(location);
        if uids.is_empty() {
            writeln!(out, "No station from {location} found.")?;
            return Ok(());
        }

        let readings = self.provider.search(location).await?;
        let stations = saved_stations(uids, &readings);

        let Some(station) = self.choose("Choose a station to remove", stations)? else {
            return Ok(());
        };

        registry.remove(location, station.uid);
        registry.save(&self.stations_file)?;

        writeln!(out, "{}", format!("Successfully removed {}!", station.name).green())?;
        Ok(())
    }

    async fn search(&self, query: &str, select: bool, out: &mut dyn Write) -> Result<()> {
        let mut readings = self.provider.search(query).await?;

        if readings.is_empty() {
            writeln!(out, "No air quality data found for search: {}", query.red().bold())?;
            return Ok(());
        }

        if select {
            let stations = readings.iter().map(|r| r.station.clone()).collect();
            let Some(chosen) = self.choose("Choose a station", stations)? else {
                return Ok(());
            };
            readings.retain(|r| r.station.uid == chosen.uid);
        }

        write!(out, "{}", table::render(&report::build_rows(&readings)))?;
        Ok(())
    }

    async fn show(&self, out: &mut dyn Write) -> Result<()> {
        let registry = StationRegistry::load(&self.stations_file)?;

        if registry.is_empty() {
            writeln!(
                out,
                "You have not saved any stations, use {} to save a station!",
                "`air add <location>`".green().bold()
            )?;
            return Ok(());
        }

        let readings = show::fetch_saved(self.provider.as_ref(), &registry).await?;

        let saved = registry.all_uids().len();
        if readings.len() < saved {
            warn!(
                saved,
                found = readings.len(),
                "some saved stations were not returned by the API"
            );
        }

        write!(out, "{}", table::render(&report::build_rows(&readings)))?;
        Ok(())
    }
}

/// Saved uids of one location, named from a fresh search where possible.
fn saved_stations(uids: &[i64], readings: &[StationReading]) -> Vec<Station> {
    uids.iter()
        .map(|&uid| {
            readings
                .iter()
                .find(|r| r.station.uid == uid)
                .map(|r| r.station.clone())
                .unwrap_or_else(|| {
                    debug!(uid, "saved station missing from search results");
                    Station {
                        uid,
                        name: format!("Station #{uid}"),
                    }
                })
        })
        .collect()
}
