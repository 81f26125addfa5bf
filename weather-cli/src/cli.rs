use std::{env, io, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::Password;
use weather_core::{
    API_KEY_ENV, City, Config, HistoryStore, WeatherPayload, format_report, provider_from_config,
    recommend,
};

use crate::session::{HISTORY_LIMIT, Session, print_history};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather checker")]
pub struct Cli {
    /// History file to read and append to, overriding the configured one.
    #[arg(long, global = true, value_name = "PATH")]
    pub history: Option<PathBuf>,

    /// Without a subcommand, starts the interactive prompt.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store an OpenWeather API key in the config file.
    Configure,

    /// Show weather for a single city and exit.
    Check {
        /// City name, e.g. "London" or "Rio de Janeiro".
        city: String,
    },

    /// Print the most recent queries.
    History {
        /// How many entries to show.
        #[arg(long, short = 'n', default_value_t = HISTORY_LIMIT)]
        limit: usize,
    },

    /// Print a report for built-in sample data, without a network call.
    Sample,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Some(Command::Sample) => {
                let payload = WeatherPayload::sample();
                println!("{}", format_report(&payload));
                println!("{}", recommend(&payload));
            }
            Some(Command::Configure) => configure()?,
            Some(Command::History { limit }) => {
                let config = Config::load()?;
                let store = history_store(self.history, &config)?;
                let doc = store.load();
                print_history(&doc.tail(limit), doc.len(), &mut io::stdout())?;
            }
            Some(Command::Check { city }) => {
                let city = City::try_from(city.as_str())?;
                if let Some(session) = open_session(self.history)? {
                    session.query(&city, &mut io::stdout()).await?;
                }
            }
            None => {
                if let Some(session) = open_session(self.history)? {
                    session.run_interactive().await?;
                }
            }
        }

        Ok(())
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key);
    config.save()?;

    println!("Saved API key to {}", Config::config_file_path()?.display());
    Ok(())
}

fn history_store(override_path: Option<PathBuf>, config: &Config) -> Result<HistoryStore> {
    let path = match override_path {
        Some(path) => path,
        None => config.history_path()?,
    };
    Ok(HistoryStore::new(path))
}

/// Build a session, or print setup instructions and return `None` when
/// no API key is available.
fn open_session(history: Option<PathBuf>) -> Result<Option<Session>> {
    let config = Config::load()?;

    let api_key = match config.resolve_api_key(env::var(API_KEY_ENV).ok()) {
        Ok(key) => key,
        Err(err) => {
            eprintln!("ERROR: {err}");
            return Ok(None);
        }
    };

    let provider = provider_from_config(&config, api_key)?;
    let store = history_store(history, &config)?;

    Ok(Some(Session::new(provider, store)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["weather"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.history.is_none());
    }

    #[test]
    fn history_defaults_to_five() {
        let cli = Cli::try_parse_from(["weather", "history"]).unwrap();
        assert!(matches!(cli.command, Some(Command::History { limit: 5 })));
    }

    #[test]
    fn global_history_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["weather", "check", "Paris", "--history", "/tmp/h.json"])
            .unwrap();

        assert_eq!(cli.history, Some(PathBuf::from("/tmp/h.json")));
        match cli.command {
            Some(Command::Check { city }) => assert_eq!(city, "Paris"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn explicit_history_path_wins() {
        let store = history_store(Some(PathBuf::from("/tmp/x.json")), &Config::default()).unwrap();
        assert_eq!(store.path(), PathBuf::from("/tmp/x.json").as_path());
    }
}
