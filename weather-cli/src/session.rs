//! The query loop: read a command, fetch, print, record.

use std::io::{self, Write};

use anyhow::Result;
use inquire::{InquireError, Text};
use tracing::debug;
use weather_core::{
    City, HistoryStore, QueryEntry, RequestOutcome, WeatherProvider, format_report, recommend,
};

/// Entries shown by the `history` command.
pub const HISTORY_LIMIT: usize = 5;

/// One line of user input, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Exit,
    History,
    Empty,
    Query(City),
}

impl SessionCommand {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let lower = trimmed.to_lowercase();

        match lower.as_str() {
            "exit" | "quit" | "q" => SessionCommand::Exit,
            "history" => SessionCommand::History,
            _ => City::try_from(trimmed).map_or(SessionCommand::Empty, SessionCommand::Query),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug)]
pub struct Session {
    provider: Box<dyn WeatherProvider>,
    history: HistoryStore,
}

impl Session {
    pub fn new(provider: Box<dyn WeatherProvider>, history: HistoryStore) -> Self {
        Self { provider, history }
    }

    /// Prompt until the user exits or closes the input.
    pub async fn run_interactive(&self) -> Result<()> {
        let mut out = io::stdout();
        print_banner(&mut out)?;

        loop {
            let line = match Text::new("Enter city name (or command):").prompt() {
                Ok(line) => line,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    writeln!(out)?;
                    break;
                }
                Err(err) => return Err(err.into()),
            };

            if self.handle_line(&line, &mut out).await? == Flow::Exit {
                return Ok(());
            }
        }

        writeln!(out, "Thanks for using Weather Checker!")?;
        Ok(())
    }

    /// Act on one line of input.
    pub async fn handle_line<W: Write>(&self, line: &str, out: &mut W) -> io::Result<Flow> {
        match SessionCommand::parse(line) {
            SessionCommand::Exit => {
                writeln!(out, "\nThanks for using Weather Checker!")?;
                return Ok(Flow::Exit);
            }
            SessionCommand::History => self.show_history(HISTORY_LIMIT, out)?,
            SessionCommand::Empty => writeln!(out, "Please enter a city name")?,
            SessionCommand::Query(city) => {
                self.query(&city, out).await?;
                writeln!(out)?;
            }
        }

        Ok(Flow::Continue)
    }

    /// Fetch and print the weather for `city`, recording it on success.
    ///
    /// Returns whether the lookup succeeded. Provider and history failures
    /// are printed, not returned.
    pub async fn query<W: Write>(&self, city: &City, out: &mut W) -> io::Result<bool> {
        writeln!(out, "\nFetching weather for {city}...")?;

        let outcome = self.provider.fetch(city).await;
        let payload = match outcome {
            RequestOutcome::Success(payload) => payload,
            failure => {
                debug!(?failure, %city, "query failed");
                if let Some(msg) = failure.failure_message(city) {
                    writeln!(out, "{msg}")?;
                }
                writeln!(out, "Could not retrieve weather data. Try again.")?;
                return Ok(false);
            }
        };

        writeln!(out, "{}", format_report(&payload))?;
        writeln!(out, "{}", recommend(&payload))?;

        match self.history.append(QueryEntry::new(city, &payload)) {
            Ok(total) => writeln!(out, "Saved to history ({total} total queries)")?,
            Err(err) => writeln!(out, "Could not save history: {err}")?,
        }

        Ok(true)
    }

    pub fn show_history<W: Write>(&self, limit: usize, out: &mut W) -> io::Result<()> {
        let doc = self.history.load();
        print_history(&doc.tail(limit), doc.len(), out)
    }
}

/// Print `entries` under a header giving the `total` number stored.
pub fn print_history<W: Write>(
    entries: &[QueryEntry],
    total: usize,
    out: &mut W,
) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "No history yet!");
    }

    writeln!(out, "\nWeather Query History ({total} entries):")?;
    writeln!(out, "{}", "─".repeat(60))?;
    for entry in entries {
        writeln!(out, "{}", entry.summary_line())?;
    }
    Ok(())
}

fn print_banner<W: Write>(out: &mut W) -> io::Result<()> {
    let rule = "=".repeat(70);
    writeln!(out, "{rule}")?;
    writeln!(out, "WEATHER CHECKER")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "\nCommands:")?;
    writeln!(out, "  - Enter a city name to check weather")?;
    writeln!(out, "  - Type 'history' to see past queries")?;
    writeln!(out, "  - Type 'exit' to quit")?;
    writeln!(out)
}
