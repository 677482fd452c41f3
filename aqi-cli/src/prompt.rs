//! Interactive prompts. Esc / Ctrl-C are reported as `None` rather than errors.

use anyhow::{Context, Result, bail};
use aqi_core::Station;
use inquire::{InquireError, Password, PasswordDisplayMode, Select};
use std::fmt;

pub trait Prompter {
    /// Let the user choose one of `stations`.
    fn pick_station(&self, message: &str, stations: Vec<Station>) -> Result<Option<Station>>;

    /// Ask for the API token, trimmed.
    fn api_token(&self) -> Result<Option<String>>;
}

/// Terminal prompts backed by `inquire`.
#[derive(Debug, Default)]
pub struct InquirePrompter;

/// Menu entry showing just the station name.
struct StationChoice(Station);

impl fmt::Display for StationChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

impl Prompter for InquirePrompter {
    fn pick_station(&self, message: &str, stations: Vec<Station>) -> Result<Option<Station>> {
        let choices = stations.into_iter().map(StationChoice).collect();

        match Select::new(message, choices).prompt() {
            Ok(choice) => Ok(Some(choice.0)),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
            Err(e) => Err(e).context("Failed to show station menu"),
        }
    }

    fn api_token(&self) -> Result<Option<String>> {
        let answer = Password::new("Enter your API Token (hidden)")
            .with_display_mode(PasswordDisplayMode::Hidden)
            .without_confirmation()
            .prompt();

        let token = match answer {
            Ok(token) => token,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(None);
            }
            Err(e) => return Err(e).context("Failed to read API token"),
        };

        let token = token.trim();
        if token.is_empty() {
            bail!("API token cannot be empty");
        }

        Ok(Some(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_entries_show_station_names() {
        let choice = StationChoice(Station {
            uid: 9,
            name: "Pulchowk".into(),
        });
        assert_eq!(choice.to_string(), "Pulchowk");
    }
}
