use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use timetable_core::commute::parse_duration;
use timetable_core::settings::clean_notes_path;
use timetable_core::{Building, Settings};

use crate::render::Render;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the current settings (token masked)
    Show,
    /// Print the location of the config file
    Path,
    /// Set the API token; prompts for it when omitted
    Token { value: Option<String> },
    /// Set travel times (HH:MM) to a building and back
    Commute {
        building: BuildingArg,

        /// Travel time to the building
        #[arg(long)]
        forwards: Option<String>,

        /// Travel time back home
        #[arg(long)]
        backwards: Option<String>,
    },
    /// Turn commute notes on or off
    GenerateCommute {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Set the vault-relative folder for notes
    Notes { path: String },
    /// Set the vault root directory
    Vault { path: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BuildingArg {
    Op,
    A,
}

impl From<BuildingArg> for Building {
    fn from(arg: BuildingArg) -> Self {
        match arg {
            BuildingArg::Op => Building::Op,
            BuildingArg::A => Building::A,
        }
    }
}

pub fn run(mut settings: Settings, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", settings.render());
            return Ok(());
        }
        ConfigAction::Path => {
            println!("{}", Settings::config_path()?.display());
            return Ok(());
        }
        ConfigAction::Token { value } => {
            let token = match value {
                Some(value) => value,
                None => rpassword::prompt_password("API token: ").context("Failed to read token")?,
            };
            let token = token.trim();
            if token.is_empty() {
                anyhow::bail!("Token must not be empty");
            }
            settings.api_key = token.to_string();
        }
        ConfigAction::Commute {
            building,
            forwards,
            backwards,
        } => {
            if forwards.is_none() && backwards.is_none() {
                anyhow::bail!("Pass --forwards and/or --backwards");
            }
            let commute = settings.commute.for_building_mut(building.into());
            if let Some(forwards) = forwards {
                parse_duration(&forwards)?;
                commute.forwards = forwards.trim().to_string();
            }
            if let Some(backwards) = backwards {
                parse_duration(&backwards)?;
                commute.backwards = backwards.trim().to_string();
            }
        }
        ConfigAction::GenerateCommute { enabled } => settings.generate_commute = enabled,
        ConfigAction::Notes { path } => {
            settings.path = clean_notes_path(&path).map_err(anyhow::Error::msg)?;
        }
        ConfigAction::Vault { path } => settings.vault = path,
    }

    settings.save()?;
    println!("{}", "Settings saved".green());
    Ok(())
}
