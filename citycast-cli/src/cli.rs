use std::fmt;

use anyhow::{Context, anyhow, bail};
use citycast_core::{
    CityQuery, Config, FileStore, LookupController, LookupPhase, OpenWeatherClient,
    config::API_KEY_ENV,
};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};

use crate::render;

type Controller = LookupController<OpenWeatherClient, FileStore>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "Current weather and 5-day forecast by city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and the default city.
    Configure,

    /// Show weather for a city once.
    Show {
        /// City name; the configured default city when absent.
        city: Option<String>,
    },

    /// List recent searches.
    History {
        /// Forget all recent searches.
        #[arg(long)]
        clear: bool,
    },

    /// Browse weather interactively (default).
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => configure(),
            Command::Show { city } => show(city).await,
            Command::History { clear } => history(clear),
            Command::Interactive => interactive().await,
        }
    }
}

fn build_controller() -> anyhow::Result<Controller> {
    let config = Config::load()?.with_env_overrides();
    if config.api_key.is_none() {
        tracing::warn!("no API key configured; set {API_KEY_ENV} or run `citycast configure`");
    }

    let store = FileStore::open_default()?;
    tracing::debug!(path = %store.path().display(), "using history store");

    Ok(LookupController::new(
        OpenWeatherClient::new(config.client_config()),
        store,
        config.default_city,
    ))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.api_key = Some(api_key.trim().to_string());
    }

    let city = Text::new("Default city:")
        .with_default(config.default_city.as_str())
        .prompt()?;
    config.default_city =
        CityQuery::parse(&city).ok_or_else(|| anyhow!("Default city must not be blank"))?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(city: Option<String>) -> anyhow::Result<()> {
    let mut controller = build_controller()?;

    let ticket = match city {
        Some(city) => controller
            .search(&city)
            .context("City name must not be blank")?,
        None => controller.start(),
    };
    controller.run(ticket).await;

    let state = controller.state();
    if state.phase() == LookupPhase::Failed {
        bail!("{}", state.error.as_deref().unwrap_or_default());
    }

    render::print_state(state);
    Ok(())
}

fn history(clear: bool) -> anyhow::Result<()> {
    let mut controller = build_controller()?;

    if clear {
        controller.clear_history();
        println!("Recent searches cleared.");
    } else {
        render::print_history(controller.recent_searches());
    }
    Ok(())
}

#[derive(Debug, Clone)]
enum MenuChoice {
    Search,
    Recent(usize, CityQuery),
    Refresh,
    ClearHistory,
    ToggleTheme,
    Quit,
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuChoice::Search => f.write_str("Search for a city"),
            MenuChoice::Recent(_, city) => write!(f, "Recent: {city}"),
            MenuChoice::Refresh => f.write_str("Refresh"),
            MenuChoice::ClearHistory => f.write_str("Clear recent searches"),
            MenuChoice::ToggleTheme => f.write_str("Toggle theme"),
            MenuChoice::Quit => f.write_str("Quit"),
        }
    }
}

fn menu(controller: &Controller) -> Vec<MenuChoice> {
    let mut choices = vec![MenuChoice::Search];
    choices.extend(
        controller
            .recent_searches()
            .entries()
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, city)| MenuChoice::Recent(i, city)),
    );
    choices.push(MenuChoice::Refresh);
    if !controller.recent_searches().is_empty() {
        choices.push(MenuChoice::ClearHistory);
    }
    choices.extend([MenuChoice::ToggleTheme, MenuChoice::Quit]);
    choices
}

async fn interactive() -> anyhow::Result<()> {
    let mut controller = build_controller()?;

    let ticket = controller.start();
    render::print_header(controller.theme());
    render::print_state(controller.state());
    controller.run(ticket).await;

    loop {
        render::print_state(controller.state());
        println!();

        let choice = match Select::new("What next?", menu(&controller)).prompt() {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let ticket = match choice {
            MenuChoice::Search => {
                let text = match Text::new("City:").prompt() {
                    Ok(text) => text,
                    Err(InquireError::OperationCanceled) => continue,
                    Err(InquireError::OperationInterrupted) => break,
                    Err(e) => return Err(e.into()),
                };
                controller.set_input(text);
                controller.submit_input()
            }
            MenuChoice::Recent(index, _) => controller.select_history(index),
            MenuChoice::Refresh => Some(controller.refresh()),
            MenuChoice::ClearHistory => {
                controller.clear_history();
                None
            }
            MenuChoice::ToggleTheme => {
                render::print_header(controller.toggle_theme());
                None
            }
            MenuChoice::Quit => break,
        };

        if let Some(ticket) = ticket {
            render::print_state(controller.state());
            controller.run(ticket).await;
        }
    }

    Ok(())
}
