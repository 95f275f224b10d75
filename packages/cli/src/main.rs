#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line client for courier tracking.
//!
//! ```text
//! courier_track serve [--interactive]
//! courier_track track [ID] [--theme light|dark]
//! courier_track create
//! courier_track update <ID> [--status S] [--lat LAT --lng LNG]
//! ```
//!
//! Running `courier_track` with no subcommand enters interactive mode.
//! Configuration comes from `COURIER_TRACK_CONFIG` and the environment
//! (see `courier_track_config`).

mod orders;
mod track;

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use courier_track_config::AppConfig;
use courier_track_order_models::Theme;
use dialoguer::Select;

#[derive(Parser)]
#[command(name = "courier_track", about = "Track deliveries and manage courier orders")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the proxy server
    Serve {
        /// Prompt for bind address and port first
        #[arg(long)]
        interactive: bool,
    },
    /// Look up an order and follow it until it is gone or Ctrl-C
    Track {
        /// Tracking ID (prompted for when omitted)
        id: Option<String>,
        /// Color theme for status badges and the route line
        #[arg(long, value_enum, default_value_t = ThemeArg::Light)]
        theme: ThemeArg,
    },
    /// Create an order interactively
    Create,
    /// Post a courier update straight to the order service
    #[command(group(ArgGroup::new("change").required(true).multiple(true).args(["status", "lat"])))]
    Update {
        /// Tracking ID
        id: String,
        /// New status label (e.g. "In Transit")
        #[arg(long)]
        status: Option<String>,
        /// Courier latitude
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Courier longitude
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Self::Light,
            ThemeArg::Dark => Self::Dark,
        }
    }
}

/// Top-level action selection for interactive mode.
enum Action {
    Track,
    Create,
    Update,
    Server,
}

impl Action {
    const ALL: &[Self] = &[Self::Track, Self::Create, Self::Update, Self::Server];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Track => "Track an order",
            Self::Create => "Create an order",
            Self::Update => "Post a courier update",
            Self::Server => "Start server",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let config = AppConfig::load()?;

    let Some(command) = cli.command else {
        return interactive(config).await;
    };

    match command {
        Commands::Serve { interactive } => serve(config, interactive).await?,
        Commands::Track { id, theme } => track::run(&config, id, theme.into()).await?,
        Commands::Create => orders::create(&config).await?,
        Commands::Update {
            id,
            status,
            lat,
            lng,
        } => orders::update(&config, &id, status, lat.zip(lng)).await?,
    }

    Ok(())
}

async fn interactive(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Courier Track");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Track => track::run(&config, None, Theme::default()).await?,
        Action::Create => orders::create(&config).await?,
        Action::Update => orders::update_interactive(&config).await?,
        Action::Server => serve(config, true).await?,
    }

    Ok(())
}

async fn serve(config: AppConfig, interactive: bool) -> Result<(), Box<dyn std::error::Error>> {
    // The server uses actix-web's runtime, so we need to run it
    // in a blocking task to avoid nesting tokio runtimes.
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(async move {
            if interactive {
                courier_track_server::interactive::run(config).await
            } else {
                courier_track_server::run_server(config).await
            }
        })
    })
    .await??;

    Ok(())
}
