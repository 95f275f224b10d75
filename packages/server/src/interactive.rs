//! Interactive mode for the server.
//!
//! Prompts for bind address and port before starting the server.

use courier_track_config::AppConfig;
use dialoguer::{Confirm, Input};

use crate::ServerError;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Asks for a bind address and port, defaulting to the values already in
/// `config`, and delegates to [`super::run_server`].
///
/// # Errors
///
/// Returns [`ServerError`] if the underlying server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run(mut config: AppConfig) -> Result<(), ServerError> {
    println!("Courier Track Server");
    println!();

    let default_addr = config.bind_addr.clone();
    config.bind_addr = Input::<String>::new()
        .with_prompt("Bind address")
        .default(default_addr.clone())
        .interact_text()
        .unwrap_or(default_addr);

    let default_port = config.port;
    config.port = Input::<u16>::new()
        .with_prompt("Port")
        .default(default_port)
        .interact_text()
        .unwrap_or(default_port);

    if !Confirm::new()
        .with_prompt(format!(
            "Start server on {}:{}?",
            config.bind_addr, config.port
        ))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(config).await
}
