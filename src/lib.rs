pub mod api;
pub mod context;
pub mod core;
pub mod directory;
pub mod providers;
pub mod refresher;
pub mod store;

use crate::api::ApiState;
use crate::context::AppContext;
use crate::core::config::{AppConfig, ServerConfig};
use actix_web::{App, HttpServer, web};
use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Run the HTTP API with the background refresher.
    Serve,
    /// Run a single refresh cycle into the store.
    Refresh,
    /// Print the stored row for a currency code.
    Show(String),
}

pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let context = AppContext::new(config)?;

    match command {
        AppCommand::Serve => serve(context).await,
        AppCommand::Refresh => refresh_once(context).await,
        AppCommand::Show(code) => show(context, &code).await,
    }
}

/// Serves the API until the server stops, then shuts the refresher down and
/// closes the context. Shutdown runs whether or not the server failed.
pub async fn serve(context: AppContext) -> Result<()> {
    info!("Exchange rates service starting...");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresher = context.refresher().spawn(shutdown_rx);
    let state = web::Data::new(ApiState::from(&context));

    let server_result = run_server(&context.config().server, state).await;

    shutdown_tx.send_replace(true);
    if let Err(e) = refresher.await {
        warn!(error = %e, "Refresher task ended abnormally");
    }
    let close_result = context.close().await;

    server_result?;
    close_result
}

async fn run_server(config: &ServerConfig, state: web::Data<ApiState>) -> Result<()> {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::configure)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;

    info!("Listening on {}:{}", config.host, config.port);
    server.run().await.context("HTTP server failed")
}

async fn refresh_once(context: AppContext) -> Result<()> {
    let result = context.refresher().run_cycle().await;
    let close_result = context.close().await;

    let count = result.context("Refresh cycle failed")?;
    info!(count, "Stored rates");
    close_result
}

async fn show(context: AppContext, code: &str) -> Result<()> {
    let result = context.store().get(code).await;
    let close_result = context.close().await;

    match result {
        Ok(row) => {
            println!("{} ({}): {}", row.char_code, row.display_name, row.value);
        }
        Err(e) if e.is_not_found() => {
            println!("No stored rate for {}", code.to_uppercase());
        }
        Err(e) => return Err(e).context("Failed to read rate store"),
    }
    close_result
}
