/// Trip Planner Server
///
/// Main server entry point. Handles:
/// - Command-line argument parsing
/// - Database initialization
/// - HTTP server startup
use actix_web::web;
use anyhow::Context;
use std::fs;
use std::process;
use trip_planner_server::config::Config;
use trip_planner_server::{db, server};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();

    let config = Config::from_args();

    log::info!("Starting Trip Planner Server");
    log::info!("Database: {:?}", config.database);
    log::info!("Identifier attempts: {}", config.id_max_attempts);

    // Write PID file if specified
    if let Some(pidfile) = &config.pidfile {
        let pid = process::id().to_string();
        fs::write(pidfile, pid)
            .with_context(|| format!("Failed to write PID file {}", pidfile.display()))?;
        log::info!("PID file written to: {:?}", pidfile);
    }

    let pool = db::create_pool(&config.database, config.id_max_attempts).with_context(|| {
        format!("Failed to open database {}", config.database.display())
    })?;
    log::info!("Database initialized");

    let bind_addr = config.bind_addr();
    log::info!("Starting HTTP server on {}", bind_addr);

    let http_server = server::create_http_server(web::Data::new(pool), &bind_addr)
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    http_server.await.context("HTTP server failed")?;
    Ok(())
}
