/// Configuration management for the trip planner server.
/// Handles command-line argument parsing and config structure.
use crate::db::ids::DEFAULT_MAX_ATTEMPTS;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "Trip Planner Server")]
#[command(about = "REST backend for trips, places, bookings and friends", long_about = None)]
pub struct Config {
    /// Interface to bind (default: 127.0.0.1)
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Server port (default: 4000)
    #[arg(long, default_value = "4000")]
    pub port: u16,

    /// SQLite database file path (default: trips.db)
    #[arg(long, default_value = "trips.db")]
    pub database: PathBuf,

    /// PID file path (optional) - write server PID to this file on startup
    #[arg(long)]
    pub pidfile: Option<PathBuf>,

    /// Identifier candidates tried before a create gives up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub id_max_attempts: u32,
}

impl Config {
    /// Parse command-line arguments into Config
    pub fn from_args() -> Self {
        Config::parse()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
