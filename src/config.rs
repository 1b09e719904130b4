use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::store::DEFAULT_STORE_PATH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "rosterd", version)]
#[command(about = "Student roster sidecar: JSON requests on stdin, JSON responses on stdout")]
pub struct Config {
    /// Roster file loaded at startup and written after every change
    #[arg(long, env = "ROSTERD_STORE", default_value = DEFAULT_STORE_PATH)]
    pub store: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Shape of the log lines written to stderr
    #[arg(long, value_enum, default_value = "compact")]
    pub log_format: LogFormat,
}
