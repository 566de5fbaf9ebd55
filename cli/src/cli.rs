use clap::Parser;
use std::path::PathBuf;

/// Terminal client for the note service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Base URL of the note service API
    #[arg(short, long, env = "JOT_SERVER_URL")]
    pub server: Option<String>,

    /// Path to the config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Keep the session in memory only; do not touch the session file
    #[arg(long, default_value_t = false)]
    pub ephemeral: bool,

    /// Enable verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
