use colored::*;
use log::{error, info};

// Paired log + terminal output helpers for the screen loop.

pub fn log_info(message: &str) {
    info!("{message}");
}

pub fn log_error(message: &str) {
    error!("{message}");
    eprintln!("{}", message.red());
}
