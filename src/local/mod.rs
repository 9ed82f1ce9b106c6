use std::io;
use thiserror::Error;

use brainflow::config::{Config, ConfigError};
use brainflow::utils::log::CallLog;
use brainflow::{bindings, BoardShim, BrainFlowError, DataFilter};

pub mod info;
pub mod record;
pub mod spectrum;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    BrainFlow(#[from] BrainFlowError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Usage(String),
}

/// Points the loader at the configured library directory and sets up the
/// native logger. Must run before the first native call.
pub fn apply_native_config(config: &Config) -> Result<(), CliError> {
    if let Some(dir) = &config.native.lib_dir {
        if !bindings::set_library_dir(dir) {
            eprintln!("Library directory already set, ignoring {:?}", dir);
        }
    }

    BoardShim::set_log_level(config.logging.board_log_level)?;
    if let Some(log_file) = &config.logging.board_log_file {
        BoardShim::set_log_file(log_file)?;
    }

    Ok(())
}

pub fn data_filter(config: &Config) -> Result<DataFilter, CliError> {
    let filter = DataFilter::new()?;
    Ok(match CallLog::from_config(&config.logging) {
        Some(log) => filter.with_call_log(log),
        None => filter,
    })
}
