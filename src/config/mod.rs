use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::board_shim::DEFAULT_BUFFER_SIZE;
use crate::constants::{BoardIds, LogLevels};
use crate::input_params::BrainFlowInputParams;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub native: NativeConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

/// Where to find `BoardController` and `DataHandler`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct NativeConfig {
    pub lib_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    pub board_id: i32,
    pub buffer_size: i32,
    pub duration_secs: f64,
    pub input_params: BrainFlowInputParams,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            board_id: BoardIds::SyntheticBoard.into(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            duration_secs: 5.0,
            input_params: BrainFlowInputParams::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub board_log_level: LogLevels,
    pub board_log_file: Option<String>,
    pub call_log: bool,
    pub call_log_dir: PathBuf,
    pub call_log_file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            board_log_level: LogLevels::Off,
            board_log_file: None,
            call_log: false,
            call_log_dir: PathBuf::from("logs"),
            call_log_file: "brainflow_calls.log".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub recording_file: String,
    pub file_mode: String,
    pub spectrum_file: PathBuf,
    pub summary_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            recording_file: "recording.csv".to_string(),
            file_mode: "w".to_string(),
            spectrum_file: PathBuf::from("spectrum.csv"),
            summary_dir: PathBuf::from("logs"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[source] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[source] serde_yaml::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] serde_yaml::Error),
    #[error("Failed to write config file: {0}")]
    Write(#[source] std::io::Error),
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let config_str = fs::read_to_string(path).map_err(ConfigError::Read)?;

    serde_yaml::from_str(&config_str).map_err(ConfigError::Parse)
}

pub fn save_config<P: AsRef<Path>>(config: &Config, path: P) -> Result<(), ConfigError> {
    let yaml = serde_yaml::to_string(config).map_err(ConfigError::Serialize)?;

    fs::write(path, yaml).map_err(ConfigError::Write)
}
