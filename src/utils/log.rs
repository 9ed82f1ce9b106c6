use chrono::Local;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::LoggingConfig;

/// Appends a timestamped entry to `dir/filename`, creating both if needed.
///
/// # Arguments
///
/// * `dir` - Directory holding the log file
/// * `filename` - Name of the log file inside `dir`
/// * `message` - The message to log
pub fn log_to_file(dir: &Path, filename: &str, message: &str) -> io::Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(filename))?;

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    writeln!(file, "[{}] {}", timestamp, message)?;

    file.flush()?;

    Ok(())
}

/// Logs a message under a formatted header block.
pub fn log_with_header(dir: &Path, filename: &str, header: &str, message: &str) -> io::Result<()> {
    let formatted_message = format!(
        "===== {} =====\n{}\n====================",
        header, message
    );
    log_to_file(dir, filename, &formatted_message)
}

/// Appends a row to a CSV file, writing `headers` first if the file is new.
pub fn log_csv(dir: &Path, filename: &str, headers: &[&str], data: &[&str]) -> io::Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }

    let path = dir.join(filename);
    let file_exists = path.exists();

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if !file_exists && !headers.is_empty() {
        writer.write_record(headers)?;
    }

    writer.write_record(data)?;
    writer.flush()?;

    Ok(())
}

// CALL LOG --------------------------------------------------------------------

/// Records every delegated native call made through a façade.
#[derive(Debug, Clone)]
pub struct CallLog {
    dir: PathBuf,
    filename: String,
}

impl CallLog {
    pub fn new(dir: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            filename: filename.into(),
        }
    }

    /// Returns `None` when call logging is switched off.
    pub fn from_config(config: &LoggingConfig) -> Option<Self> {
        config
            .call_log
            .then(|| Self::new(&config.call_log_dir, config.call_log_file.clone()))
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.filename)
    }

    pub fn record(&self, operation: &str, status: i32) {
        let message = format!("{} -> {}", operation, status);
        // a failing log write must not turn a successful native call into an error
        if let Err(e) = log_to_file(&self.dir, &self.filename, &message) {
            eprintln!("Failed to write call log {:?}: {}", self.path(), e);
        }
    }
}
