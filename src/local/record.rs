use chrono::Local;
use colored::Colorize;
use ndarray::Array2;
use std::thread;
use std::time::Duration;

use brainflow::config::{load_config, SessionConfig};
use brainflow::utils::log::{log_csv, CallLog};
use brainflow::BoardShim;

use super::{apply_native_config, data_filter, CliError};

const SUMMARY_FILE: &str = "sessions.csv";
const SUMMARY_HEADERS: [&str; 6] = [
    "timestamp",
    "board_id",
    "duration_secs",
    "rows",
    "samples",
    "file",
];

pub fn run(config_path: &str) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    apply_native_config(&config)?;

    let session = &config.session;
    let mut board = BoardShim::new(session.board_id, &session.input_params)?;
    if let Some(log) = CallLog::from_config(&config.logging) {
        board = board.with_call_log(log);
    }

    println!(
        "{}",
        format!("Recording board {} for {}s", session.board_id, session.duration_secs).bold()
    );

    board.prepare_session()?;
    let streamed = stream(&board, session);
    // release even when streaming failed, then report the first error
    let released = board.release_session();
    let data = streamed?;
    released?;

    let (rows, samples) = data.dim();
    let output = &config.output;
    data_filter(&config)?.write_file(
        &data,
        &output.recording_file,
        &output.file_mode,
    )?;

    let summary = [
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        session.board_id.to_string(),
        session.duration_secs.to_string(),
        rows.to_string(),
        samples.to_string(),
        output.recording_file.clone(),
    ];
    let summary: Vec<&str> = summary.iter().map(String::as_str).collect();
    log_csv(&output.summary_dir, SUMMARY_FILE, &SUMMARY_HEADERS, &summary)?;

    println!(
        "{} {} samples x {} rows written to {}",
        "Done:".green().bold(),
        samples,
        rows,
        output.recording_file
    );
    Ok(())
}

fn stream(board: &BoardShim, session: &SessionConfig) -> Result<Array2<f64>, CliError> {
    let duration = Duration::try_from_secs_f64(session.duration_secs)
        .map_err(|_| {
            CliError::Usage(format!("Invalid duration: {}", session.duration_secs))
        })?;

    board.start_stream(session.buffer_size)?;
    thread::sleep(duration);
    let data = board.get_board_data();
    let stopped = board.stop_stream();

    let data = data?;
    stopped?;
    Ok(data)
}
