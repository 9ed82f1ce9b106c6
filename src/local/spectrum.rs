use colored::Colorize;
use std::io;

use brainflow::config::load_config;
use brainflow::BoardShim;

use super::{apply_native_config, data_filter, CliError};

pub fn run(config_path: &str) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    apply_native_config(&config)?;

    let filter = data_filter(&config)?;
    let data = filter.read_file(&config.output.recording_file)?;

    let board_id = config.session.board_id;
    let sampling_rate = BoardShim::get_sampling_rate(board_id)?;
    let channels: Vec<usize> = BoardShim::get_eeg_channels(board_id)?
        .into_iter()
        .filter(|&row| row < data.nrows())
        .collect();

    let window = largest_power_of_two(data.ncols()).ok_or_else(|| {
        CliError::Usage(format!("No samples in {}", config.output.recording_file))
    })?;

    let mut magnitudes: Vec<Vec<f64>> = Vec::with_capacity(channels.len());
    for &row in &channels {
        let samples = data.row(row).to_vec();
        let spectrum = filter.perform_fft(&samples, 0, window)?;
        magnitudes.push(spectrum.iter().map(|bin| bin.norm()).collect());
    }

    let file = std::fs::File::create(&config.output.spectrum_file)?;
    write_spectrum(file, sampling_rate, window, &channels, &magnitudes)?;

    println!(
        "{} {} channels, {} samples window, written to {:?}",
        "Done:".green().bold(),
        channels.len(),
        window,
        config.output.spectrum_file
    );
    Ok(())
}

fn largest_power_of_two(n: usize) -> Option<usize> {
    (n > 0).then(|| 1 << (usize::BITS - 1 - n.leading_zeros()))
}

/// One line per frequency bin, one column per channel.
fn write_spectrum<W: io::Write>(
    writer: W,
    sampling_rate: i32,
    window: usize,
    channels: &[usize],
    magnitudes: &[Vec<f64>],
) -> Result<(), CliError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["frequency_hz".to_string()];
    header.extend(channels.iter().map(|row| format!("channel_{}", row)));
    wtr.write_record(&header)?;

    let bins = magnitudes.first().map_or(0, Vec::len);
    for bin in 0..bins {
        let frequency = bin as f64 * f64::from(sampling_rate) / window as f64;
        let mut record = vec![frequency.to_string()];
        record.extend(magnitudes.iter().map(|channel| channel[bin].to_string()));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
