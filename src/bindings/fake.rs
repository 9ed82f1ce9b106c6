//! In-memory stand-ins for the native libraries, used by unit tests.
//!
//! They implement just enough behaviour to exercise the façades'
//! marshaling: sized buffers, reported lengths and status codes.

use std::collections::HashMap;
use std::ffi::CStr;
use std::sync::Mutex;

use super::{BoardControllerApi, DataHandlerApi};
use crate::constants::{BoardProperty, ChannelKind};
use crate::error::ExitCode;

const OK: i32 = 0;

fn code(exit: ExitCode) -> i32 {
    exit.code()
}

// BOARD CONTROLLER ------------------------------------------------------------

/// Synthetic board with id -1 and six rows:
/// 0 package, 1-3 eeg, 4 accel, 5 timestamp.
pub const FAKE_BOARD_ID: i32 = -1;
pub const FAKE_NUM_ROWS: usize = 6;
pub const FAKE_SAMPLING_RATE: i32 = 250;

#[derive(Default)]
struct BoardState {
    prepared: bool,
    streaming: bool,
    samples: Vec<[f64; FAKE_NUM_ROWS]>,
    next_package: usize,
    json_seen: Vec<String>,
    configs: Vec<String>,
    log_level: Option<i32>,
    log_file: Option<String>,
    messages: Vec<(i32, String)>,
    forced_status: Option<i32>,
}

#[derive(Default)]
pub struct FakeBoardController {
    state: Mutex<BoardState>,
}

impl FakeBoardController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `count` samples; cell value is `row * 1000 + package number`.
    pub fn push_samples(&self, count: usize) {
        let mut state = self.state.lock().unwrap();
        for _ in 0..count {
            let package = state.next_package;
            let mut sample = [0.0; FAKE_NUM_ROWS];
            for (row, cell) in sample.iter_mut().enumerate() {
                *cell = (row * 1000 + package) as f64;
            }
            state.samples.push(sample);
            state.next_package += 1;
        }
    }

    /// Every session call returns `status` from now on.
    pub fn force_status(&self, status: i32) {
        self.state.lock().unwrap().forced_status = Some(status);
    }

    pub fn json_seen(&self) -> Vec<String> {
        self.state.lock().unwrap().json_seen.clone()
    }

    pub fn configs(&self) -> Vec<String> {
        self.state.lock().unwrap().configs.clone()
    }

    pub fn log_level(&self) -> Option<i32> {
        self.state.lock().unwrap().log_level
    }

    pub fn log_file(&self) -> Option<String> {
        self.state.lock().unwrap().log_file.clone()
    }

    pub fn messages(&self) -> Vec<(i32, String)> {
        self.state.lock().unwrap().messages.clone()
    }

    pub fn is_streaming(&self) -> bool {
        self.state.lock().unwrap().streaming
    }

    pub fn buffered(&self) -> usize {
        self.state.lock().unwrap().samples.len()
    }

    fn session_call<F>(&self, board_id: i32, input_json: &CStr, f: F) -> i32
    where
        F: FnOnce(&mut BoardState) -> i32,
    {
        let mut state = self.state.lock().unwrap();
        state
            .json_seen
            .push(input_json.to_string_lossy().into_owned());
        if let Some(status) = state.forced_status {
            return status;
        }
        if board_id != FAKE_BOARD_ID {
            return code(ExitCode::UnsupportedBoardError);
        }
        f(&mut state)
    }

    // row-major with a row stride of `samples.len()`
    fn write_rows(samples: &[[f64; FAKE_NUM_ROWS]], data: &mut [f64]) {
        let count = samples.len();
        for (col, sample) in samples.iter().enumerate() {
            for (row, value) in sample.iter().enumerate() {
                data[row * count + col] = *value;
            }
        }
    }
}

impl BoardControllerApi for FakeBoardController {
    fn prepare_session(&self, board_id: i32, input_json: &CStr) -> i32 {
        self.session_call(board_id, input_json, |state| {
            if state.prepared {
                return code(ExitCode::PortAlreadyOpenError);
            }
            state.prepared = true;
            OK
        })
    }

    fn config_board(&self, config: &CStr, board_id: i32, input_json: &CStr) -> i32 {
        self.session_call(board_id, input_json, |state| {
            if !state.prepared {
                return code(ExitCode::BoardNotCreatedError);
            }
            state.configs.push(config.to_string_lossy().into_owned());
            OK
        })
    }

    fn start_stream(&self, buffer_size: i32, board_id: i32, input_json: &CStr) -> i32 {
        self.session_call(board_id, input_json, |state| {
            if !state.prepared {
                return code(ExitCode::BoardNotCreatedError);
            }
            if buffer_size <= 0 {
                return code(ExitCode::InvalidBufferSizeError);
            }
            if state.streaming {
                return code(ExitCode::StreamAlreadyRunError);
            }
            state.streaming = true;
            OK
        })
    }

    fn stop_stream(&self, board_id: i32, input_json: &CStr) -> i32 {
        self.session_call(board_id, input_json, |state| {
            if !state.streaming {
                return code(ExitCode::StreamThreadIsNotRunning);
            }
            state.streaming = false;
            OK
        })
    }

    fn release_session(&self, board_id: i32, input_json: &CStr) -> i32 {
        self.session_call(board_id, input_json, |state| {
            if !state.prepared {
                return code(ExitCode::BoardNotCreatedError);
            }
            state.prepared = false;
            state.streaming = false;
            state.samples.clear();
            OK
        })
    }

    fn get_board_data_count(&self, count: &mut i32, board_id: i32, input_json: &CStr) -> i32 {
        self.session_call(board_id, input_json, |state| {
            if !state.prepared {
                return code(ExitCode::BoardNotCreatedError);
            }
            *count = state.samples.len() as i32;
            OK
        })
    }

    fn get_current_board_data(
        &self,
        num_samples: i32,
        data: &mut [f64],
        returned_samples: &mut i32,
        board_id: i32,
        input_json: &CStr,
    ) -> i32 {
        self.session_call(board_id, input_json, |state| {
            if !state.prepared {
                return code(ExitCode::BoardNotCreatedError);
            }
            if num_samples < 0 {
                return code(ExitCode::InvalidArgumentsError);
            }
            let take = (num_samples as usize).min(state.samples.len());
            let latest = &state.samples[state.samples.len() - take..];
            Self::write_rows(latest, data);
            *returned_samples = take as i32;
            OK
        })
    }

    fn get_board_data(
        &self,
        data_count: i32,
        data: &mut [f64],
        board_id: i32,
        input_json: &CStr,
    ) -> i32 {
        self.session_call(board_id, input_json, |state| {
            if !state.prepared {
                return code(ExitCode::BoardNotCreatedError);
            }
            if data_count < 0 || data_count as usize > state.samples.len() {
                return code(ExitCode::InvalidArgumentsError);
            }
            let drained: Vec<_> = state.samples.drain(..data_count as usize).collect();
            Self::write_rows(&drained, data);
            OK
        })
    }

    fn set_log_level(&self, log_level: i32) -> i32 {
        if !(0..=6).contains(&log_level) {
            return code(ExitCode::InvalidArgumentsError);
        }
        self.state.lock().unwrap().log_level = Some(log_level);
        OK
    }

    fn set_log_file(&self, log_file: &CStr) -> i32 {
        let log_file = log_file.to_string_lossy().into_owned();
        self.state.lock().unwrap().log_file = Some(log_file);
        OK
    }

    fn log_message(&self, log_level: i32, message: &CStr) -> i32 {
        self.state
            .lock()
            .unwrap()
            .messages
            .push((log_level, message.to_string_lossy().into_owned()));
        OK
    }

    fn get_board_property(&self, property: BoardProperty, board_id: i32, value: &mut i32) -> i32 {
        if board_id != FAKE_BOARD_ID {
            return code(ExitCode::UnsupportedBoardError);
        }
        *value = match property {
            BoardProperty::SamplingRate => FAKE_SAMPLING_RATE,
            BoardProperty::PackageNumChannel => 0,
            BoardProperty::TimestampChannel => 5,
            BoardProperty::NumRows => FAKE_NUM_ROWS as i32,
        };
        OK
    }

    fn get_channels(
        &self,
        kind: ChannelKind,
        board_id: i32,
        channels: &mut [i32],
        len: &mut i32,
    ) -> i32 {
        if board_id != FAKE_BOARD_ID {
            return code(ExitCode::UnsupportedBoardError);
        }
        // the same rows back eeg/emg/ecg/eog, as on boards that cannot split them
        let rows: &[i32] = match kind {
            ChannelKind::Eeg | ChannelKind::Emg | ChannelKind::Ecg | ChannelKind::Eog => &[1, 2, 3],
            ChannelKind::Accel => &[4],
            _ => &[],
        };
        channels[..rows.len()].copy_from_slice(rows);
        *len = rows.len() as i32;
        OK
    }
}

// DATA HANDLER ----------------------------------------------------------------

struct StoredFile {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

/// Deterministic kernels with the native output shapes.
#[derive(Default)]
pub struct FakeDataHandler {
    files: Mutex<HashMap<String, StoredFile>>,
}

const WAVELETS: [&str; 4] = ["db1", "db4", "haar", "sym2"];

impl FakeDataHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_filter(sampling_rate: i32, order: i32) -> Option<i32> {
        (sampling_rate <= 0 || order <= 0).then(|| code(ExitCode::InvalidArgumentsError))
    }

    fn known_wavelet(wavelet: &CStr) -> bool {
        WAVELETS.iter().any(|name| name.as_bytes() == wavelet.to_bytes())
    }

    fn aggregate(values: &[f64], agg_operation: i32) -> Option<f64> {
        match agg_operation {
            0 => Some(values.iter().sum::<f64>() / values.len() as f64),
            1 => {
                let mut sorted = values.to_vec();
                sorted.sort_by(|a, b| a.total_cmp(b));
                Some(sorted[sorted.len() / 2])
            }
            2 => values.first().copied(),
            _ => None,
        }
    }
}

impl DataHandlerApi for FakeDataHandler {
    fn perform_lowpass(
        &self,
        data: &mut [f64],
        sampling_rate: i32,
        _cutoff: f64,
        order: i32,
        _filter_type: i32,
        _ripple: f64,
    ) -> i32 {
        if let Some(status) = Self::check_filter(sampling_rate, order) {
            return status;
        }
        data.iter_mut().for_each(|v| *v *= 0.5);
        OK
    }

    fn perform_highpass(
        &self,
        data: &mut [f64],
        sampling_rate: i32,
        _cutoff: f64,
        order: i32,
        _filter_type: i32,
        _ripple: f64,
    ) -> i32 {
        if let Some(status) = Self::check_filter(sampling_rate, order) {
            return status;
        }
        let mean = data.iter().sum::<f64>() / data.len().max(1) as f64;
        data.iter_mut().for_each(|v| *v -= mean);
        OK
    }

    fn perform_bandpass(
        &self,
        data: &mut [f64],
        sampling_rate: i32,
        _center_freq: f64,
        band_width: f64,
        order: i32,
        _filter_type: i32,
        _ripple: f64,
    ) -> i32 {
        if let Some(status) = Self::check_filter(sampling_rate, order) {
            return status;
        }
        if band_width <= 0.0 {
            return code(ExitCode::InvalidArgumentsError);
        }
        data.iter_mut().for_each(|v| *v *= 0.25);
        OK
    }

    fn perform_bandstop(
        &self,
        data: &mut [f64],
        sampling_rate: i32,
        _center_freq: f64,
        band_width: f64,
        order: i32,
        _filter_type: i32,
        _ripple: f64,
    ) -> i32 {
        if let Some(status) = Self::check_filter(sampling_rate, order) {
            return status;
        }
        if band_width <= 0.0 {
            return code(ExitCode::InvalidArgumentsError);
        }
        data.iter_mut().for_each(|v| *v *= 0.75);
        OK
    }

    fn perform_rolling_filter(&self, data: &mut [f64], period: i32, agg_operation: i32) -> i32 {
        if period <= 0 {
            return code(ExitCode::InvalidArgumentsError);
        }
        let period = period as usize;
        let source = data.to_vec();
        for i in 0..data.len() {
            let start = (i + 1).saturating_sub(period);
            match Self::aggregate(&source[start..=i], agg_operation) {
                Some(value) => data[i] = value,
                None => return code(ExitCode::InvalidArgumentsError),
            }
        }
        OK
    }

    fn perform_downsampling(
        &self,
        data: &[f64],
        period: i32,
        agg_operation: i32,
        output: &mut [f64],
    ) -> i32 {
        if period <= 0 {
            return code(ExitCode::InvalidArgumentsError);
        }
        for (out, chunk) in output.iter_mut().zip(data.chunks_exact(period as usize)) {
            match Self::aggregate(chunk, agg_operation) {
                Some(value) => *out = value,
                None => return code(ExitCode::InvalidArgumentsError),
            }
        }
        OK
    }

    fn perform_wavelet_transform(
        &self,
        data: &[f64],
        wavelet: &CStr,
        decomposition_level: i32,
        output: &mut [f64],
        lengths: &mut [i32],
    ) -> i32 {
        if !Self::known_wavelet(wavelet) || decomposition_level <= 0 {
            return code(ExitCode::InvalidArgumentsError);
        }
        // identity "transform" split into level + 1 blocks, remainder in the first
        let blocks = lengths.len();
        let base = data.len() / blocks;
        for length in lengths.iter_mut() {
            *length = base as i32;
        }
        lengths[0] += (data.len() - base * blocks) as i32;
        output[..data.len()].copy_from_slice(data);
        // padding the caller must truncate away
        output[data.len()..].iter_mut().for_each(|v| *v = f64::NAN);
        OK
    }

    fn perform_inverse_wavelet_transform(
        &self,
        coeffs: &[f64],
        wavelet: &CStr,
        decomposition_level: i32,
        lengths: &[i32],
        output: &mut [f64],
    ) -> i32 {
        if !Self::known_wavelet(wavelet) || lengths.len() != decomposition_level as usize + 1 {
            return code(ExitCode::InvalidArgumentsError);
        }
        if coeffs.len() < output.len() {
            return code(ExitCode::InvalidBufferSizeError);
        }
        output.copy_from_slice(&coeffs[..output.len()]);
        OK
    }

    fn perform_wavelet_denoising(
        &self,
        data: &mut [f64],
        wavelet: &CStr,
        decomposition_level: i32,
    ) -> i32 {
        if !Self::known_wavelet(wavelet) || decomposition_level <= 0 {
            return code(ExitCode::InvalidArgumentsError);
        }
        data.iter_mut().for_each(|v| *v = v.round());
        OK
    }

    fn perform_fft(&self, data: &[f64], re: &mut [f64], im: &mut [f64]) -> i32 {
        let n = data.len();
        for k in 0..re.len() {
            let (mut sum_re, mut sum_im) = (0.0, 0.0);
            for (t, &x) in data.iter().enumerate() {
                let angle = -2.0 * std::f64::consts::PI * (k * t) as f64 / n as f64;
                sum_re += x * angle.cos();
                sum_im += x * angle.sin();
            }
            re[k] = sum_re;
            im[k] = sum_im;
        }
        OK
    }

    fn perform_ifft(&self, re: &[f64], im: &[f64], output: &mut [f64]) -> i32 {
        let n = output.len();
        let bins = re.len();
        for (t, out) in output.iter_mut().enumerate() {
            let mut sum = 0.0;
            for k in 0..n {
                // rebuild the full spectrum from the half spectrum by symmetry
                let (kr, ki) = if k < bins {
                    (re[k], im[k])
                } else {
                    (re[n - k], -im[n - k])
                };
                let angle = 2.0 * std::f64::consts::PI * (k * t) as f64 / n as f64;
                sum += kr * angle.cos() - ki * angle.sin();
            }
            *out = sum / n as f64;
        }
        OK
    }

    fn write_file(
        &self,
        data: &[f64],
        num_rows: i32,
        num_cols: i32,
        file_name: &CStr,
        file_mode: &CStr,
    ) -> i32 {
        let (rows, cols) = (num_rows as usize, num_cols as usize);
        if data.len() != rows * cols {
            return code(ExitCode::InvalidBufferSizeError);
        }
        let name = file_name.to_string_lossy().into_owned();
        let mut files = self.files.lock().unwrap();

        match file_mode.to_bytes() {
            b"w" => {
                files.insert(
                    name,
                    StoredFile {
                        rows,
                        cols,
                        data: data.to_vec(),
                    },
                );
            }
            b"a" => match files.get_mut(&name) {
                Some(existing) if existing.rows == rows => {
                    // appending samples means appending columns to every row
                    let mut merged = Vec::with_capacity(existing.data.len() + data.len());
                    for row in 0..rows {
                        merged.extend_from_slice(
                            &existing.data[row * existing.cols..(row + 1) * existing.cols],
                        );
                        merged.extend_from_slice(&data[row * cols..(row + 1) * cols]);
                    }
                    existing.cols += cols;
                    existing.data = merged;
                }
                Some(_) => return code(ExitCode::InvalidArgumentsError),
                None => {
                    files.insert(
                        name,
                        StoredFile {
                            rows,
                            cols,
                            data: data.to_vec(),
                        },
                    );
                }
            },
            _ => return code(ExitCode::InvalidArgumentsError),
        }
        OK
    }

    fn read_file(
        &self,
        data: &mut [f64],
        num_rows: &mut i32,
        num_cols: &mut i32,
        file_name: &CStr,
    ) -> i32 {
        let files = self.files.lock().unwrap();
        let Some(file) = files.get(&*file_name.to_string_lossy()) else {
            return code(ExitCode::GeneralError);
        };
        if data.len() < file.data.len() {
            return code(ExitCode::InvalidBufferSizeError);
        }
        data[..file.data.len()].copy_from_slice(&file.data);
        *num_rows = file.rows as i32;
        *num_cols = file.cols as i32;
        OK
    }

    fn get_num_elements_in_file(&self, file_name: &CStr, num_elements: &mut i32) -> i32 {
        let files = self.files.lock().unwrap();
        match files.get(&*file_name.to_string_lossy()) {
            Some(file) => {
                *num_elements = file.data.len() as i32;
                OK
            }
            None => code(ExitCode::GeneralError),
        }
    }
}
