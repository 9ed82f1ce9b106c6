//! Streaming session façade over the `BoardController` library.
//!
//! A `BoardShim` holds a board id and the JSON form of its input params,
//! built once and passed unchanged to every session call. Session ordering
//! (prepare, start, stop, release) is enforced by the native side only.

use ndarray::Array2;
use std::ffi::CString;
use std::fmt;
use std::sync::Arc;

use crate::bindings::{self, BoardControllerApi, CHANNEL_BUFFER_LEN};
use crate::constants::{BoardProperty, ChannelKind, LogLevels};
use crate::error::{check_status, BrainFlowError, ExitCode, Result};
use crate::input_params::BrainFlowInputParams;
use crate::utils::layout::{from_c_int, reshape_rows, to_c_int, truncate_channels};
use crate::utils::log::CallLog;

/// One hour of data at 250 Hz.
pub const DEFAULT_BUFFER_SIZE: i32 = 3600 * 250;

pub(crate) fn to_cstring(value: impl Into<Vec<u8>>) -> Result<CString> {
    CString::new(value).map_err(|_| BrainFlowError::invalid_arguments())
}

// -----------------------------------------------------------------------------
// BOARD DESCRIPTORS
// -----------------------------------------------------------------------------

fn board_property(
    api: &dyn BoardControllerApi,
    property: BoardProperty,
    board_id: i32,
) -> Result<i32> {
    let mut value = 0;
    check_status(api.get_board_property(property, board_id, &mut value))?;
    Ok(value)
}

fn board_row(
    api: &dyn BoardControllerApi,
    property: BoardProperty,
    board_id: i32,
) -> Result<usize> {
    from_c_int(board_property(api, property, board_id)?)
}

// Column-major scratch space for `num_samples` samples of `num_rows` rows.
fn board_buffer(num_samples: usize, num_rows: usize) -> Option<Vec<f64>> {
    num_samples
        .checked_mul(num_rows)
        .map(|capacity| vec![0.0; capacity])
}

fn board_channels(
    api: &dyn BoardControllerApi,
    kind: ChannelKind,
    board_id: i32,
) -> Result<Vec<usize>> {
    let mut channels = vec![0; CHANNEL_BUFFER_LEN];
    let mut len = 0;
    check_status(api.get_channels(kind, board_id, &mut channels, &mut len))?;

    truncate_channels(&channels, len)?
        .into_iter()
        .map(from_c_int)
        .collect()
}

// -----------------------------------------------------------------------------
// NATIVE LOGGER
// -----------------------------------------------------------------------------

fn apply_log_level(api: &dyn BoardControllerApi, level: LogLevels) -> Result<()> {
    check_status(api.set_log_level(level.into()))
}

fn apply_log_file(api: &dyn BoardControllerApi, log_file: &str) -> Result<()> {
    let log_file = to_cstring(log_file)?;
    check_status(api.set_log_file(&log_file))
}

fn send_log_message(
    api: &dyn BoardControllerApi,
    level: LogLevels,
    message: &str,
) -> Result<()> {
    let message = to_cstring(message)?;
    check_status(api.log_message(level.into(), &message))
}

// -----------------------------------------------------------------------------
// BOARD SHIM
// -----------------------------------------------------------------------------

pub struct BoardShim {
    board_id: i32,
    input_json: CString,
    controller: Arc<dyn BoardControllerApi>,
    call_log: Option<CallLog>,
}

impl BoardShim {
    /// Creates a shim backed by the process-wide `BoardController` library.
    pub fn new(board_id: impl Into<i32>, params: &BrainFlowInputParams) -> Result<Self> {
        Self::with_controller(board_id, params, bindings::board_controller()?)
    }

    pub fn with_controller(
        board_id: impl Into<i32>,
        params: &BrainFlowInputParams,
        controller: Arc<dyn BoardControllerApi>,
    ) -> Result<Self> {
        Ok(Self {
            board_id: board_id.into(),
            input_json: to_cstring(params.to_json()?)?,
            controller,
            call_log: None,
        })
    }

    /// Records every session call and its status in `log`.
    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.call_log = Some(log);
        self
    }

    pub fn board_id(&self) -> i32 {
        self.board_id
    }

    fn call(&self, operation: &str, status: i32) -> Result<()> {
        if let Some(log) = &self.call_log {
            log.record(&format!("{} board_id={}", operation, self.board_id), status);
        }
        check_status(status)
    }

    // SESSION ---------------------------------------------------------------

    /// Prepares the streaming session and allocates native resources.
    pub fn prepare_session(&self) -> Result<()> {
        let status = self
            .controller
            .prepare_session(self.board_id, &self.input_json);
        self.call("prepare_session", status)
    }

    /// Sends a raw configuration string to the board.
    pub fn config_board(&self, config: &str) -> Result<()> {
        let config = to_cstring(config)?;
        let status = self
            .controller
            .config_board(&config, self.board_id, &self.input_json);
        self.call("config_board", status)
    }

    /// Starts the native streaming thread with a ring buffer of `buffer_size` samples.
    pub fn start_stream(&self, buffer_size: i32) -> Result<()> {
        let status = self
            .controller
            .start_stream(buffer_size, self.board_id, &self.input_json);
        self.call("start_stream", status)
    }

    /// Stops streaming without releasing the session.
    pub fn stop_stream(&self) -> Result<()> {
        let status = self
            .controller
            .stop_stream(self.board_id, &self.input_json);
        self.call("stop_stream", status)
    }

    pub fn release_session(&self) -> Result<()> {
        let status = self
            .controller
            .release_session(self.board_id, &self.input_json);
        self.call("release_session", status)
    }

    /// Number of samples currently held in the ring buffer.
    pub fn get_board_data_count(&self) -> Result<usize> {
        let mut count = 0;
        let status = self
            .controller
            .get_board_data_count(&mut count, self.board_id, &self.input_json);
        self.call("get_board_data_count", status)?;
        from_c_int(count)
    }

    /// Latest `num_samples` samples (fewer if the buffer holds less), left in
    /// the ring buffer. Rows are channels, columns samples.
    pub fn get_current_board_data(&self, num_samples: usize) -> Result<Array2<f64>> {
        let requested = to_c_int(num_samples)?;
        let num_rows = self.num_rows()?;
        let mut buffer = board_buffer(num_samples, num_rows)
            .ok_or_else(BrainFlowError::invalid_arguments)?;
        let mut current_size = 0;

        let status = self.controller.get_current_board_data(
            requested,
            &mut buffer,
            &mut current_size,
            self.board_id,
            &self.input_json,
        );
        self.call("get_current_board_data", status)?;

        reshape_rows(&buffer, num_rows, from_c_int(current_size)?)
    }

    /// All buffered samples, removed from the ring buffer.
    pub fn get_board_data(&self) -> Result<Array2<f64>> {
        let size = self.get_board_data_count()?;
        let num_rows = self.num_rows()?;
        let mut buffer = board_buffer(size, num_rows)
            .ok_or(BrainFlowError::Exit(ExitCode::InvalidBufferSizeError))?;

        let status = self.controller.get_board_data(
            to_c_int(size)?,
            &mut buffer,
            self.board_id,
            &self.input_json,
        );
        self.call("get_board_data", status)?;

        reshape_rows(&buffer, num_rows, size)
    }

    // DESCRIPTORS FOR THIS BOARD ----------------------------------------------

    pub fn sampling_rate(&self) -> Result<i32> {
        board_property(
            &*self.controller,
            BoardProperty::SamplingRate,
            self.board_id,
        )
    }

    pub fn num_rows(&self) -> Result<usize> {
        board_row(&*self.controller, BoardProperty::NumRows, self.board_id)
    }

    pub fn package_num_channel(&self) -> Result<usize> {
        board_row(
            &*self.controller,
            BoardProperty::PackageNumChannel,
            self.board_id,
        )
    }

    pub fn timestamp_channel(&self) -> Result<usize> {
        board_row(
            &*self.controller,
            BoardProperty::TimestampChannel,
            self.board_id,
        )
    }

    pub fn channels(&self, kind: ChannelKind) -> Result<Vec<usize>> {
        board_channels(&*self.controller, kind, self.board_id)
    }

    // PROCESS-WIDE DESCRIPTORS ------------------------------------------------

    pub fn get_sampling_rate(board_id: impl Into<i32>) -> Result<i32> {
        board_property(
            &*bindings::board_controller()?,
            BoardProperty::SamplingRate,
            board_id.into(),
        )
    }

    /// Row holding package numbers.
    pub fn get_package_num_channel(board_id: impl Into<i32>) -> Result<usize> {
        board_row(
            &*bindings::board_controller()?,
            BoardProperty::PackageNumChannel,
            board_id.into(),
        )
    }

    /// Row holding timestamps.
    pub fn get_timestamp_channel(board_id: impl Into<i32>) -> Result<usize> {
        board_row(
            &*bindings::board_controller()?,
            BoardProperty::TimestampChannel,
            board_id.into(),
        )
    }

    /// Number of rows in arrays returned by [`BoardShim::get_board_data`].
    pub fn get_num_rows(board_id: impl Into<i32>) -> Result<usize> {
        board_row(
            &*bindings::board_controller()?,
            BoardProperty::NumRows,
            board_id.into(),
        )
    }

    /// Rows of the given kind. Boards that cannot separate EEG/EMG/ECG/EOG
    /// report the same rows for each.
    pub fn get_channels(board_id: impl Into<i32>, kind: ChannelKind) -> Result<Vec<usize>> {
        board_channels(&*bindings::board_controller()?, kind, board_id.into())
    }

    pub fn get_eeg_channels(board_id: impl Into<i32>) -> Result<Vec<usize>> {
        Self::get_channels(board_id, ChannelKind::Eeg)
    }

    pub fn get_emg_channels(board_id: impl Into<i32>) -> Result<Vec<usize>> {
        Self::get_channels(board_id, ChannelKind::Emg)
    }

    pub fn get_ecg_channels(board_id: impl Into<i32>) -> Result<Vec<usize>> {
        Self::get_channels(board_id, ChannelKind::Ecg)
    }

    pub fn get_eog_channels(board_id: impl Into<i32>) -> Result<Vec<usize>> {
        Self::get_channels(board_id, ChannelKind::Eog)
    }

    pub fn get_eda_channels(board_id: impl Into<i32>) -> Result<Vec<usize>> {
        Self::get_channels(board_id, ChannelKind::Eda)
    }

    pub fn get_ppg_channels(board_id: impl Into<i32>) -> Result<Vec<usize>> {
        Self::get_channels(board_id, ChannelKind::Ppg)
    }

    pub fn get_accel_channels(board_id: impl Into<i32>) -> Result<Vec<usize>> {
        Self::get_channels(board_id, ChannelKind::Accel)
    }

    pub fn get_analog_channels(board_id: impl Into<i32>) -> Result<Vec<usize>> {
        Self::get_channels(board_id, ChannelKind::Analog)
    }

    pub fn get_gyro_channels(board_id: impl Into<i32>) -> Result<Vec<usize>> {
        Self::get_channels(board_id, ChannelKind::Gyro)
    }

    pub fn get_other_channels(board_id: impl Into<i32>) -> Result<Vec<usize>> {
        Self::get_channels(board_id, ChannelKind::Other)
    }

    // NATIVE LOGGER -----------------------------------------------------------

    /// The native logger is off until a level is set.
    pub fn set_log_level(level: LogLevels) -> Result<()> {
        apply_log_level(&*bindings::board_controller()?, level)
    }

    pub fn enable_board_logger() -> Result<()> {
        Self::set_log_level(LogLevels::Info)
    }

    pub fn disable_board_logger() -> Result<()> {
        Self::set_log_level(LogLevels::Off)
    }

    pub fn enable_dev_board_logger() -> Result<()> {
        Self::set_log_level(LogLevels::Trace)
    }

    /// Redirects the native logger from stderr to `log_file`.
    pub fn set_log_file(log_file: &str) -> Result<()> {
        apply_log_file(&*bindings::board_controller()?, log_file)
    }

    /// Writes `message` through the native logger.
    pub fn log_message(level: LogLevels, message: &str) -> Result<()> {
        send_log_message(&*bindings::board_controller()?, level, message)
    }
}

impl fmt::Debug for BoardShim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardShim")
            .field("board_id", &self.board_id)
            .field("input_json", &self.input_json)
            .field("call_log", &self.call_log)
            .finish()
    }
}
