//! Seam between the façades and the native libraries.
//!
//! Each trait method mirrors one native entry point and returns its raw
//! status code. Buffers are passed as slices; the native implementation turns
//! them into pointer/length pairs and returns `InvalidArgumentsError` for any
//! output slice shorter than the native call writes.

pub mod native;

#[cfg(test)]
pub(crate) mod fake;

use once_cell::sync::OnceCell;
use std::env;
use std::ffi::CStr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::constants::{BoardProperty, ChannelKind};
use crate::error::Result;
use native::{NativeBoardController, NativeDataHandler};

pub const BOARD_CONTROLLER_LIB: &str = "BoardController";
pub const DATA_HANDLER_LIB: &str = "DataHandler";

/// Environment variable consulted when no library directory was set explicitly.
pub const LIB_DIR_ENV: &str = "BRAINFLOW_LIB_DIR";

/// Capacity the native channel getters assume for their output buffer.
pub const CHANNEL_BUFFER_LEN: usize = 512;

/// Room the native wavelet transform needs beyond the input length.
pub const WAVELET_PADDING: usize = 2 * (40 + 1);

/// Entry points of the acquisition library.
pub trait BoardControllerApi: Send + Sync {
    fn prepare_session(&self, board_id: i32, input_json: &CStr) -> i32;
    fn config_board(&self, config: &CStr, board_id: i32, input_json: &CStr) -> i32;
    fn start_stream(&self, buffer_size: i32, board_id: i32, input_json: &CStr) -> i32;
    fn stop_stream(&self, board_id: i32, input_json: &CStr) -> i32;
    fn release_session(&self, board_id: i32, input_json: &CStr) -> i32;
    fn get_board_data_count(&self, count: &mut i32, board_id: i32, input_json: &CStr) -> i32;
    /// `data` must hold `num_samples * num_rows` values.
    fn get_current_board_data(
        &self,
        num_samples: i32,
        data: &mut [f64],
        returned_samples: &mut i32,
        board_id: i32,
        input_json: &CStr,
    ) -> i32;
    /// `data` must hold `data_count * num_rows` values.
    fn get_board_data(
        &self,
        data_count: i32,
        data: &mut [f64],
        board_id: i32,
        input_json: &CStr,
    ) -> i32;
    fn set_log_level(&self, log_level: i32) -> i32;
    fn set_log_file(&self, log_file: &CStr) -> i32;
    fn log_message(&self, log_level: i32, message: &CStr) -> i32;
    fn get_board_property(&self, property: BoardProperty, board_id: i32, value: &mut i32) -> i32;
    /// `channels` must hold [`CHANNEL_BUFFER_LEN`] values.
    fn get_channels(
        &self,
        kind: ChannelKind,
        board_id: i32,
        channels: &mut [i32],
        len: &mut i32,
    ) -> i32;
}

/// Entry points of the signal processing library.
pub trait DataHandlerApi: Send + Sync {
    fn perform_lowpass(
        &self,
        data: &mut [f64],
        sampling_rate: i32,
        cutoff: f64,
        order: i32,
        filter_type: i32,
        ripple: f64,
    ) -> i32;
    fn perform_highpass(
        &self,
        data: &mut [f64],
        sampling_rate: i32,
        cutoff: f64,
        order: i32,
        filter_type: i32,
        ripple: f64,
    ) -> i32;
    #[allow(clippy::too_many_arguments)]
    fn perform_bandpass(
        &self,
        data: &mut [f64],
        sampling_rate: i32,
        center_freq: f64,
        band_width: f64,
        order: i32,
        filter_type: i32,
        ripple: f64,
    ) -> i32;
    #[allow(clippy::too_many_arguments)]
    fn perform_bandstop(
        &self,
        data: &mut [f64],
        sampling_rate: i32,
        center_freq: f64,
        band_width: f64,
        order: i32,
        filter_type: i32,
        ripple: f64,
    ) -> i32;
    fn perform_rolling_filter(&self, data: &mut [f64], period: i32, agg_operation: i32) -> i32;
    /// `output` must hold `data.len() / period` values.
    fn perform_downsampling(
        &self,
        data: &[f64],
        period: i32,
        agg_operation: i32,
        output: &mut [f64],
    ) -> i32;
    /// `output` must hold `data.len() + WAVELET_PADDING` values and `lengths`
    /// `decomposition_level + 1`.
    fn perform_wavelet_transform(
        &self,
        data: &[f64],
        wavelet: &CStr,
        decomposition_level: i32,
        output: &mut [f64],
        lengths: &mut [i32],
    ) -> i32;
    /// `lengths` must hold `decomposition_level + 1` values and `coeffs` their sum.
    fn perform_inverse_wavelet_transform(
        &self,
        coeffs: &[f64],
        wavelet: &CStr,
        decomposition_level: i32,
        lengths: &[i32],
        output: &mut [f64],
    ) -> i32;
    fn perform_wavelet_denoising(
        &self,
        data: &mut [f64],
        wavelet: &CStr,
        decomposition_level: i32,
    ) -> i32;
    /// `re` and `im` must hold `data.len() / 2 + 1` values.
    fn perform_fft(&self, data: &[f64], re: &mut [f64], im: &mut [f64]) -> i32;
    /// `output` must hold `(re.len() - 1) * 2` values.
    fn perform_ifft(&self, re: &[f64], im: &[f64], output: &mut [f64]) -> i32;
    fn write_file(
        &self,
        data: &[f64],
        num_rows: i32,
        num_cols: i32,
        file_name: &CStr,
        file_mode: &CStr,
    ) -> i32;
    /// Reads at most `data.len()` values.
    fn read_file(
        &self,
        data: &mut [f64],
        num_rows: &mut i32,
        num_cols: &mut i32,
        file_name: &CStr,
    ) -> i32;
    fn get_num_elements_in_file(&self, file_name: &CStr, num_elements: &mut i32) -> i32;
}

// -----------------------------------------------------------------------------
// PROCESS-WIDE LIBRARY HANDLES
// -----------------------------------------------------------------------------

static LIB_DIR: OnceCell<PathBuf> = OnceCell::new();
static BOARD_CONTROLLER: OnceCell<Arc<NativeBoardController>> = OnceCell::new();
static DATA_HANDLER: OnceCell<Arc<NativeDataHandler>> = OnceCell::new();

/// Sets the directory the native libraries are loaded from.
///
/// Only the first call has an effect, and only if no library was loaded yet.
/// Returns `false` when the directory was already fixed.
pub fn set_library_dir(dir: impl Into<PathBuf>) -> bool {
    if libraries_loaded() {
        return false;
    }
    LIB_DIR.set(dir.into()).is_ok()
}

fn libraries_loaded() -> bool {
    BOARD_CONTROLLER.get().is_some() || DATA_HANDLER.get().is_some()
}

/// Full path (or bare platform file name) for one of the native libraries.
pub fn library_path(name: &str) -> PathBuf {
    let file_name = libloading::library_filename(name);
    let dir = LIB_DIR
        .get()
        .cloned()
        .or_else(|| env::var_os(LIB_DIR_ENV).map(PathBuf::from));

    match dir {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Shared handle on the acquisition library, loaded on first use.
pub fn board_controller() -> Result<Arc<dyn BoardControllerApi>> {
    let lib = BOARD_CONTROLLER.get_or_try_init(|| {
        NativeBoardController::load(&library_path(BOARD_CONTROLLER_LIB)).map(Arc::new)
    })?;
    let lib: Arc<dyn BoardControllerApi> = lib.clone();
    Ok(lib)
}

/// Shared handle on the signal processing library, loaded on first use.
pub fn data_handler() -> Result<Arc<dyn DataHandlerApi>> {
    let lib = DATA_HANDLER.get_or_try_init(|| {
        NativeDataHandler::load(&library_path(DATA_HANDLER_LIB)).map(Arc::new)
    })?;
    let lib: Arc<dyn DataHandlerApi> = lib.clone();
    Ok(lib)
}
