//! Dynamically loaded `BoardController` and `DataHandler` libraries.
//!
//! Every symbol is resolved when the library is opened so a mismatched
//! library fails at load time instead of on first use.

use libloading::Library;
use std::ffi::CStr;
use std::os::raw::{c_char, c_double, c_int};
use std::path::Path;

use super::{BoardControllerApi, DataHandlerApi, CHANNEL_BUFFER_LEN, WAVELET_PADDING};
use crate::constants::{BoardProperty, ChannelKind};
use crate::error::{BrainFlowError, Result};
use crate::utils::layout::total_len;

type SessionFn = unsafe extern "C" fn(c_int, *const c_char) -> c_int;
type ConfigBoardFn = unsafe extern "C" fn(*const c_char, c_int, *const c_char) -> c_int;
type StartStreamFn = unsafe extern "C" fn(c_int, c_int, *const c_char) -> c_int;
type DataCountFn = unsafe extern "C" fn(*mut c_int, c_int, *const c_char) -> c_int;
type CurrentDataFn =
    unsafe extern "C" fn(c_int, *mut c_double, *mut c_int, c_int, *const c_char) -> c_int;
type BoardDataFn = unsafe extern "C" fn(c_int, *mut c_double, c_int, *const c_char) -> c_int;
type SetLogLevelFn = unsafe extern "C" fn(c_int) -> c_int;
type SetLogFileFn = unsafe extern "C" fn(*const c_char) -> c_int;
type LogMessageFn = unsafe extern "C" fn(c_int, *const c_char) -> c_int;
type PropertyFn = unsafe extern "C" fn(c_int, *mut c_int) -> c_int;
type ChannelsFn = unsafe extern "C" fn(c_int, *mut c_int, *mut c_int) -> c_int;

type CutoffFilterFn =
    unsafe extern "C" fn(*mut c_double, c_int, c_int, c_double, c_int, c_int, c_double) -> c_int;
type BandFilterFn = unsafe extern "C" fn(
    *mut c_double,
    c_int,
    c_int,
    c_double,
    c_double,
    c_int,
    c_int,
    c_double,
) -> c_int;
type RollingFilterFn = unsafe extern "C" fn(*mut c_double, c_int, c_int, c_int) -> c_int;
type DownsamplingFn =
    unsafe extern "C" fn(*const c_double, c_int, c_int, c_int, *mut c_double) -> c_int;
type WaveletFn = unsafe extern "C" fn(
    *const c_double,
    c_int,
    *const c_char,
    c_int,
    *mut c_double,
    *mut c_int,
) -> c_int;
type InverseWaveletFn = unsafe extern "C" fn(
    *const c_double,
    c_int,
    *const c_char,
    c_int,
    *const c_int,
    *mut c_double,
) -> c_int;
type DenoisingFn = unsafe extern "C" fn(*mut c_double, c_int, *const c_char, c_int) -> c_int;
type FftFn = unsafe extern "C" fn(*const c_double, c_int, *mut c_double, *mut c_double) -> c_int;
type IfftFn =
    unsafe extern "C" fn(*const c_double, *const c_double, c_int, *mut c_double) -> c_int;
type WriteFileFn =
    unsafe extern "C" fn(*const c_double, c_int, c_int, *const c_char, *const c_char) -> c_int;
type ReadFileFn =
    unsafe extern "C" fn(*mut c_double, *mut c_int, *mut c_int, *const c_char, c_int) -> c_int;
type NumElementsFn = unsafe extern "C" fn(*const c_char, *mut c_int) -> c_int;

const INVALID_ARGUMENTS: c_int = 13;

fn open(path: &Path) -> Result<Library> {
    // SAFETY: loading runs the library's initialisers; BrainFlow's have no
    // preconditions beyond being loaded once per path, which the caller
    // guarantees by caching the handle.
    unsafe { Library::new(path) }.map_err(|source| BrainFlowError::Library {
        path: path.display().to_string(),
        source,
    })
}

/// Resolves `name` (without trailing NUL) as a function pointer of type `T`.
///
/// # Safety
///
/// `T` must match the exported function's real signature.
unsafe fn symbol<T: Copy>(lib: &Library, path: &Path, name: &str) -> Result<T> {
    let mut symbol_name = Vec::with_capacity(name.len() + 1);
    symbol_name.extend_from_slice(name.as_bytes());
    symbol_name.push(0);

    lib.get::<T>(&symbol_name)
        .map(|symbol| *symbol)
        .map_err(|source| BrainFlowError::Symbol {
            symbol: name.to_string(),
            library: path.display().to_string(),
            source,
        })
}

fn c_len(len: usize) -> Option<c_int> {
    c_int::try_from(len).ok()
}

// Sizes of the buffers the native side reads or writes. `None` means the
// arguments themselves are out of range.

fn matrix_len(rows: c_int, cols: c_int) -> Option<usize> {
    usize::try_from(rows)
        .ok()?
        .checked_mul(usize::try_from(cols).ok()?)
}

fn fft_bins(len: usize) -> usize {
    len / 2 + 1
}

fn downsampled_len(len: usize, period: c_int) -> Option<usize> {
    let period = usize::try_from(period).ok().filter(|&period| period > 0)?;
    Some(len / period)
}

fn wavelet_blocks(decomposition_level: c_int) -> Option<usize> {
    usize::try_from(decomposition_level).ok()?.checked_add(1)
}

fn holds(buffer_len: usize, needed: Option<usize>) -> bool {
    needed.is_some_and(|needed| buffer_len >= needed)
}

// -----------------------------------------------------------------------------
// BOARD CONTROLLER
// -----------------------------------------------------------------------------

struct ChannelGetters {
    eeg: ChannelsFn,
    emg: ChannelsFn,
    ecg: ChannelsFn,
    eog: ChannelsFn,
    eda: ChannelsFn,
    ppg: ChannelsFn,
    accel: ChannelsFn,
    analog: ChannelsFn,
    gyro: ChannelsFn,
    other: ChannelsFn,
}

pub struct NativeBoardController {
    prepare_session: SessionFn,
    config_board: ConfigBoardFn,
    start_stream: StartStreamFn,
    stop_stream: SessionFn,
    release_session: SessionFn,
    get_board_data_count: DataCountFn,
    get_current_board_data: CurrentDataFn,
    get_board_data: BoardDataFn,
    set_log_level: SetLogLevelFn,
    set_log_file: SetLogFileFn,
    log_message: LogMessageFn,
    get_sampling_rate: PropertyFn,
    get_package_num_channel: PropertyFn,
    get_timestamp_channel: PropertyFn,
    get_num_rows: PropertyFn,
    channels: ChannelGetters,
    // keeps every pointer above valid
    _lib: Library,
}

impl NativeBoardController {
    pub fn load(path: &Path) -> Result<Self> {
        let lib = open(path)?;

        // SAFETY: the signatures below match BrainFlow's board_controller.h
        // and board_info_getter.h.
        unsafe {
            let channels = ChannelGetters {
                eeg: symbol(&lib, path, "get_eeg_channels")?,
                emg: symbol(&lib, path, "get_emg_channels")?,
                ecg: symbol(&lib, path, "get_ecg_channels")?,
                eog: symbol(&lib, path, "get_eog_channels")?,
                eda: symbol(&lib, path, "get_eda_channels")?,
                ppg: symbol(&lib, path, "get_ppg_channels")?,
                accel: symbol(&lib, path, "get_accel_channels")?,
                analog: symbol(&lib, path, "get_analog_channels")?,
                gyro: symbol(&lib, path, "get_gyro_channels")?,
                other: symbol(&lib, path, "get_other_channels")?,
            };

            Ok(Self {
                prepare_session: symbol(&lib, path, "prepare_session")?,
                config_board: symbol(&lib, path, "config_board")?,
                start_stream: symbol(&lib, path, "start_stream")?,
                stop_stream: symbol(&lib, path, "stop_stream")?,
                release_session: symbol(&lib, path, "release_session")?,
                get_board_data_count: symbol(&lib, path, "get_board_data_count")?,
                get_current_board_data: symbol(&lib, path, "get_current_board_data")?,
                get_board_data: symbol(&lib, path, "get_board_data")?,
                set_log_level: symbol(&lib, path, "set_log_level")?,
                set_log_file: symbol(&lib, path, "set_log_file")?,
                log_message: symbol(&lib, path, "log_message")?,
                get_sampling_rate: symbol(&lib, path, "get_sampling_rate")?,
                get_package_num_channel: symbol(&lib, path, "get_package_num_channel")?,
                get_timestamp_channel: symbol(&lib, path, "get_timestamp_channel")?,
                get_num_rows: symbol(&lib, path, "get_num_rows")?,
                channels,
                _lib: lib,
            })
        }
    }

    // `data` must hold `samples` values for every row of the board
    fn check_board_buffer(&self, samples: c_int, data: &[f64], board_id: c_int) -> c_int {
        let mut rows = 0;
        let status = unsafe { (self.get_num_rows)(board_id, &mut rows) };
        if status != 0 {
            return status;
        }
        if holds(data.len(), matrix_len(rows, samples)) {
            0
        } else {
            INVALID_ARGUMENTS
        }
    }

    fn channel_getter(&self, kind: ChannelKind) -> ChannelsFn {
        match kind {
            ChannelKind::Eeg => self.channels.eeg,
            ChannelKind::Emg => self.channels.emg,
            ChannelKind::Ecg => self.channels.ecg,
            ChannelKind::Eog => self.channels.eog,
            ChannelKind::Eda => self.channels.eda,
            ChannelKind::Ppg => self.channels.ppg,
            ChannelKind::Accel => self.channels.accel,
            ChannelKind::Analog => self.channels.analog,
            ChannelKind::Gyro => self.channels.gyro,
            ChannelKind::Other => self.channels.other,
        }
    }
}

// SAFETY (all methods below): strings are NUL-terminated `CStr`s that outlive
// the call, and every slice is checked against the length the native call
// reads or writes before the call is made.
impl BoardControllerApi for NativeBoardController {
    fn prepare_session(&self, board_id: i32, input_json: &CStr) -> i32 {
        unsafe { (self.prepare_session)(board_id, input_json.as_ptr()) }
    }

    fn config_board(&self, config: &CStr, board_id: i32, input_json: &CStr) -> i32 {
        unsafe {
            (self.config_board)(config.as_ptr(), board_id, input_json.as_ptr())
        }
    }

    fn start_stream(&self, buffer_size: i32, board_id: i32, input_json: &CStr) -> i32 {
        unsafe { (self.start_stream)(buffer_size, board_id, input_json.as_ptr()) }
    }

    fn stop_stream(&self, board_id: i32, input_json: &CStr) -> i32 {
        unsafe { (self.stop_stream)(board_id, input_json.as_ptr()) }
    }

    fn release_session(&self, board_id: i32, input_json: &CStr) -> i32 {
        unsafe { (self.release_session)(board_id, input_json.as_ptr()) }
    }

    fn get_board_data_count(&self, count: &mut i32, board_id: i32, input_json: &CStr) -> i32 {
        unsafe { (self.get_board_data_count)(count, board_id, input_json.as_ptr()) }
    }

    fn get_current_board_data(
        &self,
        num_samples: i32,
        data: &mut [f64],
        returned_samples: &mut i32,
        board_id: i32,
        input_json: &CStr,
    ) -> i32 {
        let status = self.check_board_buffer(num_samples, data, board_id);
        if status != 0 {
            return status;
        }
        unsafe {
            (self.get_current_board_data)(
                num_samples,
                data.as_mut_ptr(),
                returned_samples,
                board_id,
                input_json.as_ptr(),
            )
        }
    }

    fn get_board_data(
        &self,
        data_count: i32,
        data: &mut [f64],
        board_id: i32,
        input_json: &CStr,
    ) -> i32 {
        let status = self.check_board_buffer(data_count, data, board_id);
        if status != 0 {
            return status;
        }
        unsafe {
            (self.get_board_data)(
                data_count,
                data.as_mut_ptr(),
                board_id,
                input_json.as_ptr(),
            )
        }
    }

    fn set_log_level(&self, log_level: i32) -> i32 {
        unsafe { (self.set_log_level)(log_level) }
    }

    fn set_log_file(&self, log_file: &CStr) -> i32 {
        unsafe { (self.set_log_file)(log_file.as_ptr()) }
    }

    fn log_message(&self, log_level: i32, message: &CStr) -> i32 {
        unsafe { (self.log_message)(log_level, message.as_ptr()) }
    }

    fn get_board_property(&self, property: BoardProperty, board_id: i32, value: &mut i32) -> i32 {
        let getter = match property {
            BoardProperty::SamplingRate => self.get_sampling_rate,
            BoardProperty::PackageNumChannel => self.get_package_num_channel,
            BoardProperty::TimestampChannel => self.get_timestamp_channel,
            BoardProperty::NumRows => self.get_num_rows,
        };
        unsafe { getter(board_id, value) }
    }

    fn get_channels(
        &self,
        kind: ChannelKind,
        board_id: i32,
        channels: &mut [i32],
        len: &mut i32,
    ) -> i32 {
        if channels.len() < CHANNEL_BUFFER_LEN {
            return INVALID_ARGUMENTS;
        }
        let getter = self.channel_getter(kind);
        unsafe { getter(board_id, channels.as_mut_ptr(), len) }
    }
}

// -----------------------------------------------------------------------------
// DATA HANDLER
// -----------------------------------------------------------------------------

pub struct NativeDataHandler {
    perform_lowpass: CutoffFilterFn,
    perform_highpass: CutoffFilterFn,
    perform_bandpass: BandFilterFn,
    perform_bandstop: BandFilterFn,
    perform_rolling_filter: RollingFilterFn,
    perform_downsampling: DownsamplingFn,
    perform_wavelet_transform: WaveletFn,
    perform_inverse_wavelet_transform: InverseWaveletFn,
    perform_wavelet_denoising: DenoisingFn,
    perform_fft: FftFn,
    perform_ifft: IfftFn,
    write_file: WriteFileFn,
    read_file: ReadFileFn,
    get_num_elements_in_file: NumElementsFn,
    _lib: Library,
}

impl NativeDataHandler {
    pub fn load(path: &Path) -> Result<Self> {
        let lib = open(path)?;

        // SAFETY: the signatures below match BrainFlow's data_handler.h.
        unsafe {
            Ok(Self {
                perform_lowpass: symbol(&lib, path, "perform_lowpass")?,
                perform_highpass: symbol(&lib, path, "perform_highpass")?,
                perform_bandpass: symbol(&lib, path, "perform_bandpass")?,
                perform_bandstop: symbol(&lib, path, "perform_bandstop")?,
                perform_rolling_filter: symbol(&lib, path, "perform_rolling_filter")?,
                perform_downsampling: symbol(&lib, path, "perform_downsampling")?,
                perform_wavelet_transform: symbol(&lib, path, "perform_wavelet_transform")?,
                perform_inverse_wavelet_transform: symbol(
                    &lib,
                    path,
                    "perform_inverse_wavelet_transform",
                )?,
                perform_wavelet_denoising: symbol(&lib, path, "perform_wavelet_denoising")?,
                perform_fft: symbol(&lib, path, "perform_fft")?,
                perform_ifft: symbol(&lib, path, "perform_ifft")?,
                write_file: symbol(&lib, path, "write_file")?,
                read_file: symbol(&lib, path, "read_file")?,
                get_num_elements_in_file: symbol(&lib, path, "get_num_elements_in_file")?,
                _lib: lib,
            })
        }
    }
}

impl DataHandlerApi for NativeDataHandler {
    fn perform_lowpass(
        &self,
        data: &mut [f64],
        sampling_rate: i32,
        cutoff: f64,
        order: i32,
        filter_type: i32,
        ripple: f64,
    ) -> i32 {
        let Some(len) = c_len(data.len()) else {
            return INVALID_ARGUMENTS;
        };
        unsafe {
            (self.perform_lowpass)(
                data.as_mut_ptr(),
                len,
                sampling_rate,
                cutoff,
                order,
                filter_type,
                ripple,
            )
        }
    }

    fn perform_highpass(
        &self,
        data: &mut [f64],
        sampling_rate: i32,
        cutoff: f64,
        order: i32,
        filter_type: i32,
        ripple: f64,
    ) -> i32 {
        let Some(len) = c_len(data.len()) else {
            return INVALID_ARGUMENTS;
        };
        unsafe {
            (self.perform_highpass)(
                data.as_mut_ptr(),
                len,
                sampling_rate,
                cutoff,
                order,
                filter_type,
                ripple,
            )
        }
    }

    fn perform_bandpass(
        &self,
        data: &mut [f64],
        sampling_rate: i32,
        center_freq: f64,
        band_width: f64,
        order: i32,
        filter_type: i32,
        ripple: f64,
    ) -> i32 {
        let Some(len) = c_len(data.len()) else {
            return INVALID_ARGUMENTS;
        };
        unsafe {
            (self.perform_bandpass)(
                data.as_mut_ptr(),
                len,
                sampling_rate,
                center_freq,
                band_width,
                order,
                filter_type,
                ripple,
            )
        }
    }

    fn perform_bandstop(
        &self,
        data: &mut [f64],
        sampling_rate: i32,
        center_freq: f64,
        band_width: f64,
        order: i32,
        filter_type: i32,
        ripple: f64,
    ) -> i32 {
        let Some(len) = c_len(data.len()) else {
            return INVALID_ARGUMENTS;
        };
        unsafe {
            (self.perform_bandstop)(
                data.as_mut_ptr(),
                len,
                sampling_rate,
                center_freq,
                band_width,
                order,
                filter_type,
                ripple,
            )
        }
    }

    fn perform_rolling_filter(&self, data: &mut [f64], period: i32, agg_operation: i32) -> i32 {
        let Some(len) = c_len(data.len()) else {
            return INVALID_ARGUMENTS;
        };
        unsafe { (self.perform_rolling_filter)(data.as_mut_ptr(), len, period, agg_operation) }
    }

    fn perform_downsampling(
        &self,
        data: &[f64],
        period: i32,
        agg_operation: i32,
        output: &mut [f64],
    ) -> i32 {
        let Some(len) = c_len(data.len()) else {
            return INVALID_ARGUMENTS;
        };
        if !holds(output.len(), downsampled_len(data.len(), period)) {
            return INVALID_ARGUMENTS;
        }
        unsafe {
            (self.perform_downsampling)(
                data.as_ptr(),
                len,
                period,
                agg_operation,
                output.as_mut_ptr(),
            )
        }
    }

    fn perform_wavelet_transform(
        &self,
        data: &[f64],
        wavelet: &CStr,
        decomposition_level: i32,
        output: &mut [f64],
        lengths: &mut [i32],
    ) -> i32 {
        let Some(len) = c_len(data.len()) else {
            return INVALID_ARGUMENTS;
        };
        if !holds(output.len(), data.len().checked_add(WAVELET_PADDING))
            || !holds(lengths.len(), wavelet_blocks(decomposition_level))
        {
            return INVALID_ARGUMENTS;
        }
        unsafe {
            (self.perform_wavelet_transform)(
                data.as_ptr(),
                len,
                wavelet.as_ptr(),
                decomposition_level,
                output.as_mut_ptr(),
                lengths.as_mut_ptr(),
            )
        }
    }

    fn perform_inverse_wavelet_transform(
        &self,
        coeffs: &[f64],
        wavelet: &CStr,
        decomposition_level: i32,
        lengths: &[i32],
        output: &mut [f64],
    ) -> i32 {
        let Some(original_len) = c_len(output.len()) else {
            return INVALID_ARGUMENTS;
        };
        let Some(blocks) = wavelet_blocks(decomposition_level) else {
            return INVALID_ARGUMENTS;
        };
        let Some(used_lengths) = lengths.get(..blocks) else {
            return INVALID_ARGUMENTS;
        };
        if !holds(coeffs.len(), total_len(used_lengths)) {
            return INVALID_ARGUMENTS;
        }
        unsafe {
            (self.perform_inverse_wavelet_transform)(
                coeffs.as_ptr(),
                original_len,
                wavelet.as_ptr(),
                decomposition_level,
                lengths.as_ptr(),
                output.as_mut_ptr(),
            )
        }
    }

    fn perform_wavelet_denoising(
        &self,
        data: &mut [f64],
        wavelet: &CStr,
        decomposition_level: i32,
    ) -> i32 {
        let Some(len) = c_len(data.len()) else {
            return INVALID_ARGUMENTS;
        };
        unsafe {
            (self.perform_wavelet_denoising)(
                data.as_mut_ptr(),
                len,
                wavelet.as_ptr(),
                decomposition_level,
            )
        }
    }

    fn perform_fft(&self, data: &[f64], re: &mut [f64], im: &mut [f64]) -> i32 {
        let Some(len) = c_len(data.len()) else {
            return INVALID_ARGUMENTS;
        };
        let bins = fft_bins(data.len());
        if re.len() < bins || im.len() < bins {
            return INVALID_ARGUMENTS;
        }
        unsafe {
            (self.perform_fft)(data.as_ptr(), len, re.as_mut_ptr(), im.as_mut_ptr())
        }
    }

    fn perform_ifft(&self, re: &[f64], im: &[f64], output: &mut [f64]) -> i32 {
        let Some(len) = c_len(output.len()) else {
            return INVALID_ARGUMENTS;
        };
        let bins = fft_bins(output.len());
        if re.len() < bins || im.len() < bins {
            return INVALID_ARGUMENTS;
        }
        unsafe {
            (self.perform_ifft)(re.as_ptr(), im.as_ptr(), len, output.as_mut_ptr())
        }
    }

    fn write_file(
        &self,
        data: &[f64],
        num_rows: i32,
        num_cols: i32,
        file_name: &CStr,
        file_mode: &CStr,
    ) -> i32 {
        if !holds(data.len(), matrix_len(num_rows, num_cols)) {
            return INVALID_ARGUMENTS;
        }
        unsafe {
            (self.write_file)(
                data.as_ptr(),
                num_rows,
                num_cols,
                file_name.as_ptr(),
                file_mode.as_ptr(),
            )
        }
    }

    fn read_file(
        &self,
        data: &mut [f64],
        num_rows: &mut i32,
        num_cols: &mut i32,
        file_name: &CStr,
    ) -> i32 {
        let Some(num_elements) = c_len(data.len()) else {
            return INVALID_ARGUMENTS;
        };
        unsafe {
            (self.read_file)(
                data.as_mut_ptr(),
                num_rows,
                num_cols,
                file_name.as_ptr(),
                num_elements,
            )
        }
    }

    fn get_num_elements_in_file(&self, file_name: &CStr, num_elements: &mut i32) -> i32 {
        unsafe { (self.get_num_elements_in_file)(file_name.as_ptr(), num_elements) }
    }
}
