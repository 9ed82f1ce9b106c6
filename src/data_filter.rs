//! Signal processing façade over the `DataHandler` library.
//!
//! Filters never touch the caller's slice: the input is copied, the copy is
//! processed in place by the native kernel and returned.

use ndarray::Array2;
use num_complex::Complex64;
use std::fmt;
use std::sync::Arc;

use crate::bindings::{self, DataHandlerApi, WAVELET_PADDING};
use crate::board_shim::to_cstring;
use crate::constants::{AggOperations, FilterTypes};
use crate::error::{check_status, BrainFlowError, ExitCode, Result};
use crate::utils::layout::{
    flatten_rows, from_c_int, join_complex, reshape_rows, split_complex, to_c_int, total_len,
};
use crate::utils::log::CallLog;

/// Output of [`DataFilter::perform_wavelet_transform`].
///
/// `coeffs` is laid out as `[A(J) D(J) D(J-1) ... D(1)]` with `J` the
/// decomposition level, `lengths[i]` is the size of block `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveletCoeffs {
    pub coeffs: Vec<f64>,
    pub lengths: Vec<i32>,
}

pub struct DataFilter {
    handler: Arc<dyn DataHandlerApi>,
    call_log: Option<CallLog>,
}

impl DataFilter {
    /// Creates a filter backed by the process-wide `DataHandler` library.
    pub fn new() -> Result<Self> {
        Ok(Self::with_handler(bindings::data_handler()?))
    }

    pub fn with_handler(handler: Arc<dyn DataHandlerApi>) -> Self {
        Self {
            handler,
            call_log: None,
        }
    }

    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.call_log = Some(log);
        self
    }

    fn call(&self, operation: &str, status: i32) -> Result<()> {
        if let Some(log) = &self.call_log {
            log.record(operation, status);
        }
        check_status(status)
    }

    // FILTERS -----------------------------------------------------------------

    pub fn perform_lowpass(
        &self,
        data: &[f64],
        sampling_rate: i32,
        cutoff: f64,
        order: i32,
        filter_type: FilterTypes,
        ripple: f64,
    ) -> Result<Vec<f64>> {
        let mut filtered = data.to_vec();
        let status = self.handler.perform_lowpass(
            &mut filtered,
            sampling_rate,
            cutoff,
            order,
            filter_type.into(),
            ripple,
        );
        self.call("perform_lowpass", status)?;
        Ok(filtered)
    }

    pub fn perform_highpass(
        &self,
        data: &[f64],
        sampling_rate: i32,
        cutoff: f64,
        order: i32,
        filter_type: FilterTypes,
        ripple: f64,
    ) -> Result<Vec<f64>> {
        let mut filtered = data.to_vec();
        let status = self.handler.perform_highpass(
            &mut filtered,
            sampling_rate,
            cutoff,
            order,
            filter_type.into(),
            ripple,
        );
        self.call("perform_highpass", status)?;
        Ok(filtered)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn perform_bandpass(
        &self,
        data: &[f64],
        sampling_rate: i32,
        center_freq: f64,
        band_width: f64,
        order: i32,
        filter_type: FilterTypes,
        ripple: f64,
    ) -> Result<Vec<f64>> {
        let mut filtered = data.to_vec();
        let status = self.handler.perform_bandpass(
            &mut filtered,
            sampling_rate,
            center_freq,
            band_width,
            order,
            filter_type.into(),
            ripple,
        );
        self.call("perform_bandpass", status)?;
        Ok(filtered)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn perform_bandstop(
        &self,
        data: &[f64],
        sampling_rate: i32,
        center_freq: f64,
        band_width: f64,
        order: i32,
        filter_type: FilterTypes,
        ripple: f64,
    ) -> Result<Vec<f64>> {
        let mut filtered = data.to_vec();
        let status = self.handler.perform_bandstop(
            &mut filtered,
            sampling_rate,
            center_freq,
            band_width,
            order,
            filter_type.into(),
            ripple,
        );
        self.call("perform_bandstop", status)?;
        Ok(filtered)
    }

    /// Moving mean or median over `period` samples.
    pub fn perform_rolling_filter(
        &self,
        data: &[f64],
        period: usize,
        operation: AggOperations,
    ) -> Result<Vec<f64>> {
        let period = to_c_int(period)?;
        let mut filtered = data.to_vec();
        let status = self
            .handler
            .perform_rolling_filter(&mut filtered, period, operation.into());
        self.call("perform_rolling_filter", status)?;
        Ok(filtered)
    }

    /// Aggregates every `period` samples into one, without lowpass filtering.
    pub fn perform_downsampling(
        &self,
        data: &[f64],
        period: usize,
        operation: AggOperations,
    ) -> Result<Vec<f64>> {
        if period == 0 || data.len() / period == 0 {
            return Err(BrainFlowError::invalid_arguments());
        }

        let mut downsampled = vec![0.0; data.len() / period];
        let status = self.handler.perform_downsampling(
            data,
            to_c_int(period)?,
            operation.into(),
            &mut downsampled,
        );
        self.call("perform_downsampling", status)?;
        Ok(downsampled)
    }

    // WAVELETS ----------------------------------------------------------------

    /// Decomposes `data` into `decomposition_level + 1` coefficient blocks.
    /// Levels deeper than the signal is long are rejected.
    pub fn perform_wavelet_transform(
        &self,
        data: &[f64],
        wavelet: &str,
        decomposition_level: usize,
    ) -> Result<WaveletCoeffs> {
        let level = to_c_int(decomposition_level)?;
        if decomposition_level > data.len() {
            return Err(BrainFlowError::invalid_arguments());
        }
        let wavelet_name = to_cstring(wavelet)?;
        let mut coeffs = vec![0.0; data.len() + WAVELET_PADDING];
        let mut lengths = vec![0; decomposition_level + 1];

        let status = self.handler.perform_wavelet_transform(
            data,
            &wavelet_name,
            level,
            &mut coeffs,
            &mut lengths,
        );
        self.call("perform_wavelet_transform", status)?;

        match total_len(&lengths) {
            Some(total) if total <= coeffs.len() => coeffs.truncate(total),
            _ => return Err(BrainFlowError::Exit(ExitCode::InvalidBufferSizeError)),
        }

        Ok(WaveletCoeffs { coeffs, lengths })
    }

    /// Restores `original_len` samples from coefficients produced by
    /// [`DataFilter::perform_wavelet_transform`].
    ///
    /// `wavelet_data` must hold `decomposition_level + 1` non-negative block
    /// lengths and at least as many coefficients as they add up to.
    pub fn perform_inverse_wavelet_transform(
        &self,
        wavelet_data: &WaveletCoeffs,
        original_len: usize,
        wavelet: &str,
        decomposition_level: usize,
    ) -> Result<Vec<f64>> {
        let level = to_c_int(decomposition_level)?;
        to_c_int(original_len)?;
        let WaveletCoeffs { coeffs, lengths } = wavelet_data;
        if lengths.len().checked_sub(1) != Some(decomposition_level) {
            return Err(BrainFlowError::invalid_arguments());
        }
        match total_len(lengths) {
            Some(total) if total <= coeffs.len() => {}
            _ => return Err(BrainFlowError::invalid_arguments()),
        }

        let wavelet_name = to_cstring(wavelet)?;
        let mut restored = vec![0.0; original_len];

        let status = self.handler.perform_inverse_wavelet_transform(
            coeffs,
            &wavelet_name,
            level,
            lengths,
            &mut restored,
        );
        self.call("perform_inverse_wavelet_transform", status)?;
        Ok(restored)
    }

    pub fn perform_wavelet_denoising(
        &self,
        data: &[f64],
        wavelet: &str,
        decomposition_level: usize,
    ) -> Result<Vec<f64>> {
        let wavelet_name = to_cstring(wavelet)?;
        let mut filtered = data.to_vec();

        let status = self.handler.perform_wavelet_denoising(
            &mut filtered,
            &wavelet_name,
            to_c_int(decomposition_level)?,
        );
        self.call("perform_wavelet_denoising", status)?;
        Ok(filtered)
    }

    // FFT ---------------------------------------------------------------------

    /// Direct FFT of `data[start_pos..end_pos]`, whose length must be a power
    /// of two. Returns `len / 2 + 1` bins.
    pub fn perform_fft(
        &self,
        data: &[f64],
        start_pos: usize,
        end_pos: usize,
    ) -> Result<Vec<Complex64>> {
        if end_pos > data.len() || start_pos >= end_pos {
            return Err(BrainFlowError::invalid_arguments());
        }
        let len = end_pos - start_pos;
        if !len.is_power_of_two() {
            return Err(BrainFlowError::invalid_arguments());
        }

        let mut re = vec![0.0; len / 2 + 1];
        let mut im = vec![0.0; len / 2 + 1];
        let status = self
            .handler
            .perform_fft(&data[start_pos..end_pos], &mut re, &mut im);
        self.call("perform_fft", status)?;

        Ok(join_complex(&re, &im))
    }

    /// Inverse of [`DataFilter::perform_fft`], returns `(bins - 1) * 2` samples.
    pub fn perform_ifft(&self, data: &[Complex64]) -> Result<Vec<f64>> {
        if data.len() < 2 {
            return Err(BrainFlowError::invalid_arguments());
        }

        let (re, im) = split_complex(data);
        let mut restored = vec![0.0; (data.len() - 1) * 2];
        let status = self.handler.perform_ifft(&re, &im, &mut restored);
        self.call("perform_ifft", status)?;
        Ok(restored)
    }

    // FILES -------------------------------------------------------------------

    /// Writes `data` (rows are channels) to a CSV file, transposed so every
    /// line is one sample. `file_mode` is `"w"` or `"a"`.
    pub fn write_file(&self, data: &Array2<f64>, file_name: &str, file_mode: &str) -> Result<()> {
        let file_name = to_cstring(file_name)?;
        let file_mode = to_cstring(file_mode)?;
        let (rows, cols) = data.dim();

        let status = self.handler.write_file(
            &flatten_rows(data),
            to_c_int(rows)?,
            to_c_int(cols)?,
            &file_name,
            &file_mode,
        );
        self.call("write_file", status)
    }

    /// Reads a file written by [`DataFilter::write_file`] back into its
    /// original orientation.
    pub fn read_file(&self, file_name: &str) -> Result<Array2<f64>> {
        let file_name = to_cstring(file_name)?;

        let mut num_elements = 0;
        let status = self
            .handler
            .get_num_elements_in_file(&file_name, &mut num_elements);
        self.call("get_num_elements_in_file", status)?;

        let mut buffer = vec![0.0; from_c_int(num_elements)?];
        let (mut num_rows, mut num_cols) = (0, 0);
        let status = self
            .handler
            .read_file(&mut buffer, &mut num_rows, &mut num_cols, &file_name);
        self.call("read_file", status)?;

        reshape_rows(&buffer, from_c_int(num_rows)?, from_c_int(num_cols)?)
    }
}

impl fmt::Debug for DataFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataFilter")
            .field("call_log", &self.call_log)
            .finish()
    }
}
