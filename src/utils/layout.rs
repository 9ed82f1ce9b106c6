//! Conversions between native flat buffers and Rust-side shapes.
//!
//! The native libraries exchange 2D data as a single row-major buffer plus
//! row/column counts, channel lists as an oversized `int` buffer plus a
//! reported length, and spectra as separate real/imaginary buffers.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{BrainFlowError, ExitCode, Result};

/// Converts a Rust length into the `int` the native ABI expects.
pub fn to_c_int(value: usize) -> Result<i32> {
    i32::try_from(value).map_err(|_| BrainFlowError::invalid_arguments())
}

/// Converts a count reported by the native side back into a length.
pub fn from_c_int(value: i32) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| BrainFlowError::Exit(ExitCode::InvalidBufferSizeError))
}

/// Builds a `rows x cols` matrix from the first `rows * cols` entries of a
/// row-major buffer.
pub fn reshape_rows(buffer: &[f64], rows: usize, cols: usize) -> Result<Array2<f64>> {
    let needed = rows
        .checked_mul(cols)
        .ok_or(BrainFlowError::Exit(ExitCode::InvalidBufferSizeError))?;
    if buffer.len() < needed {
        return Err(BrainFlowError::Exit(ExitCode::InvalidBufferSizeError));
    }

    Array2::from_shape_vec((rows, cols), buffer[..needed].to_vec())
        .map_err(|_| BrainFlowError::Exit(ExitCode::InvalidBufferSizeError))
}

/// Row-major flattening, independent of the matrix's memory order.
pub fn flatten_rows(data: &Array2<f64>) -> Vec<f64> {
    data.iter().copied().collect()
}

/// Keeps the first `len` entries of a channel buffer.
pub fn truncate_channels(buffer: &[i32], len: i32) -> Result<Vec<i32>> {
    let len = from_c_int(len)?;
    buffer
        .get(..len)
        .map(<[i32]>::to_vec)
        .ok_or(BrainFlowError::Exit(ExitCode::InvalidBufferSizeError))
}

/// Sum of block lengths, `None` if any is negative or the sum overflows.
pub fn total_len(lengths: &[i32]) -> Option<usize> {
    lengths.iter().try_fold(0usize, |total, &len| {
        total.checked_add(usize::try_from(len).ok()?)
    })
}

pub fn join_complex(re: &[f64], im: &[f64]) -> Vec<Complex64> {
    re.iter()
        .zip(im)
        .map(|(&re, &im)| Complex64::new(re, im))
        .collect()
}

pub fn split_complex(data: &[Complex64]) -> (Vec<f64>, Vec<f64>) {
    data.iter().map(|c| (c.re, c.im)).unzip()
}
