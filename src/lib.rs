//! Rust bindings for the BrainFlow native libraries.
//!
//! [`BoardShim`] drives an acquisition session through `BoardController`,
//! [`DataFilter`] runs the signal processing kernels of `DataHandler`. Both
//! validate trivial arguments, marshal buffers and turn non-zero native status
//! codes into [`BrainFlowError`].

pub mod bindings;
pub mod board_shim;
pub mod config;
pub mod constants;
pub mod data_filter;
pub mod error;
pub mod input_params;
pub mod utils;

pub use board_shim::{BoardShim, DEFAULT_BUFFER_SIZE};
pub use constants::{
    AggOperations, BoardIds, BoardProperty, ChannelKind, FilterTypes, IpProtocolType, LogLevels,
};
pub use data_filter::{DataFilter, WaveletCoeffs};
pub use error::{BrainFlowError, ExitCode, Result};
pub use input_params::BrainFlowInputParams;
