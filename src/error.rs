//! Error types shared by the board and data handler façades.
//!
//! Every native entry point returns an integer status. Zero is success, any
//! other value is mapped onto [`ExitCode`] and surfaced as
//! [`BrainFlowError::Exit`].

use std::fmt;
use thiserror::Error;

/// Status codes reported by the native libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitCode {
    StatusOk,
    PortAlreadyOpenError,
    UnableToOpenPortError,
    SetPortError,
    BoardWriteError,
    IncommingMsgError,
    InitialMsgError,
    BoardNotReadyError,
    StreamAlreadyRunError,
    InvalidBufferSizeError,
    StreamThreadError,
    StreamThreadIsNotRunning,
    EmptyBufferError,
    InvalidArgumentsError,
    UnsupportedBoardError,
    BoardNotCreatedError,
    AnotherBoardIsCreatedError,
    GeneralError,
    SyncTimeoutError,
    JsonNotFoundError,
    NoSuchDataInJsonError,
    /// A code this version of the bindings does not know about.
    Unknown(i32),
}

impl ExitCode {
    /// Numeric value as returned by the native call.
    pub fn code(self) -> i32 {
        match self {
            Self::StatusOk => 0,
            Self::PortAlreadyOpenError => 1,
            Self::UnableToOpenPortError => 2,
            Self::SetPortError => 3,
            Self::BoardWriteError => 4,
            Self::IncommingMsgError => 5,
            Self::InitialMsgError => 6,
            Self::BoardNotReadyError => 7,
            Self::StreamAlreadyRunError => 8,
            Self::InvalidBufferSizeError => 9,
            Self::StreamThreadError => 10,
            Self::StreamThreadIsNotRunning => 11,
            Self::EmptyBufferError => 12,
            Self::InvalidArgumentsError => 13,
            Self::UnsupportedBoardError => 14,
            Self::BoardNotCreatedError => 15,
            Self::AnotherBoardIsCreatedError => 16,
            Self::GeneralError => 17,
            Self::SyncTimeoutError => 18,
            Self::JsonNotFoundError => 19,
            Self::NoSuchDataInJsonError => 20,
            Self::Unknown(code) => code,
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::StatusOk => "ok",
            Self::PortAlreadyOpenError => "port is already open",
            Self::UnableToOpenPortError => "unable to open port",
            Self::SetPortError => "unable to configure port",
            Self::BoardWriteError => "failed to write to board",
            Self::IncommingMsgError => "unexpected incoming message",
            Self::InitialMsgError => "invalid initial message from board",
            Self::BoardNotReadyError => "board is not ready",
            Self::StreamAlreadyRunError => "stream is already running",
            Self::InvalidBufferSizeError => "invalid buffer size",
            Self::StreamThreadError => "streaming thread failed",
            Self::StreamThreadIsNotRunning => "streaming thread is not running",
            Self::EmptyBufferError => "buffer is empty",
            Self::InvalidArgumentsError => "invalid arguments",
            Self::UnsupportedBoardError => "unsupported board",
            Self::BoardNotCreatedError => "board session is not prepared",
            Self::AnotherBoardIsCreatedError => "another board session is already prepared",
            Self::GeneralError => "general error",
            Self::SyncTimeoutError => "timed out waiting for board",
            Self::JsonNotFoundError => "board description json not found",
            Self::NoSuchDataInJsonError => "requested field missing from board description",
            Self::Unknown(_) => "unknown error",
        }
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        match code {
            0 => Self::StatusOk,
            1 => Self::PortAlreadyOpenError,
            2 => Self::UnableToOpenPortError,
            3 => Self::SetPortError,
            4 => Self::BoardWriteError,
            5 => Self::IncommingMsgError,
            6 => Self::InitialMsgError,
            7 => Self::BoardNotReadyError,
            8 => Self::StreamAlreadyRunError,
            9 => Self::InvalidBufferSizeError,
            10 => Self::StreamThreadError,
            11 => Self::StreamThreadIsNotRunning,
            12 => Self::EmptyBufferError,
            13 => Self::InvalidArgumentsError,
            14 => Self::UnsupportedBoardError,
            15 => Self::BoardNotCreatedError,
            16 => Self::AnotherBoardIsCreatedError,
            17 => Self::GeneralError,
            18 => Self::SyncTimeoutError,
            19 => Self::JsonNotFoundError,
            20 => Self::NoSuchDataInJsonError,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (exit code {})", self.description(), self.code())
    }
}

/// Error type for every fallible operation in this crate.
#[derive(Error, Debug)]
pub enum BrainFlowError {
    /// A native call (or a local argument check) reported a non-zero status.
    #[error("BrainFlow call failed: {0}")]
    Exit(ExitCode),

    /// The shared library could not be opened.
    #[error("failed to load native library {path}: {source}")]
    Library {
        /// Path or file name passed to the loader
        path: String,
        /// Loader error
        #[source]
        source: libloading::Error,
    },

    /// The shared library is missing an expected entry point.
    #[error("symbol {symbol} not found in {library}: {source}")]
    Symbol {
        /// Entry point name
        symbol: String,
        /// Library the symbol was looked up in
        library: String,
        /// Loader error
        #[source]
        source: libloading::Error,
    },

    /// Input parameters could not be encoded for the native side.
    #[error("failed to encode input params: {0}")]
    Json(#[from] serde_json::Error),
}

impl BrainFlowError {
    /// Shorthand for the error raised by local argument validation.
    pub fn invalid_arguments() -> Self {
        Self::Exit(ExitCode::InvalidArgumentsError)
    }

    /// Exit code carried by this error, if it came from a status check.
    pub fn exit_code(&self) -> Option<ExitCode> {
        match self {
            Self::Exit(code) => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BrainFlowError>;

/// Maps a native status code onto `Ok(())` or [`BrainFlowError::Exit`].
pub fn check_status(status: i32) -> Result<()> {
    match ExitCode::from(status) {
        ExitCode::StatusOk => Ok(()),
        code => Err(BrainFlowError::Exit(code)),
    }
}
