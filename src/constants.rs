//! Numeric constants understood by the native libraries.

use serde::{Deserialize, Serialize};

use crate::error::BrainFlowError;

// Declares a fieldless enum whose discriminants are fixed by the native ABI,
// together with conversions to and from `i32`.
macro_rules! native_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> i32 {
                value as i32
            }
        }

        impl TryFrom<i32> for $name {
            type Error = BrainFlowError;

            fn try_from(value: i32) -> Result<Self, BrainFlowError> {
                match value {
                    $($value => Ok(Self::$variant),)+
                    _ => Err(BrainFlowError::invalid_arguments()),
                }
            }
        }
    };
}

native_enum! {
    /// Supported boards.
    pub enum BoardIds {
        PlaybackFileBoard = -3,
        StreamingBoard = -2,
        SyntheticBoard = -1,
        CytonBoard = 0,
        GanglionBoard = 1,
        CytonDaisyBoard = 2,
        GaleaBoard = 3,
        GanglionWifiBoard = 4,
        CytonWifiBoard = 5,
        CytonDaisyWifiBoard = 6,
        BrainbitBoard = 7,
        UnicornBoard = 8,
        CallibriEegBoard = 9,
        CallibriEmgBoard = 10,
        CallibriEcgBoard = 11,
        FasciaBoard = 12,
        Notion1Board = 13,
        Notion2Board = 14,
        IronbciBoard = 15,
    }
}

native_enum! {
    /// Verbosity of the native logger.
    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum LogLevels {
        Trace = 0,
        Debug = 1,
        Info = 2,
        Warn = 3,
        Error = 4,
        Critical = 5,
        Off = 6,
    }
}

native_enum! {
    /// Transport used by network boards.
    #[derive(Default, Serialize, Deserialize)]
    #[serde(into = "i32", try_from = "i32")]
    pub enum IpProtocolType {
        #[default]
        None = 0,
        Udp = 1,
        Tcp = 2,
    }
}

native_enum! {
    /// Filter design used by the lowpass/highpass/bandpass/bandstop kernels.
    pub enum FilterTypes {
        Butterworth = 0,
        ChebyshevType1 = 1,
        Bessel = 2,
    }
}

native_enum! {
    /// Aggregation applied by rolling filters and downsampling.
    pub enum AggOperations {
        Mean = 0,
        Median = 1,
        Each = 2,
    }
}

/// Groups of rows a board can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Eeg,
    Emg,
    Ecg,
    Eog,
    Eda,
    Ppg,
    Accel,
    Analog,
    Gyro,
    Other,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 10] = [
        Self::Eeg,
        Self::Emg,
        Self::Ecg,
        Self::Eog,
        Self::Eda,
        Self::Ppg,
        Self::Accel,
        Self::Analog,
        Self::Gyro,
        Self::Other,
    ];

    /// Lower-case label, also the middle of the native getter's name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Eeg => "eeg",
            Self::Emg => "emg",
            Self::Ecg => "ecg",
            Self::Eog => "eog",
            Self::Eda => "eda",
            Self::Ppg => "ppg",
            Self::Accel => "accel",
            Self::Analog => "analog",
            Self::Gyro => "gyro",
            Self::Other => "other",
        }
    }
}

/// Scalar board descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardProperty {
    SamplingRate,
    PackageNumChannel,
    TimestampChannel,
    NumRows,
}
