//! Error taxonomy for the mixer boundary

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MixError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MixError {
    #[error("clip has unknown length")]
    UnknownLength,

    #[error("clip has variable frame rate ({fps_num}/{fps_den})")]
    VariableRate { fps_num: i64, fps_den: i64 },

    #[error("{which} buffer is {len} bytes, not a multiple of the {stride}-byte sample frame")]
    InvalidBufferLength {
        which: &'static str,
        len: usize,
        stride: usize,
    },

    #[error("secondary buffer has no samples to align onto {primary} primary sample frames")]
    DegenerateSampleCount { primary: usize, secondary: usize },

    #[error("channel count must be positive")]
    ZeroChannels,

    #[error("channel count mismatch: primary has {primary}, secondary has {secondary}")]
    ChannelMismatch { primary: usize, secondary: usize },

    #[error("sample format mismatch: primary {primary:#x}, secondary {secondary:#x}")]
    FormatMismatch { primary: i64, secondary: i64 },

    #[error("unsupported sample format tag {tag:#x}")]
    UnsupportedFormat { tag: i64 },

    #[error("output buffer is {actual} bytes, expected {expected}")]
    OutputLengthMismatch { expected: usize, actual: usize },

    #[error("gain must be finite, got {value}")]
    InvalidGain { value: f64 },
}
