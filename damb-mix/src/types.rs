//! Sample format tags and per-frame audio metadata

use crate::error::{MixError, Result};

/// libsndfile subtype mask; the container type lives in the high bits
pub const FORMAT_SUBMASK: i64 = 0x0000_FFFF;

/// Sample representation of an interleaved buffer
///
/// Discriminants match the libsndfile subtype identifiers the host stores
/// in frame metadata.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    Pcm16 = 0x0002,   // Signed 16-bit
    Pcm32 = 0x0004,   // Signed 32-bit
    Float32 = 0x0006, // 32-bit IEEE float
    Float64 = 0x0007, // 64-bit IEEE float
}

impl SampleFormat {
    /// Decode a format tag, ignoring container bits.
    ///
    /// Returns `None` for any subtype this mixer does not handle.
    pub fn from_tag(tag: i64) -> Option<Self> {
        match tag & FORMAT_SUBMASK {
            0x0002 => Some(SampleFormat::Pcm16),
            0x0004 => Some(SampleFormat::Pcm32),
            0x0006 => Some(SampleFormat::Float32),
            0x0007 => Some(SampleFormat::Float64),
            _ => None,
        }
    }

    /// Resolve a tag according to `policy`
    pub fn resolve(tag: i64, policy: UnknownFormatPolicy) -> Result<Self> {
        match (Self::from_tag(tag), policy) {
            (Some(format), _) => Ok(format),
            (None, UnknownFormatPolicy::FallbackToDouble) => {
                log::warn!(
                    "Unrecognised sample format tag {:#x}, mixing as 64-bit float",
                    tag
                );
                Ok(SampleFormat::Float64)
            }
            (None, UnknownFormatPolicy::Reject) => Err(MixError::UnsupportedFormat { tag }),
        }
    }

    pub fn tag(self) -> i64 {
        self as u32 as i64
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::Pcm16 => 2,
            SampleFormat::Pcm32 | SampleFormat::Float32 => 4,
            SampleFormat::Float64 => 8,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, SampleFormat::Float32 | SampleFormat::Float64)
    }
}

/// What to do with a format tag outside the four known subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFormatPolicy {
    /// Interpret the buffers as 64-bit float (host plugin behaviour)
    #[default]
    FallbackToDouble,
    /// Fail with [`MixError::UnsupportedFormat`]
    Reject,
}

/// Mixer configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixConfig {
    /// Gain applied to the primary input
    pub level_a: f64,
    /// Gain applied to the secondary input
    pub level_b: f64,
    pub unknown_format: UnknownFormatPolicy,
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            level_a: 1.0,
            level_b: 1.0,
            unknown_format: UnknownFormatPolicy::FallbackToDouble,
        }
    }
}

impl MixConfig {
    /// Build a config from optional gains, each defaulting to 1.0
    pub fn with_levels(level_a: Option<f64>, level_b: Option<f64>) -> Result<Self> {
        let config = Self {
            level_a: level_a.unwrap_or(1.0),
            level_b: level_b.unwrap_or(1.0),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn unknown_format(mut self, policy: UnknownFormatPolicy) -> Self {
        self.unknown_format = policy;
        self
    }

    /// Reject gains that would poison every output sample
    pub fn validate(&self) -> Result<()> {
        for value in [self.level_a, self.level_b] {
            if !value.is_finite() {
                return Err(MixError::InvalidGain { value });
            }
        }
        Ok(())
    }
}

/// Metadata carried alongside a sample buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioInfo {
    pub channels: usize,
    pub sample_rate: u32,
    /// Raw format tag, container bits included
    pub format_tag: i64,
}

impl AudioInfo {
    pub fn new(channels: usize, sample_rate: u32, format: SampleFormat) -> Self {
        Self {
            channels,
            sample_rate,
            format_tag: format.tag(),
        }
    }
}

/// A borrowed sample buffer with its metadata
#[derive(Debug, Clone, Copy)]
pub struct AudioBuffer<'a> {
    pub data: &'a [u8],
    pub info: AudioInfo,
}

impl<'a> AudioBuffer<'a> {
    pub fn new(data: &'a [u8], info: AudioInfo) -> Self {
        Self { data, info }
    }
}
