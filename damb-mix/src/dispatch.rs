//! Boundary validation and per-format dispatch
//!
//! Every precondition the kernel relies on is checked here; once
//! [`validate`] passes, [`dispatch`] always fills the whole output.

use crate::error::{MixError, Result};
use crate::resample::mix_interleaved;
use crate::types::{AudioBuffer, AudioInfo, MixConfig, SampleFormat, UnknownFormatPolicy};

/// Check a pair of inputs and resolve their shared sample format
pub fn validate(
    primary: &AudioBuffer<'_>,
    secondary: &AudioBuffer<'_>,
    policy: UnknownFormatPolicy,
) -> Result<SampleFormat> {
    let channels = primary.info.channels;
    if channels == 0 {
        return Err(MixError::ZeroChannels);
    }
    if secondary.info.channels != channels {
        return Err(MixError::ChannelMismatch {
            primary: channels,
            secondary: secondary.info.channels,
        });
    }

    let format = SampleFormat::resolve(primary.info.format_tag, policy)?;
    let secondary_format = SampleFormat::resolve(secondary.info.format_tag, policy)?;
    if secondary_format != format {
        return Err(MixError::FormatMismatch {
            primary: primary.info.format_tag,
            secondary: secondary.info.format_tag,
        });
    }

    let stride = format.bytes_per_sample() * channels;
    for (which, buffer) in [("primary", primary), ("secondary", secondary)] {
        if buffer.data.len() % stride != 0 {
            return Err(MixError::InvalidBufferLength {
                which,
                len: buffer.data.len(),
                stride,
            });
        }
    }

    if !primary.data.is_empty() && secondary.data.is_empty() {
        return Err(MixError::DegenerateSampleCount {
            primary: primary.data.len() / stride,
            secondary: 0,
        });
    }

    Ok(format)
}

/// Run the kernel instantiated for `format`
pub fn dispatch(
    format: SampleFormat,
    dst: &mut [u8],
    primary: &[u8],
    level_a: f64,
    secondary: &[u8],
    level_b: f64,
    channels: usize,
) {
    match format {
        SampleFormat::Pcm16 => mix_interleaved::<i16>(dst, primary, level_a, secondary, level_b, channels),
        SampleFormat::Pcm32 => mix_interleaved::<i32>(dst, primary, level_a, secondary, level_b, channels),
        SampleFormat::Float32 => mix_interleaved::<f32>(dst, primary, level_a, secondary, level_b, channels),
        SampleFormat::Float64 => mix_interleaved::<f64>(dst, primary, level_a, secondary, level_b, channels),
    }
}

/// Mix `secondary` onto `primary` into a caller-sized output.
///
/// `dst` must be exactly as long as the primary buffer. Returns the
/// metadata for the output, copied from the primary.
pub fn mix_into(
    dst: &mut [u8],
    primary: AudioBuffer<'_>,
    secondary: AudioBuffer<'_>,
    config: &MixConfig,
) -> Result<AudioInfo> {
    config.validate()?;
    let format = validate(&primary, &secondary, config.unknown_format)?;

    if dst.len() != primary.data.len() {
        return Err(MixError::OutputLengthMismatch {
            expected: primary.data.len(),
            actual: dst.len(),
        });
    }

    dispatch(
        format,
        dst,
        primary.data,
        config.level_a,
        secondary.data,
        config.level_b,
        primary.info.channels,
    );

    Ok(primary.info)
}

/// Allocating variant of [`mix_into`]
pub fn mix(primary: AudioBuffer<'_>, secondary: AudioBuffer<'_>, config: &MixConfig) -> Result<Vec<u8>> {
    let mut dst = vec![0u8; primary.data.len()];
    mix_into(&mut dst, primary, secondary, config)?;
    Ok(dst)
}
