//! Frame-by-frame mixer with a reusable output buffer

use crate::dispatch::{dispatch, mix, validate};
use crate::error::Result;
use crate::types::{AudioBuffer, AudioInfo, MixConfig};

/// Two-input mixer for one logical stream
///
/// Holds the gain pair and a scratch output that is resized per frame.
/// Shrinking keeps the allocation, so a steady stream stops allocating
/// after its largest frame.
pub struct AudioMixer {
    config: MixConfig,
    buffer: Vec<u8>,
    frames_mixed: u64,
}

/// Output of [`AudioMixer::mix_frame`], borrowed from the mixer's scratch
#[derive(Debug, Clone, Copy)]
pub struct MixedFrame<'a> {
    pub data: &'a [u8],
    /// Primary input's metadata, passed through
    pub info: AudioInfo,
}

impl AudioMixer {
    /// Create a new mixer
    pub fn new(config: MixConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            buffer: Vec::new(),
            frames_mixed: 0,
        })
    }

    pub fn config(&self) -> &MixConfig {
        &self.config
    }

    /// Mix one frame's inputs.
    ///
    /// Nothing is written when validation fails.
    pub fn mix_frame(&mut self, primary: AudioBuffer<'_>, secondary: AudioBuffer<'_>) -> Result<MixedFrame<'_>> {
        let format = validate(&primary, &secondary, self.config.unknown_format)?;

        let len = primary.data.len();
        if len > self.buffer.capacity() {
            log::debug!("Growing mix buffer from {} to {} bytes", self.buffer.capacity(), len);
        }
        self.buffer.resize(len, 0);

        dispatch(
            format,
            &mut self.buffer,
            primary.data,
            self.config.level_a,
            secondary.data,
            self.config.level_b,
            primary.info.channels,
        );
        self.frames_mixed += 1;

        Ok(MixedFrame {
            data: &self.buffer,
            info: primary.info,
        })
    }

    /// Get mixer statistics
    pub fn stats(&self) -> AudioMixerStats {
        AudioMixerStats {
            frames_mixed: self.frames_mixed,
            buffer_capacity: self.buffer.capacity(),
        }
    }
}

/// Mixer statistics
#[derive(Debug, Clone, Copy)]
pub struct AudioMixerStats {
    pub frames_mixed: u64,
    pub buffer_capacity: usize,
}

/// Inputs for one frame of a batch
#[derive(Debug, Clone, Copy)]
pub struct FramePair<'a> {
    pub primary: AudioBuffer<'a>,
    pub secondary: AudioBuffer<'a>,
}

/// Mix independent frames in parallel, each into its own buffer.
///
/// Results come back in input order; computation order is unspecified.
pub fn mix_batch(config: &MixConfig, pairs: &[FramePair<'_>]) -> Vec<Result<Vec<u8>>> {
    use rayon::prelude::*;

    pairs
        .par_iter()
        .map(|pair| mix(pair.primary, pair.secondary, config))
        .collect()
}
