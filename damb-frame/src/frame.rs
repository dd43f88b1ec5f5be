//! Owned audio frames and clip-level checks

use damb_mix::{AudioBuffer, AudioInfo, MixError, SampleFormat};

/// Interleaved samples attached to one frame of a clip
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    pub samples: Vec<u8>,
    pub info: AudioInfo,
}

impl AudioFrame {
    pub fn new(samples: Vec<u8>, info: AudioInfo) -> Self {
        Self { samples, info }
    }

    pub fn as_buffer(&self) -> AudioBuffer<'_> {
        AudioBuffer::new(&self.samples, self.info)
    }

    /// Number of sample frames, if the format tag and length are consistent
    pub fn sample_frames(&self) -> Option<usize> {
        let format = SampleFormat::from_tag(self.info.format_tag)?;
        let stride = format.bytes_per_sample() * self.info.channels;
        if stride == 0 || self.samples.len() % stride != 0 {
            return None;
        }
        Some(self.samples.len() / stride)
    }
}

/// Length and timing of an input clip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipInfo {
    /// 0 when the length is unknown
    pub num_frames: i64,
    pub fps_num: i64,
    pub fps_den: i64,
}

impl ClipInfo {
    pub fn new(num_frames: i64, fps_num: i64, fps_den: i64) -> Self {
        Self {
            num_frames,
            fps_num,
            fps_den,
        }
    }

    /// Clips must have a known length and a fixed frame rate
    pub fn validate(&self) -> Result<(), MixError> {
        if self.num_frames <= 0 {
            return Err(MixError::UnknownLength);
        }
        if self.fps_num <= 0 || self.fps_den <= 0 {
            return Err(MixError::VariableRate {
                fps_num: self.fps_num,
                fps_den: self.fps_den,
            });
        }
        Ok(())
    }

    /// Audio sample frames per video frame at `sample_rate`
    pub fn samples_per_frame(&self, sample_rate: u32) -> f64 {
        (sample_rate as f64 * self.fps_den as f64) / self.fps_num as f64
    }

    /// Whether `frame` holds the sample count this clip's timing implies.
    ///
    /// A fractional rate alternates between the floor and ceiling, so both
    /// are accepted. Frames without a sample rate are not checked.
    pub fn matches_frame(&self, frame: &AudioFrame) -> bool {
        let Some(count) = frame.sample_frames() else {
            return false;
        };
        if frame.info.sample_rate == 0 {
            return true;
        }

        let expected = self.samples_per_frame(frame.info.sample_rate);
        let count = count as f64;
        count >= expected.floor() && count <= expected.ceil()
    }
}
