//! Frame-synchronous audio mixer
//!
//! Combines two interleaved sample buffers into one, with an independent
//! linear gain per input. When the inputs differ in length the secondary
//! is linearly interpolated onto the primary's sample grid.
//!
//! Key features:
//! - One generic kernel, instantiated for i16 / i32 / f32 / f64 samples
//! - Format dispatch from libsndfile-style subtype tags
//! - Reusable output buffer per stream, rayon batch path across frames

pub mod dispatch;
pub mod error;
pub mod mixer;
pub mod resample;
pub mod sample;
pub mod types;

pub use dispatch::*;
pub use error::*;
pub use mixer::*;
pub use resample::*;
pub use sample::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_format_sizes() {
        assert_eq!(SampleFormat::Pcm16.bytes_per_sample(), 2);
        assert_eq!(SampleFormat::Pcm32.bytes_per_sample(), 4);
        assert_eq!(SampleFormat::Float32.bytes_per_sample(), 4);
        assert_eq!(SampleFormat::Float64.bytes_per_sample(), 8);
        assert!(SampleFormat::Float32.is_float());
        assert!(!SampleFormat::Pcm16.is_float());
    }

    #[test]
    fn test_tag_round_trip() {
        for format in [
            SampleFormat::Pcm16,
            SampleFormat::Pcm32,
            SampleFormat::Float32,
            SampleFormat::Float64,
        ] {
            assert_eq!(SampleFormat::from_tag(format.tag()), Some(format));
        }
        assert_eq!(SampleFormat::from_tag(0x0001), None);
    }
}
