//! Linear time alignment of the secondary input onto the primary grid
//!
//! Output sample frame `i` reads the secondary at fractional position
//! `i * (secondary_frames - 1) / (primary_frames - 1)`. The first output
//! frame lands exactly on the first secondary frame and the last output
//! frame exactly on the last one.

use crate::sample::Sample;

/// Where a primary sample frame reads from in the secondary buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondaryPosition {
    /// Lower neighbour, always `< secondary_frames`
    pub index: usize,
    /// Weight of the upper neighbour, in `[0, 1]`
    pub lambda: f64,
}

impl SecondaryPosition {
    const ORIGIN: SecondaryPosition = SecondaryPosition {
        index: 0,
        lambda: 0.0,
    };
}

/// Map primary sample frame `i` onto the secondary buffer.
///
/// Integer arithmetic keeps the index exact; only the remainder becomes
/// floating point. Single-frame buffers on either side resolve to the
/// first secondary frame.
#[inline]
pub fn secondary_position(i: usize, primary_frames: usize, secondary_frames: usize) -> SecondaryPosition {
    if primary_frames <= 1 || secondary_frames <= 1 {
        return SecondaryPosition::ORIGIN;
    }

    let max_sample = (primary_frames - 1) as u64;
    let max_secondary = (secondary_frames - 1) as u64;
    let scaled = i as u64 * max_secondary;

    let index = scaled / max_sample;
    if index >= max_secondary {
        // Would read one past the end; step back and take the upper neighbour
        return SecondaryPosition {
            index: (max_secondary - 1) as usize,
            lambda: 1.0,
        };
    }

    SecondaryPosition {
        index: index as usize,
        lambda: (scaled % max_sample) as f64 / max_sample as f64,
    }
}

#[inline]
fn lerp(lo: f64, hi: f64, lambda: f64) -> f64 {
    if lambda == 0.0 {
        lo
    } else if lambda == 1.0 {
        hi
    } else {
        lo + (hi - lo) * lambda
    }
}

/// Mix two interleaved buffers of `T` into `dst`.
///
/// `dst` and `primary` have the same length; `secondary` is stretched or
/// compressed onto the primary's sample frame count. Both inputs are
/// promoted to `f64`, scaled, summed and narrowed with [`Sample::from_f64`].
///
/// Callers validate lengths first (see [`crate::dispatch`]); this routine
/// has no failure path.
pub fn mix_interleaved<T: Sample>(
    dst: &mut [u8],
    primary: &[u8],
    level_a: f64,
    secondary: &[u8],
    level_b: f64,
    channels: usize,
) {
    let stride = T::SIZE * channels;
    debug_assert!(stride > 0);
    debug_assert_eq!(dst.len(), primary.len());
    debug_assert_eq!(primary.len() % stride, 0);
    debug_assert_eq!(secondary.len() % stride, 0);

    let primary_frames = primary.len() / stride;
    let secondary_frames = secondary.len() / stride;
    debug_assert!(primary_frames == 0 || secondary_frames > 0);

    if primary_frames == 1 || secondary_frames == 1 {
        log::trace!(
            "single-frame input ({} primary, {} secondary), using first secondary frame",
            primary_frames,
            secondary_frames
        );
    }

    for (i, (out_frame, in_frame)) in dst
        .chunks_exact_mut(stride)
        .zip(primary.chunks_exact(stride))
        .enumerate()
    {
        let pos = secondary_position(i, primary_frames, secondary_frames);
        let lo = &secondary[pos.index * stride..(pos.index + 1) * stride];
        let hi = if pos.index + 1 < secondary_frames {
            &secondary[(pos.index + 1) * stride..(pos.index + 2) * stride]
        } else {
            lo
        };

        for k in 0..channels {
            let offset = k * T::SIZE;
            let a = T::read(&in_frame[offset..]).to_f64();
            let b = lerp(
                T::read(&lo[offset..]).to_f64(),
                T::read(&hi[offset..]).to_f64(),
                pos.lambda,
            );
            T::from_f64(a * level_a + b * level_b).write(&mut out_frame[offset..]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_bytes<T: Sample>(samples: &[T]) -> Vec<u8> {
        bytemuck::cast_slice(samples).to_vec()
    }

    fn from_bytes<T: Sample>(bytes: &[u8]) -> Vec<T> {
        bytes.chunks_exact(T::SIZE).map(T::read).collect()
    }

    fn run<T: Sample>(primary: &[T], a: f64, secondary: &[T], b: f64, channels: usize) -> Vec<T> {
        let primary = to_bytes(primary);
        let secondary = to_bytes(secondary);
        let mut dst = vec![0u8; primary.len()];
        mix_interleaved::<T>(&mut dst, &primary, a, &secondary, b, channels);
        from_bytes(&dst)
    }

    #[test]
    fn test_position_endpoints() {
        for secondary in 2..12 {
            for primary in 2..12 {
                let first = secondary_position(0, primary, secondary);
                assert_eq!(first, SecondaryPosition { index: 0, lambda: 0.0 });

                let last = secondary_position(primary - 1, primary, secondary);
                assert_eq!(last.index, secondary - 2, "{} -> {}", primary, secondary);
                assert_eq!(last.lambda, 1.0);
            }
        }
    }

    #[test]
    fn test_position_monotonic_and_in_bounds() {
        let (primary, secondary) = (1601, 1602);
        let mut previous = 0.0;
        for i in 0..primary {
            let pos = secondary_position(i, primary, secondary);
            assert!(pos.index + 1 < secondary, "index {} out of bounds", pos.index);
            assert!((0.0..=1.0).contains(&pos.lambda));

            let absolute = pos.index as f64 + pos.lambda;
            assert!(absolute >= previous, "mapping went backwards at {}", i);
            previous = absolute;
        }
    }

    #[test]
    fn test_position_degenerate() {
        assert_eq!(secondary_position(0, 1, 100), SecondaryPosition::ORIGIN);
        for i in 0..50 {
            assert_eq!(secondary_position(i, 50, 1), SecondaryPosition::ORIGIN);
        }
    }

    #[test]
    fn test_identity_gain_equal_lengths() {
        let primary: Vec<i16> = vec![1, -2, 300, i16::MAX, i16::MIN, 7];
        let secondary: Vec<i16> = vec![9, 9, 9, 9, 9, 9];
        assert_eq!(run::<i16>(&primary, 1.0, &secondary, 0.0, 2), primary);
    }

    #[test]
    fn test_upsample_scenario_i32() {
        let out = run::<i32>(&[10, 20, 30, 40], 1.0, &[0, 100], 1.0, 1);
        // 10 + 0, 20 + 33.3, 30 + 66.7, 40 + 100, truncated
        assert_eq!(out, vec![10, 53, 96, 140]);
    }

    #[test]
    fn test_secondary_endpoints_exact_f64() {
        let secondary = vec![0.1f64, 0.7, -0.3, 0.123456789];
        let out = run::<f64>(&[0.0f64; 9], 0.0, &secondary, 1.0, 1);
        assert_eq!(out[0], 0.1);
        assert_eq!(out[8], 0.123456789);
    }

    #[test]
    fn test_downsample_interleaved_channels() {
        // 5 stereo frames onto 3: positions 0, 2, 4
        let secondary: Vec<f32> = vec![0.0, 10.0, 1.0, 11.0, 2.0, 12.0, 3.0, 13.0, 4.0, 14.0];
        let out = run::<f32>(&[0.0f32; 6], 0.0, &secondary, 1.0, 2);
        assert_eq!(out, vec![0.0, 10.0, 2.0, 12.0, 4.0, 14.0]);
    }

    #[test]
    fn test_single_secondary_frame_is_constant() {
        let out = run::<i32>(&[0, 0, 0, 0, 0, 0], 1.0, &[5, -5], 1.0, 2);
        assert_eq!(out, vec![5, -5, 5, -5, 5, -5]);
    }

    #[test]
    fn test_single_primary_frame() {
        let out = run::<f32>(&[1.0], 1.0, &[2.0, 3.0, 4.0], 1.0, 1);
        assert_eq!(out, vec![3.0]);
    }

    #[test]
    fn test_half_gain_reproduces_input() {
        let buffer: Vec<f32> = vec![0.5, -0.25, 1.0, 0.125];
        assert_eq!(run::<f32>(&buffer, 0.5, &buffer, 0.5, 1), buffer);

        let ints: Vec<i16> = vec![3, -3, 1001, -32768, 32767];
        let out = run::<i16>(&ints, 0.5, &ints, 0.5, 1);
        for (o, i) in out.iter().zip(&ints) {
            assert!((*o as i32 - *i as i32).abs() <= 1, "{} vs {}", o, i);
        }
    }

    #[test]
    fn test_role_swap_mirrors_source() {
        let a: Vec<f64> = vec![1.0, 2.0, 3.0];
        let b: Vec<f64> = vec![7.0, 8.0, 9.0];
        assert_eq!(run::<f64>(&a, 1.0, &b, 0.0, 1), a);
        assert_eq!(run::<f64>(&b, 1.0, &a, 0.0, 1), b);
        assert_eq!(run::<f64>(&a, 0.0, &b, 1.0, 1), b);
    }

    #[test]
    fn test_overflow_saturates() {
        let out = run::<i16>(&[30000, -30000], 1.0, &[30000, -30000], 1.0, 1);
        assert_eq!(out, vec![i16::MAX, i16::MIN]);
    }
}
