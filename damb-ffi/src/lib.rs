//! damb FFI - C Foreign Function Interface
//!
//! C-compatible API over the mixer kernel. Status codes are `0` on success
//! and negative on failure; nothing panics across the boundary.

use std::os::raw::{c_char, c_int};
use std::slice;

use damb_mix::{
    mix_into, AudioBuffer, AudioInfo, AudioMixer, MixConfig, MixError, UnknownFormatPolicy,
};

/// Opaque handle to AudioMixer (C-compatible)
pub struct DambMixer {
    _private: [u8; 0],
}

pub const DAMB_OK: c_int = 0;
pub const DAMB_ERR_NULL: c_int = -1;
pub const DAMB_ERR_UNKNOWN_LENGTH: c_int = -2;
pub const DAMB_ERR_VARIABLE_RATE: c_int = -3;
pub const DAMB_ERR_BUFFER_LENGTH: c_int = -4;
pub const DAMB_ERR_DEGENERATE: c_int = -5;
pub const DAMB_ERR_CHANNELS: c_int = -6;
pub const DAMB_ERR_FORMAT: c_int = -7;
pub const DAMB_ERR_OUTPUT_LENGTH: c_int = -8;
pub const DAMB_ERR_GAIN: c_int = -9;

fn status(err: &MixError) -> c_int {
    log::debug!("damb mix failed: {}", err);
    match err {
        MixError::UnknownLength => DAMB_ERR_UNKNOWN_LENGTH,
        MixError::VariableRate { .. } => DAMB_ERR_VARIABLE_RATE,
        MixError::InvalidBufferLength { .. } => DAMB_ERR_BUFFER_LENGTH,
        MixError::DegenerateSampleCount { .. } => DAMB_ERR_DEGENERATE,
        MixError::ZeroChannels | MixError::ChannelMismatch { .. } => DAMB_ERR_CHANNELS,
        MixError::FormatMismatch { .. } | MixError::UnsupportedFormat { .. } => DAMB_ERR_FORMAT,
        MixError::OutputLengthMismatch { .. } => DAMB_ERR_OUTPUT_LENGTH,
        MixError::InvalidGain { .. } => DAMB_ERR_GAIN,
    }
}

/// Build a byte slice, treating a zero length as empty regardless of `ptr`
unsafe fn bytes<'a>(ptr: *const u8, len: usize) -> Option<&'a [u8]> {
    if len == 0 {
        Some(&[])
    } else if ptr.is_null() {
        None
    } else {
        Some(slice::from_raw_parts(ptr, len))
    }
}

unsafe fn bytes_mut<'a>(ptr: *mut u8, len: usize) -> Option<&'a mut [u8]> {
    if len == 0 {
        Some(&mut [])
    } else if ptr.is_null() {
        None
    } else {
        Some(slice::from_raw_parts_mut(ptr, len))
    }
}

/// The C caller keeps its own frame metadata and copies it onto the output;
/// only channels and format matter to the mix, so the rate stays 0.
fn info(channels: u32, format_tag: i64) -> AudioInfo {
    AudioInfo {
        channels: channels as usize,
        sample_rate: 0,
        format_tag,
    }
}

// ============================================================================
// ONE-SHOT MIX
// ============================================================================

/// Mix `secondary` onto `primary` into `out` (`out_len == primary_len`)
///
/// Unrecognised format tags are mixed as 64-bit float.
///
/// # Safety
/// Each non-null pointer must be valid for its length; `out` must not
/// overlap either input.
#[no_mangle]
pub unsafe extern "C" fn damb_mix_buffers(
    primary: *const u8,
    primary_len: usize,
    level_a: f64,
    secondary: *const u8,
    secondary_len: usize,
    level_b: f64,
    channels: u32,
    format_tag: i64,
    out: *mut u8,
    out_len: usize,
) -> c_int {
    let (Some(primary), Some(secondary), Some(out)) = (
        bytes(primary, primary_len),
        bytes(secondary, secondary_len),
        bytes_mut(out, out_len),
    ) else {
        return DAMB_ERR_NULL;
    };

    let config = MixConfig {
        level_a,
        level_b,
        ..MixConfig::default()
    };
    let info = info(channels, format_tag);

    match mix_into(out, AudioBuffer::new(primary, info), AudioBuffer::new(secondary, info), &config) {
        Ok(_) => DAMB_OK,
        Err(err) => status(&err),
    }
}

// ============================================================================
// MIXER HANDLE API
// ============================================================================

/// Create a mixer with the given gains
///
/// `strict != 0` rejects unrecognised format tags instead of mixing them as
/// 64-bit float. Returns null on non-finite gains.
///
/// # Safety
/// Safe to call.
#[no_mangle]
pub unsafe extern "C" fn damb_mixer_create(level_a: f64, level_b: f64, strict: c_int) -> *mut DambMixer {
    let policy = if strict != 0 {
        UnknownFormatPolicy::Reject
    } else {
        UnknownFormatPolicy::FallbackToDouble
    };
    let config = MixConfig {
        level_a,
        level_b,
        unknown_format: policy,
    };

    match AudioMixer::new(config) {
        Ok(mixer) => Box::into_raw(Box::new(mixer)) as *mut DambMixer,
        Err(err) => {
            status(&err);
            std::ptr::null_mut()
        }
    }
}

/// Destroy a mixer
///
/// # Safety
/// Caller must ensure ptr is valid and not already freed.
#[no_mangle]
pub unsafe extern "C" fn damb_mixer_destroy(ptr: *mut DambMixer) {
    if !ptr.is_null() {
        let _ = Box::from_raw(ptr as *mut AudioMixer);
    }
}

/// Mix one frame and copy the result into `out`
///
/// The mixer keeps its scratch buffer between calls.
///
/// # Safety
/// Caller must ensure ptr is a live mixer and each non-null pointer is
/// valid for its length.
#[no_mangle]
pub unsafe extern "C" fn damb_mixer_mix(
    ptr: *mut DambMixer,
    primary: *const u8,
    primary_len: usize,
    secondary: *const u8,
    secondary_len: usize,
    channels: u32,
    format_tag: i64,
    out: *mut u8,
    out_len: usize,
) -> c_int {
    if ptr.is_null() {
        return DAMB_ERR_NULL;
    }
    let (Some(primary), Some(secondary), Some(out)) = (
        bytes(primary, primary_len),
        bytes(secondary, secondary_len),
        bytes_mut(out, out_len),
    ) else {
        return DAMB_ERR_NULL;
    };
    if out.len() != primary.len() {
        return status(&MixError::OutputLengthMismatch {
            expected: primary.len(),
            actual: out.len(),
        });
    }

    let mixer = &mut *(ptr as *mut AudioMixer);
    let info = info(channels, format_tag);

    match mixer.mix_frame(AudioBuffer::new(primary, info), AudioBuffer::new(secondary, info)) {
        Ok(frame) => {
            out.copy_from_slice(frame.data);
            DAMB_OK
        }
        Err(err) => status(&err),
    }
}

/// Frames mixed so far by this mixer
///
/// # Safety
/// Caller must ensure ptr is valid.
#[no_mangle]
pub unsafe extern "C" fn damb_mixer_frames_mixed(ptr: *const DambMixer) -> u64 {
    if ptr.is_null() {
        return 0;
    }

    let mixer = &*(ptr as *const AudioMixer);
    mixer.stats().frames_mixed
}

// ============================================================================
// UTILITY FUNCTIONS
// ============================================================================

/// Get library version string
#[no_mangle]
pub extern "C" fn damb_mix_version() -> *const c_char {
    "0.1.0\0".as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use damb_mix::SampleFormat;
    use std::ffi::CStr;

    fn pcm32(samples: &[i32]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_ne_bytes()).collect()
    }

    fn read_pcm32(bytes: &[u8]) -> Vec<i32> {
        bytes
            .chunks_exact(4)
            .map(|c| i32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn test_mix_buffers_ffi() {
        let a = pcm32(&[10, 20, 30, 40]);
        let b = pcm32(&[0, 100]);
        let mut out = vec![0u8; a.len()];

        let rc = unsafe {
            damb_mix_buffers(
                a.as_ptr(),
                a.len(),
                1.0,
                b.as_ptr(),
                b.len(),
                1.0,
                1,
                SampleFormat::Pcm32.tag(),
                out.as_mut_ptr(),
                out.len(),
            )
        };

        assert_eq!(rc, DAMB_OK);
        assert_eq!(read_pcm32(&out), vec![10, 53, 96, 140]);
    }

    #[test]
    fn test_mix_buffers_errors() {
        let a = pcm32(&[1, 2, 3]);
        let mut out = vec![0u8; a.len()];

        let rc = unsafe {
            damb_mix_buffers(
                std::ptr::null(),
                a.len(),
                1.0,
                a.as_ptr(),
                a.len(),
                1.0,
                1,
                SampleFormat::Pcm32.tag(),
                out.as_mut_ptr(),
                out.len(),
            )
        };
        assert_eq!(rc, DAMB_ERR_NULL);

        let rc = unsafe {
            damb_mix_buffers(
                a.as_ptr(),
                a.len(),
                1.0,
                a.as_ptr(),
                a.len(),
                1.0,
                2,
                SampleFormat::Pcm32.tag(),
                out.as_mut_ptr(),
                out.len(),
            )
        };
        assert_eq!(rc, DAMB_ERR_BUFFER_LENGTH);
    }

    #[test]
    fn test_mixer_handle_ffi() {
        unsafe {
            let mixer = damb_mixer_create(1.0, 0.5, 1);
            assert!(!mixer.is_null());

            let a = pcm32(&[100, 200]);
            let b = pcm32(&[10, 20]);
            let mut out = vec![0u8; a.len()];

            let rc = damb_mixer_mix(
                mixer,
                a.as_ptr(),
                a.len(),
                b.as_ptr(),
                b.len(),
                1,
                SampleFormat::Pcm32.tag(),
                out.as_mut_ptr(),
                out.len(),
            );
            assert_eq!(rc, DAMB_OK);
            assert_eq!(read_pcm32(&out), vec![105, 210]);
            assert_eq!(damb_mixer_frames_mixed(mixer), 1);

            let rc = damb_mixer_mix(
                mixer,
                a.as_ptr(),
                a.len(),
                b.as_ptr(),
                b.len(),
                1,
                0x0001,
                out.as_mut_ptr(),
                out.len(),
            );
            assert_eq!(rc, DAMB_ERR_FORMAT, "strict mixer rejects unknown tags");

            damb_mixer_destroy(mixer);
        }
    }

    #[test]
    fn test_mixer_create_rejects_nan() {
        unsafe {
            assert!(damb_mixer_create(f64::NAN, 1.0, 0).is_null());
        }
    }

    #[test]
    fn test_version() {
        unsafe {
            let version = damb_mix_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, "0.1.0");
        }
    }
}
