//! Sample element types
//!
//! The kernel reads and writes samples straight from byte ranges, which
//! carry no alignment guarantee, so every access goes through
//! `bytemuck::pod_read_unaligned` / `bytes_of`.

use bytemuck::Pod;

/// A storage representation the mixer can be instantiated for
pub trait Sample: Pod + Send + Sync {
    const SIZE: usize = std::mem::size_of::<Self>();

    /// Promote to the accumulation type
    fn to_f64(self) -> f64;

    /// Narrow from the accumulation type.
    ///
    /// Integer targets truncate toward zero and saturate at their bounds
    /// (NaN becomes 0); this is Rust's `as` conversion, no rounding.
    fn from_f64(value: f64) -> Self;

    #[inline]
    fn read(bytes: &[u8]) -> Self {
        bytemuck::pod_read_unaligned(&bytes[..Self::SIZE])
    }

    #[inline]
    fn write(self, bytes: &mut [u8]) {
        bytes[..Self::SIZE].copy_from_slice(bytemuck::bytes_of(&self));
    }
}

macro_rules! impl_sample {
    ($($t:ty),*) => {
        $(
            impl Sample for $t {
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $t
                }
            }
        )*
    };
}

impl_sample!(i16, i32, f32, f64);
