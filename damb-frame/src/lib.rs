//! Frame-level plumbing around the damb mixer
//!
//! - Owned frames carrying samples plus channel / rate / format metadata
//! - Clip checks (known length, fixed frame rate)
//! - Two-producer join per frame index
//! - Worker-thread pipeline over crossbeam channels

pub mod frame;
pub mod join;
pub mod pipeline;

pub use frame::*;
pub use join::*;
pub use pipeline::*;

use damb_mix::MixError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Mix(#[from] MixError),

    #[error("frame {frame} already has a {role:?} input")]
    DuplicateInput { frame: u64, role: Role },

    #[error("pipeline disconnected")]
    Disconnected,

    #[error("failed to spawn mix thread: {0}")]
    Spawn(String),
}
