//! Fan-in of two producers keyed by frame index
//!
//! A frame is mixed only once both its primary and secondary inputs have
//! arrived. Frames may complete in any order.

use crate::frame::AudioFrame;
use crate::PipelineError;
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;

/// Which input of the mix a frame belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Primary,
    Secondary,
}

#[derive(Default)]
struct Slot {
    primary: Option<AudioFrame>,
    secondary: Option<AudioFrame>,
}

impl Slot {
    fn is_complete(&self) -> bool {
        self.primary.is_some() && self.secondary.is_some()
    }
}

#[derive(Default)]
struct JoinState {
    pending: HashMap<u64, Slot>,
    closed: bool,
}

/// Join point for the two inputs of each frame
#[derive(Default)]
pub struct FrameJoin {
    state: Mutex<JoinState>,
    ready: Condvar,
}

impl FrameJoin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one input for frame `n`.
    ///
    /// Returns `true` when this completes the pair.
    pub fn submit(&self, n: u64, role: Role, frame: AudioFrame) -> Result<bool, PipelineError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PipelineError::Disconnected);
        }

        let slot = state.pending.entry(n).or_default();
        let target = match role {
            Role::Primary => &mut slot.primary,
            Role::Secondary => &mut slot.secondary,
        };
        if target.is_some() {
            return Err(PipelineError::DuplicateInput { frame: n, role });
        }
        *target = Some(frame);

        let complete = slot.is_complete();
        if complete {
            self.ready.notify_all();
        }
        Ok(complete)
    }

    /// Take both inputs of frame `n` if they have arrived
    pub fn try_take(&self, n: u64) -> Option<(AudioFrame, AudioFrame)> {
        let mut state = self.state.lock();
        Self::take_complete(&mut state, n)
    }

    /// Block until both inputs of frame `n` are available
    pub fn wait_pair(&self, n: u64) -> Result<(AudioFrame, AudioFrame), PipelineError> {
        let mut state = self.state.lock();
        loop {
            if let Some(pair) = Self::take_complete(&mut state, n) {
                return Ok(pair);
            }
            if state.closed {
                return Err(PipelineError::Disconnected);
            }
            self.ready.wait(&mut state);
        }
    }

    /// Refuse further inputs and wake every waiter
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.ready.notify_all();
    }

    /// Frames with at least one input still waiting for the other
    pub fn pending(&self) -> usize {
        self.state.lock().pending.len()
    }

    fn take_complete(state: &mut JoinState, n: u64) -> Option<(AudioFrame, AudioFrame)> {
        if !state.pending.get(&n).is_some_and(Slot::is_complete) {
            return None;
        }
        let slot = state.pending.remove(&n)?;
        Some((slot.primary?, slot.secondary?))
    }
}
