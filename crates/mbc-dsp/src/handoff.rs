//! Control-to-audio parameter handoff
//!
//! A single-slot cell: the control side replaces the whole parameter set and
//! raises a pending flag; the audio side tests-and-clears the flag at block
//! start and copies the parameters out. The audio side only ever `try_lock`s,
//! so a publish in progress defers the update by one block instead of
//! blocking the audio thread.

use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;
use mbc_core::{MbcResult, ParameterSnapshot};
use parking_lot::Mutex;

use crate::multiband::MultibandParams;

/// Single-writer / single-reader parameter cell
#[derive(Debug, Default)]
pub struct ParameterHandoff {
    params: Mutex<Option<MultibandParams>>,
    pending: AtomicBool,
}

impl ParameterHandoff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and publish a snapshot (control side)
    ///
    /// Errors are reported here; nothing is published on error.
    pub fn publish(&self, snapshot: &ParameterSnapshot) -> MbcResult<()> {
        let params = MultibandParams::from_snapshot(snapshot)?;
        self.publish_params(params);
        Ok(())
    }

    /// Publish already validated parameters (control side)
    pub fn publish_params(&self, params: MultibandParams) {
        *self.params.lock() = Some(params);
        self.pending.store(true, Ordering::Release);
    }

    /// Store parameters without raising the pending flag
    pub(crate) fn seed(&self, params: MultibandParams) {
        *self.params.lock() = Some(params);
        self.pending.store(false, Ordering::Release);
    }

    /// Take pending parameters (audio side, never blocks)
    pub fn take(&self) -> Option<MultibandParams> {
        if self
            .pending
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return None;
        }

        match self.params.try_lock() {
            Some(params) => *params,
            None => {
                // Writer is mid-publish; pick it up next block
                self.pending.store(true, Ordering::Release);
                warn!("Parameter handoff busy, update deferred");
                None
            }
        }
    }

    /// Last published parameters, ignoring the pending flag
    pub fn latest(&self) -> Option<MultibandParams> {
        *self.params.lock()
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}
