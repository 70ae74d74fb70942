//! Realtime processor boundary
//!
//! Owns the multiband compressor and the handoff cell feeding it. The host
//! calls [`MultibandProcessor::prepare`] from the control side before
//! streaming, hands [`MultibandProcessor::handoff`] to whatever produces
//! parameter changes, and calls [`MultibandProcessor::process_block`] from
//! the audio callback.

use std::sync::Arc;

use mbc_core::{MbcResult, ParameterSnapshot, Sample};

use crate::Processor;
use crate::handoff::ParameterHandoff;
use crate::multiband::{MultibandCompressor, MultibandParams};

pub struct MultibandProcessor {
    compressor: MultibandCompressor,
    handoff: Arc<ParameterHandoff>,
    non_realtime: bool,
}

impl Default for MultibandProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl MultibandProcessor {
    pub fn new() -> Self {
        Self {
            compressor: MultibandCompressor::new(),
            handoff: Arc::new(ParameterHandoff::new()),
            non_realtime: false,
        }
    }

    /// Validate `snapshot` and prepare for streaming
    ///
    /// Must not run concurrently with `process_block`.
    pub fn prepare(&mut self, snapshot: &ParameterSnapshot) -> MbcResult<()> {
        let params = MultibandParams::from_snapshot(snapshot)?;
        self.compressor.prepare_params(&params);
        self.handoff.seed(params);
        Ok(())
    }

    /// Handoff cell for the control side
    pub fn handoff(&self) -> Arc<ParameterHandoff> {
        Arc::clone(&self.handoff)
    }

    /// Offline rendering: apply the latest parameters before every block
    pub fn set_non_realtime(&mut self, non_realtime: bool) {
        self.non_realtime = non_realtime;
    }

    pub fn is_non_realtime(&self) -> bool {
        self.non_realtime
    }

    /// Apply pending parameters, then process a block in place
    pub fn process_block(&mut self, channels: &mut [&mut [Sample]]) {
        let params = if self.non_realtime {
            self.handoff.take();
            self.handoff.latest()
        } else {
            self.handoff.take()
        };
        if let Some(params) = params {
            self.compressor.apply_params(&params);
        }

        self.compressor.process_block(channels);
    }

    pub fn compressor(&self) -> &MultibandCompressor {
        &self.compressor
    }
}

impl Processor for MultibandProcessor {
    fn reset(&mut self) {
        self.compressor.reset();
    }
}
