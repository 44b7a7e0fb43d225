/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Per block state of a shard processor.

use crate::{fees::FeeAccumulator, forwarder::IntermediateResults};

/// BlockContext holds what a shard collects while processing one block: the accumulated fees
/// and the outbox of results for other shards. It is passed explicitly to every processing
/// call and reset with [BlockContext::create_block_started].
#[derive(Clone, Debug, Default)]
pub struct BlockContext {
    pub fees: FeeAccumulator,
    pub outbox: IntermediateResults,
}

impl BlockContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets fees and discards results that were not taken from the outbox.
    pub fn create_block_started(&mut self) {
        self.fees.create_block_started();
        self.outbox.clean();
    }

    pub fn fees(&self) -> &FeeAccumulator {
        &self.fees
    }

    pub fn outbox(&self) -> &IntermediateResults {
        &self.outbox
    }

    pub fn outbox_mut(&mut self) -> &mut IntermediateResults {
        &mut self.outbox
    }
}
