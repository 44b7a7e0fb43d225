/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Outbox of smart contract results produced in a block for other shards.

use std::collections::BTreeMap;

use crate::types::{SmartContractResult, ShardId};

/// IntermediateResults buffers the cross-shard results produced in a block, keyed by the
/// shard of their receiver. Results for one shard keep their creation order.
#[derive(Clone, Debug, Default)]
pub struct IntermediateResults {
    outbox: BTreeMap<ShardId, Vec<SmartContractResult>>,
}

impl IntermediateResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result to the outbox of `shard`.
    pub fn forward(&mut self, shard: ShardId, scr: SmartContractResult) {
        log::debug!(
            "forward result {} to shard {}",
            hex::encode(scr.hash()),
            shard
        );
        self.outbox.entry(shard).or_default().push(scr);
    }

    /// All results, ordered by destination shard then creation order.
    pub fn results(&self) -> impl Iterator<Item = (ShardId, &SmartContractResult)> {
        self.outbox
            .iter()
            .flat_map(|(shard, scrs)| scrs.iter().map(move |scr| (*shard, scr)))
    }

    pub fn results_for_shard(&self, shard: ShardId) -> &[SmartContractResult] {
        self.outbox
            .get(&shard)
            .map(|scrs| scrs.as_slice())
            .unwrap_or_default()
    }

    /// Removes and returns the results for `shard`.
    pub fn take_results_for_shard(&mut self, shard: ShardId) -> Vec<SmartContractResult> {
        self.outbox.remove(&shard).unwrap_or_default()
    }

    /// Removes and returns all results keyed by destination shard.
    pub fn take_all(&mut self) -> BTreeMap<ShardId, Vec<SmartContractResult>> {
        std::mem::take(&mut self.outbox)
    }

    pub fn clean(&mut self) {
        self.outbox.clear();
    }

    pub fn len(&self) -> usize {
        self.outbox.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.outbox.values().all(Vec::is_empty)
    }
}
