/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Fee handling: computing the cost of a transaction and accumulating fees per block.
//!
//! - [economics] computes gas limits, fees and developer shares, and validates the gas
//! values of transactions. [EconomicsHandler] is the seam for alternative fee schedules, e.g.
//! [GenesisEconomics] which charges nothing.
//! - [accumulator] sums up the fees collected in a block, and reverts the contribution of
//! transactions which are dropped from the block.

pub mod accumulator;
pub use accumulator::FeeAccumulator;

pub mod economics;
pub use economics::{Economics, EconomicsConfig, EconomicsHandler, GenesisEconomics};
