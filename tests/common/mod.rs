#[cfg(test)]
#[allow(dead_code)]
pub mod counter_vm;
pub use counter_vm::*;

#[cfg(test)]
#[allow(dead_code)]
pub mod test_data;
pub use test_data::*;

#[cfg(test)]
#[allow(dead_code)]
pub mod simulate_ledger;
pub use simulate_ledger::*;
