//! Quote results returned by the aggregator's read path.

use {
    alloy_primitives::{Address, U256},
    serde::{Deserialize, Serialize},
};

/// Best-known outcome for a swap at the moment of computation.
///
/// Only instantaneously valid: reserves may change between quoting and
/// execution, so `min_amount_out` on the execution call is the sole
/// staleness guard.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Asset sequence the output was computed over, input asset first.
    pub path: Vec<Address>,
    /// Expected output of the final hop, in raw smallest units.
    pub amount_out: U256,
}

impl Quote {
    /// Number of pools the quoted route crosses.
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}
