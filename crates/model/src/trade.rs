//! Records emitted for executed swaps.

use {
    alloy_primitives::{Address, U256},
    serde::{Deserialize, Serialize},
};

/// Record of one settled routed swap.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoutedSwap {
    pub caller: Address,
    pub path: Vec<Address>,
    pub amount_in: U256,
    pub amount_out: U256,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routed_swap_serialization_roundtrip() {
        let record = RoutedSwap {
            caller: Address::with_last_byte(1),
            path: vec![Address::with_last_byte(2), Address::with_last_byte(3)],
            amount_in: U256::from(100),
            amount_out: U256::from(98),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(serde_json::from_str::<RoutedSwap>(&json).unwrap(), record);
    }
}
