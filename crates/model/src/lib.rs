//! Domain types shared between the liquidity layer and the aggregator.

pub mod quote;
pub mod trade;

use alloy_primitives::Address;

/// Token pair specified by two token addresses.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TokenPair(Address, Address);

impl TokenPair {
    /// Create a new token pair from two addresses.
    /// The addresses must not be equal.
    pub fn new(token_a: Address, token_b: Address) -> Option<Self> {
        match token_a.cmp(&token_b) {
            std::cmp::Ordering::Less => Some(Self(token_a, token_b)),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(Self(token_b, token_a)),
        }
    }

    /// Used to determine if `token` is among the pair.
    pub fn contains(&self, token: &Address) -> bool {
        self.0 == *token || self.1 == *token
    }

    /// Returns the token in the pair which is not the one passed in, or None
    /// if the token passed in is not part of the pair.
    pub fn other(&self, token: &Address) -> Option<Address> {
        if &self.0 == token {
            Some(self.1)
        } else if &self.1 == token {
            Some(self.0)
        } else {
            None
        }
    }

    /// The first address is always the lower one.
    /// The addresses are never equal.
    pub fn get(&self) -> (Address, Address) {
        (self.0, self.1)
    }
}

impl IntoIterator for TokenPair {
    type Item = Address;
    type IntoIter = std::iter::Chain<std::iter::Once<Address>, std::iter::Once<Address>>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(self.0).chain(std::iter::once(self.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_pair_is_sorted() {
        let token_a = Address::with_last_byte(2);
        let token_b = Address::with_last_byte(1);

        let pair = TokenPair::new(token_a, token_b).unwrap();
        assert_eq!(pair.get(), (token_b, token_a));
        assert_eq!(pair, TokenPair::new(token_b, token_a).unwrap());
    }

    #[test]
    fn token_pair_rejects_equal_addresses() {
        let token = Address::with_last_byte(1);
        assert_eq!(TokenPair::new(token, token), None);
    }

    #[test]
    fn token_pair_membership() {
        let token_a = Address::with_last_byte(1);
        let token_b = Address::with_last_byte(2);
        let outsider = Address::with_last_byte(3);
        let pair = TokenPair::new(token_a, token_b).unwrap();

        assert!(pair.contains(&token_a));
        assert!(pair.contains(&token_b));
        assert!(!pair.contains(&outsider));

        assert_eq!(pair.other(&token_a), Some(token_b));
        assert_eq!(pair.other(&token_b), Some(token_a));
        assert_eq!(pair.other(&outsider), None);
    }

    #[test]
    fn token_pair_iterates_in_canonical_order() {
        let token_a = Address::with_last_byte(9);
        let token_b = Address::with_last_byte(4);
        let pair = TokenPair::new(token_a, token_b).unwrap();

        let tokens: Vec<_> = pair.into_iter().collect();
        assert_eq!(tokens, vec![token_b, token_a]);
    }
}
