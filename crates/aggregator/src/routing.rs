//! Path-finding logic over registered pools: candidate enumeration and
//! chained quotes along a path.

use {
    alloy_primitives::{Address, U256},
    itertools::Itertools,
    liquidity::{pool::PoolError, registry::PoolRegistry},
    thiserror::Error,
};

/// The default number of pools a route may cross (one intermediate asset).
pub const DEFAULT_MAX_HOPS: usize = 2;

pub type PathCandidate = Vec<Address>;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum EstimateError {
    #[error("path has a hop without a registered pool")]
    MissingPool,
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Returns possible paths from `sell` to `buy` across registered pools,
/// bounded by `max_hops` pools per path.
///
/// Candidates come out shortest first (the direct pair before any
/// intermediate route) and intermediates follow pool registration order, so
/// the enumeration order doubles as the tie-break order downstream. Every
/// consecutive pair in a returned candidate has a registered pool.
pub fn path_candidates(
    registry: &PoolRegistry,
    sell: Address,
    buy: Address,
    max_hops: usize,
) -> Vec<PathCandidate> {
    if sell == buy {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    // Start with just the sell token; each round extends every prefix by one
    // pool, completing the ones that reach the buy token.
    let mut path_prefixes = vec![vec![sell]];
    for _ in 0..max_hops {
        let mut next_round_path_prefixes = Vec::new();
        for path_prefix in &path_prefixes {
            let last = path_prefix[path_prefix.len() - 1];
            if registry.pool_for(last, buy).is_some() {
                let mut full_path = path_prefix.clone();
                full_path.push(buy);
                candidates.push(full_path);
            }
            for neighbor in registry.neighbors_of(last) {
                if neighbor != buy && !path_prefix.contains(&neighbor) {
                    let mut next_round_path_prefix = path_prefix.clone();
                    next_round_path_prefix.push(neighbor);
                    next_round_path_prefixes.push(next_round_path_prefix);
                }
            }
        }
        path_prefixes = next_round_path_prefixes;
    }
    candidates
}

/// Given a path and sell amount (first token of the path) computes the buy
/// amount (last token of the path) by chaining each hop's quote; each hop's
/// output becomes the next hop's input.
pub fn estimate_swap_output(
    registry: &PoolRegistry,
    path: &[Address],
    amount_in: U256,
) -> Result<U256, EstimateError> {
    if path.len() < 2 {
        return Err(EstimateError::MissingPool);
    }
    let mut amount = amount_in;
    for (asset_in, asset_out) in path.iter().copied().tuple_windows() {
        let pool = registry
            .pool_for(asset_in, asset_out)
            .ok_or(EstimateError::MissingPool)?;
        amount = pool.quote_out(asset_in, amount)?;
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        liquidity::pool::Pool,
        model::TokenPair,
    };

    fn addr(byte: u8) -> Address {
        Address::with_last_byte(byte)
    }

    fn add_pool(registry: &mut PoolRegistry, pool_byte: u8, a: Address, b: Address) {
        registry
            .register(Pool::new(addr(pool_byte), TokenPair::new(a, b).unwrap(), 30))
            .unwrap();
    }

    fn add_pool_with_reserves(
        registry: &mut PoolRegistry,
        pool_byte: u8,
        a: Address,
        b: Address,
        reserves: (U256, U256),
    ) {
        add_pool(registry, pool_byte, a, b);
        let pool = registry.pool_for_mut(a, b).unwrap();
        let (amount0, amount1) = if TokenPair::new(a, b).unwrap().get().0 == a {
            reserves
        } else {
            (reserves.1, reserves.0)
        };
        seed(pool, amount0, amount1);
    }

    /// Backdoors reserves in without ledger plumbing; routing only reads
    /// them through `quote_out`.
    fn seed(pool: &mut Pool, amount0: U256, amount1: U256) {
        use liquidity::tokens::{TokenConfig, TokenLedger};
        let (token0, token1) = pool.tokens().get();
        let mut ledger = TokenLedger::new();
        for (token, symbol) in [(token0, "T0"), (token1, "T1")] {
            ledger.deploy(token, TokenConfig::new(symbol, symbol)).unwrap();
        }
        let provider = Address::with_last_byte(255);
        ledger.mint(token0, provider, amount0).unwrap();
        ledger.mint(token1, provider, amount1).unwrap();
        ledger.approve(token0, provider, pool.address(), amount0).unwrap();
        ledger.approve(token1, provider, pool.address(), amount1).unwrap();
        pool.add_liquidity(&mut ledger, provider, amount0, amount1).unwrap();
    }

    #[test]
    fn no_candidates_for_same_token() {
        let mut registry = PoolRegistry::new();
        add_pool(&mut registry, 10, addr(1), addr(2));
        assert!(path_candidates(&registry, addr(1), addr(1), DEFAULT_MAX_HOPS).is_empty());
    }

    #[test]
    fn candidates_shortest_first_then_registration_order() {
        let sell = addr(1);
        let buy = addr(5);
        let mut registry = PoolRegistry::new();
        add_pool(&mut registry, 10, sell, addr(2));
        add_pool(&mut registry, 11, sell, buy);
        add_pool(&mut registry, 12, sell, addr(3));
        add_pool(&mut registry, 13, addr(2), buy);
        add_pool(&mut registry, 14, addr(3), buy);

        assert_eq!(
            path_candidates(&registry, sell, buy, DEFAULT_MAX_HOPS),
            vec![
                vec![sell, buy],
                vec![sell, addr(2), buy],
                vec![sell, addr(3), buy],
            ]
        );
    }

    #[test]
    fn candidates_only_include_fully_backed_paths() {
        let sell = addr(1);
        let buy = addr(5);
        let mut registry = PoolRegistry::new();
        // addr(2) neighbors the sell token but has no pool towards the buy
        // token, so no candidate goes through it.
        add_pool(&mut registry, 10, sell, addr(2));
        add_pool(&mut registry, 11, sell, addr(3));
        add_pool(&mut registry, 12, addr(3), buy);

        assert_eq!(
            path_candidates(&registry, sell, buy, DEFAULT_MAX_HOPS),
            vec![vec![sell, addr(3), buy]]
        );
    }

    #[test]
    fn hop_cap_bounds_the_search() {
        let sell = addr(1);
        let buy = addr(4);
        let mut registry = PoolRegistry::new();
        add_pool(&mut registry, 10, sell, addr(2));
        add_pool(&mut registry, 11, addr(2), addr(3));
        add_pool(&mut registry, 12, addr(3), buy);

        assert!(path_candidates(&registry, sell, buy, 0).is_empty());
        assert!(path_candidates(&registry, sell, buy, 2).is_empty());
        // A three-pool chain only shows up once the cap admits it.
        assert_eq!(
            path_candidates(&registry, sell, buy, 3),
            vec![vec![sell, addr(2), addr(3), buy]]
        );
    }

    #[test]
    fn estimate_chains_hop_quotes() {
        let sell = addr(1);
        let mid = addr(2);
        let buy = addr(3);
        let mut registry = PoolRegistry::new();
        add_pool_with_reserves(
            &mut registry,
            10,
            sell,
            mid,
            (U256::from(100), U256::from(100)),
        );
        add_pool_with_reserves(
            &mut registry,
            11,
            mid,
            buy,
            (U256::from(200), U256::from(50)),
        );

        // First hop nets 8, which the second hop prices at 1.
        assert_eq!(
            estimate_swap_output(&registry, &[sell, mid, buy], U256::from(10)),
            Ok(U256::from(1))
        );
    }

    #[test]
    fn estimate_fails_for_missing_pool() {
        let sell = addr(1);
        let mid = addr(2);
        let buy = addr(3);
        let mut registry = PoolRegistry::new();
        add_pool_with_reserves(
            &mut registry,
            10,
            sell,
            mid,
            (U256::from(100), U256::from(100)),
        );

        assert_eq!(
            estimate_swap_output(&registry, &[sell, mid, buy], U256::from(10)),
            Err(EstimateError::MissingPool)
        );
        assert_eq!(
            estimate_swap_output(&registry, &[sell], U256::from(10)),
            Err(EstimateError::MissingPool)
        );
    }

    #[test]
    fn estimate_propagates_empty_pool_errors() {
        let sell = addr(1);
        let buy = addr(2);
        let mut registry = PoolRegistry::new();
        add_pool(&mut registry, 10, sell, buy);

        assert_eq!(
            estimate_swap_output(&registry, &[sell, buy], U256::from(10)),
            Err(EstimateError::Pool(PoolError::InsufficientReserves))
        );
    }
}
