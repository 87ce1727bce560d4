//! Admitted assets and the pair-to-pool mapping.
//!
//! Both registries iterate in registration order; the aggregator documents
//! that order as its deterministic tie-break, so it must not depend on hash
//! iteration.

use {
    crate::pool::Pool,
    alloy_primitives::Address,
    indexmap::{IndexMap, IndexSet},
    model::TokenPair,
    thiserror::Error,
};

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum RegistryError {
    #[error("asset {0} is not registered")]
    UnknownAsset(Address),
    #[error("a pool for this pair is already registered")]
    PoolAlreadyExists(TokenPair),
    #[error("pool custody does not match the pair being registered")]
    PairMismatch,
}

/// Assets admitted for pooling and routing.
#[derive(Clone, Debug, Default)]
pub struct AssetRegistry {
    assets: IndexSet<Address>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: registering an already admitted asset is a no-op.
    /// Returns whether the asset was newly admitted.
    pub fn register(&mut self, asset: Address) -> bool {
        self.assets.insert(asset)
    }

    pub fn is_registered(&self, asset: Address) -> bool {
        self.assets.contains(&asset)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// One authoritative pool per unordered token pair.
#[derive(Clone, Debug, Default)]
pub struct PoolRegistry {
    pools: IndexMap<TokenPair, Pool>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering a second pool for a pair is rejected; re-pointing a live
    /// pair would silently reroute concurrent quoting.
    pub fn register(&mut self, pool: Pool) -> Result<(), RegistryError> {
        let pair = pool.tokens();
        if self.pools.contains_key(&pair) {
            return Err(RegistryError::PoolAlreadyExists(pair));
        }
        self.pools.insert(pair, pool);
        Ok(())
    }

    /// Order-independent lookup: `(a, b)` and `(b, a)` resolve to the same
    /// pool.
    pub fn pool_for(&self, asset_a: Address, asset_b: Address) -> Option<&Pool> {
        self.pools.get(&TokenPair::new(asset_a, asset_b)?)
    }

    pub fn pool_for_mut(&mut self, asset_a: Address, asset_b: Address) -> Option<&mut Pool> {
        self.pools.get_mut(&TokenPair::new(asset_a, asset_b)?)
    }

    /// Every asset sharing a direct pool with `asset`, in pool registration
    /// order.
    pub fn neighbors_of(&self, asset: Address) -> Vec<Address> {
        let mut neighbors = IndexSet::new();
        for pair in self.pools.keys() {
            if let Some(other) = pair.other(&asset) {
                neighbors.insert(other);
            }
        }
        neighbors.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
