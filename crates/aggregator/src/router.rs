//! The aggregator: admin-gated registries, best-route quoting and atomic
//! multi-hop execution.

use {
    crate::routing::{self, DEFAULT_MAX_HOPS},
    alloy_primitives::{Address, U256},
    itertools::Itertools,
    liquidity::{
        pool::{Pool, PoolError},
        registry::{AssetRegistry, PoolRegistry, RegistryError},
        tokens::{TokenLedger, TransferError},
    },
    model::{TokenPair, quote::Quote, trade::RoutedSwap},
    thiserror::Error,
};

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum RouterError {
    #[error("caller is not the registry admin")]
    Unauthorized,
    #[error("no route from {sell} to {buy}")]
    NoRouteFound { sell: Address, buy: Address },
    #[error("swap amount must be positive")]
    InvalidAmount,
    #[error("path is not fully backed by registered pools")]
    PathNotFound,
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// Routing parameters.
#[derive(Clone, Copy, Debug)]
pub struct RouterConfig {
    /// Maximum number of pools a route may cross.
    pub max_hops: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
        }
    }
}

/// Routes swaps across the registered pools.
///
/// Owns the registries and the event log; custody lives on the token ledger
/// passed into the state-mutating operations, under the router's own
/// address.
pub struct Aggregator {
    admin: Address,
    address: Address,
    config: RouterConfig,
    assets: AssetRegistry,
    pools: PoolRegistry,
    events: Vec<RoutedSwap>,
}

/// One validated hop of a planned settlement.
#[derive(Clone, Debug, Eq, PartialEq)]
struct HopExecution {
    asset_in: Address,
    asset_out: Address,
    amount_in: U256,
    amount_out: U256,
}

/// The fully simulated execution plan for a path. Produced against current
/// reserves before anything moves; the commit phase only applies these
/// proven values.
#[derive(Clone, Debug)]
struct Settlement {
    hops: Vec<HopExecution>,
}

impl Settlement {
    fn amount_out(&self) -> U256 {
        self.hops.last().map_or(U256::ZERO, |hop| hop.amount_out)
    }
}

impl Aggregator {
    pub fn new(admin: Address, address: Address) -> Self {
        Self::with_config(admin, address, RouterConfig::default())
    }

    pub fn with_config(admin: Address, address: Address, config: RouterConfig) -> Self {
        Self {
            admin,
            address,
            config,
            assets: AssetRegistry::new(),
            pools: PoolRegistry::new(),
            events: Vec::new(),
        }
    }

    /// The router's custody identity on the token ledger.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn events(&self) -> &[RoutedSwap] {
        &self.events
    }

    pub fn is_registered(&self, asset: Address) -> bool {
        self.assets.is_registered(asset)
    }

    pub fn pool(&self, asset_a: Address, asset_b: Address) -> Option<&Pool> {
        self.pools.pool_for(asset_a, asset_b)
    }

    pub fn pool_mut(&mut self, asset_a: Address, asset_b: Address) -> Option<&mut Pool> {
        self.pools.pool_for_mut(asset_a, asset_b)
    }

    /// Admits an asset for pooling and routing. Admin-only; idempotent.
    pub fn register_token(&mut self, caller: Address, asset: Address) -> Result<(), RouterError> {
        self.ensure_admin(caller)?;
        if self.assets.register(asset) {
            tracing::debug!(?asset, "asset admitted");
        }
        Ok(())
    }

    /// Registers the authoritative pool for `(asset_a, asset_b)`.
    /// Admin-only; both assets must be admitted and the pair must not
    /// already have a pool.
    pub fn register_pool(
        &mut self,
        caller: Address,
        asset_a: Address,
        asset_b: Address,
        pool: Pool,
    ) -> Result<(), RouterError> {
        self.ensure_admin(caller)?;
        for asset in [asset_a, asset_b] {
            if !self.assets.is_registered(asset) {
                return Err(RegistryError::UnknownAsset(asset).into());
            }
        }
        if TokenPair::new(asset_a, asset_b) != Some(pool.tokens()) {
            return Err(RegistryError::PairMismatch.into());
        }
        let address = pool.address();
        self.pools.register(pool)?;
        tracing::debug!(?asset_a, ?asset_b, pool = ?address, "pool registered");
        Ok(())
    }

    /// Best output over all candidate paths within the hop cap.
    ///
    /// Pure read path: no state mutation, safe to call arbitrarily often.
    /// Candidates that cannot be priced (empty pool, overflow, would-drain
    /// output) are skipped. Selection keeps a strictly greater output only,
    /// and candidates are enumerated shortest first then in pool
    /// registration order, so ties resolve to the direct path and then to
    /// the earliest registered intermediate.
    pub fn quote_best(
        &self,
        asset_in: Address,
        asset_out: Address,
        amount_in: U256,
    ) -> Result<Quote, RouterError> {
        if amount_in.is_zero() {
            return Err(RouterError::InvalidAmount);
        }
        let candidates =
            routing::path_candidates(&self.pools, asset_in, asset_out, self.config.max_hops);
        let mut best: Option<Quote> = None;
        for path in candidates {
            let amount_out = match routing::estimate_swap_output(&self.pools, &path, amount_in) {
                Ok(amount_out) => amount_out,
                Err(err) => {
                    tracing::debug!(?err, ?path, "skipping unpriceable candidate");
                    continue;
                }
            };
            if best.as_ref().is_none_or(|best| amount_out > best.amount_out) {
                best = Some(Quote { path, amount_out });
            }
        }
        let quote = best.ok_or(RouterError::NoRouteFound {
            sell: asset_in,
            buy: asset_out,
        })?;
        tracing::debug!(hops = quote.hops(), amount_out = %quote.amount_out, "best route selected");
        Ok(quote)
    }

    /// Executes a swap along `path`, pulling `amount_in` of the first asset
    /// from `caller` (who must have pre-approved the router) and paying the
    /// final output to `recipient`.
    ///
    /// Validate-then-commit: the whole path is simulated against current
    /// reserves, slippage is checked on the simulated final output, and only
    /// then do funds start moving. Intermediate hops run with a zero
    /// minimum; the caller's minimum applies once, to the final hop. A
    /// failure at any check point leaves every reserve and balance
    /// untouched.
    pub fn swap_exact_tokens_for_tokens(
        &mut self,
        ledger: &mut TokenLedger,
        caller: Address,
        amount_in: U256,
        min_amount_out: U256,
        path: &[Address],
        recipient: Address,
    ) -> Result<U256, RouterError> {
        if amount_in.is_zero() {
            return Err(RouterError::InvalidAmount);
        }
        let settlement = self.plan_settlement(path, amount_in)?;
        let amount_out = settlement.amount_out();
        if amount_out < min_amount_out {
            return Err(PoolError::SlippageExceeded {
                amount_out,
                min_amount_out,
            }
            .into());
        }

        ledger.transfer_from(path[0], self.address, caller, self.address, amount_in)?;

        let last_hop = settlement.hops.len() - 1;
        for (index, hop) in settlement.hops.iter().enumerate() {
            let router = self.address;
            let pool = self
                .pools
                .pool_for_mut(hop.asset_in, hop.asset_out)
                .ok_or(RouterError::PathNotFound)?;
            ledger.transfer(hop.asset_in, router, pool.address(), hop.amount_in)?;
            let (hop_min, hop_recipient) = if index == last_hop {
                (min_amount_out, recipient)
            } else {
                (U256::ZERO, router)
            };
            pool.swap(ledger, hop.asset_in, hop.amount_in, hop_min, hop_recipient)?;
        }

        tracing::info!(?caller, ?path, %amount_in, %amount_out, "routed swap settled");
        self.events.push(RoutedSwap {
            caller,
            path: path.to_vec(),
            amount_in,
            amount_out,
        });
        Ok(amount_out)
    }

    /// Simulates every hop of `path` against current reserves.
    fn plan_settlement(&self, path: &[Address], amount_in: U256) -> Result<Settlement, RouterError> {
        let hops = path.len().saturating_sub(1);
        if hops == 0 || hops > self.config.max_hops {
            return Err(RouterError::PathNotFound);
        }
        // A repeated asset would make a later hop observe reserves the plan
        // has already spent.
        if path.iter().duplicates().next().is_some() {
            return Err(RouterError::PathNotFound);
        }

        let mut executions = Vec::with_capacity(hops);
        let mut amount = amount_in;
        for (asset_in, asset_out) in path.iter().copied().tuple_windows() {
            let pool = self
                .pools
                .pool_for(asset_in, asset_out)
                .ok_or(RouterError::PathNotFound)?;
            let amount_out = pool.quote_out(asset_in, amount)?;
            executions.push(HopExecution {
                asset_in,
                asset_out,
                amount_in: amount,
                amount_out,
            });
            amount = amount_out;
        }
        Ok(Settlement { hops: executions })
    }

    fn ensure_admin(&self, caller: Address) -> Result<(), RouterError> {
        if caller != self.admin {
            return Err(RouterError::Unauthorized);
        }
        Ok(())
    }
}
