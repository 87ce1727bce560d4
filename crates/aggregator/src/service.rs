//! The externally facing service: one global sequential transaction order
//! with snapshot reads.
//!
//! Every state-mutating operation takes the write lock and runs to
//! completion, so writes apply one at a time and no in-flight operation is
//! ever partially visible. Reads take the read lock and observe the last
//! committed state; they never block each other. A quote can therefore go
//! stale by the time the matching swap applies; `min_amount_out` is the
//! caller's only guard against that.

use {
    crate::router::{Aggregator, RouterConfig, RouterError},
    alloy_primitives::{Address, U256},
    liquidity::{
        pool::Pool,
        tokens::{TokenConfig, TokenInfo, TokenLedger, TransferError},
    },
    model::{quote::Quote, trade::RoutedSwap},
    std::sync::RwLock,
};

struct State {
    ledger: TokenLedger,
    aggregator: Aggregator,
}

/// Thread-safe facade over the token ledger and the aggregator.
pub struct SwapService {
    state: RwLock<State>,
}

impl SwapService {
    pub fn new(admin: Address, router_address: Address) -> Self {
        Self::with_config(admin, router_address, RouterConfig::default())
    }

    pub fn with_config(admin: Address, router_address: Address, config: RouterConfig) -> Self {
        Self {
            state: RwLock::new(State {
                ledger: TokenLedger::new(),
                aggregator: Aggregator::with_config(admin, router_address, config),
            }),
        }
    }

    /// The router's custody address, which callers approve for swaps.
    pub fn router_address(&self) -> Address {
        self.state.read().unwrap().aggregator.address()
    }

    pub fn quote_best(
        &self,
        asset_in: Address,
        asset_out: Address,
        amount_in: U256,
    ) -> Result<Quote, RouterError> {
        self.state
            .read()
            .unwrap()
            .aggregator
            .quote_best(asset_in, asset_out, amount_in)
    }

    pub fn balance_of(&self, token: Address, owner: Address) -> U256 {
        self.state.read().unwrap().ledger.balance_of(token, owner)
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.state
            .read()
            .unwrap()
            .ledger
            .allowance(token, owner, spender)
    }

    pub fn token_info(&self, token: Address) -> Result<TokenInfo, TransferError> {
        self.state.read().unwrap().ledger.info(token)
    }

    /// Reserves of the pool for `(asset_a, asset_b)`, in canonical pair
    /// order, if one is registered.
    pub fn reserves(&self, asset_a: Address, asset_b: Address) -> Option<(u128, u128)> {
        self.state
            .read()
            .unwrap()
            .aggregator
            .pool(asset_a, asset_b)
            .map(|pool| pool.reserves())
    }

    /// Snapshot of the routed-swap records emitted so far.
    pub fn events(&self) -> Vec<RoutedSwap> {
        self.state.read().unwrap().aggregator.events().to_vec()
    }

    pub fn deploy_token(
        &self,
        address: Address,
        config: TokenConfig,
    ) -> Result<(), TransferError> {
        self.state.write().unwrap().ledger.deploy(address, config)
    }

    pub fn mint(&self, token: Address, to: Address, amount: U256) -> Result<(), TransferError> {
        self.state.write().unwrap().ledger.mint(token, to, amount)
    }

    pub fn approve(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        self.state
            .write()
            .unwrap()
            .ledger
            .approve(token, owner, spender, amount)
    }

    pub fn register_token(&self, caller: Address, asset: Address) -> Result<(), RouterError> {
        self.state
            .write()
            .unwrap()
            .aggregator
            .register_token(caller, asset)
    }

    pub fn register_pool(
        &self,
        caller: Address,
        asset_a: Address,
        asset_b: Address,
        pool: Pool,
    ) -> Result<(), RouterError> {
        self.state
            .write()
            .unwrap()
            .aggregator
            .register_pool(caller, asset_a, asset_b, pool)
    }

    /// Adds liquidity to the pool for `(asset_a, asset_b)`; amounts follow
    /// the pair's canonical order and the provider must have approved the
    /// pool for both of them.
    pub fn add_liquidity(
        &self,
        provider: Address,
        asset_a: Address,
        asset_b: Address,
        amount0: U256,
        amount1: U256,
    ) -> Result<(), RouterError> {
        let state = &mut *self.state.write().unwrap();
        let pool = state
            .aggregator
            .pool_mut(asset_a, asset_b)
            .ok_or(RouterError::PathNotFound)?;
        pool.add_liquidity(&mut state.ledger, provider, amount0, amount1)?;
        Ok(())
    }

    pub fn swap_exact_tokens_for_tokens(
        &self,
        caller: Address,
        amount_in: U256,
        min_amount_out: U256,
        path: &[Address],
        recipient: Address,
    ) -> Result<U256, RouterError> {
        let state = &mut *self.state.write().unwrap();
        state.aggregator.swap_exact_tokens_for_tokens(
            &mut state.ledger,
            caller,
            amount_in,
            min_amount_out,
            path,
            recipient,
        )
    }
}
