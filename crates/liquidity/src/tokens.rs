//! In-memory token custody: balances, allowances and per-token metadata.
//!
//! This is the substrate the pools and the router move funds through. In the
//! source system it was the set of independently deployed fungible token
//! contracts; here it is one ledger mutated through `&mut self`, with caller
//! identity supplied explicitly by the layer that owns authentication.

use {
    alloy_primitives::{Address, U256},
    indexmap::IndexMap,
    serde::{Deserialize, Serialize},
    std::collections::HashMap,
    thiserror::Error,
};

/// Decimal precision applied when a deployment does not specify one.
///
/// Always supplied explicitly through [`TokenConfig`]; never inferred from a
/// fallible query at use time.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Deployment-time token configuration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenConfig {
    pub fn new(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals: DEFAULT_DECIMALS,
        }
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }
}

/// Presentation metadata for a deployed token.
///
/// Used by collaborating layers for unit conversion only; the core always
/// computes in raw smallest-unit integers.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TransferError {
    #[error("token {0} is not deployed")]
    UnknownToken(Address),
    #[error("token {0} is already deployed")]
    TokenAlreadyDeployed(Address),
    #[error("balance of {owner} in token {token} too low")]
    InsufficientBalance { token: Address, owner: Address },
    #[error("allowance granted by {owner} to {spender} in token {token} too low")]
    InsufficientAllowance {
        token: Address,
        owner: Address,
        spender: Address,
    },
    #[error("token supply arithmetic overflow")]
    ArithmeticOverflow,
}

#[derive(Clone, Debug)]
struct TokenState {
    config: TokenConfig,
    total_supply: U256,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
}

/// All deployed tokens and who holds them.
#[derive(Clone, Debug, Default)]
pub struct TokenLedger {
    tokens: IndexMap<Address, TokenState>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a token at `address`. The address is assigned externally;
    /// token lifecycle is not this ledger's concern.
    pub fn deploy(&mut self, address: Address, config: TokenConfig) -> Result<(), TransferError> {
        if self.tokens.contains_key(&address) {
            return Err(TransferError::TokenAlreadyDeployed(address));
        }
        self.tokens.insert(
            address,
            TokenState {
                config,
                total_supply: U256::ZERO,
                balances: HashMap::new(),
                allowances: HashMap::new(),
            },
        );
        Ok(())
    }

    pub fn is_deployed(&self, token: Address) -> bool {
        self.tokens.contains_key(&token)
    }

    pub fn info(&self, token: Address) -> Result<TokenInfo, TransferError> {
        let state = self.state(token)?;
        Ok(TokenInfo {
            symbol: state.config.symbol.clone(),
            decimals: state.config.decimals,
        })
    }

    pub fn decimals(&self, token: Address) -> Result<u8, TransferError> {
        Ok(self.state(token)?.config.decimals)
    }

    pub fn total_supply(&self, token: Address) -> Result<U256, TransferError> {
        Ok(self.state(token)?.total_supply)
    }

    /// Zero for unknown tokens and for holders with no entry.
    pub fn balance_of(&self, token: Address, owner: Address) -> U256 {
        self.tokens
            .get(&token)
            .and_then(|state| state.balances.get(&owner))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.tokens
            .get(&token)
            .and_then(|state| state.allowances.get(&(owner, spender)))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    pub fn mint(&mut self, token: Address, to: Address, amount: U256) -> Result<(), TransferError> {
        let state = self.state_mut(token)?;
        let supply = state
            .total_supply
            .checked_add(amount)
            .ok_or(TransferError::ArithmeticOverflow)?;
        let balance = state
            .balances
            .get(&to)
            .copied()
            .unwrap_or(U256::ZERO)
            .checked_add(amount)
            .ok_or(TransferError::ArithmeticOverflow)?;
        state.total_supply = supply;
        state.balances.insert(to, balance);
        Ok(())
    }

    pub fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        let state = self.state_mut(token)?;
        state.allowances.insert((owner, spender), amount);
        Ok(())
    }

    pub fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        let state = self.state_mut(token)?;
        let debited = state
            .balances
            .get(&from)
            .copied()
            .unwrap_or(U256::ZERO)
            .checked_sub(amount)
            .ok_or(TransferError::InsufficientBalance { token, owner: from })?;
        state.balances.insert(from, debited);
        let credited = state
            .balances
            .get(&to)
            .copied()
            .unwrap_or(U256::ZERO)
            .checked_add(amount)
            .ok_or(TransferError::ArithmeticOverflow)?;
        state.balances.insert(to, credited);
        Ok(())
    }

    /// Moves `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance.
    pub fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        let remaining = self
            .allowance(token, from, spender)
            .checked_sub(amount)
            .ok_or(TransferError::InsufficientAllowance {
                token,
                owner: from,
                spender,
            })?;
        self.transfer(token, from, to, amount)?;
        let state = self.state_mut(token)?;
        state.allowances.insert((from, spender), remaining);
        Ok(())
    }

    /// Checks that a `transfer_from` with these parameters would succeed,
    /// without moving anything. Lets multi-leg operations validate every leg
    /// before the first one commits.
    pub fn ensure_transfer_from(
        &self,
        token: Address,
        spender: Address,
        from: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        self.state(token)?;
        if self.allowance(token, from, spender) < amount {
            return Err(TransferError::InsufficientAllowance {
                token,
                owner: from,
                spender,
            });
        }
        if self.balance_of(token, from) < amount {
            return Err(TransferError::InsufficientBalance { token, owner: from });
        }
        Ok(())
    }

    fn state(&self, token: Address) -> Result<&TokenState, TransferError> {
        self.tokens
            .get(&token)
            .ok_or(TransferError::UnknownToken(token))
    }

    fn state_mut(&mut self, token: Address) -> Result<&mut TokenState, TransferError> {
        self.tokens
            .get_mut(&token)
            .ok_or(TransferError::UnknownToken(token))
    }
}
