//! Constant-product pool state and swap math.
//!
//! All amounts are raw smallest-unit integers. Reserves are kept as `u128`
//! and every intermediate product is widened to `U256`, so the math can
//! never wrap; anything that does not fit is reported as an error instead.

use {
    crate::tokens::{TokenLedger, TransferError},
    alloy_primitives::{Address, U256},
    model::TokenPair,
    thiserror::Error,
};

/// Fee denominator: pool fees are fixed in basis points.
pub const BPS: u32 = 10_000;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PoolError {
    #[error("token {0} is not part of the pool")]
    InvalidAsset(Address),
    #[error("swap amount must be positive")]
    InvalidAmount,
    #[error("swap would drain the output reserve")]
    InsufficientReserves,
    #[error("output {amount_out} below caller minimum {min_amount_out}")]
    SlippageExceeded {
        amount_out: U256,
        min_amount_out: U256,
    },
    #[error("arithmetic overflow in swap math")]
    ArithmeticOverflow,
    #[error("input amount has not been deposited into pool custody")]
    MissingDeposit,
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// This type denotes `(reserve_in, reserve_out, token_out)` relative to a
/// given input token.
type RelativeReserves = (u128, u128, Address);

/// One constant-product market for a token pair.
///
/// Reserve indices match the pair's canonical order. The fee is fixed at
/// construction and retained in the pool, which keeps the reserve product
/// non-decreasing across swaps.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pool {
    address: Address,
    tokens: TokenPair,
    reserves: (u128, u128),
    fee_bps: u32,
}

impl Pool {
    /// A new, empty pool. `address` is the pool's custody identity on the
    /// token ledger.
    pub fn new(address: Address, tokens: TokenPair, fee_bps: u32) -> Self {
        assert!(fee_bps < BPS, "fee must be below 100%");
        Self {
            address,
            tokens,
            reserves: (0, 0),
            fee_bps,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn tokens(&self) -> TokenPair {
        self.tokens
    }

    pub fn reserves(&self) -> (u128, u128) {
        self.reserves
    }

    pub fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    /// Expected output for selling `amount_in` of `asset_in` into the pool,
    /// as a pure function of current reserves. No side effects.
    pub fn quote_out(&self, asset_in: Address, amount_in: U256) -> Result<U256, PoolError> {
        let (reserve_in, reserve_out, _) = self.relative_reserves(asset_in)?;
        let amount_out = self.amount_out(amount_in, reserve_in, reserve_out)?;
        check_final_reserves(amount_in, amount_out, reserve_in, reserve_out)?;
        Ok(amount_out)
    }

    /// Swaps `amount_in` of `asset_in`, paying the output to `recipient`.
    ///
    /// The input must already be in the pool's custody on the ledger; the
    /// pool never pulls from an arbitrary source. Every check runs before
    /// the first mutation, so a failed swap changes nothing.
    pub fn swap(
        &mut self,
        ledger: &mut TokenLedger,
        asset_in: Address,
        amount_in: U256,
        min_amount_out: U256,
        recipient: Address,
    ) -> Result<U256, PoolError> {
        let (reserve_in, reserve_out, asset_out) = self.relative_reserves(asset_in)?;
        let amount_out = self.amount_out(amount_in, reserve_in, reserve_out)?;
        let (final_in, final_out) =
            check_final_reserves(amount_in, amount_out, reserve_in, reserve_out)?;
        if amount_out < min_amount_out {
            return Err(PoolError::SlippageExceeded {
                amount_out,
                min_amount_out,
            });
        }

        let required = U256::from(reserve_in)
            .checked_add(amount_in)
            .ok_or(PoolError::ArithmeticOverflow)?;
        if ledger.balance_of(asset_in, self.address) < required {
            return Err(PoolError::MissingDeposit);
        }

        ledger.transfer(asset_out, self.address, recipient, amount_out)?;
        self.set_reserves(asset_in, final_in, final_out);
        tracing::debug!(
            pool = ?self.address,
            ?asset_in,
            %amount_in,
            %amount_out,
            "swap applied"
        );
        Ok(amount_out)
    }

    /// Pulls both amounts from the pre-approving provider and increases the
    /// reserves. Amounts follow the pair's canonical order. No ratio
    /// enforcement: the first depositor sets the effective price and later
    /// unbalanced deposits move it, which is accepted behavior.
    pub fn add_liquidity(
        &mut self,
        ledger: &mut TokenLedger,
        provider: Address,
        amount0: U256,
        amount1: U256,
    ) -> Result<(), PoolError> {
        let (token0, token1) = self.tokens.get();
        let final0 = grown_reserve(self.reserves.0, amount0)?;
        let final1 = grown_reserve(self.reserves.1, amount1)?;
        // Both legs are validated up front so a failure on the second one
        // cannot strand the first.
        ledger.ensure_transfer_from(token0, self.address, provider, amount0)?;
        ledger.ensure_transfer_from(token1, self.address, provider, amount1)?;

        ledger.transfer_from(token0, self.address, provider, self.address, amount0)?;
        ledger.transfer_from(token1, self.address, provider, self.address, amount1)?;
        self.reserves = (final0, final1);
        tracing::debug!(pool = ?self.address, ?provider, %amount0, %amount1, "liquidity added");
        Ok(())
    }

    /// Given one of the pool's two tokens, returns its reserve, the opposite
    /// reserve and the opposite token.
    fn relative_reserves(&self, token: Address) -> Result<RelativeReserves, PoolError> {
        let (token0, token1) = self.tokens.get();
        if token == token0 {
            Ok((self.reserves.0, self.reserves.1, token1))
        } else if token == token1 {
            Ok((self.reserves.1, self.reserves.0, token0))
        } else {
            Err(PoolError::InvalidAsset(token))
        }
    }

    fn set_reserves(&mut self, asset_in: Address, final_in: u128, final_out: u128) {
        if asset_in == self.tokens.get().0 {
            self.reserves = (final_in, final_out);
        } else {
            self.reserves = (final_out, final_in);
        }
    }

    /// Fee-adjusted constant-product output. The fee is applied to the input
    /// first, truncating, then the product formula, truncating again.
    fn amount_out(
        &self,
        amount_in: U256,
        reserve_in: u128,
        reserve_out: u128,
    ) -> Result<U256, PoolError> {
        if amount_in.is_zero() {
            return Err(PoolError::InvalidAmount);
        }
        if reserve_in == 0 || reserve_out == 0 {
            return Err(PoolError::InsufficientReserves);
        }

        let reserve_in = U256::from(reserve_in);
        let reserve_out = U256::from(reserve_out);
        let amount_in_after_fee = amount_in
            .checked_mul(U256::from(BPS - self.fee_bps))
            .ok_or(PoolError::ArithmeticOverflow)?
            .checked_div(U256::from(BPS))
            .ok_or(PoolError::ArithmeticOverflow)?;
        let numerator = reserve_out
            .checked_mul(amount_in_after_fee)
            .ok_or(PoolError::ArithmeticOverflow)?;
        let denominator = reserve_in
            .checked_add(amount_in_after_fee)
            .ok_or(PoolError::ArithmeticOverflow)?;
        let amount_out = numerator
            .checked_div(denominator)
            .ok_or(PoolError::ArithmeticOverflow)?;

        if amount_out >= reserve_out {
            return Err(PoolError::InsufficientReserves);
        }
        Ok(amount_out)
    }
}

/// Post-swap reserves; errors if the output side would not stay positive or
/// the input side no longer fits the reserve width.
fn check_final_reserves(
    amount_in: U256,
    amount_out: U256,
    reserve_in: u128,
    reserve_out: u128,
) -> Result<(u128, u128), PoolError> {
    let final_in = U256::from(reserve_in)
        .checked_add(amount_in)
        .ok_or(PoolError::ArithmeticOverflow)?;
    let final_in = u128::try_from(final_in).map_err(|_| PoolError::ArithmeticOverflow)?;
    let final_out = U256::from(reserve_out)
        .checked_sub(amount_out)
        .ok_or(PoolError::InsufficientReserves)?;
    let final_out = u128::try_from(final_out).map_err(|_| PoolError::ArithmeticOverflow)?;
    Ok((final_in, final_out))
}

fn grown_reserve(reserve: u128, amount: U256) -> Result<u128, PoolError> {
    let grown = U256::from(reserve)
        .checked_add(amount)
        .ok_or(PoolError::ArithmeticOverflow)?;
    u128::try_from(grown).map_err(|_| PoolError::ArithmeticOverflow)
}
