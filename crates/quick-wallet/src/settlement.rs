//! Relay fee settlement.
//!
//! The fee is paid by the wallet to the relayer as part of the same
//! execution unit as the primary call, after that call succeeds. The fee
//! asset is either the wallet's own address, meaning native currency, or a
//! token contract address, in which case the token's `transfer` interface is
//! invoked with the wallet as caller. A failed settlement aborts the unit,
//! rolling back the primary call with it.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};

use crate::{contract::CallOutcome, error::ExecutionError, ledger::LedgerState};

sol! {
    /// The token collaborator interface consumed by fee settlement.
    ///
    /// Tokens are external contracts; the protocol only relies on `transfer`
    /// reporting failure cleanly (revert or `false`) on insufficient
    /// balance, and on `balanceOf` for diagnostics.
    interface IERC20 {
        function transfer(address to, uint256 value) external returns (bool);
        function balanceOf(address owner) external view returns (uint256);
    }
}

/// Pays `fee_amount` of `fee_asset` from the wallet to the relayer.
///
/// `fee_asset == wallet` selects the native-currency path; anything else is
/// invoked as a token contract. Token transfer failures (revert, `false`
/// return, undecodable return data) surface as
/// [`ExecutionError::InsufficientBalance`], carrying the token balance the
/// wallet actually had.
pub fn settle_fee(
    state: &mut LedgerState,
    wallet: Address,
    fee_asset: Address,
    fee_amount: U256,
    relayer: Address,
) -> Result<(), ExecutionError> {
    if fee_asset == wallet {
        return state.transfer_native(wallet, relayer, fee_amount);
    }

    let available = token_balance(state, fee_asset, wallet).unwrap_or(U256::ZERO);
    let input = IERC20::transferCall { to: relayer, value: fee_amount }.abi_encode();
    let failed = match state.invoke(wallet, fee_asset, &input, U256::ZERO)? {
        CallOutcome::Success { output } => {
            !matches!(IERC20::transferCall::abi_decode_returns(&output, true), Ok(ret) if ret._0)
        }
        CallOutcome::Revert { .. } => true,
    };
    if failed {
        return Err(ExecutionError::InsufficientBalance { needed: fee_amount, available });
    }
    Ok(())
}

/// Queries a token's `balanceOf` for an account.
pub fn token_balance(
    state: &mut LedgerState,
    token: Address,
    owner: Address,
) -> Result<U256, ExecutionError> {
    let input = IERC20::balanceOfCall { owner }.abi_encode();
    match state.invoke(owner, token, &input, U256::ZERO)? {
        CallOutcome::Success { output } => IERC20::balanceOfCall::abi_decode_returns(&output, true)
            .map(|ret| ret._0)
            .map_err(|_| ExecutionError::TargetCallFailed { output }),
        CallOutcome::Revert { output } => Err(ExecutionError::TargetCallFailed { output }),
    }
}
