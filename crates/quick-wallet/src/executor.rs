//! End-to-end validation and execution of signed authorizations.
//!
//! [`WalletExecutor`] is the state machine that takes an authorization from
//! `Received` through `Verified` to `Executed`, or rejects it with a
//! specific reason. It runs against a [`LedgerState`] inside an execution
//! unit, so every path through it is all-or-nothing: a rejection at any
//! point leaves no observable effects, including the nonce.
//!
//! # Validation order
//!
//! 1. Signature must recover to the wallet owner over the nonce-pinned
//!    digest (`InvalidSignature`).
//! 2. The ledger time must not have passed the expiry; the boundary is
//!    inclusive, `current_time == expiry` still executes (`Expired`).
//! 3. The authorization's nonce must equal the wallet's current nonce
//!    (`NonceMismatch`); this is what lets exactly one of several racing
//!    submissions succeed.
//!
//! # Deployment path
//!
//! Whether the wallet needs deploying is decided from state *inside* the
//! unit, not from a lookup ahead of it, so a racing unit that deploys first
//! cannot slip between check and execution. The first authorization for an
//! undeployed wallet deploys it at the derived address with nonce 0 and
//! executes the call in the same unit; if anything fails, the wallet stays
//! undeployed.
//!
//! # Failure semantics
//!
//! A target-call revert rejects the authorization with `TargetCallFailed`
//! and does **not** burn the nonce: the same signed authorization may be
//! resubmitted once the cause is fixed. Fee settlement runs after the target
//! call, and the nonce advances last, all within the unit.

use alloy_primitives::{Address, Bytes, U256};

use crate::{
    authorization::{authorization_digest, Authorization},
    contract::CallOutcome,
    error::ExecutionError,
    factory::WalletFactory,
    ledger::LedgerState,
    settlement::settle_fee,
    signature::verify_owner,
};

/// What a successfully executed authorization produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// The wallet that executed the call.
    pub wallet: Address,
    /// Whether this execution deployed the wallet.
    pub deployed: bool,
    /// The target call's return data.
    pub output: Bytes,
}

/// Executes signed authorizations against a ledger state.
#[derive(Debug)]
pub struct WalletExecutor<'a> {
    state: &'a mut LedgerState,
    factory: &'a WalletFactory,
}

impl<'a> WalletExecutor<'a> {
    /// Creates an executor over the given unit state.
    pub fn new(state: &'a mut LedgerState, factory: &'a WalletFactory) -> Self {
        Self { state, factory }
    }

    /// Validates and executes one signed authorization for `owner`'s wallet,
    /// deploying the wallet first if this is its first authorization.
    pub fn execute(
        &mut self,
        owner: Address,
        auth: &Authorization,
        nonce: U256,
        signature: &[u8],
        relayer: Address,
    ) -> Result<ExecutionSummary, ExecutionError> {
        let wallet = self.factory.derive_wallet_address(owner);
        let (wallet_owner, current_nonce, deployed) = match self.state.wallet(wallet) {
            Some(account) => (account.owner(), account.tx_count(), false),
            None => {
                self.factory.deploy(self.state, owner)?;
                (owner, U256::ZERO, true)
            }
        };

        // Received -> Verified
        let digest = authorization_digest(wallet, &auth.encode(), nonce);
        verify_owner(digest, signature, wallet_owner)?;
        let current_time = U256::from(self.state.timestamp());
        if current_time > auth.expiry {
            return Err(ExecutionError::Expired { expiry: auth.expiry, current_time });
        }
        if nonce != current_nonce {
            return Err(ExecutionError::NonceMismatch { expected: current_nonce, provided: nonce });
        }

        // Verified -> Executed
        let output =
            match self.state.invoke(wallet, auth.target, &auth.call_data, auth.native_value)? {
                CallOutcome::Success { output } => output,
                CallOutcome::Revert { output } => {
                    return Err(ExecutionError::TargetCallFailed { output })
                }
            };
        settle_fee(self.state, wallet, auth.fee_asset, auth.fee_amount, relayer)?;
        if let Some(account) = self.state.wallet_mut(wallet) {
            account.advance_nonce();
        }

        Ok(ExecutionSummary { wallet, deployed, output })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{test_factory, TestSigner};
    use alloy_primitives::address;

    fn transfer_auth(wallet: Address, to: Address, value: U256, expiry: u64) -> Authorization {
        Authorization {
            target: to,
            call_data: Bytes::new(),
            native_value: value,
            fee_asset: wallet,
            fee_amount: U256::from(1),
            expiry: U256::from(expiry),
        }
    }

    #[test]
    fn first_authorization_deploys_and_executes() {
        let factory = test_factory();
        let signer = TestSigner::new(1);
        let wallet = factory.derive_wallet_address(signer.address());
        let recipient = address!("00000000000000000000000000000000000000cc");

        let mut state = LedgerState::default();
        state.set_balance(wallet, U256::from(100));

        let auth = transfer_auth(wallet, recipient, U256::from(10), 60);
        let signature =
            signer.sign_digest(authorization_digest(wallet, &auth.encode(), U256::ZERO));

        let relayer = address!("00000000000000000000000000000000000000dd");
        let summary = WalletExecutor::new(&mut state, &factory)
            .execute(signer.address(), &auth, U256::ZERO, &signature, relayer)
            .expect("should execute");

        assert_eq!(summary.wallet, wallet);
        assert!(summary.deployed);
        assert_eq!(state.wallet(wallet).unwrap().tx_count(), U256::from(1));
        assert_eq!(state.balance(wallet), U256::from(89));
        assert_eq!(state.balance(recipient), U256::from(10));
        assert_eq!(state.balance(relayer), U256::from(1));
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let factory = test_factory();
        let signer = TestSigner::new(1);
        let wallet = factory.derive_wallet_address(signer.address());
        let recipient = address!("00000000000000000000000000000000000000cc");
        let relayer = address!("00000000000000000000000000000000000000dd");

        let mut state = LedgerState::default();
        state.set_timestamp(1000);
        state.set_balance(wallet, U256::from(100));

        // expiry == current_time still executes
        let auth = transfer_auth(wallet, recipient, U256::from(10), 1000);
        let signature =
            signer.sign_digest(authorization_digest(wallet, &auth.encode(), U256::ZERO));
        WalletExecutor::new(&mut state, &factory)
            .execute(signer.address(), &auth, U256::ZERO, &signature, relayer)
            .expect("should execute at the boundary");
    }

    #[test]
    fn past_expiry_is_rejected() {
        let factory = test_factory();
        let signer = TestSigner::new(1);
        let wallet = factory.derive_wallet_address(signer.address());
        let recipient = address!("00000000000000000000000000000000000000cc");
        let relayer = address!("00000000000000000000000000000000000000dd");

        let mut state = LedgerState::default();
        state.set_timestamp(1001);
        state.set_balance(wallet, U256::from(100));

        let auth = transfer_auth(wallet, recipient, U256::from(10), 1000);
        let signature =
            signer.sign_digest(authorization_digest(wallet, &auth.encode(), U256::ZERO));
        let err = WalletExecutor::new(&mut state, &factory)
            .execute(signer.address(), &auth, U256::ZERO, &signature, relayer)
            .unwrap_err();
        assert_eq!(
            err,
            ExecutionError::Expired {
                expiry: U256::from(1000),
                current_time: U256::from(1001)
            }
        );
    }

    #[test]
    fn wrong_nonce_is_rejected() {
        let factory = test_factory();
        let signer = TestSigner::new(1);
        let wallet = factory.derive_wallet_address(signer.address());
        let recipient = address!("00000000000000000000000000000000000000cc");
        let relayer = address!("00000000000000000000000000000000000000dd");

        let mut state = LedgerState::default();
        state.set_balance(wallet, U256::from(100));

        // signed for nonce 5 while a fresh wallet sits at nonce 0
        let auth = transfer_auth(wallet, recipient, U256::from(10), 60);
        let signature =
            signer.sign_digest(authorization_digest(wallet, &auth.encode(), U256::from(5)));
        let err = WalletExecutor::new(&mut state, &factory)
            .execute(signer.address(), &auth, U256::from(5), &signature, relayer)
            .unwrap_err();
        assert_eq!(
            err,
            ExecutionError::NonceMismatch { expected: U256::ZERO, provided: U256::from(5) }
        );
    }
}
