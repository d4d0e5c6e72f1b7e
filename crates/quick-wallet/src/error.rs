//! Error types for authorization execution.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Reasons an authorization is rejected or its execution unit rolled back.
///
/// Every rejection is reported synchronously to the submitter as part of the
/// relay receipt. The core performs no retries; resubmission with a fresh
/// nonce or expiry is a caller concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ExecutionError {
    /// The signature does not recover to the wallet owner.
    #[error("signature does not recover to the wallet owner")]
    InvalidSignature,

    /// The authorization expired before it was executed.
    #[error("authorization expired: expiry={expiry} current_time={current_time}")]
    Expired {
        /// The expiry timestamp carried by the authorization
        expiry: U256,
        /// The ledger timestamp at execution time
        current_time: U256,
    },

    /// The authorization is pinned to a nonce other than the wallet's current
    /// one. Replays of a consumed authorization and races between submitters
    /// both surface as this error.
    #[error("nonce mismatch: wallet at {expected}, authorization signed for {provided}")]
    NonceMismatch {
        /// The wallet's current nonce
        expected: U256,
        /// The nonce the authorization was signed for
        provided: U256,
    },

    /// The wallet cannot cover a native transfer or the fee, in native
    /// currency or in the fee token.
    #[error("insufficient balance: needed {needed}, available {available}")]
    InsufficientBalance {
        /// The amount the transfer required
        needed: U256,
        /// The balance actually available
        available: U256,
    },

    /// The target call reverted. The whole execution unit is rolled back and
    /// the wallet nonce does not advance.
    #[error("target call failed")]
    TargetCallFailed {
        /// The revert data returned by the target
        output: Bytes,
    },

    /// Something already occupies the derived wallet address. Fatal: the
    /// deployment is never retried (protects against address squatting).
    #[error("contract already deployed at {address}")]
    AlreadyDeployed {
        /// The occupied address
        address: Address,
    },
}
