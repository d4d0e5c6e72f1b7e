//! Wallet account state.

use alloy_primitives::{Address, U256};

/// A deployed counterfactual wallet.
///
/// The owner identity is baked in at deployment and never changes.
/// `tx_count` is the replay-protection nonce: it starts at zero, advances by
/// exactly one inside the execution unit of every successfully executed
/// authorization, and never moves for a rejected one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletAccount {
    owner: Address,
    tx_count: U256,
}

impl WalletAccount {
    pub(crate) const fn new(owner: Address) -> Self {
        Self { owner, tx_count: U256::ZERO }
    }

    /// The immutable owner identity.
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// The wallet's current nonce.
    pub const fn tx_count(&self) -> U256 {
        self.tx_count
    }

    /// Consumes the current nonce. Called exactly once per executed
    /// authorization, inside its execution unit.
    pub(crate) fn advance_nonce(&mut self) {
        self.tx_count += U256::from(1);
    }
}
